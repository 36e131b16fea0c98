//! SNV mapping store
//!
//! Pairs a [`SetStore`] with the variant codec: callers push
//! `(Snv, VariantRecord)` pairs in and pull decoded records out.

use std::path::Path;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::hashset::{CacheSession, MergeMode, SetStore};
use crate::variant::{decode_record, Snv, VariantRecord};

/// Genomic SNV to protein-level records index
pub struct MutationMap {
    store: SetStore,
}

impl MutationMap {
    pub fn new(store: SetStore) -> Self {
        Self { store }
    }

    /// Open the named mapping store under the configured data root
    pub fn open(config: &StoreConfig, name: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(SetStore::open_named(config, name)?))
    }

    /// Record one consequence of `snv`
    pub fn insert(&self, snv: &Snv, record: &VariantRecord) -> Result<()> {
        self.store.add(&snv.key(), &record.encode())
    }

    /// All records stored for `snv`
    pub fn lookup(&self, snv: &Snv) -> Result<Vec<VariantRecord>> {
        self.lookup_key(&snv.key())
    }

    /// All records stored under a prebuilt key
    pub fn lookup_key(&self, key: &str) -> Result<Vec<VariantRecord>> {
        self.store
            .members(key)?
            .iter()
            .map(|encoded| decode_record(encoded))
            .collect()
    }

    /// Number of distinct SNVs stored
    pub fn len(&self) -> Result<u64> {
        self.store.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.store.is_empty()
    }

    /// Start a bulk import
    pub fn import(&mut self, mode: MergeMode) -> MappingImport<'_> {
        MappingImport {
            session: self.store.cache_session(mode),
            imported: 0,
        }
    }

    pub fn store(&self) -> &SetStore {
        &self.store
    }

    pub fn close(&self) -> Result<()> {
        self.store.close()
    }
}

/// Bulk import of mapping records through a cache session
pub struct MappingImport<'a> {
    session: CacheSession<'a>,
    imported: u64,
}

impl<'a> MappingImport<'a> {
    /// Flush automatically after every `adds` records
    pub fn flush_every(self, adds: usize) -> Self {
        Self {
            session: self.session.flush_every(adds),
            imported: self.imported,
        }
    }

    pub fn add(&mut self, snv: &Snv, record: &VariantRecord) -> Result<()> {
        self.session.cached_add(&snv.key(), &record.encode())?;
        self.imported += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.session.flush()
    }

    /// Finish the import, returning the number of records added
    pub fn finish(self) -> Result<u64> {
        let imported = self.imported;
        self.session.finish()?;
        tracing::info!(imported, "mapping import finished");
        Ok(imported)
    }
}
