//! Application store handles
//!
//! The stores an application keeps open for its whole run, constructed once
//! at start-up and passed to whatever needs them.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::hashset::SetStore;
use crate::mapping::MutationMap;

/// Directory name of the SNV mapping store
pub const MUTATIONS_STORE: &str = "snv_mappings";

/// Directory name of the RefSeq transcript to protein id store
pub const REFSEQ_STORE: &str = "refseq_proteins";

/// Configuration for the named application store
///
/// The RefSeq store holds integer protein ids, so it is opened in
/// integer-valued mode; every other store keeps `config` as given.
pub fn store_config(config: &StoreConfig, name: &str) -> StoreConfig {
    let mut config = config.clone();
    if name == REFSEQ_STORE {
        config.integer_values = true;
    }
    config
}

/// Every store the application uses
pub struct Stores {
    /// SNV key -> encoded variant records
    pub mutations: MutationMap,

    /// RefSeq transcript id -> protein ids (integer members)
    pub refseq: SetStore,
}

impl Stores {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let mutations = MutationMap::open(config, MUTATIONS_STORE)?;
        let refseq = SetStore::open_named(&store_config(config, REFSEQ_STORE), REFSEQ_STORE)?;

        Ok(Self { mutations, refseq })
    }

    pub fn close(&self) -> Result<()> {
        self.mutations.close()?;
        self.refseq.close()
    }
}
