//! Multi-valued set store
//!
//! `key -> set of strings` over the KV engine. Each key's members are
//! joined into a single value (see [`super::members`]).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::engine::{KvEngine, KvIter};
use crate::error::{Result, StoreError};

use super::cache::{CacheSession, MergeMode};
use super::members::{
    assert_integer_member, assert_member, join_members, parse_integer, split_members,
    value_to_string, Members,
};
use super::mutable::MutableSet;

/// Persistent hash of sets
///
/// Absent keys read as empty sets. Every operation on a handle that has not
/// been opened fails with [`StoreError::StoreNotOpened`].
///
/// `add` and `update` read and write the key inside a single write
/// transaction; callers still must not run two writers on one store.
pub struct SetStore {
    engine: KvEngine,
    integer_values: bool,
}

impl SetStore {
    /// Create an unopened store handle at `path`
    pub fn new(path: impl Into<PathBuf>, config: StoreConfig) -> Self {
        let integer_values = config.integer_values;
        Self {
            engine: KvEngine::new(path, config),
            integer_values,
        }
    }

    /// Create and open a store handle at `path`
    pub fn open_at(path: impl Into<PathBuf>, config: StoreConfig) -> Result<Self> {
        let store = Self::new(path, config);
        store.open()?;
        Ok(store)
    }

    /// Open the named store under the configured data root
    pub fn open_named(config: &StoreConfig, name: impl AsRef<Path>) -> Result<Self> {
        Self::open_at(config.store_path(name), config.clone())
    }

    pub fn open(&self) -> Result<()> {
        self.engine.open()
    }

    pub fn close(&self) -> Result<()> {
        self.engine.close()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch a key's members as a write-back view
    ///
    /// `add`/`update` on the returned view persist immediately.
    pub fn get(&self, key: &str) -> Result<MutableSet<'_>> {
        let members = self.members(key)?;
        let key = key.to_string();
        Ok(MutableSet::new(members, move |current| self.set(&key, current)))
    }

    /// Fetch a key's members as a plain set
    pub fn members(&self, key: &str) -> Result<HashSet<String>> {
        match self.engine.get(key.as_bytes())? {
            Some(raw) => Ok(split_members(value_to_string(raw)?)),
            None => Ok(HashSet::new()),
        }
    }

    /// Check whether `key` has ever been written
    pub fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.engine.get(key.as_bytes())?.is_some())
    }

    /// Fetch a key's members parsed as integers
    pub fn get_integers(&self, key: &str) -> Result<HashSet<i64>> {
        self.members(key)?
            .iter()
            .map(|member| parse_integer(member))
            .collect()
    }

    /// Number of keys (not members) in the store
    pub fn len(&self) -> Result<u64> {
        self.engine.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.engine.is_empty()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Replace a key's members
    ///
    /// # Panics
    /// If a member contains [`super::DELIMITER`], or is not a decimal
    /// integer on an integer-valued store.
    pub fn set(&self, key: &str, members: &HashSet<String>) -> Result<()> {
        members.iter().for_each(|m| self.check_member(m));
        self.engine
            .put(key.as_bytes(), join_members(members).as_bytes())
    }

    /// Replace a key's members with integer identifiers
    pub fn set_integers(&self, key: &str, members: &HashSet<i64>) -> Result<()> {
        let members: HashSet<String> = members.iter().map(i64::to_string).collect();
        self.set(key, &members)
    }

    /// Add one member to a key
    pub fn add(&self, key: &str, member: &str) -> Result<()> {
        self.update(key, [member])
    }

    /// Add one integer member to a key
    pub fn add_integer(&self, key: &str, member: i64) -> Result<()> {
        self.update(key, [member.to_string()])
    }

    /// Union `members` into a key's set
    pub fn update<I, S>(&self, key: &str, members: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let additions: Vec<String> = members
            .into_iter()
            .map(|m| {
                let m = m.as_ref();
                self.check_member(m);
                m.to_string()
            })
            .collect();

        self.engine.write(|txn| {
            let mut current = match txn.get(key.as_bytes())? {
                Some(raw) => split_members(value_to_string(raw)?),
                None => HashSet::new(),
            };
            current.extend(additions);
            txn.put(key.as_bytes(), join_members(&current).as_bytes())
        })
    }

    /// Union integer identifiers into a key's set
    pub fn update_integers<I>(&self, key: &str, members: I) -> Result<()>
    where
        I: IntoIterator<Item = i64>,
    {
        self.update(key, members.into_iter().map(|m| m.to_string()))
    }

    /// Write several whole keys in one transaction
    pub(crate) fn write_sets<'k, I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'k String, &'k HashSet<String>)>,
    {
        self.engine.write(|txn| {
            for (key, members) in entries {
                txn.put(key.as_bytes(), join_members(members).as_bytes())?;
            }
            Ok(())
        })
    }

    pub(crate) fn check_member(&self, member: &str) {
        assert_member(member);
        if self.integer_values {
            assert_integer_member(member);
        }
    }

    // =========================================================================
    // Scans
    // =========================================================================

    /// Iterate every key with a lazy member sequence
    pub fn iter_items(&self) -> Result<Items> {
        Ok(Items {
            inner: self.engine.iter()?,
        })
    }

    /// Iterate every key's lazy member sequence
    pub fn iter_values(&self) -> Result<Values> {
        Ok(Values {
            inner: self.engine.iter()?,
        })
    }

    // =========================================================================
    // Bulk Import
    // =========================================================================

    /// Start a write-behind cache session
    ///
    /// The session borrows the store exclusively until it is finished or
    /// dropped, and flushes whatever is pending on the way out.
    pub fn cache_session(&mut self, mode: MergeMode) -> CacheSession<'_> {
        CacheSession::new(self, mode)
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Irreversibly delete the on-disk store
    ///
    /// Works on an unopened handle as well; the handle is left unopened.
    pub fn destroy(&self) -> Result<()> {
        self.engine.destroy()
    }

    /// Delete the on-disk store and re-create it empty
    ///
    /// Works on an unopened handle as well; the handle is left open.
    pub fn reset(&self) -> Result<()> {
        self.engine.destroy()?;
        self.engine.open()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_open(&self) -> bool {
        self.engine.is_open()
    }

    pub fn integer_values(&self) -> bool {
        self.integer_values
    }

    pub fn path(&self) -> &Path {
        self.engine.path()
    }

    /// The underlying engine handle (for testing and debugging)
    pub fn engine(&self) -> &KvEngine {
        &self.engine
    }
}

// =============================================================================
// Scan Iterators
// =============================================================================

/// `(key, members)` pairs of a full-store scan
pub struct Items {
    inner: KvIter,
}

impl Iterator for Items {
    type Item = Result<(String, Members)>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(entry.and_then(|(key, value)| {
            let key = String::from_utf8(key)
                .map_err(|e| StoreError::corrupt(format!("key is not UTF-8: {}", e)))?;
            Ok((key, Members::new(value_to_string(value)?)))
        }))
    }
}

/// Member sequences of a full-store scan
pub struct Values {
    inner: KvIter,
}

impl Iterator for Values {
    type Item = Result<Members>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(entry.and_then(|(_, value)| Ok(Members::new(value_to_string(value)?))))
    }
}
