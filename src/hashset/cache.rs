//! Write-behind cache session
//!
//! Batches bulk additions in memory and writes whole keys back in one
//! transaction per flush, instead of one read/write round trip per add.
//!
//! ## Merge Modes
//! - `MergeWithExisting`: the first touch of a key loads its on-disk
//!   members, so flushed sets are the union of old and new members.
//! - `Overwrite`: a key touched in the session starts empty and its
//!   pre-session members are discarded at flush. Keys this session has
//!   already flushed are loaded back, so a second touch extends rather
//!   than clobbers what the session wrote earlier.
//!
//! ## Failure Semantics
//! Each flush commits fully or not at all. A crash loses only additions
//! made since the last successful flush.

use std::collections::{HashMap, HashSet};

use crate::error::Result;

use super::store::SetStore;

/// Number of flushes between memory-reclaim sweeps
pub const RECLAIM_EVERY_FLUSHES: u64 = 10;

/// How cached additions combine with what is already on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Union with the on-disk members
    #[default]
    MergeWithExisting,

    /// Replace the on-disk members of every touched key
    Overwrite,
}

/// Open cache session over a [`SetStore`]
///
/// The store is exclusively borrowed while the session lives. Dropping the
/// session flushes pending additions, including during a panic unwind;
/// call [`CacheSession::finish`] to observe the final flush's result.
pub struct CacheSession<'a> {
    store: &'a mut SetStore,
    mode: MergeMode,

    /// Accumulated members per key since the last flush
    pending: HashMap<String, HashSet<String>>,

    /// Keys flushed by this session (tracked in overwrite mode only)
    flushed: HashSet<String>,

    flush_count: u64,

    /// Additions since the last flush
    unflushed_adds: usize,

    /// Flush automatically after this many additions
    flush_every: Option<usize>,

    finished: bool,
}

impl<'a> CacheSession<'a> {
    pub(crate) fn new(store: &'a mut SetStore, mode: MergeMode) -> Self {
        tracing::debug!(path = %store.path().display(), ?mode, "cache session started");
        Self {
            store,
            mode,
            pending: HashMap::new(),
            flushed: HashSet::new(),
            flush_count: 0,
            unflushed_adds: 0,
            flush_every: None,
            finished: false,
        }
    }

    /// Flush automatically after every `adds` cached additions
    pub fn flush_every(mut self, adds: usize) -> Self {
        self.flush_every = Some(adds.max(1));
        self
    }

    // =========================================================================
    // Cached Writes
    // =========================================================================

    /// Add a member to a key in memory
    pub fn cached_add(&mut self, key: &str, value: &str) -> Result<()> {
        self.store.check_member(value);
        if !self.pending.contains_key(key) {
            let initial = self.load(key)?;
            self.pending.insert(key.to_string(), initial);
        }
        if let Some(members) = self.pending.get_mut(key) {
            members.insert(value.to_string());
        }

        self.unflushed_adds += 1;
        if let Some(limit) = self.flush_every {
            if self.unflushed_adds >= limit {
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Add an integer member to a key in memory
    pub fn cached_add_integer(&mut self, key: &str, value: i64) -> Result<()> {
        self.cached_add(key, &value.to_string())
    }

    /// Members of `key` as the session currently sees them
    pub fn get(&self, key: &str) -> Result<HashSet<String>> {
        match self.pending.get(key) {
            Some(members) => Ok(members.clone()),
            None => self.load(key),
        }
    }

    /// Starting members for a key's first touch since the last flush
    fn load(&self, key: &str) -> Result<HashSet<String>> {
        match self.mode {
            MergeMode::MergeWithExisting => self.store.members(key),
            MergeMode::Overwrite if self.flushed.contains(key) => self.store.members(key),
            MergeMode::Overwrite => Ok(HashSet::new()),
        }
    }

    // =========================================================================
    // Flushing
    // =========================================================================

    /// Write every pending key in one transaction
    ///
    /// On failure nothing is committed and the pending additions are kept,
    /// so the caller may retry.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let keys = self.pending.len();
        self.store.write_sets(self.pending.iter())?;

        if self.mode == MergeMode::Overwrite {
            self.flushed.extend(self.pending.drain().map(|(key, _)| key));
        } else {
            self.pending.clear();
        }
        self.unflushed_adds = 0;
        self.flush_count += 1;

        tracing::debug!(keys, flush = self.flush_count, "cache session flushed");

        if self.flush_count % RECLAIM_EVERY_FLUSHES == 0 {
            // The flush itself has committed; a failed sweep only costs memory
            if let Err(e) = self.reclaim() {
                tracing::warn!(flush = self.flush_count, "cache session reclaim failed: {}", e);
            }
        }
        Ok(())
    }

    /// Hand back memory held by emptied buffers and engine caches
    fn reclaim(&mut self) -> Result<()> {
        self.pending.shrink_to_fit();
        self.store.engine().release_memory()?;
        tracing::debug!(flush = self.flush_count, "cache session reclaimed memory");
        Ok(())
    }

    /// End the session with a final flush
    ///
    /// If the final flush fails its additions are lost along with the session.
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.flush()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Number of keys waiting for the next flush
    pub fn pending_keys(&self) -> usize {
        self.pending.len()
    }

    /// Number of successful flushes so far
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }
}

impl Drop for CacheSession<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.flush() {
            tracing::error!(
                path = %self.store.path().display(),
                pending = self.pending.len(),
                "cache session flush on drop failed: {}",
                e
            );
        }
    }
}
