//! Configuration for snvmap stores
//!
//! Centralized configuration with sensible defaults. Store paths and engine
//! options are handed in by the embedding application; nothing here reads
//! the environment.

use std::path::{Path, PathBuf};

/// Configuration shared by every store opened under one data root
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Location
    // -------------------------------------------------------------------------
    /// Application data root. A named store lives in its own directory:
    ///   {data_root}/
    ///     └── {store name}/
    ///           ├── data.sqlite
    ///           └── data.sqlite-wal   (while a writer is active)
    pub data_root: PathBuf,

    // -------------------------------------------------------------------------
    // Engine Configuration
    // -------------------------------------------------------------------------
    /// Open without write access; the store must already exist
    pub read_only: bool,

    /// Bytes of the database file the engine may memory-map for reads
    pub map_size: u64,

    /// How often the engine fsyncs committed transactions
    pub sync_mode: SyncMode,

    /// Rows fetched per page during a full-store scan
    pub scan_batch_size: usize,

    // -------------------------------------------------------------------------
    // Value Format
    // -------------------------------------------------------------------------
    /// Members are decimal integers (identifiers) rather than encoded strings
    pub integer_values: bool,
}

/// Engine sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// fsync on every commit (safest, slowest)
    Full,

    /// fsync at WAL checkpoints only; a power loss may drop the last
    /// commits but never corrupts the store
    Normal,
}

impl SyncMode {
    pub(crate) fn pragma_value(self) -> &'static str {
        match self {
            SyncMode::Full => "FULL",
            SyncMode::Normal => "NORMAL",
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./snvmap_data"),
            read_only: false,
            map_size: 1024 * 1024 * 1024, // 1 GB
            sync_mode: SyncMode::Normal,
            scan_batch_size: 1024,
            integer_values: false,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Resolve a store name (a relative path) against the data root
    pub fn store_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.data_root.join(name)
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the application data root
    pub fn data_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_root = path.into();
        self
    }

    /// Open stores read-only
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Set the memory-map size (in bytes)
    pub fn map_size(mut self, bytes: u64) -> Self {
        self.config.map_size = bytes;
        self
    }

    /// Set the engine sync strategy
    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.config.sync_mode = mode;
        self
    }

    /// Set the number of rows fetched per scan page
    pub fn scan_batch_size(mut self, rows: usize) -> Self {
        self.config.scan_batch_size = rows.max(1);
        self
    }

    /// Treat set members as integers
    pub fn integer_values(mut self, enabled: bool) -> Self {
        self.config.integer_values = enabled;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
