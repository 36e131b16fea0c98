//! Engine Module
//!
//! A thin adapter over the embedded, transactional key-value engine.
//!
//! ## Responsibilities
//! - Own the engine connection and its open/close lifecycle
//! - Byte-string get/put inside implicit transactions
//! - Explicit read/write transaction scoping
//! - Snapshotted full-store scans
//!
//! ## On-Disk Layout
//! ```text
//! {store dir}/
//!   ├── data.sqlite        kv(key BLOB PRIMARY KEY, value BLOB) WITHOUT ROWID
//!   ├── data.sqlite-wal    (WAL journal, present while open for writing)
//!   └── data.sqlite-shm
//! ```

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

const DB_FILENAME: &str = "data.sqlite";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   BLOB PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
) WITHOUT ROWID;";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on one on-disk store
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - The engine runs in WAL mode: readers see the snapshot taken when their
///   transaction started and never block on the writer.
/// - At most ONE writable handle may hold a store open at a time. Nothing
///   enforces this; opening two writers is a misuse.
/// - Within a process the connection sits behind a mutex, so a handle is
///   `Send + Sync` and calls through it are serialized.
pub struct KvEngine {
    /// Store directory
    path: PathBuf,

    /// Engine options
    config: StoreConfig,

    /// `None` until `open()` succeeds, and again after `close()`
    conn: Mutex<Option<Connection>>,
}

impl KvEngine {
    /// Create an unopened handle for the store directory at `path`
    pub fn new(path: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self {
            path: path.into(),
            config,
            conn: Mutex::new(None),
        }
    }

    /// Open the store
    ///
    /// Write mode creates the directory and an empty store if absent.
    /// Read-only mode requires an existing store. Opening an already open
    /// handle is a no-op.
    pub fn open(&self) -> Result<()> {
        let mut slot = self.conn.lock();
        if slot.is_some() {
            return Ok(());
        }

        let conn = if self.config.read_only {
            self.connect_read_only()?
        } else {
            self.connect_writable()?
        };

        let map_size = i64::try_from(self.config.map_size).unwrap_or(i64::MAX);
        conn.pragma_update(None, "mmap_size", map_size)?;

        tracing::info!(
            path = %self.path.display(),
            read_only = self.config.read_only,
            "opened store"
        );

        *slot = Some(conn);
        Ok(())
    }

    fn connect_writable(&self) -> Result<Connection> {
        fs::create_dir_all(&self.path).map_err(|e| StoreError::unavailable(&self.path, e))?;

        let conn = Connection::open(self.db_file())
            .map_err(|e| StoreError::unavailable(&self.path, e))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", self.config.sync_mode.pragma_value())?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    fn connect_read_only(&self) -> Result<Connection> {
        let db_file = self.db_file();
        if !db_file.is_file() {
            return Err(StoreError::unavailable(&self.path, "store does not exist"));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(&db_file, flags)
            .map_err(|e| StoreError::unavailable(&self.path, e))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Run `f` against the open connection
    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut slot = self.conn.lock();
        let conn = slot.as_mut().ok_or(StoreError::StoreNotOpened)?;
        f(conn)
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.config.read_only {
            return Err(StoreError::ReadOnly(self.path.clone()));
        }
        Ok(())
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.with_conn(|conn| select_value(conn, key))
    }

    /// Put a key-value pair, replacing any previous value
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_writable()?;
        self.with_conn(|conn| upsert_value(conn, key, value))
    }

    /// Number of keys in the store
    pub fn len(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    /// Check whether the store holds no keys
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Run `f` inside one read transaction (a consistent snapshot)
    pub fn read<T>(&self, f: impl FnOnce(&ReadTxn<'_>) -> Result<T>) -> Result<T> {
        self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
            let out = f(&ReadTxn { conn: &tx })?;
            tx.finish()?;
            Ok(out)
        })
    }

    /// Run `f` inside one write transaction
    ///
    /// Commits when `f` returns `Ok`. An `Err` (or a panic) rolls the whole
    /// transaction back.
    pub fn write<T>(&self, f: impl FnOnce(&WriteTxn<'_>) -> Result<T>) -> Result<T> {
        self.ensure_writable()?;
        self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let out = f(&WriteTxn { conn: &tx })?;
            tx.commit()?;
            Ok(out)
        })
    }

    // =========================================================================
    // Scans
    // =========================================================================

    /// Iterate every `(key, value)` pair in key order
    ///
    /// The iterator owns its own read connection and transaction, so it sees
    /// the store as of this call regardless of later writes. Call `iter()`
    /// again to restart.
    pub fn iter(&self) -> Result<KvIter> {
        // Refuse scans on unopened handles even though the scan has its own connection
        self.with_conn(|_| Ok(()))?;

        let conn = self.connect_read_only()?;
        conn.execute_batch("BEGIN DEFERRED")?;
        // Pin the snapshot now rather than at the first page
        conn.query_row("SELECT 1 FROM kv LIMIT 1", [], |_| Ok(()))
            .optional()?;

        Ok(KvIter {
            conn,
            batch_size: self.config.scan_batch_size.max(1),
            after: None,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Ask the engine to give back cache memory it no longer needs
    pub fn release_memory(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch("PRAGMA shrink_memory")?;
            Ok(())
        })
    }

    /// Close the handle
    ///
    /// Closing an unopened handle is a no-op.
    pub fn close(&self) -> Result<()> {
        let conn = self.conn.lock().take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| StoreError::Engine(e))?;
            tracing::info!(path = %self.path.display(), "closed store");
        }
        Ok(())
    }

    /// Close the handle and irreversibly remove the store directory
    ///
    /// Unlike every other operation this does not require an opened handle,
    /// so an administrator can remove a store nothing has opened.
    pub fn destroy(&self) -> Result<()> {
        self.ensure_writable()?;
        self.close()?;
        if self.path.exists() {
            fs::remove_dir_all(&self.path)?;
        }
        tracing::info!(path = %self.path.display(), "destroyed store");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Check whether `open()` has succeeded and `close()` has not been called
    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Get the store directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the engine configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn db_file(&self) -> PathBuf {
        self.path.join(DB_FILENAME)
    }
}

impl Drop for KvEngine {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.get_mut().take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!(path = %self.path.display(), "failed to close store: {}", e);
            }
        }
    }
}

// =============================================================================
// Transaction Handles
// =============================================================================

/// Reads inside an explicit read transaction
pub struct ReadTxn<'t> {
    conn: &'t Connection,
}

impl ReadTxn<'_> {
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        select_value(self.conn, key)
    }
}

/// Reads and writes inside an explicit write transaction
pub struct WriteTxn<'t> {
    conn: &'t Connection,
}

impl WriteTxn<'_> {
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        select_value(self.conn, key)
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        upsert_value(self.conn, key, value)
    }
}

fn select_value(conn: &Connection, key: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
    let value = stmt
        .query_row(params![key], |row| row.get::<_, Vec<u8>>(0))
        .optional()?;
    Ok(value)
}

fn upsert_value(conn: &Connection, key: &[u8], value: &[u8]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )?;
    stmt.execute(params![key, value])?;
    Ok(())
}

// =============================================================================
// Scan Iterator
// =============================================================================

/// Lazy full-store scan, paged by key
pub struct KvIter {
    /// Dedicated read connection holding the scan's transaction
    conn: Connection,

    /// Rows fetched per page
    batch_size: usize,

    /// Last key handed out; the next page starts after it
    after: Option<Vec<u8>>,

    buffer: VecDeque<(Vec<u8>, Vec<u8>)>,

    exhausted: bool,
}

impl KvIter {
    fn fetch_page(&mut self) -> Result<()> {
        let limit = self.batch_size as i64;
        let mut page = Vec::with_capacity(self.batch_size);
        {
            let mut stmt = match self.after {
                Some(_) => self.conn.prepare_cached(
                    "SELECT key, value FROM kv WHERE key > ?1 ORDER BY key LIMIT ?2",
                )?,
                None => self
                    .conn
                    .prepare_cached("SELECT key, value FROM kv ORDER BY key LIMIT ?1")?,
            };
            let mut rows = match &self.after {
                Some(after) => stmt.query(params![after, limit])?,
                None => stmt.query(params![limit])?,
            };
            while let Some(row) = rows.next()? {
                page.push((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?));
            }
        }

        if page.len() < self.batch_size {
            self.exhausted = true;
        }
        if let Some((key, _)) = page.last() {
            self.after = Some(key.clone());
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl Iterator for KvIter {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
