//! # snvmap
//!
//! A persistent index from genomic single-nucleotide variants to the
//! protein-level records they produce across all isoforms of a gene:
//! - Multi-valued "hash of sets" over an embedded transactional KV engine
//! - Write-back set views for interactive single-key edits
//! - Write-behind cache sessions for bulk imports
//! - Compact textual codec for SNV keys and variant records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              MutationMap  (Snv ──► VariantRecords)           │
//! │                  variant key / record codec                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 SetStore  (key ──► set<String>)              │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │   MutableSet    │                │  CacheSession   │
//!   │ (write-through) │                │ (write-behind)  │
//!   └────────┬────────┘                └────────┬────────┘
//!            └────────────────┬─────────────────┘
//!                             ▼
//!                     ┌───────────────┐
//!                     │   KvEngine    │
//!                     │ (SQLite, WAL) │
//!                     └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod engine;
pub mod hashset;
pub mod variant;
pub mod mapping;
pub mod stores;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::{StoreConfig, SyncMode};
pub use engine::KvEngine;
pub use hashset::{CacheSession, MergeMode, MutableSet, SetStore};
pub use mapping::{MappingImport, MutationMap};
pub use stores::Stores;
pub use variant::{Snv, Strand, VariantRecord};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of snvmap
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
