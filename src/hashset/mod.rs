//! Hash-of-Sets Module
//!
//! A persistent `key -> set of strings` map layered on the KV engine.
//!
//! ## Components
//! - [`SetStore`]: get/set/add/update/scan over whole keys
//! - [`MutableSet`]: a fetched set whose mutations write themselves back
//! - [`CacheSession`]: write-behind batching for bulk imports
//!
//! ## Value Format
//! ```text
//! key   ──►  "member1|member2|member3"
//! ```

mod cache;
mod members;
mod mutable;
mod store;

pub use cache::{CacheSession, MergeMode, RECLAIM_EVERY_FLUSHES};
pub use members::{Members, DELIMITER};
pub use mutable::MutableSet;
pub use store::{Items, SetStore, Values};
