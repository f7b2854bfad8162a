//! # lrucache
//!
//! Fixed-capacity LRU cache over integer keys and values.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to arena slot (O(1))
//! - **LRU List**: Doubly-linked list of slot indices between two sentinel
//!   slots (O(1) promote and evict)
//! - **Snapshot**: Serializable view of capacity, size, items and order
//!
//! `LruCache` itself is single-threaded; wrap it in `SharedLruCache` to share
//! it across threads.

#![warn(missing_docs)]

mod config;
mod error;
mod lru;
mod shared;
mod snapshot;
mod stats;

pub use config::{CacheConfig, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use error::{Error, Result};
pub use lru::{Iter, LruCache, NOT_FOUND};
pub use shared::SharedLruCache;
pub use snapshot::Snapshot;
pub use stats::{CacheStats, StatsSnapshot};
