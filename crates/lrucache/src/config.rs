//! Cache construction parameters

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default capacity, matching the two-entry demo cache
pub const DEFAULT_CAPACITY: i64 = 2;

/// Upper bound on capacity; two arena slots are reserved for sentinels
pub const MAX_CAPACITY: i64 = (u32::MAX - 2) as i64;

/// Configuration for an [`LruCache`](crate::LruCache)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub capacity: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Config with the given capacity
    pub fn with_capacity(capacity: i64) -> Self {
        Self { capacity }
    }

    /// Check the capacity and return it as a slot count
    pub fn validate(&self) -> Result<usize> {
        if self.capacity <= 0 {
            return Err(Error::invalid_config(format!(
                "capacity must be greater than 0, got {}",
                self.capacity
            )));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(Error::invalid_config(format!(
                "capacity must be at most {}, got {}",
                MAX_CAPACITY, self.capacity
            )));
        }
        Ok(self.capacity as usize)
    }
}
