//! Read-only view of a cache's contents

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Point-in-time copy of a cache's state
///
/// Serializes to `{"capacity":2,"size":1,"items":{"1":1},"order":[1]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Configured capacity
    pub capacity: i64,
    /// Number of live entries
    pub size: usize,
    /// Live entries keyed by key
    pub items: BTreeMap<i64, i64>,
    /// Keys from most- to least-recently-used
    pub order: Vec<i64>,
}

impl Snapshot {
    /// Most-recently-used key, if any
    pub fn most_recent(&self) -> Option<i64> {
        self.order.first().copied()
    }

    /// Least-recently-used key, if any
    pub fn least_recent(&self) -> Option<i64> {
        self.order.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_shape() {
        let snap = Snapshot {
            capacity: 2,
            size: 2,
            items: BTreeMap::from([(1, 1), (2, 2)]),
            order: vec![2, 1],
        };

        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(
            json,
            r#"{"capacity":2,"size":2,"items":{"1":1,"2":2},"order":[2,1]}"#
        );

        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_items_sorted_by_key_not_recency() {
        let mut cache = crate::LruCache::new(3).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);

        let snap = cache.snapshot();
        assert_eq!(snap.order, vec![2, 1]);
        assert_eq!(
            serde_json::to_string(&snap.items).unwrap(),
            r#"{"1":1,"2":2}"#
        );
    }

    #[test]
    fn test_snapshot_ends() {
        let snap = Snapshot {
            capacity: 3,
            size: 3,
            items: BTreeMap::from([(1, 10), (2, 20), (3, 30)]),
            order: vec![3, 1, 2],
        };

        assert_eq!(snap.most_recent(), Some(3));
        assert_eq!(snap.least_recent(), Some(2));
        assert_eq!(Snapshot::default().most_recent(), None);
    }
}
