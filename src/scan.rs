//! Bounded index discovery over collections that cannot report their size.
//!
//! The automation host exposes its collections without any count query, so
//! the set of valid identifiers has to be discovered by probing. Two
//! strategies exist: walking a bulk "all items" handle until the first
//! failed lookup, and, when the host refuses that handle or it turns out
//! empty, probing single-item lookups over a bounded key range while
//! tolerating gaps.

use std::collections::BTreeSet;

use log::debug;

use crate::errors::HostError;

/// An item handle returned by collection lookups.
pub trait ProbeItem {
    /// Host identifier of the item, when the host exposes one.
    fn number(&self) -> Option<i64>;
}

/// Positional handle over a host "all items" snapshot.
pub trait BulkHandle {
    /// Item type produced by lookups.
    type Item: ProbeItem;

    /// Look up the item at a 1-based position.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Lookup`] past the end of the snapshot; callers
    /// treat the first failure as the end of the walk.
    fn get(&self, index: usize) -> Result<Self::Item, HostError>;
}

/// A collection-like host handle probed by the discovery scan.
pub trait ProbeCollection {
    /// Item type produced by lookups.
    type Item: ProbeItem;
    /// Bulk handle type produced by [`ProbeCollection::all`].
    type Bulk: BulkHandle<Item = Self::Item>;

    /// Request the bulk "all items" handle.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::BulkUnavailable`] when the host refuses the
    /// handle; discovery then falls back to single-item probing.
    fn all(&self) -> Result<Self::Bulk, HostError>;

    /// Look up a single item by identifier. The identifier space doubles as
    /// the 1-based probe key space during the fallback scan.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Lookup`] when nothing exists at `key`.
    fn get(&self, key: i64) -> Result<Self::Item, HostError>;
}

/// Bounds on the fallback scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanLimits {
    /// Highest key probed by the fallback scan.
    pub max_index: i64,
    /// Number of consecutive failed lookups that terminates the fallback
    /// scan. Bounds the cost of sparse identifier spaces while still
    /// tolerating gaps.
    pub max_consecutive_misses: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_index: 10_000,
            max_consecutive_misses: 20,
        }
    }
}

/// Discover the identifiers present in a collection.
///
/// The bulk handle is tried first; its identifiers are returned in walk
/// order. When the handle is refused or yields nothing, the fallback scan
/// probes single-item lookups and returns its findings deduplicated and
/// sorted ascending.
pub fn discover<C: ProbeCollection>(collection: &C, limits: ScanLimits) -> Vec<i64> {
    match collection.all() {
        Ok(bulk) => {
            let ids = walk_bulk(&bulk);
            if ids.is_empty() {
                debug!("bulk handle yielded no items, falling back to indexed scan");
            } else {
                return ids;
            }
        }
        Err(_) => debug!("bulk handle unavailable, falling back to indexed scan"),
    }
    indexed_scan(collection, limits)
}

/// Walk a 1-based index against the bulk handle, stopping at the first
/// failed lookup.
fn walk_bulk<B: BulkHandle>(bulk: &B) -> Vec<i64> {
    let mut ids = Vec::new();
    let mut index = 1;
    while let Ok(item) = bulk.get(index) {
        if let Some(number) = item.number() {
            ids.push(number);
        } else {
            debug!("bulk item at position {index} has no identifier, skipping");
        }
        index += 1;
    }
    ids
}

/// Probe single-item lookups over `1..=max_index`, tolerating gaps up to the
/// consecutive-miss bound.
fn indexed_scan<C: ProbeCollection>(collection: &C, limits: ScanLimits) -> Vec<i64> {
    let mut ids = BTreeSet::new();
    let mut misses = 0;
    for key in 1..=limits.max_index {
        match collection.get(key) {
            Ok(item) => {
                misses = 0;
                if let Some(number) = item.number() {
                    ids.insert(number);
                }
            }
            Err(_) => {
                misses += 1;
                if misses >= limits.max_consecutive_misses {
                    debug!("indexed scan stopped at key {key} after {misses} consecutive misses");
                    break;
                }
            }
        }
    }
    ids.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{MemoryCollection, MemoryNode};

    fn collection_with(ids: &[i64]) -> MemoryCollection<MemoryNode> {
        let mut collection = MemoryCollection::new();
        for &id in ids {
            collection.insert(id, MemoryNode::at(id, 0.0, 0.0, 0.0));
        }
        collection
    }

    #[test]
    fn bulk_walk_returns_every_identifier() {
        let collection = collection_with(&[1, 2, 5, 7]);
        assert_eq!(discover(&collection, ScanLimits::default()), vec![1, 2, 5, 7]);
    }

    #[test]
    fn fallback_scan_tolerates_gaps_up_to_the_bound() {
        let collection = collection_with(&[1, 2, 5, 7]).with_bulk_denied();
        assert_eq!(discover(&collection, ScanLimits::default()), vec![1, 2, 5, 7]);
    }

    #[test]
    fn fallback_scan_stops_after_twenty_consecutive_misses() {
        // Identifiers resume at 24, i.e. 21 consecutive missing keys starting
        // at 3. The scan must stop without ever reaching them.
        let collection = collection_with(&[1, 2, 24, 25]).with_bulk_denied();
        assert_eq!(discover(&collection, ScanLimits::default()), vec![1, 2]);
    }

    #[test]
    fn empty_bulk_handle_falls_back_to_the_indexed_scan() {
        let mut collection = collection_with(&[3, 4]);
        collection.set_bulk_override(Vec::new());
        assert_eq!(discover(&collection, ScanLimits::default()), vec![3, 4]);
    }

    #[test]
    fn miss_counter_resets_on_every_hit() {
        // Repeated gaps of 19 never trip the 20-miss bound.
        let collection = collection_with(&[1, 21, 41]).with_bulk_denied();
        assert_eq!(discover(&collection, ScanLimits::default()), vec![1, 21, 41]);
    }

    #[test]
    fn fallback_scan_respects_the_key_ceiling() {
        let collection = collection_with(&[1, 2, 3]).with_bulk_denied();
        let limits = ScanLimits {
            max_index: 2,
            ..ScanLimits::default()
        };
        assert_eq!(discover(&collection, limits), vec![1, 2]);
    }

    #[test]
    fn items_without_identifiers_are_skipped() {
        let mut collection = collection_with(&[1, 3]);
        collection.insert(2, MemoryNode::default());
        assert_eq!(discover(&collection, ScanLimits::default()), vec![1, 3]);
    }
}
