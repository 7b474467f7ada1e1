//! Region-Aware Spawn Pool
//!
//! Round-robin pool of reusable instances. Checkout reuses a free entry
//! when the circular scan finds one, grows by one while the capacity
//! bound allows, and otherwise reports exhaustion with `None`. Instances
//! destroyed behind the pool's back are purged lazily during the scan.

use std::time::Instant;

use crate::config::PoolConfig;
use crate::entry::{PooledEntry, RegionTag};
use crate::host::{InstanceHost, Transform};
use crate::region::{RegionEvents, RegionId, RegionLifecycleBridge};

/// Checkout/reuse counters, diagnostics only.
#[derive(Debug, Default, Clone)]
pub struct PoolStats {
    /// Instances created through growth
    pub created: usize,
    /// Checkouts served by a previously used entry
    pub reused: usize,
    /// Stale entries removed during scans
    pub purged: usize,
    /// Checkouts that found the pool exhausted
    pub denied: usize,
}

impl PoolStats {
    /// Fraction of checkouts served without creating an instance.
    pub fn reuse_rate(&self) -> f64 {
        let total = self.created + self.reused;
        if total == 0 {
            0.0
        } else {
            self.reused as f64 / total as f64
        }
    }
}

/// Pool of reusable instances driven through an [`InstanceHost`].
///
/// The pool owns the host, and with it the lifetime of every instance it
/// creates: callers receive handles, never ownership, and `checkin` only
/// deactivates. Instances are destroyed exclusively by [`clear`].
///
/// All operations are synchronous and complete within one circular scan;
/// a single logical thread is expected to drive the pool.
///
/// [`clear`]: SpawnPool::clear
pub struct SpawnPool<H: InstanceHost> {
    host: H,
    entries: Vec<PooledEntry<H::Handle>>,
    max_size: Option<usize>,
    scan_cursor: usize,
    bridge: Option<RegionLifecycleBridge>,
    stats: PoolStats,
}

impl<H: InstanceHost> SpawnPool<H> {
    /// Create a pool over `host`, pre-warmed per `config`.
    pub fn new(host: H, config: PoolConfig) -> Self {
        let mut pool = Self {
            host,
            entries: Vec::new(),
            max_size: config.max_size,
            scan_cursor: 0,
            bridge: None,
            stats: PoolStats::default(),
        };
        if config.prewarm > 0 {
            pool.initialize(config.prewarm);
        }
        pool
    }

    /// Check out a free instance for `region`.
    ///
    /// Returns `None` when every live entry is checked out and the
    /// capacity bound blocks growth. Exhaustion is an expected outcome
    /// under load, not an error; callers retry later or skip the spawn.
    pub fn checkout(&mut self, region: RegionId) -> Option<H::Handle> {
        // Self-initialize on first use (and after clear)
        if self.entries.is_empty() && !self.try_grow() {
            self.stats.denied += 1;
            return None;
        }

        let selected = match self.scan_for_free() {
            Some(idx) => Some(idx),
            None if self.try_grow() => Some(self.entries.len() - 1),
            None => None,
        };

        let Some(idx) = selected else {
            self.stats.denied += 1;
            return None;
        };

        self.scan_cursor = idx;
        let entry = &mut self.entries[idx];
        if entry.retrieved_at.is_some() {
            self.stats.reused += 1;
        }
        entry.active = true;
        entry.region = RegionTag::Held(region);
        entry.retrieved_at = Some(Instant::now());
        let handle = entry.handle;
        self.host.set_active(handle, true);
        Some(handle)
    }

    /// Checkout plus spatial placement of the instance.
    pub fn checkout_at(&mut self, region: RegionId, transform: &Transform) -> Option<H::Handle> {
        let handle = self.checkout(region)?;
        self.host.place(handle, transform);
        Some(handle)
    }

    /// Return an instance to the pool.
    ///
    /// Idempotent: checking in an inactive or unknown handle is a no-op.
    /// The region tag and retrieval timestamp stay behind for diagnostics;
    /// only the active flag flips.
    pub fn checkin(&mut self, handle: H::Handle) {
        let Some(entry) = self.entries.iter_mut().find(|e| e.handle == handle) else {
            return;
        };
        if !entry.active {
            return;
        }
        entry.active = false;
        self.host.set_active(handle, false);
    }

    /// Pre-warm the pool to at least `target` entries, clamped to the
    /// capacity bound. Idempotent; does nothing at or above target.
    pub fn initialize(&mut self, target: usize) {
        let target = match self.max_size {
            Some(max) => target.min(max),
            None => target,
        };
        while self.entries.len() < target {
            if !self.try_grow() {
                break;
            }
        }
    }

    /// Destroy every instance, active or not, and empty the pool.
    ///
    /// The only bulk-destruction path. Safe on an uninitialized pool; the
    /// next checkout re-initializes from scratch.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!("Clearing pool, destroying {} entries", self.entries.len());
        }
        for entry in self.entries.drain(..) {
            if self.host.is_alive(entry.handle) {
                self.host.destroy(entry.handle);
            }
        }
        self.scan_cursor = 0;
    }

    /// Reclaim every entry held by a torn-down region.
    ///
    /// The authoritative reclamation path, distinct from `checkin`: runs
    /// regardless of each entry's active flag and re-tags the entry as
    /// detached. Entries whose instance is already dead are skipped here
    /// and purged by a later scan.
    pub fn reclaim_region(&mut self, region: RegionId) {
        let mut reclaimed = 0;
        for entry in &mut self.entries {
            if entry.region != RegionTag::Held(region) {
                continue;
            }
            entry.region = RegionTag::Detached;
            entry.active = false;
            if self.host.is_alive(entry.handle) {
                self.host.set_active(entry.handle, false);
            }
            reclaimed += 1;
        }
        if reclaimed > 0 {
            tracing::debug!("Region {} teardown reclaimed {} entries", region, reclaimed);
        }
    }

    /// Subscribe to a region-teardown stream.
    ///
    /// Replaces any previous subscription. Call order relative to other
    /// subscribers is the owning system's responsibility.
    pub fn activate(&mut self, events: &mut RegionEvents) {
        self.bridge = Some(RegionLifecycleBridge::subscribe(events));
    }

    /// Drop the region-teardown subscription.
    pub fn deactivate(&mut self) {
        self.bridge = None;
    }

    /// Apply teardown notifications received since the last pump.
    pub fn pump_region_events(&mut self) {
        let Some(bridge) = &mut self.bridge else {
            return;
        };
        let regions = bridge.drain();
        for region in regions {
            self.reclaim_region(region);
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity bound; `None` = unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.max_size
    }

    /// Number of entries currently available for checkout.
    pub fn free(&self) -> usize {
        self.entries.iter().filter(|e| !e.active).count()
    }

    /// Checkout/reuse counters.
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Entry records, for diagnostics.
    pub fn entries(&self) -> &[PooledEntry<H::Handle>] {
        &self.entries
    }

    /// The instance backend.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the instance backend.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Circular scan for an inactive entry, purging dead handles in place.
    ///
    /// Starts just after the cursor and probes at most one full circle.
    /// Removal keeps the scan at the same index so the entry shifted into
    /// the vacated slot is not skipped. If purging empties the pool
    /// entirely, one compensating growth is attempted; otherwise growth is
    /// left to the caller.
    fn scan_for_free(&mut self) -> Option<usize> {
        let mut budget = self.entries.len();
        if budget == 0 {
            return None;
        }
        let mut idx = (self.scan_cursor + 1) % self.entries.len();
        while budget > 0 {
            if !self.host.is_alive(self.entries[idx].handle) {
                let dead = self.entries.remove(idx);
                self.stats.purged += 1;
                tracing::warn!("Purging stale pooled instance {:?}", dead.handle);
                if self.entries.is_empty() {
                    return if self.try_grow() { Some(0) } else { None };
                }
                if idx >= self.entries.len() {
                    idx = 0;
                }
                budget -= 1;
                continue;
            }
            if !self.entries[idx].active {
                return Some(idx);
            }
            idx = (idx + 1) % self.entries.len();
            budget -= 1;
        }
        None
    }

    /// Append one fresh, inactive entry. Fails at the capacity bound.
    fn try_grow(&mut self) -> bool {
        if let Some(max) = self.max_size {
            if self.entries.len() >= max {
                return false;
            }
        }
        let handle = self.host.create();
        self.host.set_active(handle, false);
        self.entries.push(PooledEntry::new(handle));
        self.stats.created += 1;
        tracing::debug!("Pool grew to {} entries", self.entries.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Slot-vector backend: handles are indices, liveness and activation
    /// are flags the test can flip to simulate out-of-band destruction.
    #[derive(Debug, Default)]
    struct MockHost {
        alive: Vec<bool>,
        active: Vec<bool>,
        placed: Vec<(usize, Transform)>,
        destroyed: usize,
    }

    impl MockHost {
        fn kill(&mut self, handle: usize) {
            self.alive[handle] = false;
        }
    }

    impl InstanceHost for MockHost {
        type Handle = usize;

        fn create(&mut self) -> usize {
            self.alive.push(true);
            self.active.push(false);
            self.alive.len() - 1
        }

        fn destroy(&mut self, handle: usize) {
            self.alive[handle] = false;
            self.destroyed += 1;
        }

        fn set_active(&mut self, handle: usize, active: bool) {
            self.active[handle] = active;
        }

        fn is_alive(&self, handle: usize) -> bool {
            self.alive[handle]
        }

        fn place(&mut self, handle: usize, transform: &Transform) {
            self.placed.push((handle, *transform));
        }
    }

    fn pool(config: PoolConfig) -> SpawnPool<MockHost> {
        SpawnPool::new(MockHost::default(), config)
    }

    #[test]
    fn test_checkout_self_initializes() {
        let mut pool = pool(PoolConfig::unbounded());
        assert!(pool.is_empty());

        let handle = pool.checkout(1).unwrap();
        assert_eq!(pool.len(), 1);
        assert!(pool.host().active[handle]);
    }

    #[test]
    fn test_bounded_growth_stops_at_capacity() {
        let mut pool = pool(PoolConfig::bounded(2));

        let a = pool.checkout(1).unwrap();
        let b = pool.checkout(1).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);

        // Both active, at capacity: exhaustion, not an error
        assert_eq!(pool.checkout(1), None);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.stats().denied, 1);
    }

    #[test]
    fn test_checkin_makes_entry_reusable() {
        let mut pool = pool(PoolConfig::bounded(2));

        let a = pool.checkout(1).unwrap();
        let _b = pool.checkout(1).unwrap();
        pool.checkin(a);
        assert!(!pool.host().active[a]);

        // Reused, not grown, and re-tagged to the new region
        let c = pool.checkout(2).unwrap();
        assert_eq!(c, a);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.entries()[0].region, RegionTag::Held(2));
    }

    #[test]
    fn test_checkin_is_idempotent() {
        let mut pool = pool(PoolConfig::unbounded());

        let a = pool.checkout(3).unwrap();
        pool.checkin(a);
        let free_after_one = pool.free();
        pool.checkin(a);
        assert_eq!(pool.free(), free_after_one);

        // Tag and timestamp survive check-in
        assert_eq!(pool.entries()[0].region, RegionTag::Held(3));
        assert!(pool.entries()[0].retrieved_at.is_some());
    }

    #[test]
    fn test_checkin_unknown_handle_is_noop() {
        let mut pool = pool(PoolConfig::unbounded());
        let _a = pool.checkout(1).unwrap();

        pool.checkin(99); // never pooled
        assert_eq!(pool.free(), 0);
    }

    #[test]
    fn test_unbounded_growth() {
        let mut pool = pool(PoolConfig::unbounded());

        let a = pool.checkout(5).unwrap();
        let b = pool.checkout(5).unwrap();
        let c = pool.checkout(5).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.stats().created, 3);
    }

    #[test]
    fn test_purge_does_not_skip_next_candidate() {
        let mut pool = pool(PoolConfig::unbounded());
        pool.initialize(3);

        // Scan starts just after the cursor (index 0), so index 1 is
        // probed first. Kill it: the entry shifted into its slot must
        // still be examined and selected.
        pool.host_mut().kill(1);
        let handle = pool.checkout(1).unwrap();

        assert_eq!(handle, 2);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.stats().purged, 1);
    }

    #[test]
    fn test_purge_emptying_pool_grows_once() {
        let mut pool = pool(PoolConfig::unbounded());
        pool.initialize(1);
        pool.host_mut().kill(0);

        let handle = pool.checkout(1).unwrap();
        assert_eq!(handle, 1); // brand-new instance
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.stats().purged, 1);
        assert_eq!(pool.stats().created, 2);
    }

    #[test]
    fn test_purge_frees_a_slot_under_the_bound() {
        // Removing the dead entry frees its capacity slot, so the
        // compensating growth succeeds even at max_size = 1.
        let mut pool = pool(PoolConfig::bounded(1));
        let a = pool.checkout(1).unwrap();
        pool.checkin(a);
        pool.host_mut().kill(a);

        // Dead entry purged, pool now empty, growth allowed again (1 slot)
        let b = pool.checkout(2).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_zero_capacity_always_denies() {
        let mut pool = pool(PoolConfig::bounded(0));
        assert_eq!(pool.checkout(1), None);
        assert_eq!(pool.checkout(2), None);
        assert!(pool.is_empty());
        assert_eq!(pool.stats().denied, 2);
    }

    #[test]
    fn test_initialize_clamps_and_is_idempotent() {
        let mut pool = pool(PoolConfig::bounded(3));
        pool.initialize(5);
        assert_eq!(pool.len(), 3);

        pool.initialize(2);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.stats().created, 3);
    }

    #[test]
    fn test_prewarm_from_config() {
        let config = PoolConfig {
            max_size: Some(8),
            prewarm: 4,
        };
        let pool = SpawnPool::new(MockHost::default(), config);
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.free(), 4);
    }

    #[test]
    fn test_clear_destroys_everything() {
        let mut pool = pool(PoolConfig::unbounded());
        let _a = pool.checkout(1).unwrap();
        let _b = pool.checkout(1).unwrap();

        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.host().destroyed, 2);

        // Self-initializes again with a brand-new instance
        let c = pool.checkout(1).unwrap();
        assert_eq!(c, 2);
    }

    #[test]
    fn test_clear_uninitialized_is_noop() {
        let mut pool = pool(PoolConfig::unbounded());
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.host().destroyed, 0);
    }

    #[test]
    fn test_clear_skips_already_dead_instances() {
        let mut pool = pool(PoolConfig::unbounded());
        let a = pool.checkout(1).unwrap();
        let _b = pool.checkout(1).unwrap();
        pool.host_mut().kill(a);

        pool.clear();
        assert_eq!(pool.host().destroyed, 1);
    }

    #[test]
    fn test_reclaim_region_frees_only_that_region() {
        let mut pool = pool(PoolConfig::unbounded());
        let a = pool.checkout(7).unwrap();
        let b = pool.checkout(8).unwrap();

        pool.reclaim_region(7);

        assert!(!pool.entries()[0].active);
        assert_eq!(pool.entries()[0].region, RegionTag::Detached);
        assert!(!pool.host().active[a]);

        assert!(pool.entries()[1].active);
        assert_eq!(pool.entries()[1].region, RegionTag::Held(8));
        assert!(pool.host().active[b]);
    }

    #[test]
    fn test_reclaim_region_tolerates_dead_instance() {
        let mut pool = pool(PoolConfig::unbounded());
        let a = pool.checkout(7).unwrap();
        pool.host_mut().kill(a);

        pool.reclaim_region(7);
        assert!(!pool.entries()[0].active);
        assert_eq!(pool.entries()[0].region, RegionTag::Detached);

        // Purge stays lazy: the dead entry goes away on the next scan
        let b = pool.checkout(9).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.stats().purged, 1);
    }

    #[test]
    fn test_reclaimed_entry_is_checked_out_again() {
        let mut pool = pool(PoolConfig::bounded(1));
        let a = pool.checkout(7).unwrap();

        pool.reclaim_region(7);
        let b = pool.checkout(8).unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.entries()[0].region, RegionTag::Held(8));
    }

    #[test]
    fn test_checkout_at_places_instance() {
        let mut pool = pool(PoolConfig::unbounded());
        let transform = Transform::at([1.0, 2.0, 3.0]);

        let handle = pool.checkout_at(1, &transform).unwrap();
        assert_eq!(pool.host().placed, vec![(handle, transform)]);
    }

    #[test]
    fn test_pump_applies_teardown_events() {
        let mut events = RegionEvents::new();
        let mut pool = pool(PoolConfig::unbounded());
        pool.activate(&mut events);

        let a = pool.checkout(7).unwrap();
        events.region_unloaded(7);
        pool.pump_region_events();

        assert!(!pool.host().active[a]);
        assert_eq!(pool.entries()[0].region, RegionTag::Detached);
    }

    #[test]
    fn test_deactivate_stops_receiving_events() {
        let mut events = RegionEvents::new();
        let mut pool = pool(PoolConfig::unbounded());
        pool.activate(&mut events);
        let a = pool.checkout(7).unwrap();

        pool.deactivate();
        events.region_unloaded(7);
        pool.pump_region_events();

        // Still checked out: the subscription was dropped
        assert!(pool.host().active[a]);
        assert_eq!(pool.entries()[0].region, RegionTag::Held(7));
    }

    #[test]
    fn test_stats_counters() {
        let mut pool = pool(PoolConfig::bounded(2));
        let a = pool.checkout(1).unwrap();
        let _b = pool.checkout(1).unwrap();
        assert_eq!(pool.checkout(1), None);

        pool.checkin(a);
        let _c = pool.checkout(2).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.created, 2);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.denied, 1);
        assert!((stats.reuse_rate() - 1.0 / 3.0).abs() < 1e-9);
    }
}
