//! Pool Entry Bookkeeping
//!
//! Per-instance record tracking checkout state and region ownership.

use std::time::Instant;

use crate::region::RegionId;

/// Region ownership tag on a pooled entry.
///
/// Diagnostics metadata only: the `active` flag on [`PooledEntry`] is the
/// authoritative free/used signal, never the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionTag {
    /// Never checked out since creation
    #[default]
    Unassigned,
    /// Checked out by (or last held by) this region
    Held(RegionId),
    /// Reclaimed by a region teardown
    Detached,
}

/// One pooled instance plus its checkout bookkeeping.
#[derive(Debug)]
pub struct PooledEntry<H> {
    /// Handle to the managed instance, owned by the pool for its lifetime
    pub handle: H,
    /// Region that holds (or last held) this entry
    pub region: RegionTag,
    /// Monotonic time of the last checkout; survives check-in
    pub retrieved_at: Option<Instant>,
    /// True while checked out
    pub active: bool,
}

impl<H> PooledEntry<H> {
    /// New entries start free and unassigned.
    pub(crate) fn new(handle: H) -> Self {
        Self {
            handle,
            region: RegionTag::Unassigned,
            retrieved_at: None,
            active: false,
        }
    }
}
