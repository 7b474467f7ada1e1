//! Region Lifecycle Events
//!
//! In-process notification stream for region (scene/level) teardown. A
//! pool subscribes through a [`RegionLifecycleBridge`] while activated and
//! reclaims entries held by unloaded regions on its next pump.

use std::sync::mpsc;

/// Identifier of a loaded region.
pub type RegionId = u32;

/// Publisher side of the region-teardown stream.
///
/// Delivers one event per teardown to every live subscriber. No ordering
/// guarantee between regions.
#[derive(Debug, Default)]
pub struct RegionEvents {
    subscribers: Vec<mpsc::Sender<RegionId>>,
}

impl RegionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce that a region has been torn down.
    ///
    /// Subscribers whose bridge has been dropped are pruned here.
    pub fn region_unloaded(&mut self, region: RegionId) {
        self.subscribers.retain(|tx| tx.send(region).is_ok());
    }

    /// Number of known subscribers. Disconnected bridges are only pruned
    /// on the next publish, so this can briefly over-count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn subscribe(&mut self) -> mpsc::Receiver<RegionId> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }
}

/// Subscriber handle held by an activated pool.
///
/// Dropping the bridge unsubscribes from the stream.
#[derive(Debug)]
pub struct RegionLifecycleBridge {
    events: mpsc::Receiver<RegionId>,
}

impl RegionLifecycleBridge {
    /// Subscribe to a teardown stream.
    pub fn subscribe(hub: &mut RegionEvents) -> Self {
        Self {
            events: hub.subscribe(),
        }
    }

    /// Take every teardown notification received since the last drain.
    pub fn drain(&mut self) -> Vec<RegionId> {
        let mut regions = Vec::new();
        while let Ok(region) = self.events.try_recv() {
            regions.push(region);
        }
        regions
    }
}
