//! Spawn Pool
//!
//! Region-aware object pool for scene-scoped instance reuse.
//!
//! Expensive-to-create instances are checked out, used, and checked back
//! in instead of being allocated and destroyed per use. Every checkout is
//! tagged with the region (scene/level) that requested it, so when a
//! region is torn down its instances are reclaimed into the pool
//! automatically instead of leaking.
//!
//! The pool is single-threaded by contract: one logical owner thread
//! drives checkout, check-in and event pumping. Wrap it in a mutex at the
//! call site if the surrounding system is multi-threaded.
//!
//! # Example
//! ```rust,ignore
//! use spawn_pool::{InstanceHost, PoolConfig, RegionEvents, SpawnPool};
//!
//! let mut events = RegionEvents::new();
//! let mut pool = SpawnPool::new(host, PoolConfig::bounded(32));
//! pool.activate(&mut events);
//!
//! let handle = pool.checkout(region).expect("pool exhausted");
//! // ... use the instance ...
//! pool.checkin(handle);
//!
//! events.region_unloaded(region);
//! pool.pump_region_events(); // reclaims anything the region still held
//! ```

pub mod config;
pub mod entry;
pub mod host;
pub mod pool;
pub mod region;

pub use config::PoolConfig;
pub use entry::{PooledEntry, RegionTag};
pub use host::{InstanceHost, Transform};
pub use pool::{PoolStats, SpawnPool};
pub use region::{RegionEvents, RegionId, RegionLifecycleBridge};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pool error
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
}
