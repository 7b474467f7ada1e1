//! Pool Configuration
//!
//! Plain construction parameters, serde-derived so an external
//! config/asset loader can produce them before the pool is built.

use serde::{Deserialize, Serialize};

use crate::PoolError;

/// Pool construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Capacity bound; `None` = unbounded.
    #[serde(default)]
    pub max_size: Option<usize>,
    /// Entries to create up front, clamped to `max_size`.
    #[serde(default)]
    pub prewarm: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: None,
            prewarm: 0,
        }
    }
}

impl PoolConfig {
    /// Pool capped at `max_size` entries.
    pub fn bounded(max_size: usize) -> Self {
        Self {
            max_size: Some(max_size),
            prewarm: 0,
        }
    }

    /// Pool with no capacity bound.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Flag configurations that can never satisfy a checkout.
    ///
    /// Optional diagnostics: a pool built from an invalid config still
    /// works, every checkout just reports exhaustion.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_size == Some(0) {
            return Err(PoolError::InvalidConfig(
                "max_size of 0 can never satisfy a checkout".into(),
            ));
        }
        Ok(())
    }
}
