//! Instance Host Interface
//!
//! The pool never touches concrete engine objects. It drives an
//! [`InstanceHost`] that knows how to create, place, toggle and destroy
//! them, and hands opaque handles back to callers. The pool owns the host
//! and therefore the lifetime of every instance it creates; callers only
//! ever borrow handles.

use serde::{Deserialize, Serialize};

/// Spatial placement applied by [`SpawnPool::checkout_at`].
///
/// [`SpawnPool::checkout_at`]: crate::SpawnPool::checkout_at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position (x, y, z)
    pub position: [f32; 3],
    /// Orientation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Transform {
    /// Placement at a position with identity orientation.
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Backend owning the concrete instances behind pool handles.
///
/// Implementations must hand out a fresh, independently destroyable
/// instance from every `create` call. `destroy` and `set_active` are only
/// ever called on handles this host produced, and `destroy` only on
/// handles that still pass `is_alive`.
pub trait InstanceHost {
    /// Opaque handle to one managed instance.
    type Handle: Copy + PartialEq + std::fmt::Debug;

    /// Create a fresh instance. Called on pool growth.
    fn create(&mut self) -> Self::Handle;

    /// Destroy an instance. Called only from `clear`.
    fn destroy(&mut self, handle: Self::Handle);

    /// Toggle usable/visible state without destroying the instance.
    fn set_active(&mut self, handle: Self::Handle, active: bool);

    /// Whether the instance still exists. Detects out-of-band destruction.
    fn is_alive(&self, handle: Self::Handle) -> bool;

    /// Apply a spatial transform to the instance.
    fn place(&mut self, handle: Self::Handle, transform: &Transform);
}
