//! [`PlaneRegistry`] – the live set of detected surfaces.
//!
//! The tracking system reports planes from its own update thread while
//! localization queries run on others.  Readers never hold the lock while
//! they work: [`PlaneRegistry::snapshot`] hands out an immutable
//! [`PlaneSnapshot`] (a shared, reference-counted list) and writers swap in a
//! new list on every mutation.
//!
//! Planes are keyed by the tracking system's anchor id.  Adding a plane whose
//! id is already present replaces the old record in place, so registry
//! order (which breaks ties in the localizer) is the order in which each
//! surface was first seen.
//!
//! # Example
//!
//! ```rust
//! use wayfind_perception::plane_registry::PlaneRegistry;
//! use wayfind_types::{Plane, PlaneId, Vec3};
//!
//! let registry = PlaneRegistry::new();
//! registry.add(Plane::horizontal(PlaneId::new("floor"), Vec3::new(0.0, -1.0, 0.0), 4.0, 4.0));
//!
//! let snapshot = registry.snapshot();
//! registry.remove(&PlaneId::new("floor"));
//!
//! // The snapshot taken earlier is unaffected by the removal.
//! assert_eq!(snapshot.len(), 1);
//! assert!(registry.is_empty());
//! ```

use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;
use wayfind_types::{Plane, PlaneId};

/// An immutable view of the registry at one instant.
#[derive(Debug, Clone)]
pub struct PlaneSnapshot {
    version: u64,
    planes: Arc<[Plane]>,
}

impl PlaneSnapshot {
    /// Mutation counter at the time the snapshot was taken.  Two snapshots
    /// with equal versions hold the same planes.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }
}

impl Deref for PlaneSnapshot {
    type Target = [Plane];

    fn deref(&self) -> &[Plane] {
        &self.planes
    }
}

#[derive(Debug)]
struct RegistryState {
    version: u64,
    planes: Arc<[Plane]>,
}

/// Thread-safe store of detected planes with copy-on-write updates.
///
/// Share it between threads with `Arc<PlaneRegistry>`.
#[derive(Debug)]
pub struct PlaneRegistry {
    state: RwLock<RegistryState>,
}

impl Default for PlaneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaneRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                version: 0,
                planes: Arc::from(Vec::new()),
            }),
        }
    }

    /// Insert `plane`, replacing any existing plane with the same id.
    pub fn add(&self, plane: Plane) {
        self.mutate(|planes| {
            let existing = planes.iter().position(|p| p.id() == plane.id());
            match existing {
                Some(index) => {
                    debug!(plane_id = %plane.id(), "plane updated");
                    planes[index] = plane;
                }
                None => {
                    debug!(plane_id = %plane.id(), "plane added");
                    planes.push(plane);
                }
            }
        });
    }

    /// Remove the plane with `id`.  Unknown ids are ignored.
    pub fn remove(&self, id: &PlaneId) {
        if self.get(id).is_none() {
            return;
        }
        self.mutate(|planes| planes.retain(|p| p.id() != id));
        debug!(plane_id = %id, "plane removed");
    }

    /// Drop every plane (e.g. the tracking session was reset).
    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// A consistent view of all planes, in registry order.
    pub fn snapshot(&self) -> PlaneSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        PlaneSnapshot {
            version: state.version,
            planes: Arc::clone(&state.planes),
        }
    }

    /// A copy of the plane with `id`, if registered.
    pub fn get(&self, id: &PlaneId) -> Option<Plane> {
        self.snapshot().iter().find(|p| p.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The new list is built outside the slice the readers share, then
    // swapped in under the write lock.
    fn mutate(&self, f: impl FnOnce(&mut Vec<Plane>)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut planes = state.planes.to_vec();
        f(&mut planes);
        state.planes = Arc::from(planes);
        state.version += 1;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
