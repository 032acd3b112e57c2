//! [`ObservationLedger`] – camera poses for detection requests in flight.
//!
//! When a frame is sent to the vision service the caller records the pose it
//! was captured with.  When the response arrives (possibly seconds later,
//! after the user has moved) the pose is taken back out by request id and
//! used to rebuild the ray.  Cancelling a request is just
//! [`discard`][ObservationLedger::discard].
//!
//! The ledger is a plain value owned by the caller and passed into the
//! locator per call; the localization core itself never stores poses.
//!
//! # Example
//!
//! ```rust
//! use wayfind_runtime::observations::ObservationLedger;
//! use wayfind_types::Pose;
//!
//! let mut ledger = ObservationLedger::new();
//! let id = ledger.record("keys", Pose::identity());
//! assert_eq!(ledger.len(), 1);
//!
//! let obs = ledger.take(id).unwrap();
//! assert_eq!(obs.label, "keys");
//! assert!(ledger.is_empty());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;
use wayfind_types::{Observation, Pose, WayfindError};

/// Pending observations keyed by request id.
#[derive(Debug, Default, Clone)]
pub struct ObservationLedger {
    pending: HashMap<Uuid, Observation>,
}

impl ObservationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request for `label` captured at `pose` and return its id.
    pub fn record(&mut self, label: impl Into<String>, pose: Pose) -> Uuid {
        let obs = Observation::new(label, pose);
        let id = obs.id;
        self.insert(obs);
        id
    }

    /// Store an externally constructed observation, replacing any entry with
    /// the same id.
    pub fn insert(&mut self, obs: Observation) {
        debug!(observation = %obs.id, label = %obs.label, "observation recorded");
        self.pending.insert(obs.id, obs);
    }

    pub fn get(&self, id: Uuid) -> Option<&Observation> {
        self.pending.get(&id)
    }

    /// The pose captured for a pending request, leaving it pending.
    ///
    /// # Errors
    ///
    /// [`WayfindError::UnknownObservation`] when no request with `id` is
    /// pending.
    pub fn pose(&self, id: Uuid) -> Result<Pose, WayfindError> {
        self.pending.get(&id).map(|obs| obs.pose).ok_or_else(|| {
            warn!(observation = %id, "response for unknown observation");
            WayfindError::UnknownObservation(id)
        })
    }

    /// Remove and return the observation for a completed request.
    ///
    /// # Errors
    ///
    /// [`WayfindError::UnknownObservation`] when no request with `id` is
    /// pending (already answered, discarded or never recorded).
    pub fn take(&mut self, id: Uuid) -> Result<Observation, WayfindError> {
        self.pending.remove(&id).ok_or_else(|| {
            warn!(observation = %id, "response for unknown observation");
            WayfindError::UnknownObservation(id)
        })
    }

    /// Forget a request (it was cancelled).  Returns `true` if it was pending.
    pub fn discard(&mut self, id: Uuid) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Drop every observation captured before `cutoff`; returns how many
    /// were removed.
    pub fn prune_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, obs| obs.captured_at >= cutoff);
        let removed = before - self.pending.len();
        if removed > 0 {
            debug!(removed, "pruned stale observations");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
