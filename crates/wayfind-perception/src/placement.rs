//! Object Placement Resolver.
//!
//! - [`resolve_placement`] keeps a freshly localized object within a
//!   believable distance of the camera that observed it.
//! - [`snap_to_plane`] decides whether an already placed object should drop
//!   onto a plane the tracker has just found beneath (or just above) it.
//!
//! Both are stateless; animating the snap is left to the renderer.
//!
//! # Example
//!
//! ```rust
//! use wayfind_perception::placement::resolve_placement;
//! use wayfind_types::Vec3;
//!
//! let p = resolve_placement(Vec3::new(20.0, 0.0, 0.0), Vec3::ZERO, 10.0);
//! assert_eq!(p, Vec3::new(10.0, 0.0, 0.0));
//! ```

use tracing::debug;
use wayfind_types::{Plane, Vec3};

/// Clamp `raw_position` to at most `max_distance` from `camera`, keeping it
/// on the camera → position ray.
pub fn resolve_placement(raw_position: Vec3, camera: Vec3, max_distance: f32) -> Vec3 {
    let max_distance = max_distance.max(0.0);
    let offset = raw_position - camera;
    let distance = offset.length();

    if distance <= max_distance || distance == 0.0 {
        return raw_position;
    }
    debug!(distance, max_distance, "clamping placement distance");
    camera + offset * (max_distance / distance)
}

/// Thresholds for [`snap_to_plane`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOptions {
    /// Fraction by which the plane's extent is grown for the footprint test.
    pub tolerance_fraction: f32,
    /// Largest vertical gap (metres) that still snaps.
    pub vertical_allowance: f32,
    /// Gaps at or below this (metres) count as already resting on the plane.
    pub epsilon: f32,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            tolerance_fraction: 0.1,
            vertical_allowance: 0.05,
            epsilon: 0.001,
        }
    }
}

/// Result of [`snap_to_plane`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapOutcome {
    /// The object should move onto the plane.
    Snap {
        /// World-space Y of the snapped position.
        new_y: f32,
        /// Snapped world-space position.
        position: Vec3,
        /// Gap that will be closed (metres, ≥ 0).
        vertical_distance: f32,
    },
    /// The object already rests on the plane.
    AlreadyOnPlane,
    /// The object is over the plane but too far above or below it.
    TooFar { vertical_distance: f32 },
    /// The object is not over the plane's (grown) rectangle.
    OutsideFootprint,
}

impl SnapOutcome {
    pub fn new_y(&self) -> Option<f32> {
        match self {
            SnapOutcome::Snap { new_y, .. } => Some(*new_y),
            _ => None,
        }
    }
}

/// Decide whether an object at `position` (world space) should snap onto
/// `plane`.
///
/// The object is expressed in the plane's anchor frame; it snaps when its
/// `(x, z)` lies inside the extent grown by `tolerance_fraction` and its
/// vertical gap lies in `(epsilon, vertical_allowance)`.
pub fn snap_to_plane(position: Vec3, plane: &Plane, options: &SnapOptions) -> SnapOutcome {
    let anchor = plane.transform();
    let local = anchor.inverse_transform_point(position);

    if !plane.contains_local(local.x, local.z, options.tolerance_fraction) {
        return SnapOutcome::OutsideFootprint;
    }

    let vertical_distance = local.y.abs();
    if vertical_distance <= options.epsilon {
        return SnapOutcome::AlreadyOnPlane;
    }
    if vertical_distance >= options.vertical_allowance {
        return SnapOutcome::TooFar { vertical_distance };
    }

    let snapped = anchor.transform_point(Vec3::new(local.x, 0.0, local.z));
    debug!(plane_id = %plane.id(), vertical_distance, "snapping object onto plane");
    SnapOutcome::Snap {
        new_y: snapped.y,
        position: snapped,
        vertical_distance,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wayfind_types::PlaneId;

    fn table() -> Plane {
        // 1 m × 1 m table top at y = 0.75.
        Plane::horizontal(PlaneId::new("table"), Vec3::new(0.0, 0.75, 0.0), 1.0, 1.0)
    }

    // ── resolve_placement ───────────────────────────────────────────────────

    #[test]
    fn far_position_is_clamped_to_max_distance() {
        let p = resolve_placement(Vec3::new(20.0, 0.0, 0.0), Vec3::ZERO, 10.0);
        assert!(p.distance(Vec3::new(10.0, 0.0, 0.0)) < 1e-6);
    }

    #[test]
    fn clamped_position_stays_on_camera_ray() {
        let camera = Vec3::new(1.0, 1.5, -2.0);
        let raw = Vec3::new(-7.0, 0.3, 9.0);
        let p = resolve_placement(raw, camera, 3.0);
        assert!((p.distance(camera) - 3.0).abs() < 1e-5);
        let dir_raw = (raw - camera).normalized().unwrap();
        let dir_p = (p - camera).normalized().unwrap();
        assert!(dir_raw.distance(dir_p) < 1e-5);
    }

    #[test]
    fn near_position_is_untouched() {
        let raw = Vec3::new(0.5, -0.2, -1.0);
        assert_eq!(resolve_placement(raw, Vec3::ZERO, 5.0), raw);
    }

    #[test]
    fn negative_max_distance_collapses_to_camera() {
        let camera = Vec3::new(1.0, 2.0, 3.0);
        let p = resolve_placement(Vec3::new(4.0, 2.0, 3.0), camera, -1.0);
        assert!(p.distance(camera) < 1e-6);
    }

    // ── snap_to_plane ───────────────────────────────────────────────────────

    #[test]
    fn object_hovering_just_above_snaps_down() {
        let outcome = snap_to_plane(Vec3::new(0.2, 0.78, 0.1), &table(), &SnapOptions::default());
        match outcome {
            SnapOutcome::Snap {
                new_y,
                position,
                vertical_distance,
            } => {
                assert!((new_y - 0.75).abs() < 1e-5);
                assert!(position.distance(Vec3::new(0.2, 0.75, 0.1)) < 1e-5);
                assert!((vertical_distance - 0.03).abs() < 1e-4);
            }
            other => panic!("expected snap, got {other:?}"),
        }
    }

    #[test]
    fn object_slightly_below_snaps_up() {
        let outcome = snap_to_plane(Vec3::new(0.0, 0.72, 0.0), &table(), &SnapOptions::default());
        assert!((outcome.new_y().unwrap() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn object_on_plane_is_noop() {
        let outcome = snap_to_plane(Vec3::new(0.0, 0.75, 0.0), &table(), &SnapOptions::default());
        assert_eq!(outcome, SnapOutcome::AlreadyOnPlane);
        let within_eps = snap_to_plane(Vec3::new(0.0, 0.7505, 0.0), &table(), &SnapOptions::default());
        assert_eq!(within_eps, SnapOutcome::AlreadyOnPlane);
    }

    #[test]
    fn object_far_above_is_too_far() {
        let outcome = snap_to_plane(Vec3::new(0.0, 1.0, 0.0), &table(), &SnapOptions::default());
        assert!(matches!(outcome, SnapOutcome::TooFar { .. }));
        assert!(outcome.new_y().is_none());
    }

    #[test]
    fn footprint_tolerance_grows_extent() {
        // Half extent 0.5; grown by 10 % → 0.55.
        let edge = snap_to_plane(Vec3::new(0.53, 0.77, 0.0), &table(), &SnapOptions::default());
        assert!(edge.new_y().is_some());
        let beyond = snap_to_plane(Vec3::new(0.6, 0.77, 0.0), &table(), &SnapOptions::default());
        assert_eq!(beyond, SnapOutcome::OutsideFootprint);
    }
}
