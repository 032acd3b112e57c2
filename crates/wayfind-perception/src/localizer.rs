//! Single-Ray Localizer.
//!
//! Intersects one ray against every registered plane and keeps the closest
//! hit that lands inside the plane's finite rectangle.
//!
//! Each plane is tested in its own anchor frame, where the surface is
//! `y = 0`:
//!
//! ```text
//! o, d = T_plane⁻¹ · ray          (local origin / direction)
//! t    = −o.y / d.y               (skip when d.y == 0 or t ≤ 0)
//! p    = o + d·t                  (accept when |p.x − c.x| ≤ ex/2 and |p.z − c.z| ≤ ez/2)
//! ```
//!
//! The smallest `t` wins; on an exact tie the plane that comes first in the
//! list wins.  A ray that lies in a plane (`d.y == 0`) never hits it, even
//! when its origin is on the surface.
//!
//! When no plane qualifies the result is empty.  Falling back to feature
//! points is the caller's job (see [`crate::feature_points`]).
//!
//! # Example
//!
//! ```rust
//! use wayfind_perception::localizer::localize;
//! use wayfind_types::{Plane, PlaneId, Ray, Vec3};
//!
//! let floor = Plane::horizontal(PlaneId::new("floor"), Vec3::new(0.0, -1.0, 0.0), 4.0, 4.0);
//! let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)).unwrap();
//!
//! let result = localize(&ray, &[floor]);
//! assert!(result.hit_plane);
//! assert_eq!(result.position, Some(Vec3::new(0.0, -1.0, 0.0)));
//! ```

use tracing::debug;
use wayfind_types::{LocalizationResult, Plane, Ray, Vec3};

/// An accepted ray/plane intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    /// Distance along the ray (metres).
    pub t: f32,
    /// Intersection in the plane's anchor frame.
    pub local: Vec3,
    /// Intersection in world space.
    pub world: Vec3,
}

/// Intersect `ray` with the finite rectangle of `plane`.
///
/// Returns `None` when the ray is parallel to the plane, the intersection is
/// behind the origin, or it falls outside the plane's extent.
pub fn intersect_plane(ray: &Ray, plane: &Plane) -> Option<PlaneHit> {
    let anchor = plane.transform();
    let origin = anchor.inverse_transform_point(ray.origin());
    let direction = anchor.inverse_transform_vector(ray.direction());

    if direction.y == 0.0 {
        return None;
    }
    let t = -origin.y / direction.y;
    if !t.is_finite() || t <= 0.0 {
        return None;
    }

    let local = origin + direction * t;
    if !plane.contains_local(local.x, local.z, 0.0) {
        return None;
    }

    Some(PlaneHit {
        t,
        local,
        world: anchor.transform_point(local),
    })
}

/// Resolve `ray` against `planes`, keeping the closest in-bounds hit.
pub fn localize(ray: &Ray, planes: &[Plane]) -> LocalizationResult {
    let mut best: Option<(PlaneHit, &Plane)> = None;

    for plane in planes {
        let Some(hit) = intersect_plane(ray, plane) else {
            continue;
        };
        // Strict comparison keeps the earliest plane on ties.
        if best.as_ref().is_none_or(|(b, _)| hit.t < b.t) {
            best = Some((hit, plane));
        }
    }

    match best {
        Some((hit, plane)) => {
            debug!(plane_id = %plane.id(), t = hit.t, "ray hit plane");
            LocalizationResult::on_plane(hit.world, plane.id().clone())
        }
        None => {
            debug!(planes = planes.len(), "ray hit no plane");
            LocalizationResult::miss()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
