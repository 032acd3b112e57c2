//! Stereo Localizer.
//!
//! Two observations of the same object from different poses give two rays
//! that, with perfect data, cross at the object.  In practice they are skew,
//! so the estimate is the midpoint of their segment of closest approach:
//!
//! ```text
//! A, B = ray1.origin, ray2.origin
//! a, b = ray1.direction, ray2.direction
//! c    = B − A
//! den  = (a·a)(b·b) − (a·b)²
//! D    = A + a · (−(a·b)(b·c) + (a·c)(b·b)) / den
//! E    = B + b · ( (a·b)(a·c) − (b·c)(a·a)) / den
//! X    = (D + E) / 2
//! ```
//!
//! The products are accumulated in `f64`; nearly parallel rays make `den`
//! the difference of two close numbers.  The estimate is purely geometric:
//! it is not checked against planes or distance from either camera.

use tracing::warn;
use wayfind_types::{Ray, Vec3, WayfindError};

/// Rays whose `den` falls below this fraction of `(a·a)(b·b)` (i.e.
/// `sin²θ` for unit directions) are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy)]
struct V64 {
    x: f64,
    y: f64,
    z: f64,
}

impl V64 {
    fn of(v: Vec3) -> Self {
        Self {
            x: f64::from(v.x),
            y: f64::from(v.y),
            z: f64::from(v.z),
        }
    }

    fn dot(self, o: Self) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    fn sub(self, o: Self) -> Self {
        Self {
            x: self.x - o.x,
            y: self.y - o.y,
            z: self.z - o.z,
        }
    }

    fn mul_add(self, dir: Self, s: f64) -> Self {
        Self {
            x: self.x + dir.x * s,
            y: self.y + dir.y * s,
            z: self.z + dir.z * s,
        }
    }
}

/// Estimate the 3-D point two rays observe.
///
/// # Errors
///
/// [`WayfindError::ParallelRays`] when the rays are (numerically) parallel
/// and no unique closest approach exists.
pub fn localize_stereo(ray1: &Ray, ray2: &Ray) -> Result<Vec3, WayfindError> {
    let big_a = V64::of(ray1.origin());
    let big_b = V64::of(ray2.origin());
    let a = V64::of(ray1.direction());
    let b = V64::of(ray2.direction());
    let c = big_b.sub(big_a);

    let aa = a.dot(a);
    let bb = b.dot(b);
    let ab = a.dot(b);
    let ac = a.dot(c);
    let bc = b.dot(c);

    let denominator = aa * bb - ab * ab;
    if denominator.abs() <= PARALLEL_EPSILON * aa * bb {
        warn!(denominator, "stereo rays are parallel");
        return Err(WayfindError::ParallelRays { denominator });
    }

    let d = big_a.mul_add(a, (-ab * bc + ac * bb) / denominator);
    let e = big_b.mul_add(b, (ab * ac - bc * aa) / denominator);

    Ok(Vec3::new(
        ((d.x + e.x) * 0.5) as f32,
        ((d.y + e.y) * 0.5) as f32,
        ((d.z + e.z) * 0.5) as f32,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(o: (f32, f32, f32), d: (f32, f32, f32)) -> Ray {
        Ray::new(Vec3::new(o.0, o.1, o.2), Vec3::new(d.0, d.1, d.2)).unwrap()
    }

    #[test]
    fn crossing_rays_meet_at_intersection() {
        let target = Vec3::new(1.0, 0.5, -2.0);
        let r1 = Ray::through(Vec3::new(0.0, 1.5, 0.0), target).unwrap();
        let r2 = Ray::through(Vec3::new(2.0, 1.4, 0.3), target).unwrap();
        let x = localize_stereo(&r1, &r2).unwrap();
        assert!(x.distance(target) < 1e-4, "got {x:?}");
    }

    #[test]
    fn perpendicular_axes_meet_at_origin() {
        let r1 = ray((-3.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let r2 = ray((0.0, 0.0, 5.0), (0.0, 0.0, -1.0));
        let x = localize_stereo(&r1, &r2).unwrap();
        assert!(x.distance(Vec3::ZERO) < 1e-6);
    }

    #[test]
    fn skew_rays_give_midpoint_of_closest_approach() {
        // Line 1 along X at y = 0; line 2 along Z at y = 1.
        let r1 = ray((-2.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let r2 = ray((0.0, 1.0, -2.0), (0.0, 0.0, 1.0));
        let x = localize_stereo(&r1, &r2).unwrap();
        assert!(x.distance(Vec3::new(0.0, 0.5, 0.0)) < 1e-6, "got {x:?}");
    }

    #[test]
    fn parallel_rays_are_rejected() {
        let r1 = ray((0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let r2 = ray((0.0, 1.0, 0.0), (1.0, 0.0, 0.0));
        let err = localize_stereo(&r1, &r2).unwrap_err();
        assert!(matches!(err, WayfindError::ParallelRays { .. }));
    }

    #[test]
    fn anti_parallel_rays_are_rejected() {
        let r1 = ray((0.0, 0.0, 0.0), (0.0, 0.0, -1.0));
        let r2 = ray((1.0, 0.0, -4.0), (0.0, 0.0, 1.0));
        assert!(localize_stereo(&r1, &r2).is_err());
    }

    #[test]
    fn identical_rays_are_rejected() {
        let r = ray((0.5, 0.5, 0.5), (0.3, -0.2, 0.9));
        assert!(localize_stereo(&r, &r).is_err());
    }

    #[test]
    fn result_is_symmetric_in_argument_order() {
        let r1 = ray((0.0, 1.5, 0.0), (0.2, -0.5, -1.0));
        let r2 = ray((1.0, 1.5, 0.5), (-0.3, -0.45, -1.0));
        let x12 = localize_stereo(&r1, &r2).unwrap();
        let x21 = localize_stereo(&r2, &r1).unwrap();
        assert!(x12.distance(x21) < 1e-5);
    }
}
