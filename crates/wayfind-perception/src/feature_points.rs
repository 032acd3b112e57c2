//! Feature-Point Hit Tester.
//!
//! When no detected plane supports the object, the tracker's sparse point
//! cloud is the next best source of depth.  [`hit_test`] keeps the points
//! inside a viewing cone around the ray and within a distance band, ranked
//! by how close they pass to the ray.  [`hit_test_from_origin`] skips the
//! filtering and returns the single closest point.
//!
//! For a point `p`, ray origin `o` and unit direction `d`:
//!
//! ```text
//! v     = p − o
//! perp  = |v × d|             (distance from the point to the ray)
//! along = v · d               (distance of its projection along the ray)
//! angle = acos(v̂ · d)
//! ```

use std::cmp::Ordering;

use tracing::debug;
use wayfind_types::{FeatureHit, Ray, Vec3};

/// Filtering parameters for [`hit_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureQuery {
    /// Full opening angle of the search cone (degrees).
    pub cone_angle_deg: f32,
    /// Minimum along-ray distance (metres).
    pub min_distance: f32,
    /// Maximum along-ray distance (metres).
    pub max_distance: f32,
    pub max_results: usize,
}

impl Default for FeatureQuery {
    fn default() -> Self {
        Self {
            cone_angle_deg: 10.0,
            min_distance: 0.1,
            max_distance: 5.0,
            max_results: 10,
        }
    }
}

fn measure(origin: Vec3, direction: Vec3, point: Vec3) -> FeatureHit {
    let v = point - origin;
    let angle_deg = match v.normalized() {
        Some(u) => u.dot(direction).clamp(-1.0, 1.0).acos().to_degrees(),
        None => 0.0,
    };
    FeatureHit {
        position: point,
        distance_to_ray: v.cross(direction).length(),
        distance_along_ray: v.dot(direction),
        angle_deg,
    }
}

fn by_distance_to_ray(a: &FeatureHit, b: &FeatureHit) -> Ordering {
    a.distance_to_ray.total_cmp(&b.distance_to_ray)
}

/// Points near `ray`, closest to the ray first, at most
/// `query.max_results` of them.
pub fn hit_test(ray: &Ray, points: &[Vec3], query: &FeatureQuery) -> Vec<FeatureHit> {
    let half_cone = query.cone_angle_deg * 0.5;

    let mut hits: Vec<FeatureHit> = points
        .iter()
        .filter(|p| p.is_finite())
        .map(|&p| measure(ray.origin(), ray.direction(), p))
        .filter(|h| {
            h.distance_along_ray >= query.min_distance
                && h.distance_along_ray <= query.max_distance
                && h.angle_deg <= half_cone
        })
        .collect();

    // Stable sort: equal distances keep point-cloud order.
    hits.sort_by(by_distance_to_ray);
    hits.truncate(query.max_results);

    debug!(
        candidates = points.len(),
        accepted = hits.len(),
        "feature point hit test"
    );
    hits
}

/// The single point passing closest to the line from `origin` along
/// `direction`, with no cone or range filtering.
///
/// Returns `None` for an empty point cloud or a zero `direction`.
pub fn hit_test_from_origin(origin: Vec3, direction: Vec3, points: &[Vec3]) -> Option<FeatureHit> {
    let direction = direction.normalized()?;
    points
        .iter()
        .filter(|p| p.is_finite())
        .map(|&p| measure(origin, direction, p))
        .min_by(by_distance_to_ray)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap()
    }

    fn query(max_results: usize) -> FeatureQuery {
        FeatureQuery {
            cone_angle_deg: 20.0,
            min_distance: 0.5,
            max_distance: 4.0,
            max_results,
        }
    }

    #[test]
    fn empty_cloud_yields_no_hits() {
        assert!(hit_test(&forward_ray(), &[], &query(5)).is_empty());
        assert!(hit_test_from_origin(Vec3::ZERO, Vec3::Z, &[]).is_none());
    }

    #[test]
    fn hits_are_sorted_by_perpendicular_distance() {
        let points = [
            Vec3::new(0.2, 0.0, -2.0),
            Vec3::new(0.0, 0.05, -3.0),
            Vec3::new(-0.1, 0.0, -1.5),
        ];
        let hits = hit_test(&forward_ray(), &points, &query(10));
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].position, points[1]);
        assert_eq!(hits[1].position, points[2]);
        assert_eq!(hits[2].position, points[0]);
        assert!((hits[0].distance_to_ray - 0.05).abs() < 1e-6);
        assert!((hits[0].distance_along_ray - 3.0).abs() < 1e-6);
    }

    #[test]
    fn range_filter_rejects_near_far_and_behind() {
        let points = [
            Vec3::new(0.0, 0.0, -0.2), // too near
            Vec3::new(0.0, 0.0, -6.0), // too far
            Vec3::new(0.0, 0.0, 2.0),  // behind
            Vec3::new(0.0, 0.0, -2.0), // kept
        ];
        let hits = hit_test(&forward_ray(), &points, &query(10));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, points[3]);
    }

    #[test]
    fn cone_filter_uses_half_angle() {
        // 20° cone → 10° half angle.
        let inside = Vec3::new((8f32).to_radians().tan() * 2.0, 0.0, -2.0);
        let outside = Vec3::new((12f32).to_radians().tan() * 2.0, 0.0, -2.0);
        let hits = hit_test(&forward_ray(), &[inside, outside], &query(10));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, inside);
        assert!((hits[0].angle_deg - 8.0).abs() < 1e-3);
    }

    #[test]
    fn max_results_truncates() {
        let points: Vec<Vec3> = (1..=8).map(|i| Vec3::new(i as f32 * 0.01, 0.0, -2.0)).collect();
        let hits = hit_test(&forward_ray(), &points, &query(3));
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].position, points[0]);
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let points = [Vec3::new(f32::NAN, 0.0, -2.0), Vec3::new(0.0, 0.0, -2.0)];
        assert_eq!(hit_test(&forward_ray(), &points, &query(10)).len(), 1);
    }

    #[test]
    fn from_origin_picks_globally_closest_without_filtering() {
        // The closest point lies behind the origin and far outside any cone.
        let points = [
            Vec3::new(1.0, 0.0, -2.0),
            Vec3::new(0.01, 0.0, 9.0),
            Vec3::new(0.5, 0.0, -1.0),
        ];
        let hit = hit_test_from_origin(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0), &points).unwrap();
        assert_eq!(hit.position, points[1]);
        assert!((hit.distance_to_ray - 0.01).abs() < 1e-6);
        assert!(hit.distance_along_ray < 0.0);
    }

    #[test]
    fn from_origin_with_zero_direction_is_none() {
        assert!(hit_test_from_origin(Vec3::ZERO, Vec3::ZERO, &[Vec3::X]).is_none());
    }
}
