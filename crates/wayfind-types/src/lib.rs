//! `wayfind-types` – shared value types for the Wayfind localization stack.
//!
//! # Modules
//!
//! - [`geometry`] – [`Vec3`], [`Quaternion`] and [`Pose`].
//! - [`camera`] – [`Pixel`], [`Viewport`], [`BoundingBox`],
//!   [`CameraIntrinsics`] and the per-frame [`FrameContext`].
//!
//! The rest of this file holds the query/result types passed between the
//! perception core and its callers, and the crate-wide [`WayfindError`].

pub mod camera;
pub mod geometry;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use camera::{BoundingBox, CameraIntrinsics, FrameContext, Pixel, Viewport};
pub use geometry::{Pose, Quaternion, Vec3};

// ────────────────────────────────────────────────────────────────────────────
// Ray
// ────────────────────────────────────────────────────────────────────────────

/// A half-line in world space.  `direction` is always unit length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRay")]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

#[derive(Deserialize)]
struct RawRay {
    origin: Vec3,
    direction: Vec3,
}

impl TryFrom<RawRay> for Ray {
    type Error = WayfindError;

    fn try_from(raw: RawRay) -> Result<Self, Self::Error> {
        Ray::new(raw.origin, raw.direction).ok_or(WayfindError::DegenerateRay)
    }
}

impl Ray {
    /// Build a ray, normalizing `direction`.  Returns `None` when the
    /// direction has zero length or the origin is not finite.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        if !origin.is_finite() {
            return None;
        }
        let direction = direction.normalized()?;
        Some(Self { origin, direction })
    }

    /// The ray starting at `origin` and passing through `through`.
    pub fn through(origin: Vec3, through: Vec3) -> Option<Self> {
        Self::new(origin, through - origin)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// The point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Plane
// ────────────────────────────────────────────────────────────────────────────

/// Identifier of a detected surface, as assigned by the tracking system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaneId(pub String);

impl PlaneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A detected flat surface.
///
/// The surface is the `y = 0` plane of the anchor frame given by
/// `transform`; its normal is the anchor's local +Y.  The finite rectangle is
/// centred on `center` (anchor-local) and spans `extent_x` × `extent_z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPlane")]
pub struct Plane {
    id: PlaneId,
    transform: Pose,
    center: Vec3,
    extent_x: f32,
    extent_z: f32,
}

#[derive(Deserialize)]
struct RawPlane {
    id: PlaneId,
    transform: Pose,
    center: Vec3,
    extent_x: f32,
    extent_z: f32,
}

impl From<RawPlane> for Plane {
    fn from(raw: RawPlane) -> Self {
        Plane::new(raw.id, raw.transform, raw.center, raw.extent_x, raw.extent_z)
    }
}

impl Plane {
    /// Create a plane.  Negative or NaN extents are clamped to zero.
    pub fn new(id: PlaneId, transform: Pose, center: Vec3, extent_x: f32, extent_z: f32) -> Self {
        Self {
            id,
            transform: Pose::new(transform.translation, transform.rotation.normalized()),
            center,
            extent_x: extent_x.max(0.0),
            extent_z: extent_z.max(0.0),
        }
    }

    /// A horizontal, upward-facing plane whose anchor sits at `world_center`.
    pub fn horizontal(id: PlaneId, world_center: Vec3, extent_x: f32, extent_z: f32) -> Self {
        Self::new(
            id,
            Pose::from_translation(world_center),
            Vec3::ZERO,
            extent_x,
            extent_z,
        )
    }

    pub fn id(&self) -> &PlaneId {
        &self.id
    }

    /// Anchor frame → world transform.
    pub fn transform(&self) -> Pose {
        self.transform
    }

    /// Rectangle centre in the anchor frame.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn extent_x(&self) -> f32 {
        self.extent_x
    }

    pub fn extent_z(&self) -> f32 {
        self.extent_z
    }

    /// World-space surface normal.
    pub fn normal(&self) -> Vec3 {
        self.transform.transform_vector(Vec3::Y)
    }

    /// True when the anchor-local `(x, z)` lies inside the rectangle grown by
    /// `tolerance_fraction` of each extent.
    pub fn contains_local(&self, x: f32, z: f32, tolerance_fraction: f32) -> bool {
        let grow = 1.0 + tolerance_fraction.max(0.0);
        (x - self.center.x).abs() <= self.extent_x * grow * 0.5
            && (z - self.center.z).abs() <= self.extent_z * grow * 0.5
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Query results
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of a single-ray localization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalizationResult {
    pub position: Option<Vec3>,
    pub plane: Option<PlaneId>,
    pub hit_plane: bool,
}

impl LocalizationResult {
    /// No plane qualified.
    pub fn miss() -> Self {
        Self::default()
    }

    pub fn on_plane(position: Vec3, plane: PlaneId) -> Self {
        Self {
            position: Some(position),
            plane: Some(plane),
            hit_plane: true,
        }
    }

    /// A position found without a supporting plane (e.g. a feature point).
    pub fn free(position: Vec3) -> Self {
        Self {
            position: Some(position),
            plane: None,
            hit_plane: false,
        }
    }
}

/// One feature point accepted by a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureHit {
    pub position: Vec3,
    /// Perpendicular distance from the point to the ray (metres).
    pub distance_to_ray: f32,
    /// Distance of the point's projection along the ray (metres).
    pub distance_along_ray: f32,
    /// Angle between the ray direction and the direction to the point.
    pub angle_deg: f32,
}

/// An object that has been anchored in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub label: String,
    pub position: Vec3,
    /// Rendered marker size (metres).
    pub scale: f32,
    /// Plane the object rests on, when known.
    pub plane: Option<PlaneId>,
}

/// A detection request in flight: the camera pose captured when the frame
/// was sent to the vision service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: Uuid,
    /// Object label the user is searching for.
    pub label: String,
    pub pose: Pose,
    pub captured_at: DateTime<Utc>,
}

impl Observation {
    pub fn new(label: impl Into<String>, pose: Pose) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            pose,
            captured_at: Utc::now(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Errors raised by the localization stack.
///
/// A ray that hits nothing is *not* an error; it produces an empty
/// [`LocalizationResult`].
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WayfindError {
    #[error("No active camera pose: tracking has not produced a frame")]
    NoActivePose,

    #[error("Rays are parallel (denominator {denominator:e}); cannot triangulate")]
    ParallelRays { denominator: f64 },

    #[error("Degenerate ray: direction has zero length")]
    DegenerateRay,

    #[error("Unknown observation: {0}")]
    UnknownObservation(Uuid),

    #[error("Invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Scenario Error: {0}")]
    Scenario(String),
}
