//! Rigid-body geometry primitives.
//!
//! [`Vec3`], [`Quaternion`] and [`Pose`] are the vocabulary every other
//! Wayfind crate speaks.  All coordinates are in metres, right-handed, with
//! +Y up.  A camera [`Pose`] looks down its local −Z axis.
//!
//! # Example
//!
//! ```rust
//! use wayfind_types::geometry::{Pose, Quaternion, Vec3};
//!
//! // Camera 1.5 m above the floor, turned 90° to the left.
//! let pose = Pose::new(
//!     Vec3::new(0.0, 1.5, 0.0),
//!     Quaternion::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2),
//! );
//!
//! let ahead = pose.transform_point(Vec3::new(0.0, 0.0, -1.0));
//! assert!((ahead.x + 1.0).abs() < 1e-5);
//! assert!((ahead.y - 1.5).abs() < 1e-5);
//! ```

use std::ops::{Add, Mul, Neg, Sub};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D point or direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a new vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector with the same direction, or `None` for a zero-length or
    /// non-finite vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > f32::EPSILON && len.is_finite() {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    /// True when every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1); see [`Quaternion::normalized`].
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle_rad` around `axis` (right-hand rule).  A zero axis
    /// yields the identity.
    pub fn from_axis_angle(axis: Vec3, angle_rad: f32) -> Self {
        let Some(axis) = axis.normalized() else {
            return Self::identity();
        };
        let (s, c) = (angle_rad * 0.5).sin_cos();
        Self::new(c, axis.x * s, axis.y * s, axis.z * s)
    }

    /// Rescale to unit norm.  A degenerate quaternion becomes the identity.
    pub fn normalized(self) -> Self {
        let n = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if n > f32::EPSILON && n.is_finite() {
            Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
        } else {
            Self::identity()
        }
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self * p * self.conjugate();
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`.
impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body transform from a local frame into the world frame.
///
/// To map a local point into world space, rotate it by `rotation` then add
/// `translation`.  Camera poses and plane anchors both use this type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl Pose {
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vec3::ZERO, Quaternion::identity())
    }

    /// A pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quaternion::identity())
    }

    /// Compose two transforms: if `self` = T_A_B and `other` = T_B_C the
    /// result is T_A_C.
    pub fn compose(self, other: Self) -> Self {
        let translation = self.translation + self.rotation.rotate(other.translation);
        let rotation = self.rotation * other.rotation;
        Self::new(translation, rotation)
    }

    /// The inverse transform (world → local).
    pub fn inverse(self) -> Self {
        let inv_rot = self.rotation.conjugate();
        Self::new(-inv_rot.rotate(self.translation), inv_rot)
    }

    /// Map a local point into world space.
    pub fn transform_point(self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p) + self.translation
    }

    /// Map a local direction into world space (rotation only).
    pub fn transform_vector(self, v: Vec3) -> Vec3 {
        self.rotation.rotate(v)
    }

    /// Map a world point into the local frame.
    pub fn inverse_transform_point(self, p: Vec3) -> Vec3 {
        self.rotation.conjugate().rotate(p - self.translation)
    }

    /// Map a world direction into the local frame.
    pub fn inverse_transform_vector(self, v: Vec3) -> Vec3 {
        self.rotation.conjugate().rotate(v)
    }

    /// The local −Z axis expressed in world space (camera viewing direction).
    pub fn forward(self) -> Vec3 {
        self.rotation.rotate(Vec3::new(0.0, 0.0, -1.0))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
