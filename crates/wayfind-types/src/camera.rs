//! Pinhole camera model, viewport and per-frame renderer context.
//!
//! # Coordinate conventions
//!
//! - **Pixel coordinates**: origin at the viewport's top-left corner, +X
//!   right, +Y down.
//! - **Camera frame**: +X right, +Y up, the camera looks down −Z.
//!
//! ```text
//! pixel → subtract (cx, cy) → divide by (fx, fy) → flip Y → scale by far → camera frame
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::WayfindError;
use crate::geometry::{Pose, Vec3};

/// A 2-D coordinate in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Pixel {
    pub x: f32,
    pub y: f32,
}

impl Pixel {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The on-screen area the renderer draws into, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Create a viewport.
    ///
    /// # Errors
    ///
    /// Returns [`WayfindError::InvalidViewport`] unless both dimensions are
    /// finite and strictly positive.
    pub fn new(width: f32, height: f32) -> Result<Self, WayfindError> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(Self { width, height })
        } else {
            Err(WayfindError::InvalidViewport { width, height })
        }
    }

    /// Scale normalized `[0, 1]` fractions (as reported by the detection
    /// service) to viewport pixels.
    pub fn denormalize(&self, nx: f32, ny: f32) -> Pixel {
        Pixel::new(nx * self.width, ny * self.height)
    }

    pub fn centre(&self) -> Pixel {
        self.denormalize(0.5, 0.5)
    }
}

/// An axis-aligned detection box in normalized `[0, 1]` viewport fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Centre of the box in viewport pixels.
    pub fn centre_in(&self, viewport: &Viewport) -> Pixel {
        viewport.denormalize(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Pinhole intrinsics expressed in viewport pixels, plus the far clipping
/// distance used for unprojection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CameraIntrinsics {
    /// Horizontal focal length in pixels.
    pub fx: f32,
    /// Vertical focal length in pixels.
    pub fy: f32,
    /// Principal point X in pixels.
    pub cx: f32,
    /// Principal point Y in pixels.
    pub cy: f32,
    /// Far clipping distance in metres.
    pub far: f32,
}

impl CameraIntrinsics {
    /// Square-pixel intrinsics from a vertical field of view, with the
    /// principal point at the viewport centre: `f = (height/2) / tan(fov/2)`.
    pub fn from_vertical_fov(fov_rad: f32, viewport: &Viewport, far: f32) -> Self {
        let f = (viewport.height * 0.5) / (fov_rad * 0.5).tan();
        let centre = viewport.centre();
        Self {
            fx: f,
            fy: f,
            cx: centre.x,
            cy: centre.y,
            far,
        }
    }

    /// The camera-frame point on the far clipping plane that projects onto
    /// `pixel`.
    pub fn unproject_far(&self, pixel: Pixel) -> Vec3 {
        let x = (pixel.x - self.cx) / self.fx;
        let y = -(pixel.y - self.cy) / self.fy;
        Vec3::new(x * self.far, y * self.far, -self.far)
    }
}

/// The renderer's state for the frame being drawn right now.
///
/// `current` is `None` while tracking has not produced a pose yet (session
/// starting up, or tracking lost).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub current: Option<Pose>,
    pub intrinsics: CameraIntrinsics,
    pub viewport: Viewport,
}

impl FrameContext {
    pub fn new(current: Option<Pose>, intrinsics: CameraIntrinsics, viewport: Viewport) -> Self {
        Self {
            current,
            intrinsics,
            viewport,
        }
    }

    /// The live camera pose.
    ///
    /// # Errors
    ///
    /// [`WayfindError::NoActivePose`] when tracking has not produced a pose.
    pub fn current_pose(&self) -> Result<Pose, WayfindError> {
        self.current.ok_or(WayfindError::NoActivePose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_rejects_non_positive_dimensions() {
        assert!(Viewport::new(0.0, 100.0).is_err());
        assert!(Viewport::new(100.0, -1.0).is_err());
        assert!(Viewport::new(f32::NAN, 100.0).is_err());
        assert!(Viewport::new(390.0, 844.0).is_ok());
    }

    #[test]
    fn bounding_box_centre_scales_to_pixels() {
        let vp = Viewport::new(400.0, 800.0).unwrap();
        let bbox = BoundingBox::new(0.25, 0.5, 0.5, 0.25);
        let c = bbox.centre_in(&vp);
        assert!((c.x - 200.0).abs() < 1e-4);
        assert!((c.y - 500.0).abs() < 1e-4);
    }

    #[test]
    fn centre_pixel_unprojects_onto_optical_axis() {
        let vp = Viewport::new(400.0, 800.0).unwrap();
        let k = CameraIntrinsics::from_vertical_fov(60f32.to_radians(), &vp, 100.0);
        let p = k.unproject_far(vp.centre());
        assert!(p.x.abs() < 1e-4);
        assert!(p.y.abs() < 1e-4);
        assert!((p.z + 100.0).abs() < 1e-4);
    }

    #[test]
    fn top_edge_pixel_points_up_by_half_fov() {
        let vp = Viewport::new(400.0, 800.0).unwrap();
        let k = CameraIntrinsics::from_vertical_fov(60f32.to_radians(), &vp, 10.0);
        let p = k.unproject_far(Pixel::new(200.0, 0.0));
        let angle = (p.y / -p.z).atan().to_degrees();
        assert!((angle - 30.0).abs() < 1e-3, "angle={angle}");
    }

    #[test]
    fn frame_without_pose_reports_no_active_pose() {
        let vp = Viewport::new(10.0, 10.0).unwrap();
        let k = CameraIntrinsics::from_vertical_fov(1.0, &vp, 10.0);
        let frame = FrameContext::new(None, k, vp);
        assert!(matches!(frame.current_pose(), Err(WayfindError::NoActivePose)));
    }
}
