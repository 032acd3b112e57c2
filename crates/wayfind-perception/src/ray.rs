//! Pose & Ray Builder.
//!
//! Detection results come back from the vision service long after the frame
//! was captured; by then the camera has moved.  [`build_ray`] therefore takes
//! the pose the observation was made from rather than the live one.
//!
//! The renderer only knows how to unproject with its *current* camera, so
//! the far-plane point is unprojected with the live pose first and then
//! carried into the requested pose's frame:
//!
//! ```text
//! far_world  = T_current · unproject(pixel)
//! far_rebase = T_pose · T_current⁻¹ · far_world
//! direction  = normalize(far_rebase − pose.translation)
//! ```
//!
//! # Example
//!
//! ```rust
//! use wayfind_perception::ray::build_ray;
//! use wayfind_types::{CameraIntrinsics, FrameContext, Pose, Vec3, Viewport};
//!
//! let viewport = Viewport::new(400.0, 800.0).unwrap();
//! let intrinsics = CameraIntrinsics::from_vertical_fov(1.0, &viewport, 100.0);
//! let live = Pose::from_translation(Vec3::new(2.0, 0.0, 0.0));
//! let frame = FrameContext::new(Some(live), intrinsics, viewport);
//!
//! // The object was seen from the origin a second ago.
//! let captured = Pose::identity();
//! let ray = build_ray(viewport.centre(), &frame, &captured).unwrap();
//! assert_eq!(ray.origin(), Vec3::ZERO);
//! assert!((ray.direction().z + 1.0).abs() < 1e-5);
//! ```

use tracing::debug;
use wayfind_types::{FrameContext, Pixel, Pose, Ray, WayfindError};

/// Build the world-space ray through `pixel` as seen from `pose`.
///
/// # Errors
///
/// - [`WayfindError::NoActivePose`] when `frame` has no live camera pose.
/// - [`WayfindError::DegenerateRay`] when the far clip is not strictly
///   positive, or the intrinsics otherwise collapse the far point onto the
///   camera centre.
pub fn build_ray(pixel: Pixel, frame: &FrameContext, pose: &Pose) -> Result<Ray, WayfindError> {
    let current = frame.current_pose()?;
    // A negative far clip unprojects behind the camera.
    let far = frame.intrinsics.far;
    if far.is_nan() || far <= 0.0 {
        debug!(far, "far clip must be positive");
        return Err(WayfindError::DegenerateRay);
    }

    let far_camera = frame.intrinsics.unproject_far(pixel);
    let far_world = current.transform_point(far_camera);
    let rebase = pose.compose(current.inverse());
    let far_point = rebase.transform_point(far_world);

    let ray = Ray::through(pose.translation, far_point).ok_or(WayfindError::DegenerateRay)?;
    debug!(
        pixel_x = pixel.x,
        pixel_y = pixel.y,
        origin = ?ray.origin(),
        direction = ?ray.direction(),
        "built ray"
    );
    Ok(ray)
}

/// Build the ray through `pixel` from the live camera pose (a direct tap).
///
/// # Errors
///
/// Same as [`build_ray`].
pub fn build_live_ray(pixel: Pixel, frame: &FrameContext) -> Result<Ray, WayfindError> {
    let current = frame.current_pose()?;
    build_ray(pixel, frame, &current)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
