//! [`ObjectLocator`] – turns taps and detection results into an anchored
//! object.
//!
//! # Pipeline
//!
//! ```text
//! pixel + pose ──build_ray──► ray ──localize(planes)──► hit? ──yes──► Plane
//!                                        │
//!                                        no
//!                                        ▼
//!                             hit_test(feature points) ──► best? ──► FeaturePoint
//! ```
//!
//! The two steps are explicit: [`ObjectLocator::locate`] reports which
//! source answered, and either step can be exercised on its own through
//! `wayfind-perception`.
//!
//! # Placed object lifecycle
//!
//! A successful fix is turned into a [`PlacedObject`] with
//! [`ObjectLocator::place`], which clamps it to
//! [`LocatorConfig::max_placement_distance`] from the observing camera.
//! Planes reported later may pull the object onto their surface
//! ([`ObjectLocator::on_plane_added`]).  [`ObjectLocator::clear`] removes it
//! when a new search starts.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wayfind_runtime::{LocatorConfig, ObjectLocator, PlaneRegistry};
//! use wayfind_types::{Plane, PlaneId, Ray, Vec3};
//!
//! let registry = Arc::new(PlaneRegistry::new());
//! registry.add(Plane::horizontal(PlaneId::new("floor"), Vec3::new(0.0, -1.0, 0.0), 4.0, 4.0));
//!
//! let mut locator = ObjectLocator::new(registry, LocatorConfig::default());
//! let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)).unwrap();
//! let fix = locator.locate(&ray, &[]).unwrap();
//!
//! let placed = locator.place("keys", &fix, Vec3::ZERO);
//! assert!(placed.position.distance(Vec3::new(0.0, -1.0, 0.0)) < 1e-6);
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use wayfind_perception::{
    FeatureQuery, PlaneRegistry, SnapOptions, SnapOutcome, build_live_ray, build_ray, hit_test,
    localize, localize_stereo, resolve_placement, snap_to_plane,
};
use wayfind_types::{
    BoundingBox, FrameContext, Observation, Pixel, PlacedObject, Plane, PlaneId, Pose, Ray, Vec3,
    WayfindError,
};

use crate::observations::ObservationLedger;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tuning for an [`ObjectLocator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorConfig {
    /// Placed objects are never farther than this from the observing camera
    /// (metres).
    pub max_placement_distance: f32,
    pub feature_query: FeatureQuery,
    pub snap: SnapOptions,
    /// Snap animation length per metre of vertical travel.
    pub snap_seconds_per_metre: f32,
    /// Marker size given to new placed objects (metres).
    pub object_scale: f32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_placement_distance: 5.0,
            feature_query: FeatureQuery::default(),
            snap: SnapOptions::default(),
            snap_seconds_per_metre: 10.0,
            object_scale: 0.1,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

/// Which stage of the pipeline produced a fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocateSource {
    Plane(PlaneId),
    FeaturePoint,
}

/// A resolved world position and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub position: Vec3,
    pub source: LocateSource,
    /// The ray the fix was resolved along.
    pub ray: Ray,
}

impl Located {
    pub fn plane(&self) -> Option<&PlaneId> {
        match &self.source {
            LocateSource::Plane(id) => Some(id),
            LocateSource::FeaturePoint => None,
        }
    }
}

/// A detection response matched to the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub observation: Observation,
    /// `None` when neither a plane nor a feature point qualified; the caller
    /// should retry on a later frame.
    pub located: Option<Located>,
}

/// Movement the renderer should animate after a plane snap.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapMotion {
    pub plane: PlaneId,
    pub from: Vec3,
    pub to: Vec3,
    pub duration: Duration,
}

/// Where the placed object is relative to the user, for the voice and
/// haptic collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub label: String,
    /// Straight-line distance from the camera (metres).
    pub distance: f32,
    /// Horizontal angle from the camera's forward direction, positive to the
    /// right, in `(-180, 180]` degrees.
    pub bearing_deg: f32,
    /// The bearing as a clock position, 12 = straight ahead, 3 = right.
    pub clock: u8,
}

impl Announcement {
    /// A short spoken-style sentence.
    pub fn phrase(&self) -> String {
        format!(
            "{} is {:.1} metres away at {} o'clock",
            self.label, self.distance, self.clock
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ObjectLocator
// ────────────────────────────────────────────────────────────────────────────

/// Localization session state: the shared plane registry plus the object
/// currently being tracked.
#[derive(Debug)]
pub struct ObjectLocator {
    planes: Arc<PlaneRegistry>,
    config: LocatorConfig,
    placed: Option<PlacedObject>,
}

impl ObjectLocator {
    /// Create a locator over `planes`, which the tracking thread keeps
    /// updating.
    pub fn new(planes: Arc<PlaneRegistry>, config: LocatorConfig) -> Self {
        Self {
            planes,
            config,
            placed: None,
        }
    }

    pub fn planes(&self) -> &Arc<PlaneRegistry> {
        &self.planes
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Resolve `ray`: planes first, then the best feature point.
    ///
    /// Returns `None` when neither stage finds anything.
    pub fn locate(&self, ray: &Ray, features: &[Vec3]) -> Option<Located> {
        let snapshot = self.planes.snapshot();
        let result = localize(ray, &snapshot);
        if let (Some(position), Some(plane)) = (result.position, result.plane) {
            return Some(Located {
                position,
                source: LocateSource::Plane(plane),
                ray: *ray,
            });
        }

        let best = hit_test(ray, features, &self.config.feature_query)
            .into_iter()
            .next()?;
        debug!(
            distance_to_ray = best.distance_to_ray,
            "no plane hit; using feature point"
        );
        Some(Located {
            position: best.position,
            source: LocateSource::FeaturePoint,
            ray: *ray,
        })
    }

    /// Resolve a tap on the live frame.
    ///
    /// # Errors
    ///
    /// [`WayfindError::NoActivePose`] when tracking has no current pose.
    pub fn locate_tap(
        &self,
        pixel: Pixel,
        frame: &FrameContext,
        features: &[Vec3],
    ) -> Result<Option<Located>, WayfindError> {
        let ray = build_live_ray(pixel, frame)?;
        Ok(self.locate(&ray, features))
    }

    /// Resolve a detection response against the pose captured when the
    /// request `id` was sent.  The request is removed from `ledger` once its
    /// ray has been built; on [`WayfindError::NoActivePose`] it stays
    /// pending.
    ///
    /// # Errors
    ///
    /// - [`WayfindError::UnknownObservation`] when `id` is not pending.
    /// - [`WayfindError::NoActivePose`] when tracking has no current pose.
    pub fn locate_detection(
        &self,
        ledger: &mut ObservationLedger,
        id: Uuid,
        bbox: &BoundingBox,
        frame: &FrameContext,
        features: &[Vec3],
    ) -> Result<DetectionOutcome, WayfindError> {
        let pose = ledger.pose(id)?;
        let pixel = bbox.centre_in(&frame.viewport);
        let ray = build_ray(pixel, frame, &pose)?;
        let observation = ledger.take(id)?;
        let located = self.locate(&ray, features);
        debug!(
            observation = %id,
            label = %observation.label,
            found = located.is_some(),
            "detection resolved"
        );
        Ok(DetectionOutcome {
            observation,
            located,
        })
    }

    /// Triangulate an object seen at two pixels from two captured poses.
    /// The estimate is clamped against the second (most recent) camera.
    ///
    /// # Errors
    ///
    /// - [`WayfindError::ParallelRays`] when both sightings are along the
    ///   same direction.
    /// - [`WayfindError::NoActivePose`] when tracking has no current pose.
    pub fn triangulate(
        &self,
        first: (Pixel, Pose),
        second: (Pixel, Pose),
        frame: &FrameContext,
    ) -> Result<Vec3, WayfindError> {
        let ray1 = build_ray(first.0, frame, &first.1)?;
        let ray2 = build_ray(second.0, frame, &second.1)?;
        let estimate = localize_stereo(&ray1, &ray2)?;
        Ok(resolve_placement(
            estimate,
            second.1.translation,
            self.config.max_placement_distance,
        ))
    }

    /// Anchor `label` at a fix, replacing any previously placed object.
    pub fn place(&mut self, label: &str, located: &Located, camera: Vec3) -> &PlacedObject {
        self.place_at(label, located.position, located.plane().cloned(), camera)
    }

    /// Anchor `label` at an explicit position (e.g. a stereo estimate).
    /// `plane` is dropped when the distance clamp moves the position.
    pub fn place_at(
        &mut self,
        label: &str,
        position: Vec3,
        plane: Option<PlaneId>,
        camera: Vec3,
    ) -> &PlacedObject {
        let clamped = resolve_placement(position, camera, self.config.max_placement_distance);
        // A clamped position no longer lies on the plane it was found on.
        let plane = if clamped == position { plane } else { None };
        let position = clamped;
        info!(label, ?position, "object placed");
        self.placed.insert(PlacedObject {
            label: label.to_string(),
            position,
            scale: self.config.object_scale,
            plane,
        })
    }

    pub fn placed(&self) -> Option<&PlacedObject> {
        self.placed.as_ref()
    }

    /// Remove the placed object; returns it if there was one.
    pub fn clear(&mut self) -> Option<PlacedObject> {
        let removed = self.placed.take();
        if let Some(obj) = &removed {
            info!(label = %obj.label, "placed object cleared");
        }
        removed
    }

    /// Register a new or refined plane and, if the placed object hovers just
    /// over it, snap the object onto it.
    pub fn on_plane_added(&mut self, plane: Plane) -> Option<SnapMotion> {
        self.planes.add(plane.clone());

        let placed = self.placed.as_mut()?;
        let SnapOutcome::Snap {
            position,
            vertical_distance,
            ..
        } = snap_to_plane(placed.position, &plane, &self.config.snap)
        else {
            return None;
        };

        let secs = (vertical_distance * self.config.snap_seconds_per_metre).max(0.0);
        let motion = SnapMotion {
            plane: plane.id().clone(),
            from: placed.position,
            to: position,
            duration: Duration::try_from_secs_f32(secs).unwrap_or_default(),
        };
        info!(label = %placed.label, plane_id = %plane.id(), "placed object snapped to plane");
        placed.position = position;
        placed.plane = Some(plane.id().clone());
        Some(motion)
    }

    /// Forget a plane the tracker invalidated.  The placed object keeps its
    /// position.
    pub fn on_plane_removed(&mut self, id: &PlaneId) {
        self.planes.remove(id);
        if let Some(placed) = self.placed.as_mut()
            && placed.plane.as_ref() == Some(id)
        {
            placed.plane = None;
        }
    }

    /// Distance and direction from `camera` to the placed object.
    pub fn announce(&self, camera: &Pose) -> Option<Announcement> {
        let placed = self.placed.as_ref()?;
        let offset = placed.position - camera.translation;
        let forward = camera.forward();

        let bearing_deg = horizontal_bearing(forward, offset);
        Some(Announcement {
            label: placed.label.clone(),
            distance: offset.length(),
            bearing_deg,
            clock: clock_position(bearing_deg),
        })
    }
}

/// Signed angle in the XZ plane from `forward` to `target`, positive when
/// `target` is to the right (+Y up).  Zero when either has no horizontal
/// component.
fn horizontal_bearing(forward: Vec3, target: Vec3) -> f32 {
    let f = Vec3::new(forward.x, 0.0, forward.z);
    let t = Vec3::new(target.x, 0.0, target.z);
    if f.normalized().is_none() || t.normalized().is_none() {
        return 0.0;
    }
    let right_component = f.x * t.z - f.z * t.x;
    let deg = right_component.atan2(f.dot(t)).to_degrees();
    if deg <= -180.0 { deg + 360.0 } else { deg }
}

fn clock_position(bearing_deg: f32) -> u8 {
    let hour = ((bearing_deg / 30.0).round() as i32).rem_euclid(12);
    if hour == 0 { 12 } else { hour as u8 }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;
    use wayfind_types::{CameraIntrinsics, Quaternion, Viewport};

    fn floor(y: f32) -> Plane {
        Plane::horizontal(PlaneId::new("floor"), Vec3::new(0.0, y, 0.0), 4.0, 4.0)
    }

    fn locator_with(planes: &[Plane]) -> ObjectLocator {
        let registry = Arc::new(PlaneRegistry::new());
        for p in planes {
            registry.add(p.clone());
        }
        ObjectLocator::new(registry, LocatorConfig::default())
    }

    fn frame(pose: Option<Pose>) -> FrameContext {
        let vp = Viewport::new(400.0, 800.0).unwrap();
        let k = CameraIntrinsics::from_vertical_fov(60f32.to_radians(), &vp, 100.0);
        FrameContext::new(pose, k, vp)
    }

    /// Camera 1.5 m up, pitched 45° down.
    fn looking_down() -> Pose {
        Pose::new(
            Vec3::new(0.0, 1.5, 0.0),
            Quaternion::from_axis_angle(Vec3::X, -std::f32::consts::FRAC_PI_4),
        )
    }

    // ── pipeline ────────────────────────────────────────────────────────────

    #[test]
    fn plane_hit_is_preferred_over_features() {
        let loc = locator_with(&[floor(-1.0)]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)).unwrap();
        let features = [Vec3::new(0.0, -0.5, 0.0)];
        let fix = loc.locate(&ray, &features).unwrap();
        assert_eq!(fix.source, LocateSource::Plane(PlaneId::new("floor")));
        assert!(fix.position.distance(Vec3::new(0.0, -1.0, 0.0)) < 1e-6);
    }

    #[test]
    fn falls_back_to_feature_points_without_planes() {
        let loc = locator_with(&[]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let features = [Vec3::new(0.05, 0.0, -2.0), Vec3::new(0.01, 0.0, -1.0)];
        let fix = loc.locate(&ray, &features).unwrap();
        assert_eq!(fix.source, LocateSource::FeaturePoint);
        assert_eq!(fix.position, features[1]);
        assert!(fix.plane().is_none());
    }

    #[test]
    fn nothing_found_is_none() {
        let loc = locator_with(&[]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(loc.locate(&ray, &[]).is_none());
    }

    #[test]
    fn tap_without_pose_is_error() {
        let loc = locator_with(&[floor(0.0)]);
        let err = loc
            .locate_tap(Pixel::new(200.0, 400.0), &frame(None), &[])
            .unwrap_err();
        assert_eq!(err, WayfindError::NoActivePose);
    }

    #[test]
    fn tap_at_centre_lands_on_floor_ahead() {
        let loc = locator_with(&[Plane::horizontal(PlaneId::new("floor"), Vec3::ZERO, 10.0, 10.0)]);
        let f = frame(Some(looking_down()));
        let fix = loc.locate_tap(f.viewport.centre(), &f, &[]).unwrap().unwrap();
        // 45° down from 1.5 m → 1.5 m ahead.
        assert!(fix.position.distance(Vec3::new(0.0, 0.0, -1.5)) < 1e-3, "{:?}", fix.position);
    }

    #[test]
    fn detection_uses_captured_pose_not_live_pose() {
        let loc = locator_with(&[Plane::horizontal(PlaneId::new("floor"), Vec3::ZERO, 10.0, 10.0)]);
        let mut ledger = ObservationLedger::new();
        let id = ledger.record("keys", looking_down());

        // The user has since turned 90° to the left.
        let live = Pose::new(
            Vec3::new(0.0, 1.5, 0.0),
            Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2) * looking_down().rotation,
        );
        let bbox = BoundingBox::new(0.4, 0.4, 0.2, 0.2);
        let outcome = loc
            .locate_detection(&mut ledger, id, &bbox, &frame(Some(live)), &[])
            .unwrap();

        assert_eq!(outcome.observation.label, "keys");
        let fix = outcome.located.unwrap();
        assert!(fix.position.distance(Vec3::new(0.0, 0.0, -1.5)) < 1e-3, "{:?}", fix.position);
        assert!(ledger.is_empty());
    }

    #[test]
    fn detection_without_pose_stays_pending_for_retry() {
        let loc = locator_with(&[Plane::horizontal(PlaneId::new("floor"), Vec3::ZERO, 10.0, 10.0)]);
        let mut ledger = ObservationLedger::new();
        let id = ledger.record("keys", looking_down());
        let bbox = BoundingBox::new(0.4, 0.4, 0.2, 0.2);

        // Tracking lost when the response arrives.
        let err = loc
            .locate_detection(&mut ledger, id, &bbox, &frame(None), &[])
            .unwrap_err();
        assert_eq!(err, WayfindError::NoActivePose);
        assert_eq!(ledger.len(), 1);

        let outcome = loc
            .locate_detection(&mut ledger, id, &bbox, &frame(Some(Pose::identity())), &[])
            .unwrap();
        assert_eq!(outcome.observation.label, "keys");
        let fix = outcome.located.unwrap();
        assert!(fix.position.distance(Vec3::new(0.0, 0.0, -1.5)) < 1e-3, "{:?}", fix.position);
        assert!(ledger.is_empty());
    }

    #[test]
    fn detection_for_unknown_request_is_error() {
        let loc = locator_with(&[]);
        let mut ledger = ObservationLedger::new();
        let id = Uuid::new_v4();
        let bbox = BoundingBox::new(0.4, 0.4, 0.2, 0.2);
        let err = loc
            .locate_detection(&mut ledger, id, &bbox, &frame(Some(Pose::identity())), &[])
            .unwrap_err();
        assert_eq!(err, WayfindError::UnknownObservation(id));
    }

    #[test]
    fn triangulate_two_sightings() {
        let loc = locator_with(&[]);
        let f = frame(Some(Pose::identity()));
        let target = Vec3::new(0.0, 0.0, -2.0);
        // Both cameras look straight at the target, so it sits at the centre
        // pixel in each.
        // Positive yaw turns left.
        let left = Pose::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Quaternion::from_axis_angle(Vec3::Y, -(0.5f32).atan()),
        );
        let right = Pose::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quaternion::from_axis_angle(Vec3::Y, (0.5f32).atan()),
        );
        let centre = f.viewport.centre();
        let x = loc.triangulate((centre, left), (centre, right), &f).unwrap();
        assert!(x.distance(target) < 1e-3, "{x:?}");
    }

    #[test]
    fn triangulate_parallel_sightings_is_error() {
        let loc = locator_with(&[]);
        let f = frame(Some(Pose::identity()));
        let a = Pose::from_translation(Vec3::new(-1.0, 0.0, 0.0));
        let b = Pose::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let centre = f.viewport.centre();
        let err = loc.triangulate((centre, a), (centre, b), &f).unwrap_err();
        assert!(matches!(err, WayfindError::ParallelRays { .. }));
    }

    // ── placement lifecycle ─────────────────────────────────────────────────

    #[test]
    fn place_clamps_to_max_distance() {
        let mut loc = locator_with(&[]);
        let placed = loc.place_at("keys", Vec3::new(20.0, 0.0, 0.0), None, Vec3::ZERO);
        assert!(placed.position.distance(Vec3::new(5.0, 0.0, 0.0)) < 1e-5);
        assert!((placed.scale - 0.1).abs() < 1e-6);
    }

    #[test]
    fn clamped_plane_hit_is_detached_from_plane() {
        let mut loc = locator_with(&[]);
        let far = loc.place_at(
            "keys",
            Vec3::new(0.0, 0.0, -9.0),
            Some(PlaneId::new("floor")),
            Vec3::new(0.0, 1.5, 0.0),
        );
        assert!(far.plane.is_none());
        assert!((far.position.distance(Vec3::new(0.0, 1.5, 0.0)) - 5.0).abs() < 1e-4);

        let near = loc.place_at(
            "keys",
            Vec3::new(0.0, 0.0, -1.0),
            Some(PlaneId::new("floor")),
            Vec3::new(0.0, 1.5, 0.0),
        );
        assert_eq!(near.plane, Some(PlaneId::new("floor")));
    }

    #[test]
    fn place_replaces_and_clear_removes() {
        let mut loc = locator_with(&[]);
        loc.place_at("keys", Vec3::X, None, Vec3::ZERO);
        loc.place_at("wallet", Vec3::Z, None, Vec3::ZERO);
        assert_eq!(loc.placed().unwrap().label, "wallet");
        assert_eq!(loc.clear().unwrap().label, "wallet");
        assert!(loc.placed().is_none());
        assert!(loc.clear().is_none());
    }

    #[test]
    fn new_plane_snaps_hovering_object() {
        let mut loc = locator_with(&[]);
        loc.place_at("keys", Vec3::new(0.1, 0.78, -1.0), None, Vec3::ZERO);

        let table = Plane::horizontal(PlaneId::new("table"), Vec3::new(0.0, 0.75, -1.0), 1.0, 1.0);
        let motion = loc.on_plane_added(table).unwrap();
        assert_eq!(motion.plane, PlaneId::new("table"));
        assert!(motion.to.distance(Vec3::new(0.1, 0.75, -1.0)) < 1e-5);
        // 0.03 m × 10 s/m.
        assert!((motion.duration.as_secs_f32() - 0.3).abs() < 1e-3);

        let placed = loc.placed().unwrap();
        assert_eq!(placed.plane, Some(PlaneId::new("table")));
        assert!((placed.position.y - 0.75).abs() < 1e-5);
        assert_eq!(loc.planes().len(), 1);
    }

    #[test]
    fn distant_plane_does_not_snap() {
        let mut loc = locator_with(&[]);
        loc.place_at("keys", Vec3::new(0.0, 1.0, -1.0), None, Vec3::ZERO);
        assert!(loc.on_plane_added(floor(0.0)).is_none());
        assert!((loc.placed().unwrap().position.y - 1.0).abs() < 1e-6);
        // The plane is still registered.
        assert_eq!(loc.planes().len(), 1);
    }

    #[test]
    fn removing_support_plane_detaches_object() {
        let mut loc = locator_with(&[floor(0.0)]);
        loc.place_at("keys", Vec3::ZERO, Some(PlaneId::new("floor")), Vec3::ZERO);
        loc.on_plane_removed(&PlaneId::new("floor"));
        assert!(loc.planes().is_empty());
        assert!(loc.placed().unwrap().plane.is_none());
    }

    // ── announcements ───────────────────────────────────────────────────────

    #[test]
    fn announce_without_object_is_none() {
        assert!(locator_with(&[]).announce(&Pose::identity()).is_none());
    }

    #[test]
    fn announce_reports_distance_and_clock() {
        let mut loc = locator_with(&[]);
        loc.place_at("keys", Vec3::new(2.0, 0.0, 0.0), None, Vec3::ZERO);

        let a = loc.announce(&Pose::identity()).unwrap();
        assert!((a.distance - 2.0).abs() < 1e-5);
        assert!((a.bearing_deg - 90.0).abs() < 1e-3);
        assert_eq!(a.clock, 3);
        assert!(a.phrase().contains("3 o'clock"));
    }

    #[test]
    fn announcement_serializes_for_collaborators() {
        let a = Announcement {
            label: "keys".into(),
            distance: 1.5,
            bearing_deg: -30.0,
            clock: 11,
        };
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["label"], "keys");
        assert_eq!(json["clock"], 11);
        let back: Announcement = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);

        let source = serde_json::to_string(&LocateSource::Plane(PlaneId::new("floor"))).unwrap();
        let back: LocateSource = serde_json::from_str(&source).unwrap();
        assert_eq!(back, LocateSource::Plane(PlaneId::new("floor")));
    }

    #[test]
    fn clock_positions() {
        assert_eq!(clock_position(0.0), 12);
        assert_eq!(clock_position(-90.0), 9);
        assert_eq!(clock_position(180.0), 6);
        assert_eq!(clock_position(44.0), 1);
        assert_eq!(clock_position(-14.0), 12);
    }

    #[test]
    fn bearing_behind_is_180() {
        let b = horizontal_bearing(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 3.0));
        assert!((b - 180.0).abs() < 1e-3);
    }
}
