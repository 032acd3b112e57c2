//! Scenario replay – drive the locator from a recorded JSON session.
//!
//! A scenario is a viewport plus an ordered list of tracker and vision
//! events.  [`replay`] feeds them through an [`ObjectLocator`] exactly as a
//! live session would and returns one [`ReplayEvent`] per step, so a session
//! can be reproduced (and asserted on) without a camera.
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "steps": [
//!     { "kind": "plane_added", "id": "floor", "center": { "x": 0, "y": 0, "z": -2 },
//!       "extent_x": 4, "extent_z": 4 },
//!     { "kind": "frame", "pose": { "translation": { "x": 0, "y": 1.5, "z": 0 },
//!       "rotation": { "w": 1, "x": 0, "y": 0, "z": 0 } } },
//!     { "kind": "tap", "x": 400, "y": 500, "label": "keys" },
//!     { "kind": "announce" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use wayfind_runtime::{
    Announcement, LocateSource, Located, ObjectLocator, ObservationLedger, PlaneRegistry,
    SnapMotion,
};
use wayfind_types::{
    BoundingBox, FrameContext, Pixel, Plane, PlaneId, Pose, Vec3, Viewport, WayfindError,
};

use crate::config::Config;

/// A recorded session.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Scenario {
    pub viewport: Viewport,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One camera sighting used for triangulation.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
pub struct Sighting {
    pub x: f32,
    pub y: f32,
    pub pose: Pose,
}

/// A single tracker, user or vision-service event.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// The tracker found (or refined) a plane.
    PlaneAdded {
        id: String,
        /// Anchor pose; identity when omitted.
        #[serde(default)]
        pose: Pose,
        /// Rectangle centre in the anchor frame.
        #[serde(default)]
        center: Vec3,
        extent_x: f32,
        extent_z: f32,
    },
    PlaneRemoved {
        id: String,
    },
    /// A new frame with a tracked pose and its feature cloud.
    Frame {
        pose: Pose,
        #[serde(default)]
        features: Vec<Vec3>,
    },
    /// Tracking was lost; subsequent steps run without a current pose.
    TrackingLost,
    /// The user tapped the screen at a pixel.
    Tap {
        x: f32,
        y: f32,
        #[serde(default = "default_tap_label")]
        label: String,
    },
    /// A frame was sent to the vision service; `job` names the request.
    SendDetection {
        job: String,
        label: String,
    },
    /// The vision service answered `job` with a bounding box.
    DetectionResult {
        job: String,
        bbox: BoundingBox,
    },
    /// The request was cancelled before it was answered.
    CancelDetection {
        job: String,
    },
    /// Triangulate from two sightings of the same object.
    Stereo {
        label: String,
        first: Sighting,
        second: Sighting,
    },
    Announce,
    Clear,
}

fn default_tap_label() -> String {
    "marker".to_string()
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayEvent {
    PlaneAdded {
        id: PlaneId,
        snapped: Option<SnapMotion>,
    },
    PlaneRemoved(PlaneId),
    FrameUpdated {
        features: usize,
    },
    TrackingLost,
    Placed {
        label: String,
        position: Vec3,
        source: LocateSource,
    },
    Triangulated {
        label: String,
        position: Vec3,
    },
    /// Nothing qualified along the ray; a live session would retry.
    NotFound {
        label: String,
    },
    DetectionSent {
        job: String,
        id: Uuid,
    },
    DetectionCancelled {
        job: String,
        was_pending: bool,
    },
    Announced(Announcement),
    NothingPlaced,
    Cleared(Option<String>),
    Failed {
        step: usize,
        error: WayfindError,
    },
}

impl fmt::Display for ReplayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayEvent::PlaneAdded { id, snapped: None } => write!(f, "plane {id} added"),
            ReplayEvent::PlaneAdded {
                id,
                snapped: Some(motion),
            } => write!(
                f,
                "plane {id} added; object snapped to y={:.3} over {:.2}s",
                motion.to.y,
                motion.duration.as_secs_f32()
            ),
            ReplayEvent::PlaneRemoved(id) => write!(f, "plane {id} removed"),
            ReplayEvent::FrameUpdated { features } => {
                write!(f, "frame updated ({features} feature points)")
            }
            ReplayEvent::TrackingLost => write!(f, "tracking lost"),
            ReplayEvent::Placed {
                label,
                position,
                source,
            } => {
                let via = match source {
                    LocateSource::Plane(id) => format!("plane {id}"),
                    LocateSource::FeaturePoint => "feature point".to_string(),
                };
                write!(f, "{label} placed at {} via {via}", fmt_vec(*position))
            }
            ReplayEvent::Triangulated { label, position } => {
                write!(f, "{label} triangulated at {}", fmt_vec(*position))
            }
            ReplayEvent::NotFound { label } => write!(f, "{label} not found on this frame"),
            ReplayEvent::DetectionSent { job, id } => write!(f, "detection {job} sent ({id})"),
            ReplayEvent::DetectionCancelled { job, was_pending } => {
                if *was_pending {
                    write!(f, "detection {job} cancelled")
                } else {
                    write!(f, "detection {job} was not pending")
                }
            }
            ReplayEvent::Announced(a) => write!(f, "{}", a.phrase()),
            ReplayEvent::NothingPlaced => write!(f, "nothing placed"),
            ReplayEvent::Cleared(Some(label)) => write!(f, "{label} cleared"),
            ReplayEvent::Cleared(None) => write!(f, "nothing to clear"),
            ReplayEvent::Failed { step, error } => write!(f, "step {step} failed: {error}"),
        }
    }
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Parse a scenario from JSON text.
pub fn parse(json: &str) -> Result<Scenario, WayfindError> {
    serde_json::from_str(json).map_err(|e| WayfindError::Scenario(e.to_string()))
}

/// Read and parse a scenario file.
pub fn load(path: &Path) -> Result<Scenario, WayfindError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        WayfindError::Scenario(format!("failed to read {}: {}", path.display(), e))
    })?;
    parse(&raw)
}

/// JSON Schema describing the scenario file format.
pub fn schema_json() -> Result<String, WayfindError> {
    let schema = schemars::schema_for!(Scenario);
    serde_json::to_string_pretty(&schema).map_err(|e| WayfindError::Scenario(e.to_string()))
}

/// Mutable session state threaded through a replay.
struct Session {
    locator: ObjectLocator,
    ledger: ObservationLedger,
    jobs: HashMap<String, Uuid>,
    frame: FrameContext,
    features: Vec<Vec3>,
}

impl Session {
    fn camera(&self) -> Result<Vec3, WayfindError> {
        Ok(self.frame.current_pose()?.translation)
    }

    fn place(&mut self, label: &str, located: Option<Located>, camera: Vec3) -> ReplayEvent {
        match located {
            Some(located) => {
                let placed = self.locator.place(label, &located, camera);
                ReplayEvent::Placed {
                    label: placed.label.clone(),
                    position: placed.position,
                    source: located.source,
                }
            }
            None => ReplayEvent::NotFound {
                label: label.to_string(),
            },
        }
    }

    fn apply(&mut self, step: Step) -> Result<ReplayEvent, WayfindError> {
        match step {
            Step::PlaneAdded {
                id,
                pose,
                center,
                extent_x,
                extent_z,
            } => {
                let id = PlaneId::new(id);
                let plane = Plane::new(id.clone(), pose, center, extent_x, extent_z);
                let snapped = self.locator.on_plane_added(plane);
                Ok(ReplayEvent::PlaneAdded { id, snapped })
            }
            Step::PlaneRemoved { id } => {
                let id = PlaneId::new(id);
                self.locator.on_plane_removed(&id);
                Ok(ReplayEvent::PlaneRemoved(id))
            }
            Step::Frame { pose, features } => {
                self.frame.current = Some(pose);
                self.features = features;
                Ok(ReplayEvent::FrameUpdated {
                    features: self.features.len(),
                })
            }
            Step::TrackingLost => {
                self.frame.current = None;
                Ok(ReplayEvent::TrackingLost)
            }
            Step::Tap { x, y, label } => {
                let located =
                    self.locator
                        .locate_tap(Pixel::new(x, y), &self.frame, &self.features)?;
                let camera = self.camera()?;
                Ok(self.place(&label, located, camera))
            }
            Step::SendDetection { job, label } => {
                let pose = self.frame.current_pose()?;
                let id = self.ledger.record(label, pose);
                if let Some(previous) = self.jobs.insert(job.clone(), id) {
                    self.ledger.discard(previous);
                }
                Ok(ReplayEvent::DetectionSent { job, id })
            }
            Step::DetectionResult { job, bbox } => {
                let id = self.job_id(&job)?;
                let outcome = self.locator.locate_detection(
                    &mut self.ledger,
                    id,
                    &bbox,
                    &self.frame,
                    &self.features,
                )?;
                self.jobs.remove(&job);
                let camera = outcome.observation.pose.translation;
                Ok(self.place(&outcome.observation.label, outcome.located, camera))
            }
            Step::CancelDetection { job } => {
                let was_pending = self
                    .jobs
                    .remove(&job)
                    .is_some_and(|id| self.ledger.discard(id));
                Ok(ReplayEvent::DetectionCancelled { job, was_pending })
            }
            Step::Stereo {
                label,
                first,
                second,
            } => {
                let position = self.locator.triangulate(
                    (Pixel::new(first.x, first.y), first.pose),
                    (Pixel::new(second.x, second.y), second.pose),
                    &self.frame,
                )?;
                let placed = self
                    .locator
                    .place_at(&label, position, None, second.pose.translation);
                Ok(ReplayEvent::Triangulated {
                    label: placed.label.clone(),
                    position: placed.position,
                })
            }
            Step::Announce => {
                let camera = self.frame.current_pose()?;
                Ok(self
                    .locator
                    .announce(&camera)
                    .map_or(ReplayEvent::NothingPlaced, ReplayEvent::Announced))
            }
            Step::Clear => Ok(ReplayEvent::Cleared(
                self.locator.clear().map(|obj| obj.label),
            )),
        }
    }

    fn job_id(&self, job: &str) -> Result<Uuid, WayfindError> {
        self.jobs
            .get(job)
            .copied()
            .ok_or_else(|| WayfindError::Scenario(format!("detection job '{job}' was never sent")))
    }
}

/// Replay `scenario` against a fresh locator tuned by `config`.
///
/// Recoverable localization errors (no pose, parallel rays, unknown request)
/// are reported as [`ReplayEvent::Failed`] and the replay carries on; only an
/// invalid viewport aborts it.
pub fn replay(scenario: Scenario, config: &Config) -> Result<Vec<ReplayEvent>, WayfindError> {
    let viewport = Viewport::new(scenario.viewport.width, scenario.viewport.height)?;
    let planes = Arc::new(PlaneRegistry::new());
    let mut session = Session {
        locator: ObjectLocator::new(planes, config.locator_config()),
        ledger: ObservationLedger::new(),
        jobs: HashMap::new(),
        frame: FrameContext::new(None, config.intrinsics(&viewport), viewport),
        features: Vec::new(),
    };

    info!(steps = scenario.steps.len(), "replaying scenario");
    let events = scenario
        .steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| {
            let step_no = i + 1;
            session.apply(step).unwrap_or_else(|error| {
                debug!(step = step_no, %error, "step failed");
                ReplayEvent::Failed {
                    step: step_no,
                    error,
                }
            })
        })
        .collect();
    Ok(events)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
