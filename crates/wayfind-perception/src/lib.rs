//! `wayfind-perception` – the spatial localization engine.
//!
//! Turns a 2-D pixel observed against a (possibly stale) camera pose into a
//! world-space position, using the detected planes and feature points the
//! tracking system reports.
//!
//! # Modules
//!
//! - [`ray`] – [`build_ray`][ray::build_ray]: pixel + pose → world ray, with
//!   support for poses captured in the past.
//! - [`plane_registry`] – [`PlaneRegistry`][plane_registry::PlaneRegistry]:
//!   the live set of detected surfaces with snapshot-on-read semantics.
//! - [`localizer`] – [`localize`][localizer::localize]: closest in-bounds
//!   ray/plane intersection.
//! - [`stereo`] – [`localize_stereo`][stereo::localize_stereo]: closest
//!   approach midpoint of two rays.
//! - [`feature_points`] – [`hit_test`][feature_points::hit_test]: ray against
//!   the sparse feature point cloud.
//! - [`placement`] – [`resolve_placement`][placement::resolve_placement] and
//!   [`snap_to_plane`][placement::snap_to_plane].
//!
//! Every function here is synchronous and side-effect free apart from the
//! registry's own mutators.

pub mod feature_points;
pub mod localizer;
pub mod placement;
pub mod plane_registry;
pub mod ray;
pub mod stereo;

pub use feature_points::{FeatureQuery, hit_test, hit_test_from_origin};
pub use localizer::{PlaneHit, intersect_plane, localize};
pub use placement::{SnapOptions, SnapOutcome, resolve_placement, snap_to_plane};
pub use plane_registry::{PlaneRegistry, PlaneSnapshot};
pub use ray::{build_live_ray, build_ray};
pub use stereo::localize_stereo;
