//! `wayfind-runtime` – the caller side of the localization engine.
//!
//! Where `wayfind-perception` offers pure geometric building blocks, this
//! crate strings them together the way an object-finding session uses them.
//!
//! # Modules
//!
//! - [`observations`] – [`ObservationLedger`][observations::ObservationLedger]:
//!   the camera pose captured for each detection request still in flight,
//!   keyed by request id and owned by the caller.
//! - [`locator`] – [`ObjectLocator`][locator::ObjectLocator]: the explicit
//!   plane → feature-point pipeline, stereo triangulation, placed-object
//!   lifecycle, plane snapping and spoken-style announcements.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter.
//!   Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export.

pub mod locator;
pub mod observations;
pub mod telemetry;

pub use locator::{
    Announcement, DetectionOutcome, LocateSource, Located, LocatorConfig, ObjectLocator,
    SnapMotion,
};
pub use observations::ObservationLedger;
pub use telemetry::{TracerProviderGuard, init_tracing};

// Re-export the registry so callers can share one between the tracking
// thread and the locator without depending on wayfind-perception directly.
pub use wayfind_perception::PlaneRegistry;
