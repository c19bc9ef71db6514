//! Embeddable core library for deployreport.
//!
//! A build host drives a [`ReportLifecycle`](lifecycle::ReportLifecycle) with
//! three calls: session start, one call per published artifact, and session
//! end. Artifact calls may come from any number of threads; session end waits
//! for every admitted artifact to finish introspection before the report is
//! rendered.
//!
//! # Port traits
//!
//! Output is abstracted behind port traits in [`ports`]:
//! - [`WritePort`](ports::WritePort): write the report file
//! - [`LogPort`](ports::LogPort): emit the report as a log message
//!
//! The [`adapters`] module provides the default filesystem and `tracing`
//! implementations.

pub mod accumulator;
pub mod adapters;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod ports;
pub mod serializer;
pub mod settings;

pub use accumulator::{PendingRecord, ReportAccumulator};
pub use error::{ProtocolError, ReportError};
pub use events::{DispatchOutcome, HostEvent};
pub use lifecycle::{LifecycleState, ReportLifecycle};
pub use serializer::{FlushOutcome, ReportSerializer, ReportSink};
pub use settings::ReporterSettings;

// Re-export so hosts don't need the introspection crate directly.
pub use deployreport_introspect::{FsIntrospector, IntrospectError, Introspector};
pub use deployreport_types::{ContentSummary, DeploymentRecord, DeploymentReport};
