//! Shared DTOs (schemas-as-code) for the deployreport workspace.
//!
//! # Design constraints
//! - The report document is consumed by line-based diff tooling across build runs.
//! - Field order and key order are part of the format.
//! - `content` is always present on a record, `null` when nothing was captured.

pub mod kind;
pub mod report;

pub use kind::ArtifactKind;
pub use report::{ContentSummary, DeploymentRecord, DeploymentReport};

/// Schema identifiers.
pub mod schema {
    pub const DEPLOYREPORT_REPORT_V1: &str = "deployreport.report.v1";

    /// JSON schema describing the rendered report document.
    pub const DEPLOYREPORT_REPORT_V1_SCHEMA: &str =
        include_str!("../schemas/deployreport.report.v1.json");
}
