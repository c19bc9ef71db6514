//! Error types for the report lifecycle.
//!
//! Every variant is fatal to the build step that triggered it. Nothing here is
//! retried and there is no partial-report mode.

use deployreport_introspect::IntrospectError;
use thiserror::Error;

/// Host called the lifecycle out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("no session started")]
    NotStarted,

    #[error("session already flushed")]
    AlreadyFlushed,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("introspect {artifact}")]
    Introspection {
        artifact: String,
        #[source]
        source: IntrospectError,
    },

    /// A record never received its content; the report would be incomplete.
    #[error("incomplete record {artifact}: {reason}")]
    IncompleteRecord { artifact: String, reason: String },

    #[error("render report")]
    Render(#[source] serde_json::Error),

    #[error("write report: {0:#}")]
    Output(#[source] anyhow::Error),
}

impl ReportError {
    pub fn is_protocol(&self) -> bool {
        matches!(self, ReportError::Protocol(_))
    }
}

/// Flatten an error and its sources into one line.
pub(crate) fn describe(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
