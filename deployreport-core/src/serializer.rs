//! Report rendering and output.

use crate::error::ReportError;
use crate::ports::{LogPort, WritePort};
use camino::Utf8PathBuf;
use deployreport_types::DeploymentReport;
use std::sync::Arc;
use tracing::debug;

/// Where a finished report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSink {
    /// One info message: `label`, a newline, then the document.
    Log { label: String },
    /// Create or overwrite this file with the document.
    File(Utf8PathBuf),
}

/// What a flush did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was deployed; no output at all.
    Skipped,
    Logged { records: usize },
    Written { path: Utf8PathBuf, records: usize },
}

/// Renders a report to its sink. Consumed by [`flush`](Self::flush), so a
/// session can flush at most once.
pub struct ReportSerializer {
    sink: ReportSink,
    writer: Arc<dyn WritePort>,
    log: Arc<dyn LogPort>,
}

impl std::fmt::Debug for ReportSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportSerializer")
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl ReportSerializer {
    pub fn new(sink: ReportSink, writer: Arc<dyn WritePort>, log: Arc<dyn LogPort>) -> Self {
        Self { sink, writer, log }
    }

    pub fn sink(&self) -> &ReportSink {
        &self.sink
    }

    pub fn flush(self, report: &DeploymentReport) -> Result<FlushOutcome, ReportError> {
        if report.is_empty() {
            debug!("no deployments recorded, skipping report");
            return Ok(FlushOutcome::Skipped);
        }

        let json = report.to_pretty_json().map_err(ReportError::Render)?;
        let records = report.len();

        match self.sink {
            ReportSink::Log { label } => {
                self.log.info(&format!("{}\n{}", label, json));
                Ok(FlushOutcome::Logged { records })
            }
            ReportSink::File(path) => {
                self.writer
                    .write_file(&path, json.as_bytes())
                    .map_err(ReportError::Output)?;
                debug!(path = %path, records, "report written");
                Ok(FlushOutcome::Written { path, records })
            }
        }
    }
}
