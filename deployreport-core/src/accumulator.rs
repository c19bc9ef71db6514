//! Concurrent accumulation of deployment records.
//!
//! A record is admitted (pushed under a short lock) before its content is
//! computed, so introspection of different artifacts runs in parallel while
//! positions in the report stay fixed from the moment of admission. Every
//! admitted record is tracked as in flight until its content is settled;
//! [`ReportAccumulator::finish`] joins on that count before reading.

use crate::error::{ReportError, describe};
use camino::Utf8Path;
use deployreport_introspect::Introspector;
use deployreport_types::{ContentSummary, DeploymentRecord, DeploymentReport};
use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError};
use tracing::debug;

#[derive(Debug)]
enum Settled {
    Ready(Option<ContentSummary>),
    Failed(String),
}

#[derive(Debug)]
struct RecordSlot {
    artifact: String,
    content: OnceLock<Settled>,
}

impl RecordSlot {
    fn settle(&self, value: Settled) {
        // First writer wins; later settles are no-ops.
        let _ = self.content.set(value);
    }
}

#[derive(Debug, Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        InFlightGuard(Arc::clone(self))
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self
                .idle
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn current(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut count = self.0.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count -= 1;
        if *count == 0 {
            self.0.idle.notify_all();
        }
    }
}

/// A record that holds its place in the report but has no content yet.
///
/// Call [`populate`](Self::populate) exactly once. Dropping it unpopulated
/// marks the record failed, which fails the eventual flush.
pub struct PendingRecord {
    slot: Arc<RecordSlot>,
    introspector: Arc<dyn Introspector>,
    _in_flight: InFlightGuard,
}

impl std::fmt::Debug for PendingRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRecord")
            .field("artifact", &self.slot.artifact)
            .finish_non_exhaustive()
    }
}

impl PendingRecord {
    pub fn artifact(&self) -> &str {
        &self.slot.artifact
    }

    /// Introspect `file` and store the summary in the admitted record.
    pub fn populate(self, file: &Utf8Path) -> Result<(), ReportError> {
        match self.introspector.summarize(file) {
            Ok(content) => {
                debug!(
                    artifact = %self.slot.artifact,
                    path = %file,
                    captured = content.is_some(),
                    "recorded deployment"
                );
                self.slot.settle(Settled::Ready(content));
                Ok(())
            }
            Err(source) => {
                self.slot.settle(Settled::Failed(describe(&source)));
                Err(ReportError::Introspection {
                    artifact: self.slot.artifact.clone(),
                    source,
                })
            }
        }
    }
}

impl Drop for PendingRecord {
    fn drop(&mut self) {
        self.slot
            .settle(Settled::Failed("abandoned before introspection".to_string()));
    }
}

/// Ordered, thread-safe record collection for one session.
pub struct ReportAccumulator {
    introspector: Arc<dyn Introspector>,
    records: Mutex<Vec<Arc<RecordSlot>>>,
    in_flight: Arc<InFlight>,
}

impl std::fmt::Debug for ReportAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAccumulator")
            .field("records", &self.len())
            .field("in_flight", &self.in_flight.current())
            .finish_non_exhaustive()
    }
}

impl ReportAccumulator {
    pub fn new(introspector: Arc<dyn Introspector>) -> Self {
        Self {
            introspector,
            records: Mutex::new(Vec::new()),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Reserve the next position in the report for `artifact`.
    pub fn admit(&self, artifact: impl Into<String>) -> PendingRecord {
        let slot = Arc::new(RecordSlot {
            artifact: artifact.into(),
            content: OnceLock::new(),
        });
        let guard = self.in_flight.enter();
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&slot));

        PendingRecord {
            slot,
            introspector: Arc::clone(&self.introspector),
            _in_flight: guard,
        }
    }

    /// Admit and populate in one call.
    pub fn record(&self, artifact: impl Into<String>, file: &Utf8Path) -> Result<(), ReportError> {
        self.admit(artifact).populate(file)
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of admitted records whose content is not settled yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.current()
    }

    /// Block until every admitted record has settled.
    pub fn wait_idle(&self) {
        self.in_flight.wait_idle();
    }

    /// Join on in-flight records, then snapshot the report in admission order.
    pub fn finish(&self) -> Result<DeploymentReport, ReportError> {
        self.wait_idle();

        let slots = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut deployments = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot.content.get() {
                Some(Settled::Ready(content)) => deployments.push(DeploymentRecord::new(
                    slot.artifact.clone(),
                    content.clone(),
                )),
                Some(Settled::Failed(reason)) => {
                    return Err(ReportError::IncompleteRecord {
                        artifact: slot.artifact.clone(),
                        reason: reason.clone(),
                    });
                }
                None => {
                    return Err(ReportError::IncompleteRecord {
                        artifact: slot.artifact.clone(),
                        reason: "content still pending".to_string(),
                    });
                }
            }
        }

        Ok(DeploymentReport { deployments })
    }
}
