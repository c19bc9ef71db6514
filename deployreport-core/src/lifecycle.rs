//! Session lifecycle: `Idle -> Active -> Flushed`.

use crate::accumulator::{PendingRecord, ReportAccumulator};
use crate::adapters::{FsWritePort, TracingLogPort};
use crate::error::{ProtocolError, ReportError};
use crate::events::{DispatchOutcome, HostEvent};
use crate::ports::{LogPort, WritePort};
use crate::serializer::{FlushOutcome, ReportSerializer};
use crate::settings::ReporterSettings;
use camino::Utf8Path;
use deployreport_introspect::{FsIntrospector, Introspector};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Active,
    Flushed,
}

#[derive(Debug)]
struct Session {
    accumulator: ReportAccumulator,
    serializer: ReportSerializer,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Active(Session),
    Flushed,
}

/// Drives one build session's report. Not reusable once flushed.
///
/// All methods take `&self`; share the lifecycle across worker threads by
/// reference or `Arc`.
pub struct ReportLifecycle {
    settings: ReporterSettings,
    introspector: Arc<dyn Introspector>,
    writer: Arc<dyn WritePort>,
    log: Arc<dyn LogPort>,
    phase: Mutex<Phase>,
}

impl std::fmt::Debug for ReportLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportLifecycle")
            .field("settings", &self.settings)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ReportLifecycle {
    /// Lifecycle with the filesystem introspector, file writer and `tracing` log.
    pub fn new(settings: ReporterSettings) -> Self {
        Self::with_ports(
            settings,
            Arc::new(FsIntrospector),
            Arc::new(FsWritePort),
            Arc::new(TracingLogPort),
        )
    }

    pub fn with_ports(
        settings: ReporterSettings,
        introspector: Arc<dyn Introspector>,
        writer: Arc<dyn WritePort>,
        log: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            settings,
            introspector,
            writer,
            log,
            phase: Mutex::new(Phase::Idle),
        }
    }

    pub fn settings(&self) -> &ReporterSettings {
        &self.settings
    }

    pub fn state(&self) -> LifecycleState {
        match &*self.lock_phase() {
            Phase::Idle => LifecycleState::Idle,
            Phase::Active(_) => LifecycleState::Active,
            Phase::Flushed => LifecycleState::Flushed,
        }
    }

    /// Session started: open a fresh accumulator and serializer.
    pub fn start(&self) -> Result<(), ReportError> {
        let mut phase = self.lock_phase();
        match &*phase {
            Phase::Idle => {}
            Phase::Active(_) => return Err(ProtocolError::AlreadyStarted.into()),
            Phase::Flushed => return Err(ProtocolError::AlreadyFlushed.into()),
        }

        let sink = self.settings.sink();
        debug!(sink = ?sink, "deployment session started");
        *phase = Phase::Active(Session {
            accumulator: ReportAccumulator::new(Arc::clone(&self.introspector)),
            serializer: ReportSerializer::new(
                sink,
                Arc::clone(&self.writer),
                Arc::clone(&self.log),
            ),
        });
        Ok(())
    }

    /// Reserve a report position for `artifact` without introspecting yet.
    ///
    /// The returned record counts as in flight until populated or dropped;
    /// [`end`](Self::end) waits for it.
    pub fn admit(&self, artifact: impl Into<String>) -> Result<PendingRecord, ReportError> {
        match &*self.lock_phase() {
            Phase::Active(session) => Ok(session.accumulator.admit(artifact)),
            Phase::Idle => Err(ProtocolError::NotStarted.into()),
            Phase::Flushed => Err(ProtocolError::AlreadyFlushed.into()),
        }
    }

    /// Artifact published: admit it, then introspect `file` outside any lock.
    pub fn record(&self, artifact: impl Into<String>, file: &Utf8Path) -> Result<(), ReportError> {
        self.admit(artifact)?.populate(file)
    }

    /// Session ended: wait for in-flight records, then flush once.
    ///
    /// The session's resources are released on every path out of here, and
    /// the lifecycle is `Flushed` afterwards even if the flush failed.
    pub fn end(&self) -> Result<FlushOutcome, ReportError> {
        let session = {
            let mut phase = self.lock_phase();
            match std::mem::replace(&mut *phase, Phase::Flushed) {
                Phase::Active(session) => session,
                Phase::Idle => {
                    *phase = Phase::Idle;
                    return Err(ProtocolError::NotStarted.into());
                }
                Phase::Flushed => return Err(ProtocolError::AlreadyFlushed.into()),
            }
        };

        let Session {
            accumulator,
            serializer,
        } = session;
        let report = accumulator.finish()?;
        let outcome = serializer.flush(&report)?;

        match &outcome {
            FlushOutcome::Skipped => debug!("deployment session ended without deployments"),
            FlushOutcome::Logged { records } => {
                debug!(records, "deployment report logged")
            }
            FlushOutcome::Written { path, records } => {
                info!(path = %path, records, "deployment report written")
            }
        }
        Ok(outcome)
    }

    /// Route a host event to the matching operation.
    pub fn dispatch(&self, event: HostEvent) -> Result<DispatchOutcome, ReportError> {
        match event {
            HostEvent::SessionStarted => self.start().map(|()| DispatchOutcome::Started),
            HostEvent::SessionEnded => self.end().map(DispatchOutcome::Finished),
            HostEvent::ArtifactInstalled { artifact, file }
            | HostEvent::ArtifactDeployed { artifact, file } => self
                .record(artifact, &file)
                .map(|()| DispatchOutcome::Recorded),
        }
    }

    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
