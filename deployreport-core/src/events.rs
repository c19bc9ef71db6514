//! Host events understood by the lifecycle.

use crate::serializer::FlushOutcome;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// The closed set of events a build host forwards.
///
/// Serialized with a `type` tag so recorded event streams can be replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    SessionStarted,
    SessionEnded,
    /// Installed into the local repository.
    ArtifactInstalled { artifact: String, file: Utf8PathBuf },
    /// Uploaded to a remote repository.
    ArtifactDeployed { artifact: String, file: Utf8PathBuf },
}

impl HostEvent {
    /// Artifact id and file for publish events.
    pub fn artifact(&self) -> Option<(&str, &Utf8PathBuf)> {
        match self {
            HostEvent::ArtifactInstalled { artifact, file }
            | HostEvent::ArtifactDeployed { artifact, file } => Some((artifact, file)),
            HostEvent::SessionStarted | HostEvent::SessionEnded => None,
        }
    }
}

/// Result of routing one [`HostEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Started,
    Recorded,
    Finished(FlushOutcome),
}
