use serde::{Deserialize, Serialize};

/// Suffixes introspected as zip archives.
pub const ARCHIVE_SUFFIXES: &[&str] = &[".jar", ".war", ".ear", ".zip"];

/// Suffixes captured verbatim as text.
pub const DESCRIPTOR_SUFFIXES: &[&str] = &[".pom", ".module"];

/// How an artifact file is summarized, decided by its file name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Archive,
    Descriptor,
    Unsupported,
}

impl ArtifactKind {
    /// Case-sensitive, exact suffix match.
    pub fn from_file_name(name: &str) -> Self {
        if ARCHIVE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            ArtifactKind::Archive
        } else if DESCRIPTOR_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            ArtifactKind::Descriptor
        } else {
            ArtifactKind::Unsupported
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Archive => "archive",
            ArtifactKind::Descriptor => "descriptor",
            ArtifactKind::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
