//! Port traits abstracting report output away from the lifecycle.

use camino::Utf8Path;

/// File-system write operations.
pub trait WritePort: Send + Sync {
    /// Create or truncate `path` and write `contents` in full.
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
}

/// Informational log sink.
pub trait LogPort: Send + Sync {
    fn info(&self, message: &str);
}
