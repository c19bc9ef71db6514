//! Default port implementations.

use crate::ports::{LogPort, WritePort};
use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use std::io::{BufWriter, Write};
use tracing::{debug, info};

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }

        // The handle is closed when `out` drops, including on the error paths.
        let file = fs::File::create(path).with_context(|| format!("create {}", path))?;
        let mut out = BufWriter::new(file);
        out.write_all(contents)
            .with_context(|| format!("write {}", path))?;
        out.flush().with_context(|| format!("flush {}", path))?;

        debug!(path = %path, bytes = contents.len(), "wrote report file");
        Ok(())
    }
}

/// Emits log messages through `tracing` at info level.
#[derive(Debug, Clone, Default)]
pub struct TracingLogPort;

impl LogPort for TracingLogPort {
    fn info(&self, message: &str) {
        info!("{}", message);
    }
}
