use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntrospectError {
    #[error("read artifact {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("open archive {path}")]
    Archive {
        path: Utf8PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The central directory lists more entries than there are distinct names.
    #[error("archive {path} lists {declared} entries but only {distinct} distinct names")]
    DuplicateEntries {
        path: Utf8PathBuf,
        declared: usize,
        distinct: usize,
    },
}

impl IntrospectError {
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            IntrospectError::Io { path, .. }
            | IntrospectError::Archive { path, .. }
            | IntrospectError::DuplicateEntries { path, .. } => path,
        }
    }
}
