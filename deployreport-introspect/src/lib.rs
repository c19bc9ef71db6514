//! Content introspection for published artifacts.
//!
//! Every artifact is summarized into a flat string map that diffs well across
//! build runs. The kind of summary is chosen from the file name suffix only;
//! the file contents are never sniffed. Read failures are errors, never an
//! empty summary: a malformed artifact is a build problem, not a reporting one.

mod error;
mod summarize;

pub use error::IntrospectError;
pub use summarize::{FsIntrospector, Introspector, list_archive, read_descriptor, summarize};
