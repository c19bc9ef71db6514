use crate::error::IntrospectError;
use camino::Utf8Path;
use deployreport_types::report::descriptor_summary;
use deployreport_types::{ArtifactKind, ContentSummary};
use fs_err as fs;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use tracing::debug;

/// Produces content summaries for artifact files.
pub trait Introspector: Send + Sync {
    fn summarize(&self, file: &Utf8Path) -> Result<Option<ContentSummary>, IntrospectError>;
}

/// Reads artifacts straight from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsIntrospector;

impl Introspector for FsIntrospector {
    fn summarize(&self, file: &Utf8Path) -> Result<Option<ContentSummary>, IntrospectError> {
        summarize(file)
    }
}

/// Summarize `file` according to its name.
///
/// Returns `Ok(None)` for kinds that are not captured yet.
pub fn summarize(file: &Utf8Path) -> Result<Option<ContentSummary>, IntrospectError> {
    let kind = ArtifactKind::from_file_name(file.file_name().unwrap_or_default());
    debug!(path = %file, kind = %kind, "summarizing artifact");

    match kind {
        ArtifactKind::Archive => list_archive(file).map(Some),
        ArtifactKind::Descriptor => read_descriptor(file).map(Some),
        ArtifactKind::Unsupported => Ok(None),
    }
}

/// List every archive member (directories included) with its uncompressed size.
pub fn list_archive(file: &Utf8Path) -> Result<ContentSummary, IntrospectError> {
    let handle = fs::File::open(file).map_err(|source| IntrospectError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let archive_err = |source| IntrospectError::Archive {
        path: file.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(handle);
    let declared = declared_entries(&mut reader).map_err(|source| IntrospectError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(reader).map_err(archive_err)?;

    // The reader keys entries by name, so duplicates only show up as a
    // shortfall against the end-of-central-directory count.
    if let Some(declared) = declared
        && declared > archive.len()
    {
        return Err(IntrospectError::DuplicateEntries {
            path: file.to_path_buf(),
            declared,
            distinct: archive.len(),
        });
    }

    let mut out = ContentSummary::new();
    for index in 0..archive.len() {
        // Raw access reads the central directory only; nothing is inflated.
        let entry = archive.by_index_raw(index).map_err(archive_err)?;
        out.insert(entry.name().to_string(), entry.size().to_string());
    }

    debug!(path = %file, entries = out.len(), "listed archive");
    Ok(out)
}

const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
const EOCD_LEN: usize = 22;

/// Total entry count from the end-of-central-directory record.
///
/// `None` when no record is found or the count is deferred to zip64.
fn declared_entries<R: Read + Seek>(reader: &mut R) -> io::Result<Option<usize>> {
    let len = reader.seek(SeekFrom::End(0))?;
    if len < EOCD_LEN as u64 {
        return Ok(None);
    }
    let start = len.saturating_sub(EOCD_LEN as u64 + u64::from(u16::MAX));
    reader.seek(SeekFrom::Start(start))?;
    let mut tail = Vec::new();
    reader.read_to_end(&mut tail)?;
    if tail.len() < EOCD_LEN {
        return Ok(None);
    }

    // The record is followed only by its comment.
    let found = (0..=tail.len() - EOCD_LEN).rev().find(|&pos| {
        let comment = usize::from(u16::from_le_bytes([tail[pos + 20], tail[pos + 21]]));
        tail[pos..pos + 4] == EOCD_SIGNATURE && pos + EOCD_LEN + comment == tail.len()
    });

    Ok(found.and_then(|pos| {
        let total = u16::from_le_bytes([tail[pos + 10], tail[pos + 11]]);
        (total != u16::MAX).then_some(usize::from(total))
    }))
}

/// Capture a text descriptor, line terminators normalized to `\n`.
pub fn read_descriptor(file: &Utf8Path) -> Result<ContentSummary, IntrospectError> {
    let text = fs::read_to_string(file).map_err(|source| IntrospectError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    Ok(descriptor_summary(join_lines(&text)))
}

/// Split on `\r\n`, `\r` or `\n` and join with `\n`. A final terminator
/// does not start another line.
fn join_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push('\n');
            }
            c => out.push(c),
        }
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}
