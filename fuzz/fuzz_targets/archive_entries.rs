#![no_main]

//! Fuzz target for archive listing on well-formed archives.
//!
//! Every entry the writer accepted must show up in the summary with its
//! uncompressed size.

use arbitrary::Arbitrary;
use camino::Utf8PathBuf;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;
use std::io::Write;
use zip::write::SimpleFileOptions;

#[derive(Debug, Arbitrary)]
struct ArchiveInput {
    entries: Vec<(String, Vec<u8>)>,
    stored: bool,
}

fuzz_target!(|input: ArchiveInput| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let Ok(root) = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()) else {
        return;
    };
    let path = root.join("fuzz.war");
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };

    let method = if input.stored {
        zip::CompressionMethod::Stored
    } else {
        zip::CompressionMethod::Deflated
    };
    let options = SimpleFileOptions::default().compression_method(method);

    let mut expected = BTreeMap::new();
    let mut zip = zip::ZipWriter::new(file);
    for (name, data) in &input.entries {
        if expected.contains_key(name) || zip.start_file(name.as_str(), options).is_err() {
            return;
        }
        if zip.write_all(data).is_err() {
            return;
        }
        expected.insert(name.clone(), data.len().to_string());
    }
    if zip.finish().is_err() {
        return;
    }

    let summary = deployreport_introspect::list_archive(&path).expect("written archive lists");
    assert_eq!(summary, expected);
});
