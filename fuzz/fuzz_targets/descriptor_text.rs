#![no_main]

//! Fuzz target for descriptor capture.
//!
//! Without carriage returns, the captured text is the file minus at most one
//! trailing newline.

use camino::Utf8PathBuf;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let Ok(root) = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()) else {
        return;
    };
    let path = root.join("fuzz.pom");
    if std::fs::write(&path, data).is_err() {
        return;
    }

    match deployreport_introspect::read_descriptor(&path) {
        Ok(summary) => {
            let text = std::str::from_utf8(data).expect("captured text is utf-8");
            let content = &summary[deployreport_types::report::DESCRIPTOR_CONTENT_KEY];
            assert_eq!(summary.len(), 1);
            assert!(content.len() <= text.len());
            if !text.contains('\r') {
                assert_eq!(content, text.strip_suffix('\n').unwrap_or(text));
            }
        }
        Err(_) => assert!(std::str::from_utf8(data).is_err()),
    }
});
