#![no_main]

//! Fuzz target for archive listing on arbitrary bytes.
//!
//! A corrupt archive is an error, never a panic.

use camino::Utf8PathBuf;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let Ok(root) = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()) else {
        return;
    };
    let path = root.join("fuzz.jar");
    if std::fs::write(&path, data).is_err() {
        return;
    }

    let _ = deployreport_introspect::summarize(&path);
});
