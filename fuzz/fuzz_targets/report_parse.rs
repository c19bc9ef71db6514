#![no_main]

//! Fuzz target for report and host event JSON parsing.
//!
//! Arbitrary bytes must never panic the deserializers, and any report that
//! parses must render again.

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(report) = serde_json::from_str::<deployreport_types::DeploymentReport>(s) {
        let rendered = report.to_pretty_json().expect("parsed report renders");
        let again: deployreport_types::DeploymentReport =
            serde_json::from_str(&rendered).expect("rendered report parses");
        assert_eq!(report, again);
    }

    let _ = serde_json::from_str::<deployreport_types::DeploymentRecord>(s);
    let _ = serde_json::from_str::<deployreport_core::HostEvent>(s);
});
