//! BDD harness (cucumber-rs).
//!
//! This crate keeps scenario tests isolated from the production crates. The
//! helpers here build artifact fixtures and read back rendered reports.

use anyhow::Context;
use camino::Utf8Path;
use deployreport_types::DeploymentReport;
use deployreport_types::schema::DEPLOYREPORT_REPORT_V1_SCHEMA;
use fs_err as fs;
use std::io::Write;
use zip::write::SimpleFileOptions;

/// Write a zip archive with the given `(name, contents)` entries.
pub fn write_archive(path: &Utf8Path, entries: &[(&str, &str)]) -> anyhow::Result<()> {
    let file = fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    for (name, data) in entries {
        zip.start_file(*name, SimpleFileOptions::default())
            .with_context(|| format!("start entry {} in {}", name, path))?;
        zip.write_all(data.as_bytes())
            .with_context(|| format!("write entry {} in {}", name, path))?;
    }
    zip.finish().with_context(|| format!("finish {}", path))?;
    Ok(())
}

/// Read a rendered report and check it against the published schema.
pub fn read_valid_report(path: &Utf8Path) -> anyhow::Result<DeploymentReport> {
    let text = fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path))?;

    let schema: serde_json::Value =
        serde_json::from_str(DEPLOYREPORT_REPORT_V1_SCHEMA).context("parse report schema")?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("compile report schema: {e}"))?;
    if let Some(err) = validator.iter_errors(&value).next() {
        anyhow::bail!("{} does not match the report schema: {}", path, err);
    }

    serde_json::from_value(value).with_context(|| format!("decode {}", path))
}
