use anyhow::Context;
use clap::{Parser, Subcommand};
use deployreport_types::schema::{DEPLOYREPORT_REPORT_V1, DEPLOYREPORT_REPORT_V1_SCHEMA};
use fs_err as fs;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by deployreport.
    PrintSchemas,
    /// Write the report JSON schema to a file (default: stdout).
    ExportSchema {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate rendered reports against the report schema.
    Validate {
        #[arg(required = true)]
        reports: Vec<PathBuf>,
    },
    /// Run the cucumber acceptance suite.
    Bdd,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", DEPLOYREPORT_REPORT_V1);
        }
        Command::ExportSchema { out } => match out {
            Some(path) => {
                fs::write(&path, DEPLOYREPORT_REPORT_V1_SCHEMA)?;
                println!("wrote {}", path.display());
            }
            None => print!("{}", DEPLOYREPORT_REPORT_V1_SCHEMA),
        },
        Command::Validate { reports } => {
            let mut failed = 0usize;
            for path in &reports {
                let problems = validate_report(path)?;
                if problems.is_empty() {
                    println!("ok      {}", path.display());
                } else {
                    failed += 1;
                    println!("invalid {}", path.display());
                    for problem in problems {
                        println!("  - {problem}");
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} of {} reports failed validation", reports.len());
            }
        }
        Command::Bdd => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "deployreport-bdd", "--test", "cucumber"])
                .status()
                .context("run cucumber suite")?;
            if !status.success() {
                anyhow::bail!("bdd failed");
            }
        }
    }
    Ok(())
}

/// Schema violations of the report at `path`, formatted as `pointer: message`.
fn validate_report(path: &Path) -> anyhow::Result<Vec<String>> {
    let schema: serde_json::Value =
        serde_json::from_str(DEPLOYREPORT_REPORT_V1_SCHEMA).context("parse report schema")?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("compile report schema: {e}"))?;

    let text = fs::read_to_string(path)?;
    let instance: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;

    Ok(validator
        .iter_errors(&instance)
        .map(|err| format!("{}: {}", err.instance_path(), err))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::validate_report;

    #[test]
    fn valid_report_has_no_problems() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("report.json");
        fs_err::write(
            &path,
            r#"{"deployments":[{"artifact":"g:a:jar:1","content":{"a.txt":"3"}}]}"#,
        )
        .expect("write");

        assert!(validate_report(&path).expect("validate").is_empty());
    }

    #[test]
    fn numeric_sizes_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("report.json");
        fs_err::write(
            &path,
            r#"{"deployments":[{"artifact":"g:a:jar:1","content":{"a.txt":3}}]}"#,
        )
        .expect("write");

        let problems = validate_report(&path).expect("validate");
        assert!(!problems.is_empty());
    }

    #[test]
    fn unreadable_report_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(validate_report(&temp.path().join("missing.json")).is_err());
    }
}
