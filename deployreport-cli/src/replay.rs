//! Replay of a recorded host event stream.
//!
//! The stream is JSON lines, one [`HostEvent`] per line. Session events are
//! dispatched in order. Runs of consecutive artifact events are admitted in
//! stream order and then introspected on up to `jobs` scoped threads, which is
//! how a parallel build host would publish them.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use deployreport_core::{FlushOutcome, HostEvent, LifecycleState, ReportLifecycle};
use fs_err as fs;
use std::thread;
use tracing::debug;

/// What a replay did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub artifacts: usize,
    /// Outcome of the session end, if the stream contained one.
    pub flushed: Option<FlushOutcome>,
}

/// Read a JSON-lines event stream. Blank lines are skipped.
pub fn read_events(path: &Utf8Path) -> anyhow::Result<Vec<HostEvent>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read event stream {}", path))?;
    parse_events(&contents).with_context(|| format!("parse event stream {}", path))
}

pub fn parse_events(contents: &str) -> anyhow::Result<Vec<HostEvent>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: invalid event", idx + 1))
        })
        .collect()
}

/// Dispatch `events` through `lifecycle`.
///
/// Relative artifact paths resolve against `root`. Fails on the first error
/// and when the stream leaves the session open.
pub fn replay(
    lifecycle: &ReportLifecycle,
    events: Vec<HostEvent>,
    root: &Utf8Path,
    jobs: usize,
) -> anyhow::Result<ReplaySummary> {
    let mut summary = ReplaySummary {
        events: events.len(),
        artifacts: 0,
        flushed: None,
    };
    let mut batch: Vec<(String, Utf8PathBuf)> = Vec::new();

    for event in events {
        match event {
            HostEvent::ArtifactInstalled { artifact, file }
            | HostEvent::ArtifactDeployed { artifact, file } => {
                batch.push((artifact, resolve(root, file)));
                continue;
            }
            HostEvent::SessionStarted => {
                summary.artifacts += publish_batch(lifecycle, std::mem::take(&mut batch), jobs)?;
                lifecycle.start().context("session start")?;
            }
            HostEvent::SessionEnded => {
                summary.artifacts += publish_batch(lifecycle, std::mem::take(&mut batch), jobs)?;
                let outcome = lifecycle.end().context("session end")?;
                summary.flushed = Some(outcome);
            }
        }
    }
    summary.artifacts += publish_batch(lifecycle, batch, jobs)?;

    if lifecycle.state() == LifecycleState::Active {
        anyhow::bail!("event stream ended with the session still open");
    }
    Ok(summary)
}

fn resolve(root: &Utf8Path, file: Utf8PathBuf) -> Utf8PathBuf {
    if file.is_absolute() {
        file
    } else {
        root.join(file)
    }
}

fn publish_batch(
    lifecycle: &ReportLifecycle,
    batch: Vec<(String, Utf8PathBuf)>,
    jobs: usize,
) -> anyhow::Result<usize> {
    let count = batch.len();
    if count == 0 {
        return Ok(0);
    }

    if jobs <= 1 || count == 1 {
        for (artifact, file) in batch {
            lifecycle
                .record(artifact.as_str(), &file)
                .with_context(|| format!("record {}", artifact))?;
        }
        return Ok(count);
    }

    // Admission fixes report order before any worker runs.
    let mut buckets: Vec<Vec<_>> = (0..jobs.min(count)).map(|_| Vec::new()).collect();
    let width = buckets.len();
    for (idx, (artifact, file)) in batch.into_iter().enumerate() {
        let pending = lifecycle
            .admit(artifact.as_str())
            .with_context(|| format!("record {}", artifact))?;
        buckets[idx % width].push((pending, file));
    }
    debug!(records = count, workers = width, "introspecting batch");

    let results: Vec<anyhow::Result<()>> = thread::scope(|scope| {
        let handles: Vec<_> = buckets
            .into_iter()
            .map(|bucket| {
                scope.spawn(move || -> anyhow::Result<()> {
                    for (pending, file) in bucket {
                        let artifact = pending.artifact().to_string();
                        pending
                            .populate(&file)
                            .with_context(|| format!("record {}", artifact))?;
                    }
                    Ok(())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow::anyhow!("introspection worker panicked")))
            })
            .collect()
    });

    for result in results {
        result?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deployreport_core::ReporterSettings;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        (temp, root)
    }

    fn installed(artifact: &str, file: &str) -> HostEvent {
        HostEvent::ArtifactInstalled {
            artifact: artifact.to_string(),
            file: file.into(),
        }
    }

    #[test]
    fn parse_skips_blank_lines() {
        let events = parse_events(
            "{\"type\":\"session_started\"}\n\n  \n{\"type\":\"session_ended\"}\n",
        )
        .expect("parse");
        assert_eq!(events, vec![HostEvent::SessionStarted, HostEvent::SessionEnded]);
    }

    #[test]
    fn parse_reports_line_number() {
        let err = parse_events("{\"type\":\"session_started\"}\n\nnot json\n")
            .expect_err("invalid line");
        assert!(err.to_string().contains("line 3"), "{err:#}");
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let root = Utf8Path::new("/work");
        assert_eq!(resolve(root, "a.pom".into()), Utf8PathBuf::from("/work/a.pom"));
        assert_eq!(
            resolve(root, "/abs/a.pom".into()),
            Utf8PathBuf::from("/abs/a.pom")
        );
    }

    #[test]
    fn parallel_replay_keeps_stream_order() {
        let (_temp, root) = temp_root();
        let out = root.join("report.json");
        let mut events = vec![HostEvent::SessionStarted];
        for i in 0..12 {
            let name = format!("m{i}.pom");
            std::fs::write(root.join(&name), format!("<m{i}/>")).expect("write pom");
            events.push(installed(&format!("g:m{i}:pom:1.0"), &name));
        }
        events.push(HostEvent::SessionEnded);

        let lifecycle = ReportLifecycle::new(ReporterSettings::with_output(out.clone()));
        let summary = replay(&lifecycle, events, &root, 4).expect("replay");

        assert_eq!(summary.artifacts, 12);
        assert_eq!(
            summary.flushed,
            Some(FlushOutcome::Written {
                path: out.clone(),
                records: 12
            })
        );

        let report: deployreport_core::DeploymentReport =
            serde_json::from_str(&std::fs::read_to_string(&out).expect("read")).expect("json");
        let order: Vec<_> = report
            .deployments
            .iter()
            .map(|r| r.artifact.clone())
            .collect();
        let expected: Vec<_> = (0..12).map(|i| format!("g:m{i}:pom:1.0")).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn open_session_is_an_error() {
        let (_temp, root) = temp_root();
        let lifecycle = ReportLifecycle::new(ReporterSettings::default());
        let err = replay(&lifecycle, vec![HostEvent::SessionStarted], &root, 1)
            .expect_err("session left open");
        assert!(err.to_string().contains("still open"));
    }

    #[test]
    fn artifact_before_start_is_protocol_error() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("a.pom"), "<a/>").expect("write pom");
        let lifecycle = ReportLifecycle::new(ReporterSettings::default());
        let err = replay(&lifecycle, vec![installed("g:a:pom:1", "a.pom")], &root, 1)
            .expect_err("not started");
        assert!(format!("{err:#}").contains("no session started"), "{err:#}");
    }

    #[test]
    fn missing_file_fails_parallel_batch() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("a.pom"), "<a/>").expect("write pom");
        let events = vec![
            HostEvent::SessionStarted,
            installed("g:a:pom:1", "a.pom"),
            installed("g:b:pom:1", "missing.pom"),
            HostEvent::SessionEnded,
        ];
        let lifecycle = ReportLifecycle::new(ReporterSettings::default());
        let err = replay(&lifecycle, events, &root, 2).expect_err("missing file");
        assert!(format!("{err:#}").contains("g:b:pom:1"), "{err:#}");
    }
}
