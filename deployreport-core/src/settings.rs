//! Host-resolved settings for one reporting session.

use crate::serializer::ReportSink;
use camino::Utf8PathBuf;
use std::collections::HashMap;

/// Property naming the report output file.
pub const OUTPUT_PROPERTY: &str = "deployment-reporter.output";

/// Prefix of the log message when no output file is configured.
pub const DEFAULT_LOG_LABEL: &str = "Deployments:";

/// Settings resolved once, before the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterSettings {
    /// Report file; `None` routes the report to the log sink.
    pub output: Option<Utf8PathBuf>,
    pub log_label: String,
}

impl Default for ReporterSettings {
    fn default() -> Self {
        Self {
            output: None,
            log_label: DEFAULT_LOG_LABEL.to_string(),
        }
    }
}

impl ReporterSettings {
    pub fn with_output(output: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::default()
        }
    }

    /// Resolve [`OUTPUT_PROPERTY`] from host properties.
    ///
    /// System properties win over user properties. Blank values count as unset.
    pub fn from_properties(
        system: &HashMap<String, String>,
        user: &HashMap<String, String>,
    ) -> Self {
        let lookup = |props: &HashMap<String, String>| {
            props
                .get(OUTPUT_PROPERTY)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(Utf8PathBuf::from)
        };

        Self {
            output: lookup(system).or_else(|| lookup(user)),
            ..Self::default()
        }
    }

    pub fn sink(&self) -> ReportSink {
        match &self.output {
            Some(path) => ReportSink::File(path.clone()),
            None => ReportSink::Log {
                label: self.log_label.clone(),
            },
        }
    }
}
