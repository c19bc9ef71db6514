//! Configuration file loading for deployreport.
//!
//! Discovers and loads `deployreport.toml` from the replay root and merges it
//! with the host properties given on the command line. Properties take
//! precedence over the config file.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use deployreport_core::ReporterSettings;
use deployreport_core::settings::OUTPUT_PROPERTY;
use fs_err as fs;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "deployreport.toml";

/// Top-level configuration from deployreport.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeployreportConfig {
    pub output: OutputConfig,
}

/// Output section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report file, used when no property names one.
    pub path: Option<Utf8PathBuf>,

    /// Prefix of the log message when the report goes to the log.
    pub label: Option<String>,
}

/// Discover the deployreport.toml config file.
///
/// Returns `None` if `root` has no config file.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<DeployreportConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<DeployreportConfig> {
    let config: DeployreportConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return the default if there is none.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<DeployreportConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(DeployreportConfig::default()),
    }
}

/// Builder for merging the config file with host properties.
pub struct ConfigMerger {
    config: DeployreportConfig,
}

impl ConfigMerger {
    pub fn new(config: DeployreportConfig) -> Self {
        Self { config }
    }

    /// Resolve reporter settings.
    ///
    /// `cli_output` plays the role of the system property and `user` holds
    /// `-D` definitions. The config file path is the last fallback before the
    /// log sink.
    pub fn merge_replay_args(
        self,
        cli_output: Option<&Utf8Path>,
        user: &HashMap<String, String>,
    ) -> ReporterSettings {
        let mut system = HashMap::new();
        if let Some(path) = cli_output {
            system.insert(OUTPUT_PROPERTY.to_string(), path.to_string());
        }

        let mut settings = ReporterSettings::from_properties(&system, user);
        if settings.output.is_none() {
            settings.output = self.config.output.path;
        }
        if let Some(label) = self.config.output.label {
            settings.log_label = label;
        }
        settings
    }
}

/// Parse CLI properties from key=value strings.
///
/// The value may be empty (`-Dkey=`), which leaves the property unset.
pub fn parse_cli_params(params: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    for entry in params {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid property '{}': expected key=value", entry))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("invalid property '{}': missing key", entry);
        }
        out.insert(key.to_string(), value.trim().to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deployreport_core::settings::DEFAULT_LOG_LABEL;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[output]
path = "target/deployments.json"
label = "Published:"
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(
            config.output.path.as_deref().map(Utf8Path::as_str),
            Some("target/deployments.json")
        );
        assert_eq!(config.output.label.as_deref(), Some("Published:"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.output.path.is_none());
        assert!(config.output.label.is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let err = parse_config("[output]\npath = 3\n").expect_err("bad type");
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_merge_cli_output_wins() {
        let config = parse_config("[output]\npath = \"config.json\"\n").unwrap();
        let user = HashMap::from([(OUTPUT_PROPERTY.to_string(), "user.json".to_string())]);

        let settings = ConfigMerger::new(config)
            .merge_replay_args(Some(Utf8Path::new("cli.json")), &user);

        assert_eq!(settings.output, Some(Utf8PathBuf::from("cli.json")));
    }

    #[test]
    fn test_merge_user_property_beats_config() {
        let config = parse_config("[output]\npath = \"config.json\"\n").unwrap();
        let user = HashMap::from([(OUTPUT_PROPERTY.to_string(), "user.json".to_string())]);

        let settings = ConfigMerger::new(config).merge_replay_args(None, &user);

        assert_eq!(settings.output, Some(Utf8PathBuf::from("user.json")));
    }

    #[test]
    fn test_merge_config_path_is_fallback() {
        let config = parse_config("[output]\npath = \"config.json\"\n").unwrap();
        let settings = ConfigMerger::new(config).merge_replay_args(None, &HashMap::new());
        assert_eq!(settings.output, Some(Utf8PathBuf::from("config.json")));
    }

    #[test]
    fn test_merge_defaults_to_log_sink() {
        let settings = ConfigMerger::new(DeployreportConfig::default())
            .merge_replay_args(None, &HashMap::new());
        assert!(settings.output.is_none());
        assert_eq!(settings.log_label, DEFAULT_LOG_LABEL);
    }

    #[test]
    fn test_merge_label_from_config() {
        let config = parse_config("[output]\nlabel = \"Published:\"\n").unwrap();
        let settings = ConfigMerger::new(config).merge_replay_args(None, &HashMap::new());
        assert_eq!(settings.log_label, "Published:");
    }

    #[test]
    fn test_parse_cli_params_valid() {
        let params = vec![
            "deployment-reporter.output=out.json".to_string(),
            "skipTests=true".to_string(),
        ];
        let parsed = parse_cli_params(&params).expect("parse params");
        assert_eq!(
            parsed.get(OUTPUT_PROPERTY),
            Some(&"out.json".to_string())
        );
        assert_eq!(parsed.get("skipTests"), Some(&"true".to_string()));
    }

    #[test]
    fn test_parse_cli_params_empty_value_is_unset() {
        let parsed = parse_cli_params(&["deployment-reporter.output=".to_string()]).unwrap();
        let settings = ConfigMerger::new(DeployreportConfig::default())
            .merge_replay_args(None, &parsed);
        assert!(settings.output.is_none());
    }

    #[test]
    fn test_parse_cli_params_missing_key() {
        let err = parse_cli_params(&["=value".to_string()]).expect_err("missing key");
        assert!(err.to_string().contains("missing key"));
    }

    #[test]
    fn test_parse_cli_params_missing_separator() {
        let err = parse_cli_params(&["novalue".to_string()]).expect_err("no separator");
        assert!(err.to_string().contains("expected key=value"));
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cfg = load_or_default(&root).expect("load default");
        assert!(cfg.output.path.is_none());
    }
}
