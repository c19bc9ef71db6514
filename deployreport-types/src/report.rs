use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Diffable summary of an artifact's contents.
///
/// Archives map entry path to uncompressed size, descriptors hold a single
/// `content` key. Keys are always in ascending order.
pub type ContentSummary = BTreeMap<String, String>;

/// Key used by descriptor summaries.
pub const DESCRIPTOR_CONTENT_KEY: &str = "content";

/// One installed or deployed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Opaque artifact coordinate, verbatim from the host.
    pub artifact: String,

    /// Serialized as `null` for unrecognized kinds; never omitted.
    #[serde(default)]
    pub content: Option<ContentSummary>,
}

impl DeploymentRecord {
    pub fn new(artifact: impl Into<String>, content: Option<ContentSummary>) -> Self {
        Self {
            artifact: artifact.into(),
            content,
        }
    }
}

/// All deployments of one build session, in admission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReport {
    #[serde(default)]
    pub deployments: Vec<DeploymentRecord>,
}

impl DeploymentReport {
    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    /// Render the canonical pretty-printed document.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrap descriptor text as a summary.
pub fn descriptor_summary(text: impl Into<String>) -> ContentSummary {
    let mut out = ContentSummary::new();
    out.insert(DESCRIPTOR_CONTENT_KEY.to_string(), text.into());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_null_content() {
        let record = DeploymentRecord::new("org.example:readme:txt:1.0", None);
        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"artifact":"org.example:readme:txt:1.0","content":null}"#);
    }

    #[test]
    fn record_deserializes_missing_content_as_none() {
        let record: DeploymentRecord =
            serde_json::from_str(r#"{"artifact":"a"}"#).expect("deserialize");
        assert!(record.content.is_none());
    }

    #[test]
    fn descriptor_summary_has_single_key() {
        let summary = descriptor_summary("<project/>");
        assert_eq!(summary.len(), 1);
        assert_eq!(summary.get("content").map(String::as_str), Some("<project/>"));
    }
}
