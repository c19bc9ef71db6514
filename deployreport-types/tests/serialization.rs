use deployreport_types::report::descriptor_summary;
use deployreport_types::schema::DEPLOYREPORT_REPORT_V1_SCHEMA;
use deployreport_types::{ContentSummary, DeploymentRecord, DeploymentReport};
use pretty_assertions::assert_eq;

fn archive_summary(entries: &[(&str, u64)]) -> ContentSummary {
    entries
        .iter()
        .map(|(name, size)| (name.to_string(), size.to_string()))
        .collect()
}

fn sample_report() -> DeploymentReport {
    DeploymentReport {
        deployments: vec![
            DeploymentRecord::new(
                "org.example:core:jar:1.0",
                Some(archive_summary(&[("a/b.txt", 10), ("a.txt", 3)])),
            ),
            DeploymentRecord::new(
                "org.example:core:pom:1.0",
                Some(descriptor_summary("<project>\n</project>")),
            ),
            DeploymentRecord::new("org.example:core:txt:readme:1.0", None),
        ],
    }
}

#[test]
fn pretty_json_is_stable_and_ordered() {
    let json = sample_report().to_pretty_json().expect("render");
    let expected = r#"{
  "deployments": [
    {
      "artifact": "org.example:core:jar:1.0",
      "content": {
        "a.txt": "3",
        "a/b.txt": "10"
      }
    },
    {
      "artifact": "org.example:core:pom:1.0",
      "content": {
        "content": "<project>\n</project>"
      }
    },
    {
      "artifact": "org.example:core:txt:readme:1.0",
      "content": null
    }
  ]
}"#;
    assert_eq!(json, expected);
}

#[test]
fn report_roundtrips_through_json() {
    let report = sample_report();
    let json = report.to_pretty_json().expect("render");
    let back: DeploymentReport = serde_json::from_str(&json).expect("parse");
    assert_eq!(back, report);
}

#[test]
fn rendered_report_validates_against_schema() {
    let schema: serde_json::Value =
        serde_json::from_str(DEPLOYREPORT_REPORT_V1_SCHEMA).expect("schema json");
    let validator = jsonschema::validator_for(&schema).expect("compile schema");

    let instance = serde_json::to_value(sample_report()).expect("to value");
    assert!(validator.is_valid(&instance));
}

#[test]
fn schema_rejects_missing_content_key() {
    let schema: serde_json::Value =
        serde_json::from_str(DEPLOYREPORT_REPORT_V1_SCHEMA).expect("schema json");
    let validator = jsonschema::validator_for(&schema).expect("compile schema");

    let instance = serde_json::json!({
        "deployments": [{ "artifact": "org.example:core:jar:1.0" }]
    });
    assert!(!validator.is_valid(&instance));
}

#[test]
fn schema_rejects_empty_deployments() {
    let schema: serde_json::Value =
        serde_json::from_str(DEPLOYREPORT_REPORT_V1_SCHEMA).expect("schema json");
    let validator = jsonschema::validator_for(&schema).expect("compile schema");

    let instance = serde_json::to_value(DeploymentReport::default()).expect("to value");
    assert!(!validator.is_valid(&instance));
}
