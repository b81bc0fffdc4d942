//! Validates every sample definition under forms/ against the formal
//! definition schema at docs/form-definition-schema.json, then runs the
//! semantic checks on each.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn collect_definition_files(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "json"))
        .collect();
    paths.sort();
    paths
}

fn schema_validator() -> jsonschema::Validator {
    let schema_path = workspace_root().join("docs/form-definition-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

#[test]
fn sample_definitions_match_schema_and_check_clean() {
    let validator = schema_validator();
    let files = collect_definition_files(&workspace_root().join("forms"));
    assert!(files.len() >= 3, "expected sample definitions under forms/");

    let mut failures = Vec::new();
    for path in &files {
        let src = std::fs::read_to_string(path).unwrap();
        let instance: serde_json::Value = serde_json::from_str(&src).unwrap();
        if let Err(error) = validator.validate(&instance) {
            failures.push(format!("{}: {}", path.display(), error));
            continue;
        }
        let def = formkit_core::FormDefinition::from_json_str(&src).unwrap();
        if let Err(errs) = formkit_core::check(&def) {
            for e in errs {
                failures.push(format!("{}: {}", path.display(), e));
            }
        }
    }

    assert!(
        failures.is_empty(),
        "{} problem(s) in sample definitions:\n{}",
        failures.len(),
        failures.join("\n")
    );
}

#[test]
fn schema_rejects_unknown_rule_kind() {
    let validator = schema_validator();
    let doc = serde_json::json!({
        "id": "X-1",
        "title": "X",
        "rules": [{"rule": "matches_total", "field": "total"}]
    });
    assert!(validator.validate(&doc).is_err());
}

#[test]
fn schema_rejects_field_key_with_whitespace() {
    let validator = schema_validator();
    let doc = serde_json::json!({
        "id": "X-1",
        "title": "X",
        "fields": [{"key": "cost center", "label": "Cost Center"}]
    });
    assert!(validator.validate(&doc).is_err());
}
