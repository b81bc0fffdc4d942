use std::path::Path;

use formkit_core::FormDefinition;

use crate::{fail, OutputFormat};

static DEFINITION_SCHEMA_STR: &str = include_str!("../../../../docs/form-definition-schema.json");

pub(crate) fn cmd_check(path: &Path, output: OutputFormat, quiet: bool) {
    let schema: serde_json::Value = match serde_json::from_str(DEFINITION_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => fail(
            &format!("internal error: failed to parse embedded definition schema: {}", e),
            output,
            quiet,
        ),
    };
    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => fail(
            &format!("internal error: failed to compile schema: {}", e),
            output,
            quiet,
        ),
    };

    let src = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => fail(
            &format!("error reading file '{}': {}", path.display(), e),
            output,
            quiet,
        ),
    };
    let doc: serde_json::Value = match serde_json::from_str(&src) {
        Ok(v) => v,
        Err(e) => fail(
            &format!("error parsing JSON in '{}': {}", path.display(), e),
            output,
            quiet,
        ),
    };

    // Shape first; the semantic pass assumes a well-formed document.
    let mut errors: Vec<String> = validator
        .iter_errors(&doc)
        .map(|e| format!("{}", e))
        .collect();
    let mut form_id = None;
    if errors.is_empty() {
        match serde_json::from_value::<FormDefinition>(doc) {
            Ok(def) => {
                if let Err(errs) = formkit_core::check(&def) {
                    errors.extend(errs.iter().map(|e| e.to_string()));
                }
                form_id = Some(def.id);
            }
            Err(e) => errors.push(e.to_string()),
        }
    }

    if errors.is_empty() {
        if !quiet {
            let id = form_id.unwrap_or_default();
            match output {
                OutputFormat::Text => println!("valid form definition {}", id),
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "valid": true, "id": id }))
                }
            }
        }
        return;
    }

    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("invalid form definition");
                for err in &errors {
                    eprintln!("  - {}", err);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "valid": false, "errors": errors });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
    std::process::exit(1);
}
