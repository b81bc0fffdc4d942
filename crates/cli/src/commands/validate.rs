use std::path::Path;

use formkit_core::validate;

use super::print_report_errors;
use crate::{load_definition, load_instance, OutputFormat};

pub(crate) fn cmd_validate(
    definition_path: &Path,
    instance_path: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let def = load_definition(definition_path, output, quiet);
    let inst = load_instance(&def, instance_path, output, quiet);

    let report = validate(&def, &inst);
    if report.is_valid() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => println!("{}", serde_json::json!({ "valid": true })),
            }
        }
        return;
    }

    print_report_errors(&report, output, quiet);
    std::process::exit(1);
}
