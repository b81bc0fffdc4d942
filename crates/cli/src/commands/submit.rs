use std::path::Path;

use formkit_storage::{submit_form, InMemorySubmissionStore, SubmitError};

use super::print_report_errors;
use crate::{fail, load_definition, load_instance, print_json, OutputFormat};

/// Gate an instance and store it. The CLI has no persistent backend, so the
/// record lives in an in-memory store for the run and the receipt is the
/// durable output.
pub(crate) fn cmd_submit(
    definition_path: &Path,
    instance_path: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let def = load_definition(definition_path, output, quiet);
    let inst = load_instance(&def, instance_path, output, quiet);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(
            &format!("failed to create tokio runtime: {}", e),
            output,
            quiet,
        ),
    };
    let store = InMemorySubmissionStore::new();

    match rt.block_on(submit_form(&store, &def, &inst)) {
        Ok(receipt) => match output {
            OutputFormat::Text => {
                if !quiet {
                    println!("submitted {} ({})", receipt.id, receipt.form_id);
                    println!("  at:     {}", receipt.submitted_at);
                    println!("  digest: {}", receipt.digest);
                }
            }
            OutputFormat::Json => print_json(&receipt, output, quiet),
        },
        Err(SubmitError::Invalid(report)) => {
            print_report_errors(&report, output, quiet);
            std::process::exit(1);
        }
        Err(e) => fail(&format!("submission failed: {}", e), output, quiet),
    }
}
