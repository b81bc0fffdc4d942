pub(crate) mod check;
pub(crate) mod edit;
pub(crate) mod new;
pub(crate) mod render;
pub(crate) mod submit;
pub(crate) mod validate;

use formkit_core::ValidationReport;

use crate::OutputFormat;

/// Print a blocked validation report: text to stderr as a bullet list,
/// JSON as `{"valid": false, "errors": {path: message}}`.
pub(crate) fn print_report_errors(report: &ValidationReport, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("invalid: {} field(s) need attention", report.len());
                for (path, message) in report.iter() {
                    eprintln!("  - {}: {}", path, message);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "valid": false, "errors": report });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}
