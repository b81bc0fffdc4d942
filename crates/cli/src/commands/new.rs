use std::path::Path;

use crate::{load_definition, print_json, OutputFormat};

/// Print a fresh instance. The JSON is the same shape `validate`, `render`
/// and `submit` read back, so it doubles as a fill-in template.
pub(crate) fn cmd_new(path: &Path, output: OutputFormat, quiet: bool) {
    let def = load_definition(path, output, quiet);
    print_json(&def.instantiate(), output, quiet);
}
