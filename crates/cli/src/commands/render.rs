use std::path::Path;

use formkit_core::{render, validate, RenderMode};

use crate::{load_definition, load_instance, print_json, OutputFormat};

pub(crate) fn cmd_render(
    definition_path: &Path,
    instance_path: &Path,
    mode: RenderMode,
    with_errors: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let def = load_definition(definition_path, output, quiet);
    let inst = load_instance(&def, instance_path, output, quiet);

    let mut presentation = render(&def, &inst, mode);
    if with_errors {
        presentation = presentation.with_errors(&validate(&def, &inst));
    }

    match output {
        OutputFormat::Text => print!("{}", presentation.to_text()),
        OutputFormat::Json => print_json(&presentation, output, quiet),
    }
}
