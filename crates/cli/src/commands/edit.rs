use std::path::Path;
use std::sync::Arc;

use formkit_core::{FormCommand, FormSession};

use crate::{fail, load_definition, load_instance, print_json, OutputFormat};

/// Replay commands against an instance and print the result.
///
/// A rejected command (a duplicate column, an out-of-range row) is reported
/// as a warning and leaves the instance as it was; later commands still run.
pub(crate) fn cmd_edit(
    definition_path: &Path,
    commands_path: &Path,
    instance_path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let def = Arc::new(load_definition(definition_path, output, quiet));
    let mut session = match instance_path {
        Some(p) => {
            let inst = load_instance(&def, p, output, quiet);
            FormSession::with_instance(def, inst)
        }
        None => FormSession::new(def),
    };

    let src = match std::fs::read_to_string(commands_path) {
        Ok(s) => s,
        Err(e) => fail(
            &format!("error reading file '{}': {}", commands_path.display(), e),
            output,
            quiet,
        ),
    };
    let commands: Vec<FormCommand> = match serde_json::from_str(&src) {
        Ok(c) => c,
        Err(e) => fail(
            &format!("error parsing commands in '{}': {}", commands_path.display(), e),
            output,
            quiet,
        ),
    };

    for (i, command) in commands.into_iter().enumerate() {
        let op = command.op();
        if let Err(e) = session.apply(command) {
            if !quiet {
                eprintln!("warning: command {} ({}): {}", i, op, e);
            }
        }
    }

    print_json(session.instance(), output, quiet);
}
