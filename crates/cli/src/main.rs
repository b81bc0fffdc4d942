mod commands;
mod config;
mod serve;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use formkit_core::{FormDefinition, FormInstance, RenderMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Data-driven business forms: check definitions, edit, render and submit.
#[derive(Parser)]
#[command(name = "formkit", version, about = "Data-driven business form engine")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a form definition against the definition schema and its own rules
    Check {
        /// Path to the form definition JSON file
        definition: PathBuf,
    },

    /// Print a fresh instance of a form, seeded with its defaults
    New {
        /// Path to the form definition JSON file
        definition: PathBuf,
    },

    /// Run the validation gate against a filled-in instance
    Validate {
        /// Path to the form definition JSON file
        definition: PathBuf,
        /// Path to the instance JSON file
        instance: PathBuf,
    },

    /// Replay a list of edit commands and print the resulting instance
    Edit {
        /// Path to the form definition JSON file
        definition: PathBuf,
        /// JSON array of commands to apply in order
        #[arg(long)]
        commands: PathBuf,
        /// Start from this instance instead of a fresh one
        #[arg(long)]
        instance: Option<PathBuf>,
    },

    /// Render an instance in edit or print mode
    Render {
        /// Path to the form definition JSON file
        definition: PathBuf,
        /// Path to the instance JSON file
        instance: PathBuf,
        /// Render mode (edit or print)
        #[arg(long, default_value = "print")]
        mode: RenderMode,
        /// Attach validation errors to the rendered fields
        #[arg(long)]
        errors: bool,
    },

    /// Validate and hand an instance to the submission store
    Submit {
        /// Path to the form definition JSON file
        definition: PathBuf,
        /// Path to the instance JSON file
        instance: PathBuf,
    },

    /// Start the formkit HTTP API server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
        /// Path to a formkit.toml configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Form definition files or directories to load
        #[arg()]
        definitions: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match cli.command {
        Commands::Check { definition } => {
            commands::check::cmd_check(&definition, cli.output, cli.quiet);
        }
        Commands::New { definition } => {
            commands::new::cmd_new(&definition, cli.output, cli.quiet);
        }
        Commands::Validate {
            definition,
            instance,
        } => {
            commands::validate::cmd_validate(&definition, &instance, cli.output, cli.quiet);
        }
        Commands::Edit {
            definition,
            commands: command_file,
            instance,
        } => {
            commands::edit::cmd_edit(
                &definition,
                &command_file,
                instance.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
        Commands::Render {
            definition,
            instance,
            mode,
            errors,
        } => {
            commands::render::cmd_render(&definition, &instance, mode, errors, cli.output, cli.quiet);
        }
        Commands::Submit {
            definition,
            instance,
        } => {
            commands::submit::cmd_submit(&definition, &instance, cli.output, cli.quiet);
        }
        Commands::Serve {
            port,
            config,
            definitions,
        } => {
            let config = match config {
                Some(path) => match config::read_formkit_config(&path) {
                    Ok(c) => c,
                    Err(e) => fail(&e, cli.output, cli.quiet),
                },
                None => config::FormkitConfig::default(),
            };
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => fail(
                    &format!("failed to create tokio runtime: {}", e),
                    cli.output,
                    cli.quiet,
                ),
            };
            if let Err(e) = rt.block_on(serve::start_server(port, config, definitions)) {
                fail(&format!("server error: {}", e), cli.output, cli.quiet);
            }
        }
    }
}

/// Install the global tracing subscriber. Events go to stderr so stdout
/// stays clean for command output.
fn init_tracing(quiet: bool) {
    let default = if quiet { "formkit=error" } else { "formkit=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("FORMKIT_LOG").unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Report `msg` and exit with status 1.
pub(crate) fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}

pub(crate) fn load_definition(path: &Path, output: OutputFormat, quiet: bool) -> FormDefinition {
    match FormDefinition::load(path) {
        Ok(def) => def,
        Err(e) => fail(&format!("error loading definition: {}", e), output, quiet),
    }
}

pub(crate) fn load_instance(
    definition: &FormDefinition,
    path: &Path,
    output: OutputFormat,
    quiet: bool,
) -> FormInstance {
    let src = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => fail(
            &format!("error reading file '{}': {}", path.display(), e),
            output,
            quiet,
        ),
    };
    match definition.parse_instance_str(&src) {
        Ok(inst) => inst,
        Err(e) => fail(
            &format!("error parsing instance '{}': {}", path.display(), e),
            output,
            quiet,
        ),
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T, output: OutputFormat, quiet: bool) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(&format!("serialization error: {}", e), output, quiet),
    }
}
