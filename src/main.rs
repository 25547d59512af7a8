//! optconfig - option parsing with configuration files for shell scripts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use optconfig::output::{render_error, render_json, render_shell, render_usage, write_temp_file};
use optconfig::{help, Report, Schema};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Option parsing with configuration files for shell scripts.
#[derive(Parser, Debug)]
#[command(name = "optconfig", version, about, disable_help_subcommand = true)]
struct Cli {
    /// Log what is read and resolved to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `export` statements and a `set --` line
    Shell,
    /// A JSON document
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse script arguments and write the result to a temporary file
    Parse {
        /// JSON option schema for the target script
        #[arg(long, env = "OPTCONFIG_SCHEMA")]
        schema: String,

        /// Configuration file (overrides the schema setting)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only read these configuration file sections
        #[arg(long = "section")]
        sections: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Shell)]
        format: OutputFormat,

        /// Shell variable prefix
        #[arg(long, default_value = "OPT_")]
        prefix: String,

        /// Arguments to parse for the target script
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print usage text for the target script
    Usage {
        /// JSON option schema for the target script
        #[arg(long, env = "OPTCONFIG_SCHEMA")]
        schema: String,

        /// Program name for the usage line
        #[arg(long)]
        name: Option<String>,

        /// Write a sourceable file that prints the text and exits
        #[arg(long)]
        source: bool,
    },
}

fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_schema(json: &str) -> Result<Schema> {
    let schema = Schema::from_json(json).context("failed to parse schema JSON")?;
    schema.validate().context("invalid schema")?;
    Ok(schema)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Parse {
            schema,
            file,
            sections,
            format,
            prefix,
            args,
        } => {
            let mut opt = load_schema(&schema)?
                .build()
                .context("failed to build options")?;
            if let Some(file) = file {
                opt.set_file(file);
            }
            if !sections.is_empty() {
                opt.set_sections(sections);
            }

            let content = match (opt.parse(&args), format) {
                (Ok(rest), OutputFormat::Shell) => render_shell(&Report::new(&opt, rest), &prefix),
                (Ok(rest), OutputFormat::Json) => render_json(&Report::new(&opt, rest))?,
                // The sourcing script reports the error and exits.
                (Err(e), OutputFormat::Shell) => render_error(&e.to_string()),
                (Err(e), OutputFormat::Json) => {
                    return Err(e).context("failed to parse arguments");
                }
            };

            let path = write_temp_file(&content).context("failed to write output file")?;
            println!("{}", path.display());
        }
        Commands::Usage {
            schema,
            name,
            source,
        } => {
            let opt = load_schema(&schema)?
                .build()
                .context("failed to build options")?;
            let text = match name {
                Some(name) => help::usage_with_header(&opt, &name),
                None => opt.usage(),
            };

            if source {
                let path = write_temp_file(&render_usage(&text))
                    .context("failed to write output file")?;
                println!("{}", path.display());
            } else {
                print!("{}", text);
            }
        }
    }

    Ok(())
}
