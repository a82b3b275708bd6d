mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// protogen - generate build rules for schema libraries
#[derive(Parser)]
#[command(name = "protogen")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate and resolve rules for a source tree
  Generate {
    /// Root of the source tree
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Name of the repository being generated (empty for the main repository)
    #[arg(long, default_value = "")]
    repo_name: String,

    /// Only generate for these languages (repeatable)
    #[arg(long = "lang", value_name = "NAME")]
    langs: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// List the rule kinds and how they merge
  Kinds {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Show the load statements generated rules need
  Loads {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// List the registered plugins and rule implementations
  Plugins {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match cli.command {
    Commands::Generate {
      root,
      repo_name,
      langs,
      format,
    } => cmd::cmd_generate(&root, &repo_name, &langs, format),
    Commands::Kinds { format } => cmd::cmd_kinds(format),
    Commands::Loads { format } => cmd::cmd_loads(format),
    Commands::Plugins { format } => cmd::cmd_plugins(format),
  }
}
