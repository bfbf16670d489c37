//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Solution Build - Order and check the artifacts of a script/module solution
#[derive(Parser, Debug)]
#[command(name = "solution-build")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the order in which the solution's artifacts can be packaged
    Order(commands::order::OrderArgs),

    /// Display the dependency tree of the solution's artifacts
    Tree(commands::tree::TreeArgs),

    /// List required modules after filtering and version resolution
    Deps(commands::deps::DepsArgs),

    /// Check that every referenced command can be resolved
    Check(commands::check::CheckArgs),

    /// Export or query command registry snapshots
    Registry(commands::registry::RegistryArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level, &self.color);

        match self.command {
            Commands::Order(args) => commands::order::execute(args, &self.color),
            Commands::Tree(args) => commands::tree::execute(args, &self.color),
            Commands::Deps(args) => commands::deps::execute(args, &self.color),
            Commands::Check(args) => commands::check::execute(args, &self.color),
            Commands::Registry(args) => commands::registry::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Log to stderr at `level`, unless `RUST_LOG` is set.
fn init_logging(level: &str, color: &str) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(level),
    };

    let style = match color.to_lowercase().as_str() {
        "always" => env_logger::WriteStyle::Always,
        "never" => env_logger::WriteStyle::Never,
        _ => env_logger::WriteStyle::Auto,
    };
    builder.write_style(style).format_timestamp(None);

    // the logger may already be installed when commands run in-process
    let _ = builder.try_init();
}
