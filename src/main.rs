// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Ecoview CLI - data pipeline for ecosystem dashboards

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ecoview::commands::{self, export::ExportArgs, validate::ValidateArgs, Output};
use ecoview::config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecoview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Settings file path
    #[arg(short, long, env = "ECOVIEW_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Data directory override
    #[arg(long, env = "ECOVIEW_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Fetch documents from this base URL instead of the data directory
    #[arg(long, env = "ECOVIEW_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Disable colored output
    #[arg(
        long,
        env = "NO_COLOR",
        global = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the dataset and render configuration and summarise them
    Inspect,

    /// Validate data records against the entity schema
    Validate {
        /// Validate every YAML file in this directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Schema file (defaults to the configured schema resource)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Show at most this many invalid records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Compare two schema revisions for backward compatibility
    CheckSchema {
        /// Current schema
        old: PathBuf,

        /// Proposed schema
        new: PathBuf,
    },

    /// Check the manual relationships document
    LintRelationships {
        /// Also check that endpoints name loaded entities
        #[arg(long)]
        entities: bool,
    },

    /// Validate the render configuration document
    CheckConfig {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },

    /// Export the relationship graph
    Export {
        /// Output format (dot, json)
        #[arg(short, long, default_value = "dot")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Entity types to include (defaults to the render configuration)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Only include entities matching this search term
        #[arg(long)]
        search: Option<String>,
    },

    /// Convert upstream catalogue records into data resources
    Import {
        /// Directory of upstream YAML records
        src: PathBuf,

        /// Output directory for the generated resources
        out: PathBuf,
    },

    /// Print the effective settings
    Settings,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn init_logging(cli: &Cli, default_level: &str) {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else {
        match cli.verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(url) = &cli.base_url {
        settings.base_url = Some(url.clone());
    }

    init_logging(&cli, &settings.log_level);

    let out = Output {
        json: cli.json,
        color: !cli.no_color,
    };

    match cli.command {
        Commands::Inspect => commands::inspect::run(&settings, out).await,
        Commands::Validate { dir, schema, limit } => {
            commands::validate::run(&settings, ValidateArgs { dir, schema, limit }, out).await
        }
        Commands::CheckSchema { old, new } => commands::check_schema::run(&old, &new, out),
        Commands::LintRelationships { entities } => {
            commands::lint::run(&settings, entities, out).await
        }
        Commands::CheckConfig { show } => commands::check_config::run(&settings, show, out).await,
        Commands::Export { format, output, types, search } => {
            commands::export::run(&settings, ExportArgs { format, output, types, search }).await
        }
        Commands::Import { src, out: dest } => commands::import::run(&src, &dest, out),
        Commands::Settings => commands::settings::run(&settings, out),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
