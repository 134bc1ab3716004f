//! Facet Aggregator CLI
//!
//! Serves the aggregation API or aggregates a document from disk.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use facet_aggregator::aggregator::Strategy;
use facet_aggregator::commands::{
    display_schema, display_version, execute_aggregate, execute_serve, validate_args,
    AggregateArgs, ServeArgs,
};
use facet_aggregator::utils::config::DEFAULT_CONFIG_PATH;

/// Facet Aggregator - nested facet counts to sorted totals
#[derive(Parser, Debug)]
#[command(name = "facet-aggregator")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// TOML config file with an [api] table
        #[arg(short, long, env = "FACETS_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Interface to bind (overrides the config file)
        #[arg(short, long, env = "FACETS_ADDRESS")]
        address: Option<String>,

        /// Port to bind (overrides the config file)
        #[arg(short, long, env = "FACETS_PORT")]
        port: Option<u16>,
    },

    /// Aggregate a facet document from disk
    Aggregate {
        /// Input JSON document
        #[arg(short, long)]
        input: PathBuf,

        /// Aggregation strategy
        #[arg(short, long, value_enum, default_value_t = Strategy::Streaming)]
        strategy: Strategy,

        /// Output path for the result JSON (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Serve {
            config,
            address,
            port,
        } => {
            execute_serve(ServeArgs {
                config,
                address,
                port,
            })?;
        }

        Commands::Aggregate {
            input,
            strategy,
            output,
        } => {
            let args = AggregateArgs {
                input,
                strategy,
                output,
            };

            // Validate args first
            validate_args(&args)?;

            execute_aggregate(args)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
