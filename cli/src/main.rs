//! shelter-graph: query the trail graph between mountain shelters.
//!
//! Wraps shelter-graph-core with a CSV record store. Every query command
//! rebuilds the graph for its year cutoff before answering.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelter_graph_core::{ShelterEngine, ShelterId, Year};
use tracing_subscriber::EnvFilter;

mod components;
mod config;
mod degree;
mod load;
mod nodes;
mod output;
mod reachable;
mod status;
mod store;
mod util;

use config::Config;
use output::emit;
use reachable::Method;
use store::CsvStore;

#[derive(Parser, Debug)]
#[command(name = "shelter-graph", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "SHELTER_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Log build details to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the graph and print a load summary.
    Build {
        /// Keep connections recorded in or before this year.
        #[arg(short, long)]
        year: Option<Year>,
    },

    /// List the shelters in the graph with their neighbor counts.
    Nodes {
        #[arg(short, long)]
        year: Option<Year>,
    },

    /// Count connected components.
    Components {
        #[arg(short, long)]
        year: Option<Year>,
    },

    /// Rank shelters by number of neighbors.
    Degree {
        #[arg(short, long)]
        year: Option<Year>,

        /// How many shelters to show; 0 shows all.
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },

    /// List shelters reachable from a starting shelter.
    Reachable {
        #[arg(short, long)]
        year: Option<Year>,

        /// Id of the starting shelter.
        #[arg(short, long)]
        from: ShelterId,

        #[arg(short, long, value_enum, default_value_t = Method::All)]
        method: Method,
    },

    /// Show configured files, catalog size, year bounds and the built graph.
    Status {
        #[arg(short, long)]
        year: Option<Year>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let store = CsvStore::from_config(&config);
    let mut engine = ShelterEngine::new(store);

    match cli.command {
        Command::Build { year } => {
            let year = config.resolve_year(year)?;
            emit(&load::run(&mut engine, year), cli.json)
        }
        Command::Nodes { year } => {
            engine.build_graph(config.resolve_year(year)?);
            emit(&nodes::run(&engine), cli.json)
        }
        Command::Components { year } => {
            let year = config.resolve_year(year)?;
            engine.build_graph(year);
            emit(&components::run(&engine, year), cli.json)
        }
        Command::Degree { year, top } => {
            engine.build_graph(config.resolve_year(year)?);
            emit(&degree::run(&engine, top), cli.json)
        }
        Command::Reachable { year, from, method } => {
            engine.build_graph(config.resolve_year(year)?);
            let out = reachable::run(&engine, from, method)
                .with_context(|| format!("reachability from shelter {from}"))?;
            emit(&out, cli.json)
        }
        Command::Status { year } => {
            let year = config.resolve_year(year)?;
            emit(&status::run(&mut engine, &config, year), cli.json)
        }
    }
}
