//! Metacluster administration CLI.
//!
//! Inspects and edits the metadata of one cluster: its own metacluster
//! registration and, on the management cluster, the data cluster map.
//!
//! # Quick Start
//!
//! ```bash
//! # On the management cluster
//! mcctl --data-dir ./mgmt registration init-management prod
//! mcctl --data-dir ./mgmt cluster add dc1 --connection-string fdb://dc1 --capacity 10
//! REG=$(mcctl --data-dir ./mgmt registration export-data dc1)
//!
//! # On the data cluster
//! mcctl --data-dir ./dc1 registration import "$REG"
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metacluster_config::ConfigLoader;
use metacluster_metadata::DataClusterState;
use metacluster_types::{ClusterId, ClusterName};
use tracing_subscriber::EnvFilter;

use commands::CliContext;

/// Administer metacluster registrations and data clusters.
#[derive(Parser)]
#[command(name = "mcctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory containing metacluster.toml (default: current dir).
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Metadata store directory (overrides store.data_dir).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// This cluster's metacluster registration.
    #[command(subcommand)]
    Registration(RegistrationCommands),

    /// Data clusters known to the management cluster.
    #[command(subcommand)]
    Cluster(ClusterCommands),

    /// Show aggregate capacity and clusters with room.
    Capacity,

    /// Validate management metadata and, optionally, data cluster slots.
    Check {
        /// Data cluster store to cross-check, as NAME=DIR. Repeatable.
        #[arg(long = "data-cluster", value_name = "NAME=DIR")]
        data_clusters: Vec<String>,
    },
}

#[derive(Subcommand)]
enum RegistrationCommands {
    /// Print the local registration.
    Show,

    /// Make this cluster the management cluster of a new metacluster.
    InitManagement {
        /// Metacluster name.
        metacluster_name: ClusterName,
    },

    /// Print the registration a data cluster should import (base64).
    ExportData {
        /// Data cluster name, as added with `cluster add`.
        name: ClusterName,

        /// Id to assign if the cluster has none yet.
        #[arg(long)]
        id: Option<ClusterId>,
    },

    /// Store a registration exported by the management cluster.
    Import {
        /// Base64 registration from `export-data`.
        registration: String,
    },

    /// Check a base64 registration against the local one.
    Verify {
        /// Base64 registration.
        registration: String,
    },

    /// Remove the local registration.
    Clear,
}

#[derive(Subcommand)]
enum ClusterCommands {
    /// Register a data cluster.
    Add {
        /// Data cluster name.
        name: ClusterName,

        /// How to reach the data cluster.
        #[arg(long)]
        connection_string: String,

        /// Capacity in tenant groups (default: management.default_capacity).
        #[arg(long)]
        capacity: Option<u64>,

        /// Cluster id (default: assigned at export).
        #[arg(long)]
        id: Option<ClusterId>,
    },

    /// List data clusters.
    List,

    /// Show one data cluster as JSON.
    Show {
        /// Data cluster name.
        name: ClusterName,
    },

    /// Change a data cluster's capacity.
    Configure {
        /// Data cluster name.
        name: ClusterName,

        /// New capacity in tenant groups.
        #[arg(long)]
        capacity: u64,
    },

    /// Move a data cluster to another lifecycle state.
    SetState {
        /// Data cluster name.
        name: ClusterName,

        /// Target state (ready, removing, restoring).
        state: DataClusterState,
    },

    /// Delete a data cluster that is being removed.
    Remove {
        /// Data cluster name.
        name: ClusterName,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    style::set_no_color(cli.no_color);

    let mut loader = ConfigLoader::new();
    if let Some(dir) = &cli.project_dir {
        loader = loader.with_project_dir(dir);
    }
    let mut config = loader.load().context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }

    // Initialize logging
    let level = config.logging.level_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = CliContext::new(config);

    match cli.command {
        Commands::Registration(cmd) => match cmd {
            RegistrationCommands::Show => commands::registration::show(&ctx),
            RegistrationCommands::InitManagement { metacluster_name } => {
                commands::registration::init_management(&ctx, metacluster_name)
            }
            RegistrationCommands::ExportData { name, id } => {
                commands::registration::export_data(&ctx, &name, id)
            }
            RegistrationCommands::Import { registration } => {
                commands::registration::import(&ctx, &registration)
            }
            RegistrationCommands::Verify { registration } => {
                commands::registration::verify(&ctx, &registration)
            }
            RegistrationCommands::Clear => commands::registration::clear(&ctx),
        },
        Commands::Cluster(cmd) => match cmd {
            ClusterCommands::Add {
                name,
                connection_string,
                capacity,
                id,
            } => commands::cluster::add(&ctx, name, connection_string, capacity, id),
            ClusterCommands::List => commands::cluster::list(&ctx),
            ClusterCommands::Show { name } => commands::cluster::show(&ctx, &name),
            ClusterCommands::Configure { name, capacity } => {
                commands::cluster::configure(&ctx, &name, capacity)
            }
            ClusterCommands::SetState { name, state } => {
                commands::cluster::set_state(&ctx, &name, state)
            }
            ClusterCommands::Remove { name } => commands::cluster::remove(&ctx, &name),
        },
        Commands::Capacity => commands::capacity::run(&ctx),
        Commands::Check { data_clusters } => commands::check::run(&ctx, &data_clusters),
    }
}
