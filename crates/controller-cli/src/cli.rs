use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "controller", about = "Declarative application-deployment controller", version)]
pub struct Cli {
    /// Log output format. `pretty` is easier to read at a terminal;
    /// `json` is meant for shipping to a log aggregator.
    #[arg(long, env = "CONTROLLER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the control-plane HTTP façade and background reconcile loop.
    Serve {
        /// Address to bind the HTTP server to.
        #[arg(long, env = "CONTROLLER_BIND", default_value = "0.0.0.0")]
        bind: String,

        /// Port to bind the HTTP server to.
        #[arg(long, env = "CONTROLLER_PORT", default_value_t = 8080)]
        port: u16,

        /// Path to the on-disk KV file backing the Manifest/Event stores.
        #[arg(long, env = "CONTROLLER_DATA_DIR", default_value = "./data/controller.redb")]
        store_path: PathBuf,

        /// Optional directory of build-time-embedded manifests to seed on
        /// first boot (only applied when the store is empty).
        #[arg(long, env = "CONTROLLER_MANIFEST_DIR")]
        manifest_dir: Option<PathBuf>,

        /// Run against an in-memory store instead of the on-disk KV file —
        /// state is lost on restart.
        #[arg(long)]
        ephemeral: bool,
    },

    /// Seed (or re-seed) the on-disk store from a manifest library
    /// directory without starting the HTTP façade.
    Seed {
        /// Path to the on-disk KV file backing the Manifest Store.
        #[arg(long, env = "CONTROLLER_DATA_DIR", default_value = "./data/controller.redb")]
        store_path: PathBuf,

        /// Directory of YAML manifests to load.
        manifest_dir: PathBuf,
    },
}
