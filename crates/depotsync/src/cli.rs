use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(name = "depotsync", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Config file (defaults to ./depotsync.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "f", name = "fetch", about = "Resolve and download manifests and keys for an application")]
    Fetch(FetchArg),
    #[command(alias = "rl", name = "rate-limit", about = "Show the hosting API request quota")]
    RateLimit,
}

#[derive(Clone, Debug, Args)]
pub struct FetchArg {
    /// Application id; also the branch name looked up in each repository
    pub app_id: String,

    /// Use the mirror list for restricted networks
    #[arg(long)]
    pub restricted_network: bool,

    /// Skip files no mirror can deliver instead of aborting
    #[arg(long)]
    pub best_effort: bool,

    /// Delete previously stored manifests before the run
    #[arg(long)]
    pub fresh: bool,
}
