mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use depotsync::github::GitHubApi;
use depotsync::{Config, EntryFailurePolicy, ManifestStore, QuotaReport, Resolution, Resolver};
use depotsync_fetch::{Locality, ReqwestClient};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{App, Commands, FetchArg};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    init_logging(app.verbose);

    let config = Config::load(app.config.as_deref()).context("loading configuration")?;
    let client = Arc::new(ReqwestClient::new(config.timeout()).context("building HTTP client")?);

    match app.cmd {
        Commands::RateLimit => {
            let api = GitHubApi::new(client, &config.api_base, config.api_headers());
            let report = api.check_rate_limit().await;
            if app.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_quota(&report));
            }
            Ok(())
        }
        Commands::Fetch(arg) => fetch(client, &config, arg, app.json).await,
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn fetch(
    client: Arc<ReqwestClient>,
    config: &Config,
    arg: FetchArg,
    json: bool,
) -> anyhow::Result<()> {
    let locality = Locality::from_restricted(arg.restricted_network);
    let mut resolver = Resolver::new(client, config, locality)?;
    if arg.best_effort {
        resolver = resolver.with_policy(EntryFailurePolicy::BestEffort);
    }

    if arg.fresh {
        let removed = resolver.store().clear()?;
        info!(removed, dir = %resolver.store().root().display(), "cleared stored manifests");
    }

    // Informational only; a failed check never stops the run.
    let quota = resolver.check_rate_limit().await;

    let run = resolver
        .resolve_and_fetch(&arg.app_id)
        .await
        .with_context(|| format!("processing application {}", arg.app_id))?;

    if json {
        let report = serde_json::json!({
            "quota": quota,
            "resolution": run,
            "files": run.deliverable_files(resolver.store()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", render_quota(&quota));
    print!("{}", render_run(&run, resolver.store()));
    Ok(())
}

fn render_quota(report: &QuotaReport) -> String {
    match report {
        QuotaReport::Unavailable { message } => {
            format!("Could not check API limits ({message})\n\n")
        }
        QuotaReport::Available(status) => {
            let mut out = format!(
                "API status:\n  used: {}/{} requests\n  remaining: {}\n  resets: {} ({})\n",
                status.used, status.limit, status.remaining, status.reset_relative, status.reset_formatted
            );
            if report.is_exhausted() {
                out.push_str("  API quota exhausted\n");
            }
            out.push('\n');
            out
        }
    }
}

fn render_run(run: &Resolution, store: &ManifestStore) -> String {
    let Some(repo) = run.repository.as_ref().filter(|_| !run.is_empty()) else {
        return format!("No manifests found for application {}\n", run.app_id);
    };

    let mut out = format!(
        "Application {}\n  repository: {} @ {} (updated {})\n",
        run.app_id, repo.repo, repo.sha, repo.updated_at
    );

    out.push_str(&format!("  depot keys: {}\n", run.depot_keys.len()));
    for key in &run.depot_keys {
        out.push_str(&format!("    {} {}\n", key.depot, key.key));
    }

    out.push_str(&format!("  depots: {}\n", run.depots.len()));
    for (depot, manifests) in run.depots.iter() {
        let ids: Vec<&str> = manifests.iter().map(|m| m.as_str()).collect();
        out.push_str(&format!("    {depot}: {}\n", ids.join(", ")));
    }

    let files = run.deliverable_files(store);
    out.push_str(&format!(
        "  downloaded: {} new, {} already present\n",
        files.len(),
        run.already_present.len()
    ));
    for file in &files {
        out.push_str(&format!("    {}\n", file.display()));
    }

    if run.is_partial() {
        out.push_str(&format!("  unavailable: {}\n", run.failures.len()));
        for failure in &run.failures {
            out.push_str(&format!("    {}: {}\n", failure.path, failure.message));
        }
    }
    out
}
