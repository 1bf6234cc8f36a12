use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

mod app;
mod ui;

use app::{App, AppEvent};
use cyberhound::config::Config;
use cyberhound::feed::{
    build_client, FeedSyncController, FixtureProvider, HttpIntelSource, PollScheduler,
    ScanOutcome, SyncOptions,
};
use cyberhound::storage::{Database, DatabaseError};
use cyberhound::util::sanitize;

/// `~/.config/cyberhound`
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME environment variable not set")?;
    Ok(Path::new(&home).join(".config").join("cyberhound"))
}

#[cfg(unix)]
fn restrict_to_owner(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)) {
        tracing::warn!(path = %dir.display(), error = %e, "Failed to restrict config directory to 0700");
    }
}

#[derive(Parser, Debug)]
#[command(name = "cyberhound", about = "Terminal dashboard for scraped deal and bounty intel")]
struct Args {
    /// Config file (default: ~/.config/cyberhound/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Skip the boot narration
    #[arg(long)]
    no_boot: bool,

    /// Poll once, print the snapshot and exit
    #[arg(long, conflicts_with = "scan")]
    once: bool,

    /// Scan TARGET, print the result and exit
    #[arg(long, value_name = "TARGET")]
    scan: Option<String>,

    /// Turn the clearance badge on
    #[arg(long, conflicts_with = "revoke_clearance")]
    grant_clearance: bool,

    /// Turn the clearance badge off
    #[arg(long)]
    revoke_clearance: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never land in the alternate screen buffer
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    #[cfg(unix)]
    restrict_to_owner(&config_dir);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(api_base) = &args.api_base {
        config.api_base = api_base.clone();
    }
    if args.no_boot {
        config.boot_sequence = false;
    }

    let source = HttpIntelSource::from_config(build_client()?, &config)
        .context("Invalid backend endpoint in configuration")?;
    tracing::debug!(feed = %source.feed_url(), "Using intel backend");
    let controller = FeedSyncController::new(
        source,
        FixtureProvider::default(),
        SyncOptions::from_config(&config),
    );

    // Headless modes never touch the preferences database
    if args.once {
        return print_once(&controller).await;
    }
    if let Some(target) = &args.scan {
        return print_scan(&controller, target).await;
    }

    let db_path = config_dir.join("state.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of cyberhound appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    if args.grant_clearance || args.revoke_clearance {
        db.set_clearance(args.grant_clearance)
            .await
            .context("Failed to store clearance")?;
    }
    let clearance = match db.clearance_granted().await {
        Ok(granted) => granted,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read clearance, assuming restricted");
            false
        }
    };

    let scheduler = PollScheduler::spawn(controller.clone(), config.poll_interval());
    let mut app = App::new(controller.clone(), config.promo_url.clone(), clearance);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    let result = ui::run(&mut app, event_tx, event_rx).await;

    controller.shutdown();
    scheduler.stop();
    db.close().await;
    result
}

async fn print_once(controller: &FeedSyncController<HttpIntelSource>) -> Result<()> {
    let status = controller.poll().await;
    println!("[{}] {}", status.label(), controller.message());
    for deal in controller.snapshot().iter() {
        let score = deal
            .value_score
            .map_or_else(|| "--".to_string(), |s| format!("{:.1}", s));
        println!(
            "{:>10}  {:>5}  {}",
            sanitize(&deal.id.to_string()),
            score,
            sanitize(&deal.label)
        );
    }
    Ok(())
}

async fn print_scan(controller: &FeedSyncController<HttpIntelSource>, target: &str) -> Result<()> {
    match controller.trigger_scan(target).await {
        ScanOutcome::Completed { found, status } => {
            let found = found.map_or_else(|| "unknown".to_string(), |n| n.to_string());
            println!("Scan of '{}' complete: {} found", target, found);
            if let Some(intercept) = controller.last_intercept() {
                println!(
                    "Intercept: {} / {} / verdict {}",
                    sanitize(intercept.target.as_deref().unwrap_or("-")),
                    sanitize(intercept.deal.as_deref().unwrap_or("-")),
                    sanitize(intercept.verdict_or_unknown())
                );
            }
            println!("[{}] {}", status.label(), controller.message());
            Ok(())
        }
        ScanOutcome::Failed(reason) => anyhow::bail!("Scan of '{}' failed: {}", target, reason),
        ScanOutcome::Busy | ScanOutcome::Closed => {
            anyhow::bail!("Scan of '{}' was not dispatched", target)
        }
    }
}
