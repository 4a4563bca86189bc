use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use gitlab_mirror::health::CheckResult;
use gitlab_mirror::{Config, HealthCheck, SyncEngine};

#[derive(Parser)]
#[command(name = "gitlab-mirror")]
#[command(about = "Clone or update every project on a GitLab server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone missing projects and pull existing ones (default)
    Sync,

    /// List the projects that would be mirrored
    List,

    /// System health check and diagnostics
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, created) = load_config(cli.config)?;
    init_logging(cli.verbose, &config.logging.level)?;
    if let Some(path) = created {
        info!("Created default configuration at: {:?}", path);
    }

    // The only place the process environment is consulted for credentials
    let token = read_token(&config);

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => cmd_sync(config, token).await,
        Commands::List => cmd_list(config, token).await,
        Commands::Doctor => cmd_doctor(&config, &token).await,
    }
}

/// Initialize logging: RUST_LOG wins, then --verbose, then the configured level.
/// Per-project status lines from the sync engine are always kept.
fn init_logging(verbose: bool, level: &str) -> Result<()> {
    let default_level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level))
        .add_directive(
            "gitlab_mirror::sync=info"
                .parse::<Directive>()
                .context("Invalid status line directive")?,
        );

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
    Ok(())
}

/// Load configuration from specified path or default location.
/// Also returns the path of a default config written on first run.
fn load_config(config_path: Option<PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    match config_path {
        Some(path) => Ok((Config::load(&path)?, None)),
        None => Config::load_or_default(),
    }
}

fn read_token(config: &Config) -> String {
    match std::env::var(&config.gitlab.token_env) {
        Ok(token) => token,
        Err(_) => {
            warn!(
                "{} is not set; requests to {} will be unauthenticated",
                config.gitlab.token_env, config.gitlab.url
            );
            String::new()
        }
    }
}

async fn cmd_sync(config: Config, token: String) -> Result<()> {
    info!("Starting gitlab-mirror v{}", env!("CARGO_PKG_VERSION"));

    let engine = SyncEngine::from_config(config, token).context("Failed to create sync engine")?;
    let summary = engine.run_sync().await.context("Mirror run aborted")?;

    println!(
        "Mirrored {} projects from {} page(s): {} cloned, {} updated ({:.2}s)",
        summary.total_repositories,
        summary.pages,
        summary.cloned,
        summary.updated,
        summary.duration.as_secs_f64()
    );

    Ok(())
}

async fn cmd_list(config: Config, token: String) -> Result<()> {
    let engine = SyncEngine::from_config(config, token).context("Failed to create sync engine")?;
    let repos = engine.list().await.context("Failed to list projects")?;

    println!("Projects ({}):", repos.len());
    for repo in repos {
        let state = if repo.exists_locally { "present" } else { "missing" };
        println!("  {:<40} {:<8} {}", repo.name, state, repo.clone_url);
    }

    Ok(())
}

async fn cmd_doctor(config: &Config, token: &str) -> Result<()> {
    let health = HealthCheck::run(config, token).await;
    print_health_report(&health);

    if !health.all_passed() {
        anyhow::bail!("Some checks failed");
    }
    Ok(())
}

/// Print health check report to stdout
fn print_health_report(health: &HealthCheck) {
    fn print_check(name: &str, result: &CheckResult) {
        println!("{}:", name);
        let icon = if result.passed {
            if result.is_warning {
                "⚠️ "
            } else {
                "✅"
            }
        } else {
            "❌"
        };
        println!("  {} {}", icon, result.message);
        if let Some(details) = &result.details {
            for line in details.lines() {
                println!("     {}", line);
            }
        }
    }

    println!("🔍 gitlab-mirror System Diagnostics");
    println!();

    for (name, result) in health.all_checks() {
        print_check(name, result);
        println!();
    }

    let warnings = health.warnings().len();
    if warnings > 0 {
        println!("⚠️  {} warning(s)", warnings);
    }

    if health.all_passed() {
        println!("✅ All checks passed");
    } else {
        println!("❌ Some checks failed");
    }
}
