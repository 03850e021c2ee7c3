use std::sync::Arc;

use crate::cli::{Cli, Commands};
use crate::config::{load_config, validator::validate_config, Config};
use crate::error::{AppError, Context, Result};
use crate::records::{export_csv, growth_summary, HistoryStore, JsonHistoryStore};
use crate::services::{watch_profiles, FollowerService};
use crate::ui::run_history_chart;
use crate::utils::{current_human_timestamp, ProfileRef};

/// Resolve configuration for `cli` and run the requested command.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    validate_config(&config)?;

    match cli.command {
        Commands::Fetch { profile } => fetch_once(&config, profile).await,
        Commands::History { profile } => print_history(&config, profile),
        Commands::Watch { .. } => watch(&config).await,
        Commands::Export { output } => {
            let history = history_store(&config).read_history();
            let rows = export_csv(&history, &output)?;
            println!("Exported {rows} samples to {}", output.display());
            Ok(())
        }
        Commands::Growth { profile, days } => print_growth(&config, &profile, days),
        Commands::Chart { profile } => {
            let profile = ProfileRef::parse(&profile)?;
            let history = history_store(&config).profile_history(&profile.username);
            run_history_chart(&profile.username, &history)
        }
    }
}

fn history_store(config: &Config) -> JsonHistoryStore {
    JsonHistoryStore::new(config.history_file.clone())
}

async fn fetch_once(config: &Config, profile: Option<String>) -> Result<()> {
    let identifier = match profile {
        Some(profile) => profile,
        None => config
            .primary_profile()
            .map(str::to_string)
            .ok_or_else(|| AppError::message("No profile given and none configured"))?,
    };

    let service = FollowerService::from_config(config)?;
    let count = service.get_follower_count(&identifier).await?;
    println!("{count}");
    Ok(())
}

fn print_history(config: &Config, profile: Option<String>) -> Result<()> {
    let store = history_store(config);
    let json = match profile {
        Some(profile) => {
            let profile = ProfileRef::parse(&profile)?;
            serde_json::to_string_pretty(&store.profile_history(&profile.username))?
        }
        None => serde_json::to_string_pretty(&store.read_document())?,
    };
    println!("{json}");
    Ok(())
}

fn print_growth(config: &Config, profile: &str, days: u32) -> Result<()> {
    let profile = ProfileRef::parse(profile)?;
    let history = history_store(config).profile_history(&profile.username);

    match growth_summary(&history, days) {
        Some(summary) => println!(
            "{}: {} followers on {} ({} since {})",
            profile,
            summary.latest,
            summary.latest_date,
            summary.describe(),
            summary.baseline_date
        ),
        None => println!("{profile}: no samples recorded yet"),
    }
    Ok(())
}

async fn watch(config: &Config) -> Result<()> {
    let service = Arc::new(
        FollowerService::from_config(config).context("Failed to set up follower service")?,
    );

    log::info!(
        "watching {} profile(s) every {} minute(s) since {}",
        config.profile_urls.len(),
        config.watch_interval_minutes,
        current_human_timestamp()
    );

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    watch_profiles(
        service,
        config.profile_urls.clone(),
        config.watch_interval(),
        config.watch_concurrency,
        shutdown,
    )
    .await;
    Ok(())
}
