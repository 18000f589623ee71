use super::error;
use super::output;
use super::{Commands, ConfigAction};
use crate::app::config::Config;
use crate::app::settings::ResolvedPollSettings;
use crate::app::state::AppState;
use crate::page::document::Page;
use crate::page::markup::render_listing;
use crate::page::theme::{self, Theme};
use crate::sync::poll::{build_client, fetch_snapshots, PollLoop};
use crate::sync::reconcile::reconcile_batch;
use crate::sync::snapshot::DownloadSnapshot;
use anyhow::{Context, Result};
use std::time::Duration;

/// Handle a CLI command and return exit code
pub async fn handle_command(command: Commands, state: AppState) -> i32 {
    let result = match command {
        Commands::Watch { endpoint, interval_ms } => handle_watch(endpoint, interval_ms, &state).await,
        Commands::Once { endpoint, json } => handle_once(endpoint, json, &state).await,
        Commands::Config { action } => handle_config(action, &state).await,
        Commands::Theme { mode } => handle_theme(mode, &state).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            error::ERROR
        }
    }
}

/// Resolve poll settings, reporting bad overrides as invalid input
async fn resolve_settings(
    state: &AppState,
    endpoint: Option<String>,
    interval_ms: Option<u64>,
) -> Result<ResolvedPollSettings, i32> {
    state
        .poll_settings(endpoint.as_deref(), interval_ms)
        .await
        .map_err(|e| {
            eprintln!("Error: {}", e);
            error::INVALID_INPUT
        })
}

/// Follow progress until Ctrl+C
async fn handle_watch(endpoint: Option<String>, interval_ms: Option<u64>, state: &AppState) -> Result<i32> {
    let settings = match resolve_settings(state, endpoint, interval_ms).await {
        Ok(settings) => settings,
        Err(code) => return Ok(code),
    };

    let client = build_client(&settings.user_agent, settings.request_timeout)?;
    let Some(batch) = wait_for_first_batch(&client, &settings).await else {
        return Ok(error::SUCCESS);
    };

    // Seed the listing from the first batch, then let the loop keep it current
    let mut listing = render_listing(&batch);
    reconcile_batch(&mut listing, &batch, &settings.options.display);
    let page = state.share_page(listing).await;

    let poll = PollLoop::new(client, settings.options.clone(), page.clone());
    let Some(handle) = poll.start().await else {
        return Ok(error::SUCCESS);
    };

    println!("Watching {} (Ctrl+C to stop)", settings.options.endpoint);

    let mut refresh = tokio::time::interval(settings.options.interval.max(Duration::from_millis(250)));
    let mut printed = output::ListingRefresh::default();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping progress polling");
                break;
            }
            _ = refresh.tick() => {
                if let Some(table) = printed.changed(&*page.read().await) {
                    println!("{}\n", table);
                }
            }
        }
    }

    handle.abort();
    Ok(error::SUCCESS)
}

/// Fetch the batch the listing is built from, retrying every interval while
/// the endpoint is unreachable. Returns None when interrupted first.
async fn wait_for_first_batch(
    client: &reqwest::Client,
    settings: &ResolvedPollSettings,
) -> Option<Vec<DownloadSnapshot>> {
    let endpoint = &settings.options.endpoint;
    let mut retry = tokio::time::interval(settings.options.interval);
    let mut reported = false;

    loop {
        let attempt = async {
            retry.tick().await;
            fetch_snapshots(client, endpoint).await
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => return None,
            result = attempt => match result {
                Ok(batch) => return Some(batch),
                Err(e) => {
                    tracing::warn!("Progress endpoint not ready: {}", e);
                    if !reported {
                        eprintln!("Waiting for {}: {}", endpoint, e);
                        reported = true;
                    }
                }
            },
        }
    }
}

/// Fetch one batch and print it
async fn handle_once(endpoint: Option<String>, json: bool, state: &AppState) -> Result<i32> {
    let settings = match resolve_settings(state, endpoint, None).await {
        Ok(settings) => settings,
        Err(code) => return Ok(code),
    };

    let client = build_client(&settings.user_agent, settings.request_timeout)?;
    let batch = fetch_snapshots(&client, &settings.options.endpoint)
        .await
        .context(format!("Failed to fetch {}", settings.options.endpoint))?;

    if json {
        println!("{}", output::format_batch_json(&batch));
        return Ok(error::SUCCESS);
    }

    let mut page = render_listing(&batch);
    reconcile_batch(&mut page, &batch, &settings.options.display);
    println!("{}", output::format_listing(&page));
    Ok(error::SUCCESS)
}

/// Manage configuration
async fn handle_config(action: ConfigAction, state: &AppState) -> Result<i32> {
    match action {
        ConfigAction::Get { key } => {
            let config = state.config.read().await;
            match get_config_value(&config, &key) {
                Some(value) => {
                    println!("{}", value);
                    Ok(error::SUCCESS)
                }
                None => {
                    eprintln!("Error: Unknown configuration key: {}", key);
                    Ok(error::INVALID_INPUT)
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = state.config.write().await;
            let mut updated = config.clone();
            if !set_config_value(&mut updated, &key, &value)? {
                eprintln!("Error: Unknown configuration key: {}", key);
                return Ok(error::INVALID_INPUT);
            }
            updated.save()?;
            *config = updated;
            println!("Configuration updated: {} = {}", key, value);
            Ok(error::SUCCESS)
        }
        ConfigAction::Show { json } => {
            let config = state.config.read().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&*config)?);
            } else {
                println!("{}", toml::to_string_pretty(&*config)?);
            }
            Ok(error::SUCCESS)
        }
        ConfigAction::Path => {
            let path = crate::util::paths::get_app_config_path()?;
            println!("{}", path.display());
            Ok(error::SUCCESS)
        }
    }
}

/// Get configuration value by dot notation key
fn get_config_value(config: &Config, key: &str) -> Option<String> {
    let parts: Vec<&str> = key.split('.').collect();

    let value = match parts.as_slice() {
        ["general", "theme"] => config.general.theme.clone(),
        ["poll", "endpoint"] => config.poll.endpoint.clone(),
        ["poll", "interval_ms"] => config.poll.interval_ms.to_string(),
        ["poll", "discard_stale_ticks"] => config.poll.discard_stale_ticks.to_string(),
        ["poll", "request_timeout_secs"] => config
            .poll
            .request_timeout_secs
            .map(|secs| secs.to_string())
            .unwrap_or_default(),
        ["network", "user_agent"] => config.network.user_agent.clone(),
        ["display", "utc_times"] => config.display.utc_times.to_string(),
        _ => return None,
    };
    Some(value)
}

/// Set configuration value by dot notation key. Returns false for unknown keys.
fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<bool> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "theme"] => config.general.theme = value.to_string(),
        ["poll", "endpoint"] => config.poll.endpoint = value.to_string(),
        ["poll", "interval_ms"] => config.poll.interval_ms = value.parse()?,
        ["poll", "discard_stale_ticks"] => config.poll.discard_stale_ticks = value.parse()?,
        ["poll", "request_timeout_secs"] => {
            config.poll.request_timeout_secs = if value.is_empty() {
                None
            } else {
                Some(value.parse()?)
            }
        }
        ["network", "user_agent"] => config.network.user_agent = value.to_string(),
        ["display", "utc_times"] => config.display.utc_times = value.parse()?,
        _ => return Ok(false),
    }

    Ok(true)
}

/// Show, set or toggle the saved theme
async fn handle_theme(mode: Option<String>, state: &AppState) -> Result<i32> {
    let mut config = state.config.write().await;

    let next = match mode.as_deref() {
        None => {
            match theme::saved_theme(&config) {
                Some(current) => println!("{}", current),
                None => println!("(none)"),
            }
            return Ok(error::SUCCESS);
        }
        Some("toggle") => {
            let mut page = Page::new();
            theme::restore_theme(&mut page, &config);
            theme::toggle_theme(&mut page)
        }
        Some(other) => match other.parse::<Theme>() {
            Ok(theme) => theme,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(error::INVALID_INPUT);
            }
        },
    };

    theme::remember_theme(&mut config, next);
    config.save()?;
    println!("Theme set to {}", next);
    Ok(error::SUCCESS)
}
