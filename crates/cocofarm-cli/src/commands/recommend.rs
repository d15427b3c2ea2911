//! Offline-first recommendation: provider + cache + ranking.

use chrono::{DateTime, Utc};
use clap::Args;
use cocofarm_core::storage::cache::{CURRENT_WEATHER_KEY, TASKS_KEY};
use cocofarm_core::{
    normalize_weather, rank_tasks, ApiClient, CacheDb, Config, DataSource, KeyValueStore,
    MemoryStore, OfflineFirst, TaskCatalog,
};

use super::print_ranked;

#[derive(Args)]
pub struct RecommendArgs {
    /// Use cached data only
    #[arg(long)]
    offline: bool,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: RecommendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Runtime::new()?;

    if !config.cache.enabled {
        return runtime.block_on(recommend(&config, MemoryStore::new(), args));
    }
    match CacheDb::open() {
        Ok(store) => runtime.block_on(recommend(&config, store, args)),
        Err(e) => {
            tracing::warn!(error = %e, "offline cache unavailable, continuing without it");
            runtime.block_on(recommend(&config, MemoryStore::new(), args))
        }
    }
}

/// "(offline: ...)" banner with the age of the oldest cached payload used.
fn offline_banner(cached_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match cached_at {
        Some(at) => {
            let minutes = (now - at).num_minutes().max(0);
            if minutes < 60 {
                format!("(offline: showing cached data from {minutes} min ago)")
            } else {
                format!("(offline: showing cached data from {} h ago)", minutes / 60)
            }
        }
        None => "(offline: showing cached data)".to_string(),
    }
}

async fn recommend<S: KeyValueStore>(
    config: &Config,
    store: S,
    args: RecommendArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = if args.offline {
        OfflineFirst::offline(store)
    } else {
        OfflineFirst::new(ApiClient::from_config(config)?, store)
    };

    let tasks = provider.tasks().await?;
    let weather = provider.current_weather().await?;
    let catalog = TaskCatalog::from_value(tasks.payload, config.scoring.restriction_policy)?;
    let observation = normalize_weather(Some(&weather.payload))
        .ok_or("weather data is missing required fields")?;
    let ranked = rank_tasks(&observation, catalog.tasks());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    let mut cached_at = None;
    for (key, source) in [(TASKS_KEY, tasks.source), (CURRENT_WEATHER_KEY, weather.source)] {
        if source == DataSource::Cache {
            let stamp = provider.store().updated_at(key)?;
            cached_at = match (cached_at, stamp) {
                (Some(a), Some(b)) => Some(std::cmp::min(a, b)),
                (a, b) => a.or(b),
            };
        }
    }
    if tasks.source == DataSource::Cache || weather.source == DataSource::Cache {
        println!("{}", offline_banner(cached_at, Utc::now()));
    }
    print_ranked(&ranked);
    Ok(())
}
