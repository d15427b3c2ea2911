pub mod cache;
mod config;

pub use cache::{CacheDb, KeyValueStore, MemoryStore};
pub use config::{ApiConfig, CacheConfig, Config, FarmConfig, ScoringConfig};

use std::path::PathBuf;

/// Returns `~/.config/cocofarm[-dev]/` based on COCOFARM_ENV.
///
/// Set COCOFARM_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("COCOFARM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("cocofarm-dev")
    } else {
        base_dir.join("cocofarm")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
