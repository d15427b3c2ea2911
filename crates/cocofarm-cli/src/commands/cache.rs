use clap::Subcommand;
use cocofarm_core::storage::cache::{CURRENT_WEATHER_KEY, FORECAST_KEY, TASKS_KEY};
use cocofarm_core::{CacheDb, KeyValueStore};

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show when each cached payload was last refreshed
    Status,
    /// Delete every cached payload
    Clear,
}

pub fn run(action: CacheAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = CacheDb::open()?;
    match action {
        CacheAction::Status => {
            for key in [TASKS_KEY, CURRENT_WEATHER_KEY, FORECAST_KEY] {
                match db.updated_at(key)? {
                    Some(at) => println!("{key:<16} {}", at.format("%Y-%m-%d %H:%M UTC")),
                    None => println!("{key:<16} (empty)"),
                }
            }
        }
        CacheAction::Clear => {
            let removed = db.clear()?;
            println!("Removed {removed} cached entries.");
        }
    }
    Ok(())
}
