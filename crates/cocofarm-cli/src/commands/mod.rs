pub mod cache;
pub mod config;
pub mod forecast;
pub mod rank;
pub mod recommend;

use std::path::Path;

use cocofarm_core::{Config, RankedTask, TaskCatalog};

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| format!("{} is not valid JSON: {e}", path.display()))?;
    Ok(value)
}

/// Load a task catalog file using the configured restriction policy.
pub fn load_catalog(path: &Path) -> Result<TaskCatalog, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let catalog = TaskCatalog::from_value(read_json(path)?, config.scoring.restriction_policy)?;
    tracing::debug!(path = %path.display(), tasks = catalog.len(), "catalog loaded");
    Ok(catalog)
}

pub fn print_ranked(ranked: &[RankedTask]) {
    if ranked.is_empty() {
        println!("No task is feasible in this weather.");
        return;
    }
    for entry in ranked {
        println!(
            "{:>2}. {:<28} {:>5.1}%",
            entry.rank,
            entry.task.task_name,
            entry.weather_match_score * 100.0
        );
        for (name, detail) in &entry.score_details {
            println!("      {name:<12} {:.2}  {}", detail.score, detail.explanation);
        }
    }
}
