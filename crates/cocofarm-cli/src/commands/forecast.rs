//! Forecast planning commands.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use cocofarm_core::{best_per_slot, check_scheduled, feasible_windows, parse_forecast};

use super::{load_catalog, read_json};

#[derive(Subcommand)]
pub enum ForecastAction {
    /// List forecast slots in which tasks are feasible
    Windows {
        /// Forecast JSON (live list or stored rows)
        #[arg(long)]
        forecast: PathBuf,
        /// Task catalog JSON array
        #[arg(long)]
        tasks: PathBuf,
        /// Only this task (default: best task per slot)
        #[arg(long)]
        task: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check a scheduled task against the nearest forecast slot
    Scheduled {
        /// Forecast JSON (live list or stored rows)
        #[arg(long)]
        forecast: PathBuf,
        /// Task catalog JSON array
        #[arg(long)]
        tasks: PathBuf,
        /// Task name
        #[arg(long)]
        task: String,
        /// Scheduled time (RFC 3339)
        #[arg(long)]
        at: DateTime<Utc>,
    },
}

pub fn run(action: ForecastAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ForecastAction::Windows {
            forecast,
            tasks,
            task,
            json,
        } => {
            let slots = parse_forecast(&read_json(&forecast)?);
            let catalog = load_catalog(&tasks)?;

            match task {
                Some(name) => {
                    let task = catalog
                        .find_by_name(&name)
                        .ok_or_else(|| format!("task not found: {name}"))?;
                    let windows = feasible_windows(task, &slots);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&windows)?);
                    } else if windows.is_empty() {
                        println!("{name}: no feasible slot in the forecast");
                    } else {
                        for w in &windows {
                            println!(
                                "{}  {:>5.1}%",
                                w.at.format("%Y-%m-%d %H:%M"),
                                w.weather_match_score * 100.0
                            );
                        }
                    }
                }
                None => {
                    let recs = best_per_slot(&slots, catalog.tasks());
                    if json {
                        println!("{}", serde_json::to_string_pretty(&recs)?);
                    } else {
                        for rec in &recs {
                            match &rec.best {
                                Some(best) => println!(
                                    "{}  {:<28} {:>5.1}%",
                                    rec.at.format("%Y-%m-%d %H:%M"),
                                    best.task.task_name,
                                    best.weather_match_score * 100.0
                                ),
                                None => println!("{}  -", rec.at.format("%Y-%m-%d %H:%M")),
                            }
                        }
                    }
                }
            }
        }
        ForecastAction::Scheduled {
            forecast,
            tasks,
            task,
            at,
        } => {
            let slots = parse_forecast(&read_json(&forecast)?);
            let catalog = load_catalog(&tasks)?;
            let task = catalog
                .find_by_name(&task)
                .ok_or_else(|| format!("task not found: {task}"))?;

            match check_scheduled(task, &slots, at) {
                Some(check) if check.feasible => println!(
                    "{}: feasible (forecast slot {})",
                    task.task_name,
                    check.slot_at.format("%Y-%m-%d %H:%M")
                ),
                Some(check) => println!(
                    "{}: not feasible ({}; forecast slot {})",
                    task.task_name,
                    check.report.failed().join(", "),
                    check.slot_at.format("%Y-%m-%d %H:%M")
                ),
                None => return Err(format!("{at} is outside the forecast horizon").into()),
            }
        }
    }
    Ok(())
}
