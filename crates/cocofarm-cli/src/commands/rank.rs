//! Ranking and single-task feasibility commands.

use std::path::{Path, PathBuf};

use clap::Args;
use cocofarm_core::{rank_tasks, FeasibilityReport, WeatherObservation};

use super::{load_catalog, print_ranked, read_json};

#[derive(Args)]
pub struct RankArgs {
    /// Weather observation JSON (live or stored shape)
    #[arg(long)]
    weather: PathBuf,
    /// Task catalog JSON array
    #[arg(long)]
    tasks: PathBuf,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Weather observation JSON (live or stored shape)
    #[arg(long)]
    weather: PathBuf,
    /// Task catalog JSON array
    #[arg(long)]
    tasks: PathBuf,
    /// Task name to check
    #[arg(long)]
    task: String,
}

fn load_weather(path: &Path) -> Result<WeatherObservation, Box<dyn std::error::Error>> {
    let payload = read_json(path)?;
    let observation = WeatherObservation::try_from(&payload)?;
    Ok(observation)
}

pub fn run_rank(args: RankArgs) -> Result<(), Box<dyn std::error::Error>> {
    let weather = load_weather(&args.weather)?;
    let catalog = load_catalog(&args.tasks)?;
    let ranked = rank_tasks(&weather, catalog.tasks());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        let group = weather.condition_group();
        println!(
            "Conditions: {}{} | {} of {} tasks feasible",
            group,
            if group.is_wet() { " (wet)" } else { "" },
            ranked.len(),
            catalog.len()
        );
        print_ranked(&ranked);
    }
    Ok(())
}

pub fn run_check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let weather = load_weather(&args.weather)?;
    let catalog = load_catalog(&args.tasks)?;
    let task = catalog
        .find_by_name(&args.task)
        .ok_or_else(|| format!("task not found: {}", args.task))?;

    let report = FeasibilityReport::evaluate(&weather, task);
    if report.is_feasible() {
        println!("{}: feasible", task.task_name);
    } else {
        println!(
            "{}: not feasible ({})",
            task.task_name,
            report.failed().join(", ")
        );
    }
    Ok(())
}
