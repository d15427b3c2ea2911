use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cocofarm", version, about = "Coconut farm task advisor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank feasible tasks for one weather observation
    Rank(commands::rank::RankArgs),
    /// Check whether a single task is feasible
    Check(commands::rank::CheckArgs),
    /// Forecast-based planning
    Forecast {
        #[command(subcommand)]
        action: commands::forecast::ForecastAction,
    },
    /// Fetch tasks and weather (or use the offline cache) and rank
    Recommend(commands::recommend::RecommendArgs),
    /// Offline cache management
    Cache {
        #[command(subcommand)]
        action: commands::cache::CacheAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Rank(args) => commands::rank::run_rank(args),
        Commands::Check(args) => commands::rank::run_check(args),
        Commands::Forecast { action } => commands::forecast::run(action),
        Commands::Recommend(args) => commands::recommend::run(args),
        Commands::Cache { action } => commands::cache::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
