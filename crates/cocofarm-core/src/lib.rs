//! # Cocofarm Core Library
//!
//! Recommends coconut farm tasks from weather data. The heart of the library
//! is a pure scoring engine; everything around it exists to feed it data,
//! online or offline.
//!
//! ## Architecture
//!
//! - **Weather**: normalizes live-API and cached payloads into one canonical
//!   observation
//! - **Catalog**: decodes task definitions and their condition restrictions
//!   once, at load time
//! - **Feasibility**: strict pass/fail of a task against hard thresholds
//! - **Scoring**: continuous match score and dense ranking of feasible tasks
//! - **Forecast**: feasible windows and scheduled-task checks over a forecast
//! - **Storage**: TOML configuration and the SQLite offline cache
//! - **Provider**: HTTP client for the farm API with cache fallback
//!
//! ## Key Components
//!
//! - [`evaluate_feasibility`]: hard feasibility gate
//! - [`rank_tasks`]: ranked, scored task list for one observation
//! - [`TaskCatalog`]: decoded task catalog
//! - [`OfflineFirst`]: network-first provider with offline fallback

pub mod catalog;
pub mod error;
pub mod feasibility;
pub mod forecast;
pub mod provider;
pub mod scoring;
pub mod storage;
pub mod weather;

pub use catalog::{RestrictionPolicy, Restrictions, TaskCatalog, TaskDefinition, TaskId};
pub use error::{
    CacheError, CatalogError, ConfigError, CoreError, NormalizationError, ProviderError,
    TaskParseError,
};
pub use feasibility::{evaluate_feasibility, evaluate_optional, FeasibilityReport};
pub use forecast::{
    best_per_slot, check_scheduled, feasible_windows, parse_forecast, FeasibleWindow,
    ForecastSlot, ScheduledCheck, SlotRecommendation,
};
pub use provider::{ApiClient, DataSource, Fetched, OfflineFirst};
pub use scoring::{rank_tasks, score_parameter, DimensionScore, RankedTask};
pub use storage::{CacheDb, Config, KeyValueStore, MemoryStore};
pub use weather::{normalize_weather, ConditionGroup, WeatherObservation};
