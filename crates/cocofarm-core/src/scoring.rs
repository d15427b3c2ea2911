//! Weather match scoring and task ranking.
//!
//! Tasks that pass [`evaluate_feasibility`] get a continuous score describing
//! how close the weather sits to the middle of each tolerable range:
//!
//! ```text
//! dimension = weight * clamp(1 - |actual - centre| / half_range, 0, 1)
//! total     = sum(dimension) / sum(weight)
//! ```
//!
//! Temperature carries weight 2; humidity, pressure, wind speed, wind gust,
//! cloud cover and condition carry weight 1. Wind speed, gust and cloud cover
//! are scored over `[0, max]`. The condition dimension is binary.
//!
//! Ranking is dense (1..=N) over feasible tasks only, best first. Equal scores
//! keep catalog order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::TaskDefinition;
use crate::feasibility::evaluate_feasibility;
use crate::weather::{ConditionGroup, WeatherObservation};

pub const TEMPERATURE_WEIGHT: f64 = 2.0;
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Sum of all dimension weights.
pub const TOTAL_WEIGHT: f64 = TEMPERATURE_WEIGHT + 6.0 * DEFAULT_WEIGHT;

/// Score for one weather dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Closeness to the centre of the range (0.0 to 1.0), before weighting
    pub score: f64,
    pub weight: f64,
    pub explanation: String,
}

impl DimensionScore {
    pub fn contribution(&self) -> f64 {
        self.score * self.weight
    }
}

/// A feasible task with its match score and rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTask {
    #[serde(flatten)]
    pub task: TaskDefinition,
    pub weather_match_score: f64,
    pub score_details: BTreeMap<String, DimensionScore>,
    pub rank: usize,
}

/// Weighted closeness of `actual` to the centre of `[min, max]`.
///
/// 1.0 (times weight) at the centre, 0.0 at either edge and outside the
/// range. A zero-width range scores full weight only on an exact hit.
pub fn score_parameter(actual: f64, min: f64, max: f64, weight: f64) -> f64 {
    if actual < min || actual > max {
        return 0.0;
    }
    let half_range = (max - min) / 2.0;
    if half_range <= 0.0 {
        return weight;
    }
    let centre = (min + max) / 2.0;
    let normalized = 1.0 - (actual - centre).abs() / half_range;
    normalized.clamp(0.0, 1.0) * weight
}

fn range_dimension(
    label: &str,
    unit: &str,
    actual: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    weight: f64,
) -> DimensionScore {
    match (actual, min, max) {
        (Some(v), Some(lo), Some(hi)) => {
            let weighted = score_parameter(v, lo, hi, weight);
            let score = if weight > 0.0 { weighted / weight } else { 0.0 };
            let explanation = if v < lo || v > hi {
                format!("{label} {v:.1}{unit} outside {lo:.1}..{hi:.1}{unit}")
            } else {
                format!(
                    "{label} {v:.1}{unit} within {lo:.1}..{hi:.1}{unit} (ideal {:.1}{unit})",
                    (lo + hi) / 2.0
                )
            };
            DimensionScore {
                score,
                weight,
                explanation,
            }
        }
        (None, _, _) => DimensionScore {
            score: 0.0,
            weight,
            explanation: format!("{label} not reported"),
        },
        _ => DimensionScore {
            score: 0.0,
            weight,
            explanation: format!("{label} has no required range"),
        },
    }
}

fn condition_dimension(weather: &WeatherObservation, task: &TaskDefinition) -> DimensionScore {
    let permitted = task.restrictions.permits(weather.condition_code);
    let group = weather.condition_group();
    let explanation = match (task.restrictions.is_unrestricted(), weather.condition_code) {
        (true, _) => "no weather restriction".to_string(),
        (false, Some(code)) if permitted => format!("condition {code} ({group}) allowed"),
        (false, Some(code)) => format!("condition {code} ({group}) not allowed"),
        (false, None) => format!("condition not reported ({})", ConditionGroup::Unknown),
    };
    DimensionScore {
        score: if permitted { 1.0 } else { 0.0 },
        weight: DEFAULT_WEIGHT,
        explanation,
    }
}

/// Per-dimension scores for one task, keyed by dimension name.
///
/// Does not check feasibility; out-of-range dimensions simply score 0.
pub fn score_dimensions(
    weather: &WeatherObservation,
    task: &TaskDefinition,
) -> BTreeMap<String, DimensionScore> {
    let mut details = BTreeMap::new();
    details.insert(
        "temperature".to_string(),
        range_dimension(
            "temperature",
            "°C",
            weather.temperature,
            task.temperature_min,
            task.temperature_max,
            TEMPERATURE_WEIGHT,
        ),
    );
    details.insert(
        "humidity".to_string(),
        range_dimension(
            "humidity",
            "%",
            weather.humidity,
            task.humidity_min,
            task.humidity_max,
            DEFAULT_WEIGHT,
        ),
    );
    details.insert(
        "pressure".to_string(),
        range_dimension(
            "pressure",
            " hPa",
            weather.pressure,
            task.pressure_min,
            task.pressure_max,
            DEFAULT_WEIGHT,
        ),
    );
    details.insert(
        "windSpeed".to_string(),
        range_dimension(
            "wind speed",
            " m/s",
            weather.wind_speed,
            Some(0.0),
            task.wind_speed_max,
            DEFAULT_WEIGHT,
        ),
    );
    details.insert(
        "windGust".to_string(),
        range_dimension(
            "wind gust",
            " m/s",
            Some(weather.wind_gust),
            Some(0.0),
            task.wind_gust_max,
            DEFAULT_WEIGHT,
        ),
    );
    details.insert(
        "cloudCover".to_string(),
        range_dimension(
            "cloud cover",
            "%",
            weather.cloud_cover,
            Some(0.0),
            task.cloud_cover_max,
            DEFAULT_WEIGHT,
        ),
    );
    details.insert("condition".to_string(), condition_dimension(weather, task));
    details
}

/// Overall match score (0.0 to 1.0) from dimension scores.
pub fn match_score(details: &BTreeMap<String, DimensionScore>) -> f64 {
    let weight: f64 = details.values().map(|d| d.weight).sum();
    if weight <= 0.0 {
        return 0.0;
    }
    let total: f64 = details.values().map(DimensionScore::contribution).sum();
    (total / weight).clamp(0.0, 1.0)
}

/// Rank the feasible tasks for `weather`, best match first.
///
/// Infeasible tasks are dropped. Pure and deterministic: the same inputs
/// always produce the same output.
pub fn rank_tasks(weather: &WeatherObservation, tasks: &[TaskDefinition]) -> Vec<RankedTask> {
    let mut ranked: Vec<RankedTask> = tasks
        .iter()
        .filter(|task| evaluate_feasibility(weather, task))
        .map(|task| {
            let score_details = score_dimensions(weather, task);
            RankedTask {
                task: task.clone(),
                weather_match_score: match_score(&score_details),
                score_details,
                rank: 0,
            }
        })
        .collect();

    // stable: ties keep catalog order
    ranked.sort_by(|a, b| b.weather_match_score.total_cmp(&a.weather_match_score));
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    ranked
}
