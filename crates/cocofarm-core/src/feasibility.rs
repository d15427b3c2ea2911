//! Hard pass/fail check of one task against one weather observation.
//!
//! Seven independent conditions, all inclusive:
//!
//! | Condition     | Passes when                              |
//! |---------------|------------------------------------------|
//! | temperature   | `min <= temperature <= max`              |
//! | humidity      | `min <= humidity <= max`                 |
//! | condition     | unrestricted, or code in the allowed set |
//! | wind speed    | `wind_speed <= max`                      |
//! | wind gust     | `wind_gust <= max` (gust defaults to 0)  |
//! | cloud cover   | `cloud_cover <= max`                     |
//! | pressure      | `min <= pressure <= max`                 |
//!
//! A missing reading or a missing bound fails its condition.

use serde::{Deserialize, Serialize};

use crate::catalog::TaskDefinition;
use crate::weather::WeatherObservation;

/// Per-condition verdicts for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityReport {
    pub temperature: bool,
    pub humidity: bool,
    pub condition: bool,
    pub wind_speed: bool,
    pub wind_gust: bool,
    pub cloud_cover: bool,
    pub pressure: bool,
}

impl FeasibilityReport {
    pub fn evaluate(weather: &WeatherObservation, task: &TaskDefinition) -> Self {
        Self {
            temperature: within(weather.temperature, task.temperature_min, task.temperature_max),
            humidity: within(weather.humidity, task.humidity_min, task.humidity_max),
            condition: task.restrictions.permits(weather.condition_code),
            wind_speed: at_most(weather.wind_speed, task.wind_speed_max),
            wind_gust: at_most(Some(weather.wind_gust), task.wind_gust_max),
            cloud_cover: at_most(weather.cloud_cover, task.cloud_cover_max),
            pressure: within(weather.pressure, task.pressure_min, task.pressure_max),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.failed().is_empty()
    }

    /// Names of the conditions that did not hold, in table order.
    pub fn failed(&self) -> Vec<&'static str> {
        [
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("condition", self.condition),
            ("windSpeed", self.wind_speed),
            ("windGust", self.wind_gust),
            ("cloudCover", self.cloud_cover),
            ("pressure", self.pressure),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| name)
        .collect()
    }
}

/// Whether `task` can be carried out in `weather`.
pub fn evaluate_feasibility(weather: &WeatherObservation, task: &TaskDefinition) -> bool {
    FeasibilityReport::evaluate(weather, task).is_feasible()
}

/// [`evaluate_feasibility`] for callers holding possibly-absent inputs.
/// Absent weather or task is never feasible.
pub fn evaluate_optional(
    weather: Option<&WeatherObservation>,
    task: Option<&TaskDefinition>,
) -> bool {
    match (weather, task) {
        (Some(w), Some(t)) => evaluate_feasibility(w, t),
        _ => false,
    }
}

fn within(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    match (value, min, max) {
        (Some(v), Some(lo), Some(hi)) => v >= lo && v <= hi,
        _ => false,
    }
}

fn at_most(value: Option<f64>, max: Option<f64>) -> bool {
    match (value, max) {
        (Some(v), Some(hi)) => v <= hi,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TaskId;

    fn harvest_task() -> TaskDefinition {
        TaskDefinition::new(TaskId::Number(1), "Harvesting")
            .with_temperature(24.0, 32.0)
            .with_humidity(40.0, 80.0)
            .with_pressure(1000.0, 1020.0)
            .with_wind_speed_max(10.0)
            .with_wind_gust_max(15.0)
            .with_cloud_cover_max(70.0)
    }

    fn fair_weather() -> WeatherObservation {
        WeatherObservation {
            temperature: Some(28.0),
            humidity: Some(60.0),
            pressure: Some(1010.0),
            wind_speed: Some(5.0),
            wind_gust: 7.0,
            cloud_cover: Some(40.0),
            condition_code: Some(800),
        }
    }

    #[test]
    fn test_fair_weather_is_feasible() {
        assert!(evaluate_feasibility(&fair_weather(), &harvest_task()));
    }

    #[test]
    fn test_wind_speed_over_max_fails() {
        let weather = WeatherObservation {
            wind_speed: Some(15.0),
            ..fair_weather()
        };
        let report = FeasibilityReport::evaluate(&weather, &harvest_task());
        assert!(!report.is_feasible());
        assert_eq!(report.failed(), vec!["windSpeed"]);
    }

    #[test]
    fn test_restricted_condition_fails() {
        let task = harvest_task().with_restrictions([800, 801]);
        let weather = WeatherObservation {
            condition_code: Some(500),
            ..fair_weather()
        };
        assert!(!evaluate_feasibility(&weather, &task));
        assert!(evaluate_feasibility(&fair_weather(), &task));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let weather = WeatherObservation {
            temperature: Some(32.0),
            humidity: Some(40.0),
            pressure: Some(1020.0),
            wind_speed: Some(10.0),
            wind_gust: 15.0,
            cloud_cover: Some(70.0),
            condition_code: Some(800),
        };
        assert!(evaluate_feasibility(&weather, &harvest_task()));
    }

    #[test]
    fn test_missing_reading_fails_closed() {
        let weather = WeatherObservation {
            humidity: None,
            ..fair_weather()
        };
        let report = FeasibilityReport::evaluate(&weather, &harvest_task());
        assert_eq!(report.failed(), vec!["humidity"]);
    }

    #[test]
    fn test_missing_bound_fails_closed() {
        let mut task = harvest_task();
        task.pressure_max = None;
        assert!(!evaluate_feasibility(&fair_weather(), &task));
    }

    #[test]
    fn test_default_gust_passes_gust_check() {
        let weather = WeatherObservation {
            wind_gust: 0.0,
            ..fair_weather()
        };
        let task = harvest_task().with_wind_gust_max(0.0);
        assert!(evaluate_feasibility(&weather, &task));
    }

    #[test]
    fn test_absent_inputs_are_infeasible() {
        let task = harvest_task();
        let weather = fair_weather();
        assert!(!evaluate_optional(None, Some(&task)));
        assert!(!evaluate_optional(Some(&weather), None));
        assert!(evaluate_optional(Some(&weather), Some(&task)));
    }

    #[test]
    fn test_multiple_failures_listed_in_order() {
        let weather = WeatherObservation {
            temperature: Some(40.0),
            cloud_cover: Some(95.0),
            ..fair_weather()
        };
        let report = FeasibilityReport::evaluate(&weather, &harvest_task());
        assert_eq!(report.failed(), vec!["temperature", "cloudCover"]);
    }
}
