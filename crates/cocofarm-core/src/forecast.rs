//! Forecast slots: when can a task be done, and will a scheduled task work.
//!
//! A forecast payload is either a live-API list (`{"list": [ {dt, main, wind,
//! clouds, weather}, ... ]}`) or an array of stored rows carrying a
//! `timestamp` (RFC 3339) or `dt` (unix seconds) next to the flat readings.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::TaskDefinition;
use crate::feasibility::{evaluate_feasibility, FeasibilityReport};
use crate::scoring::{match_score, rank_tasks, score_dimensions, RankedTask};
use crate::weather::WeatherObservation;

/// Default spacing between forecast entries (3-hourly).
pub const DEFAULT_SLOT_SPAN_HOURS: i64 = 3;

/// One forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSlot {
    pub at: DateTime<Utc>,
    pub observation: WeatherObservation,
}

/// A slot in which a task is feasible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibleWindow {
    pub at: DateTime<Utc>,
    pub weather_match_score: f64,
}

/// Outcome of checking a scheduled task against the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCheck {
    pub scheduled_at: DateTime<Utc>,
    pub slot_at: DateTime<Utc>,
    pub feasible: bool,
    pub report: FeasibilityReport,
}

/// The best task for one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecommendation {
    pub at: DateTime<Utc>,
    pub best: Option<RankedTask>,
}

/// Parse a forecast payload into time-ordered slots.
///
/// Entries without a timestamp or whose weather cannot be normalized are
/// skipped.
pub fn parse_forecast(payload: &Value) -> Vec<ForecastSlot> {
    let entries: &[Value] = match payload {
        Value::Array(entries) => entries,
        Value::Object(obj) => match obj.get("list") {
            Some(Value::Array(entries)) => entries,
            _ => &[],
        },
        _ => &[],
    };

    let mut slots: Vec<ForecastSlot> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let Some(at) = entry_time(entry) else {
                tracing::debug!(index, "forecast entry without timestamp skipped");
                return None;
            };
            match WeatherObservation::try_from(entry) {
                Ok(observation) => Some(ForecastSlot { at, observation }),
                Err(e) => {
                    tracing::debug!(index, error = %e, "forecast entry skipped");
                    None
                }
            }
        })
        .collect();

    slots.sort_by_key(|slot| slot.at);
    slots
}

fn entry_time(entry: &Value) -> Option<DateTime<Utc>> {
    if let Some(dt) = entry.get("dt").and_then(Value::as_i64) {
        return DateTime::from_timestamp(dt, 0);
    }
    entry
        .get("timestamp")
        .or_else(|| entry.get("dt_txt"))
        .and_then(Value::as_str)
        .and_then(parse_time)
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    // "2024-05-01 12:00:00" as sent in dt_txt
    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Slots in which `task` is feasible, in time order, with their match score.
pub fn feasible_windows(task: &TaskDefinition, slots: &[ForecastSlot]) -> Vec<FeasibleWindow> {
    slots
        .iter()
        .filter(|slot| evaluate_feasibility(&slot.observation, task))
        .map(|slot| FeasibleWindow {
            at: slot.at,
            weather_match_score: match_score(&score_dimensions(&slot.observation, task)),
        })
        .collect()
}

/// Check a task scheduled at `when` against the slot nearest to it.
///
/// Returns `None` when `when` lies outside the forecast horizon (more than
/// one slot span before the first slot or after the last).
pub fn check_scheduled(
    task: &TaskDefinition,
    slots: &[ForecastSlot],
    when: DateTime<Utc>,
) -> Option<ScheduledCheck> {
    let span = Duration::hours(DEFAULT_SLOT_SPAN_HOURS);
    let first = slots.first()?;
    let last = slots.last()?;
    if when < first.at - span || when > last.at + span {
        return None;
    }

    let nearest = slots
        .iter()
        .min_by_key(|slot| (slot.at - when).num_seconds().abs())?;
    let report = FeasibilityReport::evaluate(&nearest.observation, task);
    Some(ScheduledCheck {
        scheduled_at: when,
        slot_at: nearest.at,
        feasible: report.is_feasible(),
        report,
    })
}

/// Rank-1 task for every slot (`None` where nothing is feasible).
pub fn best_per_slot(slots: &[ForecastSlot], tasks: &[TaskDefinition]) -> Vec<SlotRecommendation> {
    slots
        .iter()
        .map(|slot| SlotRecommendation {
            at: slot.at,
            best: rank_tasks(&slot.observation, tasks).into_iter().next(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TaskId;
    use serde_json::json;

    fn live_entry(dt: i64, wind: f64, code: i32) -> Value {
        json!({
            "dt": dt,
            "main": { "temp": 28.0, "humidity": 60, "pressure": 1010 },
            "wind": { "speed": wind, "gust": 7.0 },
            "clouds": { "all": 40 },
            "weather": [ { "id": code } ]
        })
    }

    fn harvest_task() -> TaskDefinition {
        TaskDefinition::new(TaskId::Number(1), "Harvesting")
            .with_temperature(24.0, 32.0)
            .with_humidity(40.0, 80.0)
            .with_pressure(1000.0, 1020.0)
            .with_wind_speed_max(10.0)
            .with_wind_gust_max(15.0)
            .with_cloud_cover_max(70.0)
    }

    const T0: i64 = 1_714_564_800; // 2024-05-01T12:00:00Z

    #[test]
    fn test_parse_live_list_sorted() {
        let payload = json!({ "list": [
            live_entry(T0 + 3 * 3600, 5.0, 800),
            live_entry(T0, 5.0, 800),
        ]});
        let slots = parse_forecast(&payload);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].at.timestamp(), T0);
        assert_eq!(slots[1].at.timestamp(), T0 + 3 * 3600);
    }

    #[test]
    fn test_parse_stored_rows() {
        let payload = json!([
            {
                "timestamp": "2024-05-01T12:00:00Z",
                "temperature": 27.0, "humidity": 70, "pressure": 1008,
                "wind_speed": 3.0, "clouds": 20, "weather_id": 801
            },
            { "timestamp": "2024-05-01 15:00:00", "temperature": 29.0 }
        ]);
        let slots = parse_forecast(&payload);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].observation.condition_code, Some(801));
        assert_eq!(slots[1].at.timestamp(), T0 + 3 * 3600);
    }

    #[test]
    fn test_unusable_entries_skipped() {
        let payload = json!({ "list": [
            live_entry(T0, 5.0, 800),
            { "dt": T0 + 3600, "weather": [] },
            { "main": { "temp": 1.0 } }
        ]});
        assert_eq!(parse_forecast(&payload).len(), 1);
        assert!(parse_forecast(&json!("nope")).is_empty());
    }

    #[test]
    fn test_feasible_windows() {
        let slots = parse_forecast(&json!({ "list": [
            live_entry(T0, 5.0, 800),
            live_entry(T0 + 3 * 3600, 14.0, 800),
            live_entry(T0 + 6 * 3600, 2.0, 801),
        ]}));
        let windows = feasible_windows(&harvest_task(), &slots);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].at.timestamp(), T0);
        assert_eq!(windows[1].at.timestamp(), T0 + 6 * 3600);
        assert!(windows.iter().all(|w| w.weather_match_score > 0.0));
    }

    #[test]
    fn test_check_scheduled_uses_nearest_slot() {
        let slots = parse_forecast(&json!({ "list": [
            live_entry(T0, 5.0, 800),
            live_entry(T0 + 3 * 3600, 14.0, 800),
        ]}));
        let when = DateTime::from_timestamp(T0 + 2 * 3600, 0).unwrap();
        let check = check_scheduled(&harvest_task(), &slots, when).unwrap();
        assert_eq!(check.slot_at.timestamp(), T0 + 3 * 3600);
        assert!(!check.feasible);
        assert!(!check.report.wind_speed);

        let early = DateTime::from_timestamp(T0 - 3600, 0).unwrap();
        assert!(check_scheduled(&harvest_task(), &slots, early).unwrap().feasible);
    }

    #[test]
    fn test_check_scheduled_outside_horizon() {
        let slots = parse_forecast(&json!({ "list": [live_entry(T0, 5.0, 800)] }));
        let later = DateTime::from_timestamp(T0 + 24 * 3600, 0).unwrap();
        assert!(check_scheduled(&harvest_task(), &slots, later).is_none());
        assert!(check_scheduled(&harvest_task(), &[], later).is_none());
    }

    #[test]
    fn test_best_per_slot() {
        let slots = parse_forecast(&json!({ "list": [
            live_entry(T0, 5.0, 800),
            live_entry(T0 + 3 * 3600, 14.0, 800),
        ]}));
        let recs = best_per_slot(&slots, &[harvest_task()]);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].best.as_ref().unwrap().task.task_name, "Harvesting");
        assert!(recs[1].best.is_none());
    }
}
