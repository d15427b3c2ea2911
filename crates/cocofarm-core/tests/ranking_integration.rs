//! Integration tests for feasibility and ranking over decoded catalogs.

use cocofarm_core::{
    evaluate_feasibility, normalize_weather, rank_tasks, RestrictionPolicy, TaskCatalog,
    TaskDefinition, TaskId, WeatherObservation,
};
use proptest::prelude::*;
use serde_json::json;

fn reference_catalog(restrictions: &str) -> TaskCatalog {
    let payload = json!([{
        "taskId": 1,
        "taskName": "Harvesting",
        "requiredTemperature_min": 24,
        "requiredTemperature_max": 32,
        "idealHumidity_min": 40,
        "idealHumidity_max": 80,
        "requiredPressure_min": 1000,
        "requiredPressure_max": 1020,
        "requiredWindSpeed_max": 10,
        "requiredWindGust_max": 15,
        "requiredCloudCover_max": 70,
        "weatherRestrictions": restrictions
    }]);
    TaskCatalog::from_value(payload, RestrictionPolicy::FailOpen).unwrap()
}

fn reference_weather() -> WeatherObservation {
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
fn test_feasible_match_scenario() {
    let catalog = reference_catalog("[]");
    let weather = reference_weather();
    assert!(evaluate_feasibility(&weather, &catalog.tasks()[0]));

    let ranked = rank_tasks(&weather, catalog.tasks());
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].rank, 1);
    let score = ranked[0].weather_match_score;
    assert!(score > 0.8 && score < 1.0, "score was {score}");
}

#[test]
fn test_hard_fail_scenario() {
    let catalog = reference_catalog("[]");
    let weather = WeatherObservation {
        wind_speed: Some(15.0),
        ..reference_weather()
    };
    assert!(!evaluate_feasibility(&weather, &catalog.tasks()[0]));
    assert!(rank_tasks(&weather, catalog.tasks()).is_empty());
}

#[test]
fn test_restricted_condition_scenario() {
    let catalog = reference_catalog("[800,801]");
    let weather = WeatherObservation {
        condition_code: Some(500),
        ..reference_weather()
    };
    assert!(!evaluate_feasibility(&weather, &catalog.tasks()[0]));
}

#[test]
fn test_centre_of_range_scores_higher() {
    let task = TaskDefinition::new(TaskId::Number(9), "Husk drying")
        .with_temperature(20.0, 30.0)
        .with_humidity(0.0, 100.0)
        .with_pressure(900.0, 1100.0)
        .with_wind_speed_max(100.0)
        .with_wind_gust_max(100.0)
        .with_cloud_cover_max(100.0);
    let at = |t: f64| WeatherObservation {
        temperature: Some(t),
        ..reference_weather()
    };

    let centre = rank_tasks(&at(25.0), std::slice::from_ref(&task));
    let near_edge = rank_tasks(&at(21.0), std::slice::from_ref(&task));
    let centre_temp = centre[0].score_details["temperature"].score;
    let edge_temp = near_edge[0].score_details["temperature"].score;
    assert!(centre_temp > edge_temp);
    assert!(centre[0].weather_match_score > near_edge[0].weather_match_score);

    for edge in [20.0, 30.0] {
        let ranked = rank_tasks(&at(edge), std::slice::from_ref(&task));
        assert_eq!(ranked[0].score_details["temperature"].contribution(), 0.0);
    }
}

#[test]
fn test_live_and_stored_payloads_rank_identically() {
    let live = json!({
        "main": { "temp": 28.0, "humidity": 60, "pressure": 1010 },
        "wind": { "speed": 5.0, "gust": 7.0 },
        "clouds": { "all": 40 },
        "weather": [ { "id": 800 } ]
    });
    let stored = json!({
        "temperature": 28.0, "humidity": 60, "pressure": 1010,
        "wind_speed": 5.0, "wind_gust": 7.0, "clouds": 40, "weather_id": 800
    });
    let live = normalize_weather(Some(&live)).unwrap();
    let stored = normalize_weather(Some(&stored)).unwrap();
    assert_eq!(live, stored);

    let catalog = reference_catalog("[800]");
    assert_eq!(
        rank_tasks(&live, catalog.tasks()),
        rank_tasks(&stored, catalog.tasks())
    );
}

#[test]
fn test_malformed_restrictions_follow_policy() {
    let payload = json!([{
        "taskId": 3,
        "taskName": "Seedling planting",
        "requiredTemperature_min": 20, "requiredTemperature_max": 35,
        "idealHumidity_min": 30, "idealHumidity_max": 90,
        "requiredPressure_min": 990, "requiredPressure_max": 1030,
        "requiredWindSpeed_max": 12, "requiredWindGust_max": 20,
        "requiredCloudCover_max": 90,
        "weatherRestrictions": "[800, 801"
    }]);
    let weather = reference_weather();

    let open = TaskCatalog::from_value(payload.clone(), RestrictionPolicy::FailOpen).unwrap();
    assert_eq!(rank_tasks(&weather, open.tasks()).len(), 1);

    let closed = TaskCatalog::from_value(payload, RestrictionPolicy::FailClosed).unwrap();
    assert!(rank_tasks(&weather, closed.tasks()).is_empty());
    assert_eq!(closed.parse_errors().len(), 1);
}

#[test]
fn test_ranked_output_serializes_for_display() {
    let catalog = reference_catalog("[]");
    let ranked = rank_tasks(&reference_weather(), catalog.tasks());
    let value = serde_json::to_value(&ranked).unwrap();
    assert_eq!(value[0]["taskName"], "Harvesting");
    assert_eq!(value[0]["requiredWindSpeed_max"], 10.0);
    assert_eq!(value[0]["scoreDetails"].as_object().unwrap().len(), 7);
}

// Property tests

fn arb_weather() -> impl Strategy<Value = WeatherObservation> {
    (
        -5.0f64..45.0,
        0.0f64..100.0,
        960.0f64..1050.0,
        0.0f64..25.0,
        0.0f64..35.0,
        0.0f64..100.0,
        prop::sample::select(vec![200, 301, 500, 701, 800, 801, 804]),
    )
        .prop_map(|(t, h, p, ws, wg, c, code)| WeatherObservation {
            temperature: Some(t),
            humidity: Some(h),
            pressure: Some(p),
            wind_speed: Some(ws),
            wind_gust: wg,
            cloud_cover: Some(c),
            condition_code: Some(code),
        })
}

fn arb_task() -> impl Strategy<Value = TaskDefinition> {
    (
        0.0f64..30.0,
        0.0f64..20.0,
        0.0f64..60.0,
        0.0f64..50.0,
        970.0f64..1010.0,
        0.0f64..40.0,
        0.0f64..25.0,
        0.0f64..35.0,
        0.0f64..100.0,
        prop::collection::vec(prop::sample::select(vec![500, 800, 801, 804]), 0..3),
    )
        .prop_map(|(t0, tw, h0, hw, p0, pw, ws, wg, c, codes)| {
            TaskDefinition::new(TaskId::Number(0), "task")
                .with_temperature(t0, t0 + tw)
                .with_humidity(h0, h0 + hw)
                .with_pressure(p0, p0 + pw)
                .with_wind_speed_max(ws)
                .with_wind_gust_max(wg)
                .with_cloud_cover_max(c)
                .with_restrictions(codes)
        })
}

fn arb_tasks() -> impl Strategy<Value = Vec<TaskDefinition>> {
    prop::collection::vec(arb_task(), 0..12).prop_map(|tasks| {
        tasks
            .into_iter()
            .enumerate()
            .map(|(i, mut task)| {
                task.task_id = TaskId::Number(i as i64);
                task.task_name = format!("task-{i}");
                task
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_ranking_is_idempotent(weather in arb_weather(), tasks in arb_tasks()) {
        prop_assert_eq!(rank_tasks(&weather, &tasks), rank_tasks(&weather, &tasks));
    }

    #[test]
    fn prop_scores_are_non_increasing(weather in arb_weather(), tasks in arb_tasks()) {
        let ranked = rank_tasks(&weather, &tasks);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].weather_match_score >= pair[1].weather_match_score);
        }
        for (i, entry) in ranked.iter().enumerate() {
            prop_assert_eq!(entry.rank, i + 1);
        }
    }

    #[test]
    fn prop_output_matches_feasibility_gate(weather in arb_weather(), tasks in arb_tasks()) {
        let ranked = rank_tasks(&weather, &tasks);
        for task in &tasks {
            let listed = ranked.iter().any(|r| r.task.task_id == task.task_id);
            prop_assert_eq!(listed, evaluate_feasibility(&weather, task));
        }
    }

    #[test]
    fn prop_scores_within_bounds(weather in arb_weather(), tasks in arb_tasks()) {
        for entry in rank_tasks(&weather, &tasks) {
            prop_assert!((0.0..=1.0).contains(&entry.weather_match_score));
        }
    }
}
