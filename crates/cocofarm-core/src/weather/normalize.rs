//! Conversion of provider payloads into [`WeatherObservation`].
//!
//! Two payload shapes reach the app:
//!
//! ```text
//! live    { "main": { "temp", "humidity", "pressure" },
//!           "wind": { "speed", "gust" }, "clouds": { "all" },
//!           "weather": [ { "id" } ] }
//! stored  { "temperature", "humidity", "pressure", "wind_speed",
//!           "wind_gust", "clouds", "weather_id" }
//! ```
//!
//! The shape is decided once by [`RawWeather::detect`]. Missing readings stay
//! `None` so they fail range checks later; only wind gust defaults to 0.

use serde_json::{Map, Value};

use super::WeatherObservation;
use crate::error::NormalizationError;

/// Readings pulled from a live API payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveReadings {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub clouds_all: Option<f64>,
    pub weather_id: Option<i32>,
}

/// Readings pulled from a stored/offline row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredReadings {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub clouds: Option<f64>,
    pub weather_id: Option<i32>,
}

/// A weather payload with its source shape resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RawWeather {
    Live(LiveReadings),
    Stored(StoredReadings),
}

impl RawWeather {
    /// Resolve the payload shape.
    ///
    /// A `weather` array marks the live shape; a scalar `temperature` marks
    /// the stored shape. Live payloads must carry `main`, `wind`, `clouds` and
    /// a non-empty `weather` array.
    pub fn detect(value: &Value) -> Result<Self, NormalizationError> {
        let obj = match value {
            Value::Null => return Err(NormalizationError::NullInput),
            Value::Object(obj) => obj,
            _ => return Err(NormalizationError::UnknownShape),
        };

        if let Some(Value::Array(conditions)) = obj.get("weather") {
            return Self::detect_live(obj, conditions);
        }

        match obj.get("temperature") {
            Some(Value::Object(_)) | Some(Value::Array(_)) | None => {
                Err(NormalizationError::UnknownShape)
            }
            Some(_) => Ok(RawWeather::Stored(StoredReadings {
                temperature: obj.get("temperature").and_then(number),
                humidity: obj.get("humidity").and_then(number),
                pressure: obj.get("pressure").and_then(number),
                wind_speed: obj.get("wind_speed").and_then(number),
                wind_gust: obj.get("wind_gust").and_then(number),
                clouds: obj.get("clouds").and_then(number),
                weather_id: obj.get("weather_id").and_then(integer),
            })),
        }
    }

    fn detect_live(
        obj: &Map<String, Value>,
        conditions: &[Value],
    ) -> Result<Self, NormalizationError> {
        let main = obj.get("main").and_then(Value::as_object);
        let wind = obj.get("wind").and_then(Value::as_object);
        let clouds = obj.get("clouds").and_then(Value::as_object);
        let first = conditions.first();

        let (Some(main), Some(wind), Some(clouds), Some(first)) = (main, wind, clouds, first)
        else {
            let mut missing = Vec::new();
            if main.is_none() {
                missing.push("main");
            }
            if wind.is_none() {
                missing.push("wind");
            }
            if clouds.is_none() {
                missing.push("clouds");
            }
            if first.is_none() {
                missing.push("weather[0]");
            }
            return Err(NormalizationError::MissingFields(missing));
        };

        Ok(RawWeather::Live(LiveReadings {
            temp: main.get("temp").and_then(number),
            humidity: main.get("humidity").and_then(number),
            pressure: main.get("pressure").and_then(number),
            wind_speed: wind.get("speed").and_then(number),
            wind_gust: wind.get("gust").and_then(number),
            clouds_all: clouds.get("all").and_then(number),
            weather_id: first.get("id").and_then(integer),
        }))
    }

    pub fn into_observation(self) -> WeatherObservation {
        match self {
            RawWeather::Live(r) => WeatherObservation {
                temperature: r.temp,
                humidity: r.humidity,
                pressure: r.pressure,
                wind_speed: r.wind_speed,
                wind_gust: r.wind_gust.unwrap_or(0.0),
                cloud_cover: r.clouds_all,
                condition_code: r.weather_id,
            },
            RawWeather::Stored(r) => WeatherObservation {
                temperature: r.temperature,
                humidity: r.humidity,
                pressure: r.pressure,
                wind_speed: r.wind_speed,
                wind_gust: r.wind_gust.unwrap_or(0.0),
                cloud_cover: r.clouds,
                condition_code: r.weather_id,
            },
        }
    }
}

impl TryFrom<&Value> for WeatherObservation {
    type Error = NormalizationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        RawWeather::detect(value).map(RawWeather::into_observation)
    }
}

/// Normalize an optional payload, yielding `None` when it has no usable data.
pub fn normalize_weather(value: Option<&Value>) -> Option<WeatherObservation> {
    value.and_then(|v| WeatherObservation::try_from(v).ok())
}

/// JSON number or numeric string. Database rows often deliver `numeric`
/// columns as strings.
/// Numeric reading from a JSON number or numeric text.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Whole-valued number (`800`, `800.0` or `"800"`) that fits in `i32`.
pub(crate) fn integer(value: &Value) -> Option<i32> {
    if let Some(n) = value.as_i64() {
        return i32::try_from(n).ok();
    }
    let n = number(value)?;
    let in_range = (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&n);
    (n.fract() == 0.0 && in_range).then_some(n as i32)
}
