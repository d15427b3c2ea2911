//! Canonical weather observation and condition-code taxonomy.
//!
//! Every scoring path works on [`WeatherObservation`]. Source payloads (live
//! API or cached rows) are converted by [`normalize`] before anything else
//! looks at them.

pub mod normalize;

use serde::{Deserialize, Serialize};

pub use normalize::{normalize_weather, RawWeather};

/// Weather observation after normalization.
///
/// Bounded readings are `None` when the source did not provide them; the
/// feasibility evaluator treats `None` as a failed condition. Wind gust is the
/// only reading with a safe default (0 m/s).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    /// Air temperature, °C
    pub temperature: Option<f64>,
    /// Relative humidity, percent
    pub humidity: Option<f64>,
    /// Sea-level pressure, hPa
    pub pressure: Option<f64>,
    /// Sustained wind speed, m/s
    pub wind_speed: Option<f64>,
    /// Wind gust, m/s
    #[serde(default)]
    pub wind_gust: f64,
    /// Cloud cover, percent
    pub cloud_cover: Option<f64>,
    /// Weather condition code
    pub condition_code: Option<i32>,
}

impl WeatherObservation {
    /// Broad condition group for the observation's code.
    pub fn condition_group(&self) -> ConditionGroup {
        self.condition_code
            .map(ConditionGroup::from_code)
            .unwrap_or(ConditionGroup::Unknown)
    }
}

/// Grouping of condition codes by phenomenon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionGroup {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    /// Fog, mist, haze, dust, smoke
    Atmosphere,
    Clear,
    Clouds,
    Unknown,
}

impl ConditionGroup {
    pub fn from_code(code: i32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Atmosphere,
            800 => Self::Clear,
            801..=804 => Self::Clouds,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "thunderstorm",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Atmosphere => "fog/haze",
            Self::Clear => "clear",
            Self::Clouds => "cloudy",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the group involves precipitation.
    pub fn is_wet(&self) -> bool {
        matches!(
            self,
            Self::Thunderstorm | Self::Drizzle | Self::Rain | Self::Snow
        )
    }
}

impl std::fmt::Display for ConditionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
