//! Task catalog: farm task definitions and their weather requirements.
//!
//! The catalog arrives from the task provider as a JSON array. Each entry's
//! `weatherRestrictions` is JSON array text (sometimes a real array); it is
//! decoded here, once, into [`Restrictions`] so scoring never re-parses it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{CatalogError, TaskParseError};
use crate::weather::normalize::{integer, number};

/// Task identifier as delivered by the provider (numeric or string keys).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

/// What to do with a restriction list that is not valid JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionPolicy {
    /// Ignore the restriction (task is unrestricted on condition code)
    #[default]
    FailOpen,
    /// Task can never pass the condition check
    FailClosed,
}

/// Allowed weather condition codes for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Restrictions {
    /// Empty list: any condition passes
    #[default]
    Any,
    /// Only these codes pass
    Only(BTreeSet<i32>),
    /// Malformed list under [`RestrictionPolicy::FailClosed`]
    Unsatisfiable,
}

impl Restrictions {
    pub fn from_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        let set: BTreeSet<i32> = codes.into_iter().collect();
        if set.is_empty() {
            Restrictions::Any
        } else {
            Restrictions::Only(set)
        }
    }

    /// Decode the raw `weatherRestrictions` value.
    ///
    /// Null, a blank string and an empty array all mean "unrestricted".
    pub fn parse(raw: Option<&Value>) -> Result<Self, String> {
        match raw {
            None | Some(Value::Null) => Ok(Restrictions::Any),
            Some(Value::Array(items)) => Self::from_items(items),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(Restrictions::Any),
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Null) => Ok(Restrictions::Any),
                Ok(Value::Array(items)) => Self::from_items(&items),
                Ok(other) => Err(format!("expected an array, got {other}")),
                Err(e) => Err(e.to_string()),
            },
            Some(other) => Err(format!("expected an array or JSON text, got {other}")),
        }
    }

    fn from_items(items: &[Value]) -> Result<Self, String> {
        let mut codes = BTreeSet::new();
        for item in items {
            let code = integer(item)
                .ok_or_else(|| format!("condition code {item} is not an integer"))?;
            codes.insert(code);
        }
        Ok(Self::from_codes(codes))
    }

    /// Whether an observed condition code satisfies the restriction.
    pub fn permits(&self, code: Option<i32>) -> bool {
        match self {
            Restrictions::Any => true,
            Restrictions::Only(codes) => code.is_some_and(|c| codes.contains(&c)),
            Restrictions::Unsatisfiable => false,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Restrictions::Any)
    }
}

/// A catalog entry exactly as the provider sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    #[serde(rename = "taskName")]
    pub task_name: String,
    #[serde(rename = "requiredTemperature_min", default, deserialize_with = "bound")]
    pub temperature_min: Option<f64>,
    #[serde(rename = "requiredTemperature_max", default, deserialize_with = "bound")]
    pub temperature_max: Option<f64>,
    #[serde(rename = "idealHumidity_min", default, deserialize_with = "bound")]
    pub humidity_min: Option<f64>,
    #[serde(rename = "idealHumidity_max", default, deserialize_with = "bound")]
    pub humidity_max: Option<f64>,
    #[serde(rename = "requiredPressure_min", default, deserialize_with = "bound")]
    pub pressure_min: Option<f64>,
    #[serde(rename = "requiredPressure_max", default, deserialize_with = "bound")]
    pub pressure_max: Option<f64>,
    #[serde(rename = "requiredWindSpeed_max", default, deserialize_with = "bound")]
    pub wind_speed_max: Option<f64>,
    #[serde(rename = "requiredWindGust_max", default, deserialize_with = "bound")]
    pub wind_gust_max: Option<f64>,
    #[serde(rename = "requiredCloudCover_max", default, deserialize_with = "bound")]
    pub cloud_cover_max: Option<f64>,
    #[serde(rename = "weatherRestrictions", default)]
    pub weather_restrictions: Option<Value>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Task bound from a JSON number or numeric text. Null and non-numeric text
/// leave the bound unset, which fails its condition.
fn bound<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value @ (Value::Number(_) | Value::String(_))) => Ok(number(&value)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, got {other}"
        ))),
    }
}

/// A farm task with decoded weather requirements.
///
/// Bounds are inclusive. A `None` bound fails its feasibility condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDefinition {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    #[serde(rename = "taskName")]
    pub task_name: String,
    #[serde(rename = "requiredTemperature_min")]
    pub temperature_min: Option<f64>,
    #[serde(rename = "requiredTemperature_max")]
    pub temperature_max: Option<f64>,
    #[serde(rename = "idealHumidity_min")]
    pub humidity_min: Option<f64>,
    #[serde(rename = "idealHumidity_max")]
    pub humidity_max: Option<f64>,
    #[serde(rename = "requiredPressure_min")]
    pub pressure_min: Option<f64>,
    #[serde(rename = "requiredPressure_max")]
    pub pressure_max: Option<f64>,
    #[serde(rename = "requiredWindSpeed_max")]
    pub wind_speed_max: Option<f64>,
    #[serde(rename = "requiredWindGust_max")]
    pub wind_gust_max: Option<f64>,
    #[serde(rename = "requiredCloudCover_max")]
    pub cloud_cover_max: Option<f64>,
    /// Original restriction value, echoed back on serialization
    #[serde(rename = "weatherRestrictions")]
    pub weather_restrictions: Option<Value>,
    #[serde(skip)]
    pub restrictions: Restrictions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskDefinition {
    /// Task with no bounds set. Fails every bounded condition until the
    /// `with_*` builders fill them in.
    pub fn new(task_id: TaskId, task_name: impl Into<String>) -> Self {
        Self {
            task_id,
            task_name: task_name.into(),
            temperature_min: None,
            temperature_max: None,
            humidity_min: None,
            humidity_max: None,
            pressure_min: None,
            pressure_max: None,
            wind_speed_max: None,
            wind_gust_max: None,
            cloud_cover_max: None,
            weather_restrictions: None,
            restrictions: Restrictions::Any,
            details: None,
            description: None,
        }
    }

    pub fn with_temperature(mut self, min: f64, max: f64) -> Self {
        self.temperature_min = Some(min);
        self.temperature_max = Some(max);
        self
    }

    pub fn with_humidity(mut self, min: f64, max: f64) -> Self {
        self.humidity_min = Some(min);
        self.humidity_max = Some(max);
        self
    }

    pub fn with_pressure(mut self, min: f64, max: f64) -> Self {
        self.pressure_min = Some(min);
        self.pressure_max = Some(max);
        self
    }

    pub fn with_wind_speed_max(mut self, max: f64) -> Self {
        self.wind_speed_max = Some(max);
        self
    }

    pub fn with_wind_gust_max(mut self, max: f64) -> Self {
        self.wind_gust_max = Some(max);
        self
    }

    pub fn with_cloud_cover_max(mut self, max: f64) -> Self {
        self.cloud_cover_max = Some(max);
        self
    }

    pub fn with_restrictions(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        let codes: Vec<i32> = codes.into_iter().collect();
        self.weather_restrictions = Some(Value::String(
            serde_json::to_string(&codes).unwrap_or_else(|_| "[]".into()),
        ));
        self.restrictions = Restrictions::from_codes(codes);
        self
    }

    /// Build a definition from a provider record, decoding its restriction
    /// list under `policy`.
    ///
    /// The parse error, if any, is returned alongside the task so the caller
    /// can report it; the task itself is always usable.
    pub fn from_record(
        record: TaskRecord,
        policy: RestrictionPolicy,
    ) -> (Self, Option<TaskParseError>) {
        let (restrictions, parse_error) =
            match Restrictions::parse(record.weather_restrictions.as_ref()) {
                Ok(r) => (r, None),
                Err(message) => {
                    let restrictions = match policy {
                        RestrictionPolicy::FailOpen => Restrictions::Any,
                        RestrictionPolicy::FailClosed => Restrictions::Unsatisfiable,
                    };
                    let err = TaskParseError {
                        task: record.task_name.clone(),
                        message,
                    };
                    (restrictions, Some(err))
                }
            };

        let task = Self {
            task_id: record.task_id,
            task_name: record.task_name,
            temperature_min: record.temperature_min,
            temperature_max: record.temperature_max,
            humidity_min: record.humidity_min,
            humidity_max: record.humidity_max,
            pressure_min: record.pressure_min,
            pressure_max: record.pressure_max,
            wind_speed_max: record.wind_speed_max,
            wind_gust_max: record.wind_gust_max,
            cloud_cover_max: record.cloud_cover_max,
            weather_restrictions: record.weather_restrictions,
            restrictions,
            details: record.details,
            description: record.description,
        };
        (task, parse_error)
    }
}

/// Decoded task catalog, in provider order.
#[derive(Debug, Clone, Default)]
pub struct TaskCatalog {
    tasks: Vec<TaskDefinition>,
    parse_errors: Vec<TaskParseError>,
}

impl TaskCatalog {
    pub fn new(tasks: Vec<TaskDefinition>) -> Self {
        Self {
            tasks,
            parse_errors: Vec::new(),
        }
    }

    /// Decode catalog JSON text.
    ///
    /// # Errors
    /// Returns an error if the text is not JSON, is not an array, or an
    /// entry is not a task object.
    pub fn from_json(text: &str, policy: RestrictionPolicy) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value, policy)
    }

    /// Decode an already-parsed catalog payload.
    ///
    /// # Errors
    /// Returns an error if the payload is not an array or an entry is not a
    /// task object.
    pub fn from_value(value: Value, policy: RestrictionPolicy) -> Result<Self, CatalogError> {
        let Value::Array(entries) = value else {
            return Err(CatalogError::NotAnArray);
        };

        let mut catalog = Self::default();
        for (index, entry) in entries.into_iter().enumerate() {
            let record: TaskRecord = serde_json::from_value(entry)
                .map_err(|source| CatalogError::InvalidTask { index, source })?;
            let (task, parse_error) = TaskDefinition::from_record(record, policy);
            if let Some(err) = parse_error {
                tracing::warn!(
                    task = %task.task_name,
                    policy = ?policy,
                    "{}",
                    err
                );
                catalog.parse_errors.push(err);
            }
            catalog.tasks.push(task);
        }

        tracing::debug!(
            tasks = catalog.tasks.len(),
            malformed = catalog.parse_errors.len(),
            "task catalog decoded"
        );
        Ok(catalog)
    }

    pub fn tasks(&self) -> &[TaskDefinition] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<TaskDefinition> {
        self.tasks
    }

    /// Restriction lists that could not be decoded, in catalog order.
    pub fn parse_errors(&self) -> &[TaskParseError] {
        &self.parse_errors
    }

    pub fn find_by_name(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.task_name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskDefinition> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<'a> IntoIterator for &'a TaskCatalog {
    type Item = &'a TaskDefinition;
    type IntoIter = std::slice::Iter<'a, TaskDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
