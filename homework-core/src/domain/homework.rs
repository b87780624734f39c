//! Homework domain types

use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{PayloadError, Result};

/// Decoded response of the homework status endpoint
///
/// Kept as raw JSON so that shape problems surface as [`PayloadError`]s
/// during validation instead of failing the decode step.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPayload(Value);

impl StatusPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Whether the server reported a `current_date` field at all
    pub fn has_current_date(&self) -> bool {
        self.0.get("current_date").is_some()
    }

    /// Server-reported lower bound for the next query window
    ///
    /// Returns `None` when the field is absent or not an integer.
    pub fn current_date(&self) -> Option<i64> {
        self.0.get("current_date").and_then(Value::as_i64)
    }

    /// Returns the most recent work item
    ///
    /// The upstream API orders `homeworks` newest first, so this is the
    /// first element of the list.
    pub fn extract_latest(&self) -> Result<WorkItem> {
        let map = self.0.as_object().ok_or_else(|| {
            PayloadError::Shape(format!("expected an object, got {}", json_kind(&self.0)))
        })?;

        let homeworks = map
            .get("homeworks")
            .ok_or(PayloadError::MissingKey("homeworks"))?;

        let list = homeworks.as_array().ok_or_else(|| {
            PayloadError::Shape(format!(
                "`homeworks` must be a list, got {}",
                json_kind(homeworks)
            ))
        })?;

        let latest = list.first().ok_or(PayloadError::EmptyList)?;
        WorkItem::from_value(latest)
    }
}

/// A single homework record as reported by the API
///
/// Both known fields are optional here; their absence is reported when the
/// item is rendered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkItem {
    pub homework_name: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkItem {
    pub fn new(homework_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            homework_name: Some(homework_name.into()),
            status: Some(status.into()),
            extra: Map::new(),
        }
    }

    fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(PayloadError::Shape(format!(
                "homework entry must be an object, got {}",
                json_kind(value)
            )));
        }

        Self::deserialize(value)
            .map_err(|e| PayloadError::Shape(format!("malformed homework entry: {}", e)))
    }

    /// Renders the user-facing status change message
    pub fn render_message(&self) -> Result<String> {
        let name = self
            .homework_name
            .as_deref()
            .ok_or(PayloadError::MissingKey("homework_name"))?;

        let status = self
            .status
            .as_deref()
            .ok_or(PayloadError::MissingKey("status"))?;

        let status = status.parse::<HomeworkStatus>().inspect_err(|_| {
            warn!(status, homework = name, "Unexpected homework status");
        })?;

        Ok(format!(
            "Изменился статус проверки работы \"{}\". {}",
            name,
            status.verdict()
        ))
    }
}

/// Review status codes and their verdicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Status code as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable verdict shown to the user
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PayloadError::UnknownStatus(s.to_string()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
