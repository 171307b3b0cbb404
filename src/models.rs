use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row from `/get_all_jobs`. The backend serializes every column of its
/// jobs table; anything not listed here is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i64,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub applied: bool,
    #[serde(default, deserialize_with = "flag")]
    pub rejected: bool,
    #[serde(default, deserialize_with = "flag")]
    pub interview: bool,
    #[serde(default, deserialize_with = "flag")]
    pub hidden: bool,
}

/// Full posting from `/job_details/{id}`. Everything but id and title is
/// nullable in the backend schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: i64,
    pub title: String,
    pub job_url: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub job_description: Option<String>,
}

/// Response envelope of the status-change endpoints.
///
/// The backend answers `{"success": "<message>"}` while older builds sent a
/// plain boolean, so `success` is kept as raw JSON and read through
/// truthiness.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    success: Value,
}

impl Ack {
    pub fn ok(&self) -> bool {
        truthy(&self.success)
    }
}

/// Which status-change a mark request carries. The three mark endpoints are
/// the same request with a different path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected,
    Interview,
}

impl Outcome {
    pub fn path(&self) -> &'static str {
        match self {
            Outcome::Applied => "mark_applied",
            Outcome::Rejected => "mark_rejected",
            Outcome::Interview => "mark_interview",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Applied => "applied",
            Outcome::Rejected => "rejected",
            Outcome::Interview => "interview",
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(truthy))
}

/// Compact a backend datetime for display. The JSON layer emits RFC 2822
/// strings for datetime columns ("Fri, 01 Aug 2025 00:00:00 GMT"); anything
/// else is shown as-is.
pub fn display_date(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc2822(raw) {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}
