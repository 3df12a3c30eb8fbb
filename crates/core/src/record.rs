//! The extraction record: one completed attempt, successful or failed.
//!
//! Records are built once through [`ExtractionRecord::success`] or
//! [`ExtractionRecord::failure`] and never modified afterwards. The serialized
//! form uses camelCase field names and RFC 3339 timestamps so that stored
//! history stays readable by other tools.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Title given to every failure record.
pub const ERROR_TITLE: &str = "Error";

/// Outcome of an extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extraction result as shown in the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    /// Display title; [`ERROR_TITLE`] on failure.
    pub title: String,

    /// Human-readable summary, or the failure message.
    pub summary: String,

    /// Salient facts from the page. Always empty on failure.
    #[serde(default)]
    pub key_points: Vec<String>,

    /// The submitted URL, echoed back.
    pub url: String,

    /// Assigned by the client when the response arrived.
    #[serde(with = "rfc3339")]
    pub timestamp: OffsetDateTime,

    pub status: Status,

    /// Present only when `status` is [`Status::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionRecord {
    /// Builds a successful record.
    pub fn success(
        title: impl Into<String>, summary: impl Into<String>, key_points: Vec<String>, url: impl Into<String>,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            key_points,
            url: url.into(),
            timestamp,
            status: Status::Success,
            error: None,
        }
    }

    /// Builds a failure record carrying `message` as both summary and error.
    pub fn failure(url: impl Into<String>, message: impl Into<String>, timestamp: OffsetDateTime) -> Self {
        let message = message.into();
        Self {
            title: ERROR_TITLE.to_string(),
            summary: message.clone(),
            key_points: Vec::new(),
            url: url.into(),
            timestamp,
            status: Status::Error,
            error: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Whether the status, error and key point fields agree with each other.
    ///
    /// Records restored from storage written by other tools may not hold this.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            Status::Success => self.error.is_none(),
            Status::Error => self.error.is_some() && self.key_points.is_empty(),
        }
    }
}

/// A record as found in stored history.
///
/// History written before records carried a status has no `status` field;
/// those entries are successes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredRecord {
    title: String,
    summary: String,
    #[serde(default)]
    key_points: Vec<String>,
    url: String,
    #[serde(with = "rfc3339")]
    timestamp: OffsetDateTime,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    error: Option<String>,
}

impl StoredRecord {
    /// Converts to a record that satisfies [`ExtractionRecord::is_consistent`].
    ///
    /// The flag is true when fields had to be changed to get there.
    pub(crate) fn normalize(self) -> (ExtractionRecord, bool) {
        let status = self.status.unwrap_or(Status::Success);
        let mut record = ExtractionRecord {
            title: self.title,
            summary: self.summary,
            key_points: self.key_points,
            url: self.url,
            timestamp: self.timestamp,
            status,
            error: self.error,
        };

        if record.is_consistent() {
            return (record, false);
        }

        match status {
            Status::Success => record.error = None,
            Status::Error => {
                record.key_points.clear();
                if record.error.is_none() {
                    record.error = Some(record.summary.clone());
                }
            }
        }
        (record, true)
    }
}

/// RFC 3339 (de)serialization for [`OffsetDateTime`].
pub(crate) mod rfc3339 {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, &Rfc3339).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_failure_record_shape() {
        let record = ExtractionRecord::failure("https://example.com", "fetch failed", datetime!(2025-01-01 0:00 UTC));
        assert_eq!(record.title, "Error");
        assert_eq!(record.summary, "fetch failed");
        assert_eq!(record.error.as_deref(), Some("fetch failed"));
        assert!(record.key_points.is_empty());
        assert_eq!(record.status, Status::Error);
        assert!(record.is_consistent());
    }

    #[test]
    fn test_success_record_has_no_error() {
        let record = ExtractionRecord::success(
            "Example",
            "A simple page",
            vec!["one".to_string()],
            "https://example.com",
            datetime!(2025-01-01 0:00 UTC),
        );
        assert!(record.is_success());
        assert!(record.error.is_none());
        assert!(record.is_consistent());
    }

    #[test]
    fn test_serialized_field_names() {
        let record = ExtractionRecord::success(
            "Example",
            "A simple page",
            vec!["one".to_string()],
            "https://example.com",
            datetime!(2025-03-04 05:06:07 UTC),
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""keyPoints":["one"]"#));
        assert!(json.contains(r#""status":"success""#));
        assert!(json.contains(r#""timestamp":"2025-03-04T05:06:07Z""#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_deserialize_browser_timestamp() {
        let json = r#"{
            "title": "Error",
            "summary": "boom",
            "keyPoints": [],
            "url": "https://example.com",
            "timestamp": "2024-11-02T10:15:30.123Z",
            "status": "error",
            "error": "boom"
        }"#;
        let record: ExtractionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp.year(), 2024);
        assert_eq!(record.status, Status::Error);
    }

    fn stored(json: &str) -> StoredRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_stored_record_without_status_is_success() {
        let (record, changed) = stored(
            r#"{"title":"Example","summary":"A simple page","keyPoints":["one"],"url":"https://example.com","timestamp":"2024-11-02T10:15:30.123Z"}"#,
        )
        .normalize();
        assert_eq!(record.status, Status::Success);
        assert_eq!(record.key_points, vec!["one".to_string()]);
        assert!(!changed);
    }

    #[test]
    fn test_stored_error_record_is_normalized() {
        let (record, changed) = stored(
            r#"{"title":"Error","summary":"boom","keyPoints":["leak"],"url":"https://example.com","timestamp":"2025-01-01T00:00:00Z","status":"error"}"#,
        )
        .normalize();
        assert!(changed);
        assert!(record.is_consistent());
        assert!(record.key_points.is_empty());
        assert_eq!(record.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_stored_success_drops_stray_error() {
        let (record, changed) = stored(
            r#"{"title":"T","summary":"S","keyPoints":[],"url":"u","timestamp":"2025-01-01T00:00:00Z","status":"success","error":"old"}"#,
        )
        .normalize();
        assert!(changed);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_inconsistent_record_detected() {
        let mut record = ExtractionRecord::failure("https://example.com", "boom", datetime!(2025-01-01 0:00 UTC));
        record.key_points.push("leftover".to_string());
        assert!(!record.is_consistent());
    }
}
