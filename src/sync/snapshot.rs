use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Server-side download status.
///
/// The set is open: anything the server sends that is not one of the known
/// values is kept verbatim in `Other` and rendered with the default style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DownloadStatus {
    Running,
    Paused,
    Canceled,
    Completed,
    Error,
    Other(String),
}

impl DownloadStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DownloadStatus::Running => "RUNNING",
            DownloadStatus::Paused => "PAUSED",
            DownloadStatus::Canceled => "CANCELED",
            DownloadStatus::Completed => "COMPLETED",
            DownloadStatus::Error => "ERROR",
            DownloadStatus::Other(raw) => raw,
        }
    }

    /// No further progress updates are expected once a download reaches one
    /// of these states
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadStatus::Completed | DownloadStatus::Canceled | DownloadStatus::Error
        )
    }
}

impl Default for DownloadStatus {
    fn default() -> Self {
        DownloadStatus::Other(String::new())
    }
}

impl From<String> for DownloadStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "RUNNING" => DownloadStatus::Running,
            "PAUSED" => DownloadStatus::Paused,
            "CANCELED" => DownloadStatus::Canceled,
            "COMPLETED" => DownloadStatus::Completed,
            "ERROR" => DownloadStatus::Error,
            _ => DownloadStatus::Other(raw),
        }
    }
}

impl From<&str> for DownloadStatus {
    fn from(raw: &str) -> Self {
        DownloadStatus::from(raw.to_string())
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DownloadStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DownloadStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(DownloadStatus::from).unwrap_or_default())
    }
}

/// Point-in-time progress record for one download, as served by the
/// progress endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSnapshot {
    pub id: String,
    #[serde(default)]
    pub received_bytes: i64,
    /// 0 (or negative) when the size is unknown
    #[serde(default)]
    pub total_bytes: i64,
    #[serde(default)]
    pub status: DownloadStatus,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_speed_bps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_speed_bps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_finished_at: Option<String>,
    #[serde(default)]
    pub retries: Option<u64>,
}

impl DownloadSnapshot {
    pub fn new(id: impl Into<String>, status: impl Into<DownloadStatus>) -> Self {
        Self {
            id: id.into(),
            received_bytes: 0,
            total_bytes: 0,
            status: status.into(),
            avg_speed_bps: None,
            max_speed_bps: None,
            created_at: None,
            last_started_at: None,
            last_finished_at: None,
            retries: None,
        }
    }

    pub fn retries_or_default(&self) -> u64 {
        self.retries.unwrap_or(0)
    }
}

/// Decode a JSON array of snapshots
pub fn parse_batch(body: &[u8]) -> Result<Vec<DownloadSnapshot>, serde_json::Error> {
    serde_json::from_slice(body)
}

// Rates are display-only: a non-numeric value degrades to "absent" instead of
// failing the whole batch.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_snapshot() {
        let body = br#"[{
            "id": "7f1c0e7a-0000-4000-8000-000000000001",
            "receivedBytes": 512,
            "totalBytes": 1024,
            "status": "RUNNING",
            "avgSpeedBps": 2048.0,
            "maxSpeedBps": 4096.5,
            "createdAt": "2024-03-01T10:15:30Z",
            "lastStartedAt": "2024-03-01T10:16:00Z",
            "lastFinishedAt": null,
            "retries": 3
        }]"#;

        let batch = parse_batch(body).unwrap();
        assert_eq!(batch.len(), 1);

        let snap = &batch[0];
        assert_eq!(snap.id, "7f1c0e7a-0000-4000-8000-000000000001");
        assert_eq!(snap.received_bytes, 512);
        assert_eq!(snap.total_bytes, 1024);
        assert_eq!(snap.status, DownloadStatus::Running);
        assert_eq!(snap.avg_speed_bps, Some(2048.0));
        assert_eq!(snap.max_speed_bps, Some(4096.5));
        assert_eq!(snap.created_at.as_deref(), Some("2024-03-01T10:15:30Z"));
        assert_eq!(snap.last_finished_at, None);
        assert_eq!(snap.retries_or_default(), 3);
    }

    #[test]
    fn test_missing_fields_default() {
        let batch = parse_batch(br#"[{"id": "d1"}]"#).unwrap();
        let snap = &batch[0];

        assert_eq!(snap.received_bytes, 0);
        assert_eq!(snap.total_bytes, 0);
        assert_eq!(snap.status, DownloadStatus::Other(String::new()));
        assert_eq!(snap.avg_speed_bps, None);
        assert_eq!(snap.retries_or_default(), 0);
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let batch = parse_batch(br#"[{"id": "d1", "status": "QUEUED"}]"#).unwrap();
        assert_eq!(batch[0].status, DownloadStatus::Other("QUEUED".to_string()));
        assert_eq!(batch[0].status.to_string(), "QUEUED");
        assert!(!batch[0].status.is_terminal());
    }

    #[test]
    fn test_null_status_does_not_fail() {
        let batch = parse_batch(br#"[{"id": "d1", "status": null}]"#).unwrap();
        assert_eq!(batch[0].status.as_str(), "");
    }

    #[test]
    fn test_odd_field_types_degrade() {
        let body = br#"[{
            "id": "d1",
            "avgSpeedBps": "fast",
            "createdAt": 1709288130,
            "lastStartedAt": {"nested": true}
        }]"#;
        let batch = parse_batch(body).unwrap();

        assert_eq!(batch[0].avg_speed_bps, None);
        assert_eq!(batch[0].created_at, None);
        assert_eq!(batch[0].last_started_at, None);
    }

    #[test]
    fn test_negative_total_is_accepted() {
        let batch = parse_batch(br#"[{"id": "d1", "totalBytes": -1}]"#).unwrap();
        assert_eq!(batch[0].total_bytes, -1);
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        assert!(parse_batch(b"<html>login</html>").is_err());
        assert!(parse_batch(br#"{"id": "d1"}"#).is_err());
    }

    #[test]
    fn test_terminal_states() {
        for status in ["COMPLETED", "CANCELED", "ERROR"] {
            assert!(DownloadStatus::from(status).is_terminal(), "{}", status);
        }
        for status in ["RUNNING", "PAUSED", "completed", ""] {
            assert!(!DownloadStatus::from(status).is_terminal(), "{}", status);
        }
    }

    #[test]
    fn test_status_serializes_as_raw_string() {
        let snap = DownloadSnapshot::new("d1", "WEIRD");
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["status"], "WEIRD");
        assert_eq!(json["receivedBytes"], 0);
    }
}
