use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::ValidationError,
    value_objects::{BucketName, ObjectName, ObjectUri},
};

/// Date token replaced with today's date in ISO format
pub const TOKEN_DATE_ISO: &str = "$DATEISO";
/// Date token replaced with the date `datediff` days ago
pub const TOKEN_DATE_DIFF: &str = "$DATEDIFF";

/// Instruction to mirror a remote file into a bucket.
///
/// Decoded from the JSON body of a push message. Field names match the
/// message contract of the deployed publishers.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    /// URL of the remote file
    #[serde(rename = "source_file_name")]
    pub source_url: String,

    #[serde(rename = "bucket_name")]
    pub bucket: String,

    #[serde(rename = "destination_blob_name")]
    pub destination: String,

    /// Days subtracted from today when expanding `$DATEDIFF`
    #[serde(default)]
    pub datediff: Option<i64>,
}

/// A fetch request with date tokens expanded and names validated
#[derive(Debug, Clone)]
pub struct ResolvedFetch {
    pub url: String,
    pub bucket: BucketName,
    pub destination: ObjectName,
}

impl FetchRequest {
    /// Expand date tokens in the URL and destination name, then validate.
    ///
    /// `$DATEDIFF` without a `datediff` value is an error; the token has no
    /// meaning on its own.
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedFetch, ValidationError> {
        let needs_diff = self.source_url.contains(TOKEN_DATE_DIFF)
            || self.destination.contains(TOKEN_DATE_DIFF);
        if needs_diff && self.datediff.is_none() {
            return Err(ValidationError::DateDiffRequired);
        }

        let datediff = self.datediff.unwrap_or(0);
        let url = expand_date_tokens(&self.source_url, today, datediff);
        let destination = expand_date_tokens(&self.destination, today, datediff);

        Ok(ResolvedFetch {
            url,
            bucket: BucketName::new(self.bucket.clone())?,
            destination: ObjectName::new(destination)?,
        })
    }
}

/// Substitute `$DATEISO` and `$DATEDIFF` in a name or URL
pub fn expand_date_tokens(input: &str, today: NaiveDate, datediff: i64) -> String {
    let iso = today.format("%Y-%m-%d").to_string();
    let diffed = (today - Duration::days(datediff))
        .format("%Y-%m-%d")
        .to_string();
    input
        .replace(TOKEN_DATE_DIFF, &diffed)
        .replace(TOKEN_DATE_ISO, &iso)
}

/// Result of handling a single fetch request
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The remote file was written to the destination bucket
    Fetched { uri: ObjectUri, bytes: u64 },

    /// The fetch failed; the error was published, not raised
    Failed { error: String },
}

/// Status field of a fetch notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Fetched,
    Failed,
}

/// Payload published to a topic after every fetch attempt
#[derive(Debug, Clone, Serialize)]
pub struct FetchNotification {
    pub status: FetchStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Destination `gs://` URI, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub at: DateTime<Utc>,
}

impl FetchNotification {
    pub fn fetched(source_url: String, uri: String) -> Self {
        Self {
            status: FetchStatus::Fetched,
            source_url: Some(source_url),
            uri: Some(uri),
            error: None,
            at: Utc::now(),
        }
    }

    pub fn failed(source_url: Option<String>, error: String) -> Self {
        Self {
            status: FetchStatus::Failed,
            source_url,
            uri: None,
            error: Some(error),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, dayofmonth: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dayofmonth).unwrap()
    }

    #[test]
    fn test_expand_iso_token() {
        let expanded = expand_date_tokens(
            "https://example.com/data-$DATEISO.csv",
            day(2024, 6, 10),
            0,
        );
        assert_eq!(expanded, "https://example.com/data-2024-06-10.csv");
    }

    #[test]
    fn test_expand_diff_token() {
        let expanded = expand_date_tokens(
            "https://example.com/archive/$DATEDIFF.csv",
            day(2024, 6, 10),
            6,
        );
        assert_eq!(expanded, "https://example.com/archive/2024-06-04.csv");
    }

    #[test]
    fn test_expand_leaves_plain_input_alone() {
        let input = "https://example.com/static.csv";
        assert_eq!(expand_date_tokens(input, day(2024, 6, 10), 3), input);
    }

    #[test]
    fn test_resolve_applies_tokens_to_both_fields() {
        let request = FetchRequest {
            source_url: "https://example.com/$DATEDIFF.csv".to_string(),
            bucket: "landing-zone".to_string(),
            destination: "daily/$DATEISO.csv".to_string(),
            datediff: Some(1),
        };

        let resolved = request.resolve(day(2024, 3, 1)).unwrap();
        assert_eq!(resolved.url, "https://example.com/2024-02-29.csv");
        assert_eq!(resolved.destination.as_str(), "daily/2024-03-01.csv");
        assert_eq!(resolved.bucket.as_str(), "landing-zone");
    }

    #[test]
    fn test_resolve_rejects_diff_token_without_value() {
        let request = FetchRequest {
            source_url: "https://example.com/$DATEDIFF.csv".to_string(),
            bucket: "landing-zone".to_string(),
            destination: "file.csv".to_string(),
            datediff: None,
        };

        assert!(request.resolve(day(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_request_field_names() {
        let request: FetchRequest = serde_json::from_str(
            r#"{
                "source_file_name": "https://example.com/file.csv",
                "bucket_name": "landing-zone",
                "destination_blob_name": "incoming/file.csv",
                "datediff": 6
            }"#,
        )
        .unwrap();

        assert_eq!(request.source_url, "https://example.com/file.csv");
        assert_eq!(request.bucket, "landing-zone");
        assert_eq!(request.destination, "incoming/file.csv");
        assert_eq!(request.datediff, Some(6));
    }

    #[test]
    fn test_notification_shapes() {
        let ok = FetchNotification::fetched(
            "https://example.com/file.csv".to_string(),
            "gs://landing-zone/file.csv".to_string(),
        );
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["status"], "fetched");
        assert_eq!(value["uri"], "gs://landing-zone/file.csv");
        assert!(value.get("error").is_none());

        let failed = FetchNotification::failed(None, "boom".to_string());
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "boom");
        assert!(value.get("source_url").is_none());
    }
}
