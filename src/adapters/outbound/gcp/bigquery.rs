use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{
    errors::{GcpApiError, GcpApiResult},
    value_objects::ObjectUri,
};

use super::auth::TokenSource;

pub const DEFAULT_BIGQUERY_ENDPOINT: &str = "https://bigquery.googleapis.com";
pub const DEFAULT_TRANSFER_ENDPOINT: &str = "https://bigquerydatatransfer.googleapis.com";

/// Source formats accepted by load jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    NewlineDelimitedJson,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::NewlineDelimitedJson => "NEWLINE_DELIMITED_JSON",
        }
    }
}

/// Destination table within the client's project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    pub dataset: String,
    pub table: String,
}

impl TableReference {
    pub fn new(dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            table: table.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResponse {
    job_reference: JobReference,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct StartManualRunsResponse {
    #[serde(default)]
    runs: Vec<TransferRun>,
}

#[derive(Debug, Deserialize)]
struct TransferRun {
    name: String,
}

/// Client for the BigQuery and BigQuery Data Transfer REST APIs.
pub struct BigQueryClient {
    client: reqwest::Client,
    base_url: String,
    transfer_base_url: String,
    project: String,
    token_source: Arc<TokenSource>,
}

impl BigQueryClient {
    pub fn new(
        client: reqwest::Client,
        project: impl Into<String>,
        token_source: Arc<TokenSource>,
    ) -> Self {
        Self::with_endpoints(
            client,
            DEFAULT_BIGQUERY_ENDPOINT,
            DEFAULT_TRANSFER_ENDPOINT,
            project,
            token_source,
        )
    }

    pub fn with_endpoints(
        client: reqwest::Client,
        base_url: impl Into<String>,
        transfer_base_url: impl Into<String>,
        project: impl Into<String>,
        token_source: Arc<TokenSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            transfer_base_url: transfer_base_url.into(),
            project: project.into(),
            token_source,
        }
    }

    async fn token(&self) -> GcpApiResult<String> {
        self.token_source.token().await
    }

    /// Start a load job that replaces the destination table with the
    /// contents of the given objects. Returns the job id.
    pub async fn start_load_job(
        &self,
        source_uris: &[ObjectUri],
        table: &TableReference,
        format: SourceFormat,
    ) -> GcpApiResult<String> {
        let token = self.token().await?;

        let url = format!("{}/bigquery/v2/projects/{}/jobs", self.base_url, self.project);
        let uris: Vec<String> = source_uris.iter().map(|u| u.to_string()).collect();
        let body = json!({
            "configuration": {
                "load": {
                    "sourceUris": uris,
                    "destinationTable": {
                        "projectId": self.project,
                        "datasetId": table.dataset,
                        "tableId": table.table,
                    },
                    "sourceFormat": format.as_str(),
                    "autodetect": true,
                    "writeDisposition": "WRITE_TRUNCATE",
                }
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GcpApiError::InfrastructureError {
                message: format!("Failed to reach BigQuery: {}", e),
                source: Some(e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcpApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: JobResponse =
            response
                .json()
                .await
                .map_err(|e| GcpApiError::UnexpectedResponse {
                    message: format!("Malformed job response: {}", e),
                })?;

        Ok(parsed.job_reference.job_id)
    }

    /// Request a manual run of a transfer config. `resource` is the full
    /// config name, e.g. `projects/p/locations/eu/transferConfigs/123`.
    /// Returns the names of the runs that were scheduled.
    pub async fn start_transfer_run(&self, resource: &str) -> GcpApiResult<Vec<String>> {
        let token = self.token().await?;

        let url = format!("{}/v1/{}:startManualRuns", self.transfer_base_url, resource);
        let body = json!({ "requestedRunTime": requested_run_time(Utc::now()) });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GcpApiError::InfrastructureError {
                message: format!("Failed to reach the transfer service: {}", e),
                source: Some(e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcpApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: StartManualRunsResponse =
            response
                .json()
                .await
                .map_err(|e| GcpApiError::UnexpectedResponse {
                    message: format!("Malformed transfer response: {}", e),
                })?;

        Ok(parsed.runs.into_iter().map(|r| r.name).collect())
    }
}

/// Manual runs must be scheduled in the future, so pad the current time
/// by a few seconds.
fn requested_run_time(now: DateTime<Utc>) -> String {
    (now + chrono::Duration::seconds(10)).to_rfc3339_opts(SecondsFormat::Secs, true)
}
