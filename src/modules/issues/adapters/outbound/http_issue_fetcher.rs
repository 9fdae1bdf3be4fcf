// HTTP implementation of the IssuePageFetcher port against the tracker's JQL search endpoint.
//
// Responsibilities
// - Send one authenticated search request per call, scoped by project and creation date.
// - Translate the transport payload into domain issues.
// - Classify failures: connection problems, 429 and 5xx are retryable. Everything else is not.

use crate::modules::issues::core::issue::{Issue, IssueId, IssueKey, IssuePriority, IssueType};
use crate::modules::issues::core::page::IssuePage;
use crate::modules::issues::core::ports::{IssuePageFetcher, IssueSearchQuery};
use crate::shared::core::errors::DataError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SEARCH_PATH: &str = "/rest/api/2/search/jql";

const REQUESTED_FIELDS: [&str; 7] = [
    "project",
    "summary",
    "description",
    "issuetype",
    "priority",
    "created",
    "updated",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteApiConfig {
    /// Base URL of the tracker, e.g. "https://tracker.example.com".
    pub base_url: String,
    /// Static bearer credential.
    pub api_token: String,
    pub search_path: String,
    pub request_timeout: Duration,
}

impl RemoteApiConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    fn search_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.search_path
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: String,
    max_results: u32,
    fields: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    next_page_token: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RemoteIssue>,
    next_page_token: Option<String>,
    #[serde(default)]
    is_last: bool,
}

#[derive(Deserialize)]
struct RemoteIssue {
    id: String,
    key: String,
    fields: RemoteFields,
}

#[derive(Deserialize)]
struct RemoteFields {
    project: RemoteProject,
    summary: String,
    #[serde(default)]
    description: Option<String>,
    issuetype: RemoteNamed,
    #[serde(default)]
    priority: Option<RemoteNamed>,
    created: String,
    updated: String,
}

#[derive(Deserialize)]
struct RemoteProject {
    id: String,
}

#[derive(Deserialize)]
struct RemoteNamed {
    name: String,
}

pub struct HttpIssuePageFetcher {
    client: Client,
    config: RemoteApiConfig,
}

impl HttpIssuePageFetcher {
    pub fn new(config: RemoteApiConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DataError::transport("failed to build HTTP client", false).with_cause(e))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl IssuePageFetcher for HttpIssuePageFetcher {
    async fn fetch_page(
        &self,
        query: &IssueSearchQuery,
        page_token: Option<&str>,
    ) -> Result<IssuePage, DataError> {
        let body = SearchRequest {
            jql: build_jql(query),
            max_results: query.page_size,
            fields: &REQUESTED_FIELDS,
            next_page_token: page_token,
        };

        let response = self
            .client
            .post(self.config.search_url())
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let retryable = e.is_timeout() || e.is_connect() || e.is_request();
                DataError::transport("issue search request failed", retryable).with_cause(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::transport(
                format!("issue search returned {status}"),
                is_retryable_status(status),
            ));
        }

        let payload: SearchResponse = response.json().await.map_err(|e| {
            DataError::transport("issue search returned an unreadable body", false).with_cause(e)
        })?;

        let issues = payload
            .issues
            .into_iter()
            .map(to_issue)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            issues = issues.len(),
            is_last = payload.is_last,
            "issue search page received"
        );
        Ok(IssuePage::new(issues, payload.next_page_token, payload.is_last))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn build_jql(query: &IssueSearchQuery) -> String {
    let projects = query
        .project_keys
        .iter()
        .map(|key| {
            let escaped = key.as_str().replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "project in ({projects}) AND created >= \"{}\" ORDER BY created ASC",
        query.created_since.format("%Y-%m-%d %H:%M")
    )
}

fn malformed(message: String) -> DataError {
    DataError::transport(message, false)
}

fn to_issue(remote: RemoteIssue) -> Result<Issue, DataError> {
    let id: IssueId = remote
        .id
        .parse()
        .map_err(|e: DataError| malformed(format!("remote issue id {:?}: {e}", remote.id)))?;
    let key = IssueKey::parse(&remote.key)
        .map_err(|e| malformed(format!("remote issue {id}: {e}")))?;
    let project_id = remote
        .fields
        .project
        .id
        .parse::<i64>()
        .map_err(|e| malformed(format!("remote issue {key}: bad project id")).with_cause(e))?;
    let fields = remote.fields;

    Ok(Issue {
        id,
        key,
        project_id,
        summary: fields.summary,
        description: fields.description,
        issue_type: IssueType::from_remote_name(&fields.issuetype.name),
        priority: fields
            .priority
            .map(|p| IssuePriority::from_remote_name(&p.name))
            .unwrap_or(IssuePriority::Unset),
        created_at: parse_remote_timestamp(&fields.created)?,
        updated_at: parse_remote_timestamp(&fields.updated)?,
    })
}

fn parse_remote_timestamp(raw: &str) -> Result<DateTime<Utc>, DataError> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| malformed(format!("remote timestamp {raw:?}")).with_cause(e))
}
