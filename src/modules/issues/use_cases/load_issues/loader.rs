// Batched point lookup of issues by raw identifier.
//
// Purpose
// - Resolve many requested ids with a single bulk query instead of one query per id.
//
// Responsibilities
// - Parse every raw id. Malformed ids fail on their own and are left out of the query.
// - Deduplicate the parsed ids and issue at most one bulk lookup.
// - Map a batch level failure onto every requested key, malformed ones included.
// - Map each parsed key to its issue, or to a not found failure scoped to that key.
//
// Boundaries
// - Results are built fresh per call. Nothing is cached between calls.

use crate::modules::issues::core::issue::{Issue, IssueId};
use crate::modules::issues::core::ports::IssueQueries;
use crate::shared::core::errors::DataError;
use async_graphql::dataloader::Loader;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum IssueLoadError {
    #[error(transparent)]
    InvalidIdentifier(DataError),

    #[error("issue {id} not found")]
    NotFound { id: IssueId },

    #[error("issue lookup failed")]
    FetchFailed(#[source] DataError),
}

pub type IssueLookup = HashMap<String, Result<Issue, IssueLoadError>>;

#[derive(Clone)]
pub struct IssueBatchLoader {
    queries: Arc<dyn IssueQueries>,
}

impl IssueBatchLoader {
    pub fn new(queries: Arc<dyn IssueQueries>) -> Self {
        Self { queries }
    }

    pub async fn load_many<S: AsRef<str> + Sync>(&self, raw_ids: &[S]) -> IssueLookup {
        let mut results = IssueLookup::with_capacity(raw_ids.len());
        let mut parsed: Vec<(&str, IssueId)> = Vec::with_capacity(raw_ids.len());
        let mut seen = HashSet::new();
        let mut unique_ids = Vec::new();

        for raw in raw_ids {
            let raw: &str = raw.as_ref();
            match raw.parse::<IssueId>() {
                Ok(id) => {
                    parsed.push((raw, id));
                    if seen.insert(id) {
                        unique_ids.push(id);
                    }
                }
                Err(error) => {
                    results.insert(raw.to_string(), Err(IssueLoadError::InvalidIdentifier(error)));
                }
            }
        }

        if unique_ids.is_empty() {
            return results;
        }

        debug!(
            requested = raw_ids.len(),
            unique = unique_ids.len(),
            "loading issue batch"
        );
        match self.queries.find_by_ids(&unique_ids).await {
            Err(error) => raw_ids
                .iter()
                .map(|raw| {
                    let raw: &str = raw.as_ref();
                    (raw.to_string(), Err(IssueLoadError::FetchFailed(error.clone())))
                })
                .collect(),
            Ok(issues) => {
                let by_id: HashMap<IssueId, Issue> =
                    issues.into_iter().map(|issue| (issue.id, issue)).collect();
                for (raw, id) in parsed {
                    let outcome = by_id
                        .get(&id)
                        .cloned()
                        .ok_or(IssueLoadError::NotFound { id });
                    results.insert(raw.to_string(), outcome);
                }
                results
            }
        }
    }
}

/// Bridges the batch loader into async-graphql's request batching.
impl Loader<String> for IssueBatchLoader {
    type Value = Result<Issue, IssueLoadError>;
    type Error = IssueLoadError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        Ok(self.load_many(keys).await)
    }
}
