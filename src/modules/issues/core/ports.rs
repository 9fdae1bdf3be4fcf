// Ports define what the issue mirror needs from the outside world, without implementing it.
//
// Purpose
// - Describe the remote search API, the project source, the transactional store and the read side as traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - The in memory store implements every storage port. Scripted fetchers live under tests/fakes.

use crate::modules::issues::core::issue::{Issue, IssueId};
use crate::modules::issues::core::page::IssuePage;
use crate::modules::issues::core::project::{Project, ProjectKey};
use crate::shared::core::errors::DataError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSearchQuery {
    pub project_keys: Vec<ProjectKey>,
    pub created_since: DateTime<Utc>,
    pub page_size: u32,
}

#[async_trait]
pub trait IssuePageFetcher: Send + Sync {
    /// Performs exactly one remote call for the page starting at `page_token`.
    async fn fetch_page(
        &self,
        query: &IssueSearchQuery,
        page_token: Option<&str>,
    ) -> Result<IssuePage, DataError>;
}

#[async_trait]
pub trait ProjectKeySource: Send + Sync {
    async fn list_project_keys(&self) -> Result<Vec<ProjectKey>, DataError>;
}

#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    async fn register_project(&self, project: Project) -> Result<(), DataError>;
}

/// Insert-or-overwrite of issue rows keyed by issue id. Has no transaction awareness.
#[async_trait]
pub trait IssueRowWriter: Send {
    async fn upsert_rows(&mut self, issues: &[Issue]) -> Result<(), DataError>;
}

/// Runs a unit of work atomically: everything `work` wrote is applied if it returns `Ok`, nothing otherwise.
#[async_trait]
pub trait TransactionBoundary: Send + Sync {
    type Transaction: IssueRowWriter + Send;

    async fn transaction<T, F>(&self, work: F) -> Result<T, DataError>
    where
        T: Send + 'static,
        F: for<'tx> FnOnce(&'tx mut Self::Transaction) -> BoxFuture<'tx, Result<T, DataError>>
            + Send
            + 'static;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSlice {
    pub items: Vec<Issue>,
    pub total: u64,
}

#[async_trait]
pub trait IssueQueries: Send + Sync {
    /// Bulk point lookup. Unknown ids are absent from the result.
    async fn find_by_ids(&self, ids: &[IssueId]) -> Result<Vec<Issue>, DataError>;

    /// Issues ordered by id, with the total row count.
    async fn list(&self, offset: u64, limit: u64) -> Result<IssueSlice, DataError>;
}
