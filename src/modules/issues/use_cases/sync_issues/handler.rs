// Sync handler orchestrates one mirror run.
//
// Responsibilities
// - Resolve the project keys that bound the search.
// - Compute the lookback window from the injected clock.
// - Stream pages from the remote API and persist each page in its own transaction.
// - Accumulate the number of persisted issues and stop at the first failure.
//
// Boundaries
// - Pages committed before a failure stay committed. There is no compensation.
// - Nothing is retried here beyond the fetcher's own retry policy.

use crate::modules::issues::core::ports::{
    IssuePageFetcher, IssueSearchQuery, ProjectKeySource, TransactionBoundary,
};
use crate::modules::issues::use_cases::sync_issues::config::SyncConfig;
use crate::modules::issues::use_cases::sync_issues::issue_pages::issue_pages;
use crate::modules::issues::use_cases::sync_issues::upsert_issues::upsert_issues;
use crate::shared::core::errors::DataError;
use crate::shared::infrastructure::clock::Clock;
use futures::StreamExt;
use std::pin::pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not resolve project keys")]
    ProjectKeyFetchFailed(#[source] DataError),

    #[error("could not fetch issues")]
    IssueFetchFailed(#[source] DataError),

    #[error("could not persist issues")]
    IssuePersistFailed(#[source] DataError),

    #[error("lookback of {lookback} reaches past the earliest representable time")]
    LookbackOutOfRange { lookback: chrono::Duration },
}

impl SyncError {
    pub fn cause(&self) -> Option<&DataError> {
        match self {
            Self::ProjectKeyFetchFailed(e) | Self::IssueFetchFailed(e) | Self::IssuePersistFailed(e) => Some(e),
            Self::LookbackOutOfRange { .. } => None,
        }
    }
}

pub struct SyncIssuesHandler<TProjects, TFetcher, TStore>
where
    TProjects: ProjectKeySource + 'static,
    TFetcher: IssuePageFetcher + 'static,
    TStore: TransactionBoundary + 'static,
{
    projects: Arc<TProjects>,
    fetcher: Arc<TFetcher>,
    store: Arc<TStore>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
}

impl<TProjects, TFetcher, TStore> SyncIssuesHandler<TProjects, TFetcher, TStore>
where
    TProjects: ProjectKeySource + 'static,
    TFetcher: IssuePageFetcher + 'static,
    TStore: TransactionBoundary + 'static,
{
    pub fn new(
        projects: Arc<TProjects>,
        fetcher: Arc<TFetcher>,
        store: Arc<TStore>,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
    ) -> Self {
        Self {
            projects,
            fetcher,
            store,
            clock,
            config,
        }
    }

    pub async fn execute(&self) -> Result<usize, SyncError> {
        let span = info_span!("sync_issues", run_id = %Uuid::now_v7());
        self.run().instrument(span).await
    }

    async fn run(&self) -> Result<usize, SyncError> {
        let project_keys = self
            .projects
            .list_project_keys()
            .await
            .map_err(SyncError::ProjectKeyFetchFailed)?;

        let lookback = self.config.lookback;
        let created_since = self
            .clock
            .now()
            .checked_sub_signed(lookback)
            .ok_or(SyncError::LookbackOutOfRange { lookback })?;
        info!(
            projects = project_keys.len(),
            %created_since,
            "starting issue sync"
        );

        let query = IssueSearchQuery {
            project_keys,
            created_since,
            page_size: self.config.page_size,
        };
        let mut pages = pin!(issue_pages(
            &*self.fetcher,
            query,
            self.config.inter_page_delay
        ));

        let mut total = 0usize;
        while let Some(page) = pages.next().await {
            let issues = match page {
                Ok(issues) => issues,
                Err(error) => {
                    warn!(persisted = total, %error, "issue fetch failed, stopping sync");
                    return Err(SyncError::IssueFetchFailed(error));
                }
            };

            let persisted = self
                .store
                .transaction(move |tx| Box::pin(async move { upsert_issues(tx, issues).await }))
                .await
                .map_err(|error| {
                    warn!(persisted = total, %error, "issue persist failed, stopping sync");
                    SyncError::IssuePersistFailed(error)
                })?;

            total += persisted.len();
            info!(batch = persisted.len(), total, "committed issue page");
        }

        info!(total, "issue sync finished");
        Ok(total)
    }
}
