// Page fetcher decorator that retries transient transport failures.
//
// Responsibilities
// - Delegate each attempt to the wrapped fetcher with identical arguments.
// - Retry only failures flagged as retryable, following the configured backoff.
// - Surface a single failure carrying the last cause once attempts are spent.

use crate::modules::issues::core::page::IssuePage;
use crate::modules::issues::core::ports::{IssuePageFetcher, IssueSearchQuery};
use crate::shared::core::errors::DataError;
use crate::shared::infrastructure::retry::RetryPolicy;
use async_trait::async_trait;

pub struct RetryingPageFetcher<TFetcher>
where
    TFetcher: IssuePageFetcher,
{
    inner: TFetcher,
    policy: RetryPolicy,
}

impl<TFetcher> RetryingPageFetcher<TFetcher>
where
    TFetcher: IssuePageFetcher,
{
    pub fn new(inner: TFetcher, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &TFetcher {
        &self.inner
    }
}

#[async_trait]
impl<TFetcher> IssuePageFetcher for RetryingPageFetcher<TFetcher>
where
    TFetcher: IssuePageFetcher,
{
    async fn fetch_page(
        &self,
        query: &IssueSearchQuery,
        page_token: Option<&str>,
    ) -> Result<IssuePage, DataError> {
        self.policy
            .run("fetch_issue_page", DataError::is_retryable, || {
                self.inner.fetch_page(query, page_token)
            })
            .await
    }
}
