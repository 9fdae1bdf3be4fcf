use crate::modules::issues::adapters::outbound::issue_store_in_memory::InMemoryIssueStore;
use crate::modules::issues::adapters::outbound::issue_store_sqlite::SqliteIssueStore;
use crate::modules::issues::core::page::IssuePage;
use crate::modules::issues::core::ports::{
    IssuePageFetcher, IssueQueries, IssueSearchQuery, ProjectRegistry, TransactionBoundary,
};
use crate::modules::issues::use_cases::load_issues::loader::{IssueBatchLoader, IssueLoadError};
use crate::modules::issues::use_cases::sync_issues::config::SyncConfig;
use crate::modules::issues::use_cases::sync_issues::handler::{SyncError, SyncIssuesHandler};
use crate::modules::issues::use_cases::sync_issues::retrying_fetcher::RetryingPageFetcher;
use crate::modules::issues::use_cases::sync_issues::upsert_issues::upsert_issues;
use crate::shared::core::errors::DataError;
use crate::shared::infrastructure::clock::FixedClock;
use crate::shared::infrastructure::retry::RetryPolicy;
use crate::tests::fakes::scripted_fetcher::ScriptedFetcher;
use crate::tests::fixtures::issues::{fixed_now, issue_id, issues_with_ids, project};
use std::sync::Arc;
use std::time::Duration;

fn three_pages_of_five() -> Vec<Result<IssuePage, DataError>> {
    vec![
        Ok(IssuePage::new(issues_with_ids(1..=5), Some("t-2".into()), false)),
        Ok(IssuePage::new(issues_with_ids(6..=10), Some("t-3".into()), false)),
        Ok(IssuePage::last(issues_with_ids(11..=15))),
    ]
}

fn quick_config() -> SyncConfig {
    SyncConfig::default()
        .with_inter_page_delay(Duration::ZERO)
}

async fn store_with_projects(keys: &[&str]) -> Arc<InMemoryIssueStore> {
    let store = InMemoryIssueStore::new();
    for (index, key) in keys.iter().enumerate() {
        store.insert_project(project(index as i64 + 10, key)).await;
    }
    Arc::new(store)
}

async fn sync_into(
    store: Arc<InMemoryIssueStore>,
    fetcher: Arc<ScriptedFetcher>,
) -> Result<usize, SyncError> {
    SyncIssuesHandler::new(
        store.clone(),
        fetcher,
        store,
        Arc::new(FixedClock(fixed_now())),
        quick_config(),
    )
    .execute()
    .await
}

#[tokio::test]
async fn syncs_nothing_when_no_project_is_registered() {
    let store = store_with_projects(&[]).await;
    let fetcher = Arc::new(ScriptedFetcher::new(three_pages_of_five()));

    let total = sync_into(store.clone(), fetcher.clone()).await.unwrap();

    assert_eq!(total, 0);
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(store.transaction_count(), 0);
}

#[tokio::test]
async fn persists_every_page_in_its_own_transaction() {
    let store = store_with_projects(&["CORE"]).await;
    let fetcher = Arc::new(ScriptedFetcher::new(three_pages_of_five()));

    let total = sync_into(store.clone(), fetcher.clone()).await.unwrap();

    assert_eq!(total, 15);
    assert_eq!(
        fetcher.requested_tokens(),
        vec![None, Some("t-2".to_string()), Some("t-3".to_string())]
    );
    assert_eq!(store.transaction_count(), 3);
    assert_eq!(store.bulk_write_count(), 3);
    assert_eq!(store.issue_count().await, 15);
}

#[tokio::test]
async fn leaves_the_mirror_unchanged_when_the_same_data_is_synced_twice() {
    let store = store_with_projects(&["CORE"]).await;

    let first = sync_into(store.clone(), Arc::new(ScriptedFetcher::new(three_pages_of_five())))
        .await
        .unwrap();
    let before = store.list(0, 100).await.unwrap();
    let second = sync_into(store.clone(), Arc::new(ScriptedFetcher::new(three_pages_of_five())))
        .await
        .unwrap();
    let after = store.list(0, 100).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(before, after);
}

#[tokio::test]
async fn counts_persisted_issues_across_pages_of_uneven_size() {
    let store = store_with_projects(&["CORE"]).await;
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(IssuePage::new(issues_with_ids(1..=4), Some("t-2".into()), false)),
        Ok(IssuePage::new(vec![], Some("t-3".into()), false)),
        Ok(IssuePage::last(issues_with_ids(5..=5))),
    ]));

    let total = sync_into(store.clone(), fetcher).await.unwrap();

    assert_eq!(total, 5);
    assert_eq!(store.transaction_count(), 3);
    assert_eq!(store.bulk_write_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn keeps_committed_pages_when_a_later_page_exhausts_its_retries() {
    let store = store_with_projects(&["CORE"]).await;
    let unavailable = || Err(DataError::transport("issue search returned 503", true));
    let scripted = Arc::new(ScriptedFetcher::new(vec![
        Ok(IssuePage::new(issues_with_ids(1..=5), Some("t-2".into()), false)),
        unavailable(),
        unavailable(),
        unavailable(),
        unavailable(),
        Ok(IssuePage::last(issues_with_ids(6..=10))),
    ]));
    let fetcher = Arc::new(RetryingPageFetcher::new(
        ScriptedFetcherHandle(scripted.clone()),
        RetryPolicy::default(),
    ));

    let result = SyncIssuesHandler::new(
        store.clone(),
        fetcher,
        store.clone(),
        Arc::new(FixedClock(fixed_now())),
        SyncConfig::default(),
    )
    .execute()
    .await;

    match result {
        Err(SyncError::IssueFetchFailed(cause)) => assert!(cause.is_retryable()),
        other => panic!("expected IssueFetchFailed, got {other:?}"),
    }
    assert_eq!(scripted.call_count(), 5);
    assert_eq!(store.transaction_count(), 1);
    assert_eq!(store.issue_count().await, 5);
}

#[tokio::test]
async fn serves_synced_issues_through_the_batch_loader() {
    let store = SqliteIssueStore::open_in_memory().unwrap();
    store.register_project(project(10, "CORE")).await.unwrap();
    let store = Arc::new(store);
    let fetcher = Arc::new(ScriptedFetcher::new(three_pages_of_five()));

    let total = SyncIssuesHandler::new(
        store.clone(),
        fetcher,
        store.clone(),
        Arc::new(FixedClock(fixed_now())),
        quick_config(),
    )
    .execute()
    .await
    .unwrap();
    let loader = IssueBatchLoader::new(store);
    let keys: Vec<String> = ["3", "15", "16"].iter().map(|s| s.to_string()).collect();
    let lookup = loader.load_many(&keys).await;

    assert_eq!(total, 15);
    assert_eq!(lookup["3"].as_ref().unwrap().id, issue_id(3));
    assert_eq!(lookup["15"].as_ref().unwrap().key.as_str(), "CORE-15");
    assert!(matches!(lookup["16"], Err(IssueLoadError::NotFound { .. })));
}

/// Lets a shared scripted fetcher sit behind the retry decorator.
struct ScriptedFetcherHandle(Arc<ScriptedFetcher>);

#[async_trait::async_trait]
impl IssuePageFetcher for ScriptedFetcherHandle {
    async fn fetch_page(
        &self,
        query: &IssueSearchQuery,
        page_token: Option<&str>,
    ) -> Result<IssuePage, DataError> {
        self.0.fetch_page(query, page_token).await
    }
}

#[tokio::test]
async fn resolves_a_very_large_batch_from_the_sqlite_store() {
    let store = Arc::new(SqliteIssueStore::open_in_memory().unwrap());
    let issues = issues_with_ids(1..=40_000);
    store
        .transaction(move |tx| Box::pin(async move { upsert_issues(tx, issues).await }))
        .await
        .unwrap();
    let loader = IssueBatchLoader::new(store);
    let keys: Vec<String> = (1..=40_000).map(|id: i64| id.to_string()).collect();

    let lookup = loader.load_many(&keys).await;

    assert_eq!(lookup.len(), 40_000);
    assert!(lookup.values().all(Result::is_ok));
}
