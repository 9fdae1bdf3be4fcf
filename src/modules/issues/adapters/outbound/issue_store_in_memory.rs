// In memory issue store implementing every storage port.
//
// Purpose
// - Exercise the sync handler and the loader without a database.
//
// Responsibilities
// - Keep projects and issues in ordered maps keyed by id.
// - Stage writes per transaction and apply them in one write lock section on commit.
// - Count transactions, bulk writes and bulk lookups so tests can assert on them.
// - Fail every call while offline.

use crate::modules::issues::core::issue::{Issue, IssueId, IssueKey};
use crate::modules::issues::core::ports::{
    IssueQueries, IssueRowWriter, IssueSlice, ProjectKeySource, ProjectRegistry,
    TransactionBoundary,
};
use crate::modules::issues::core::project::{Project, ProjectKey};
use crate::shared::core::errors::DataError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryIssueStore {
    projects: RwLock<BTreeMap<i64, Project>>,
    issues: RwLock<BTreeMap<IssueId, Issue>>,
    is_offline: AtomicBool,
    commits_before_failure: AtomicUsize,
    fail_commits: AtomicBool,
    transactions: AtomicUsize,
    bulk_writes: AtomicUsize,
    bulk_lookups: AtomicUsize,
}

impl InMemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.is_offline.store(offline, Ordering::SeqCst);
    }

    /// Lets `commits` transactions succeed, then fails every later commit.
    pub fn fail_commits_after(&self, commits: usize) {
        self.commits_before_failure.store(commits, Ordering::SeqCst);
        self.fail_commits.store(true, Ordering::SeqCst);
    }

    pub async fn insert_project(&self, project: Project) {
        self.projects.write().await.insert(project.id, project);
    }

    pub async fn get(&self, id: IssueId) -> Option<Issue> {
        self.issues.read().await.get(&id).cloned()
    }

    pub async fn issue_count(&self) -> usize {
        self.issues.read().await.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    pub fn bulk_write_count(&self) -> usize {
        self.bulk_writes.load(Ordering::SeqCst)
    }

    pub fn bulk_lookup_count(&self) -> usize {
        self.bulk_lookups.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), DataError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(DataError::storage("issue store offline"));
        }
        Ok(())
    }

    fn reserve_commit(&self) -> Result<(), DataError> {
        if !self.fail_commits.load(Ordering::SeqCst) {
            return Ok(());
        }
        let remaining = self.commits_before_failure.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(DataError::storage("commit rejected"));
        }
        self.commits_before_failure.store(remaining - 1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit(&self, staged: Vec<Issue>) -> Result<(), DataError> {
        self.ensure_online()?;
        self.reserve_commit()?;
        let mut guard = self.issues.write().await;
        ensure_unique_keys(&guard, &staged)?;
        for issue in staged {
            match guard.get_mut(&issue.id) {
                Some(existing) => {
                    let created_at = existing.created_at;
                    *existing = Issue { created_at, ..issue };
                }
                None => {
                    guard.insert(issue.id, issue);
                }
            }
        }
        Ok(())
    }
}

/// Rejects the whole batch if applying it row by row would give one key to two ids.
fn ensure_unique_keys(
    stored: &BTreeMap<IssueId, Issue>,
    staged: &[Issue],
) -> Result<(), DataError> {
    let mut owners: HashMap<IssueKey, IssueId> = stored
        .values()
        .map(|issue| (issue.key.clone(), issue.id))
        .collect();
    let mut keys: HashMap<IssueId, IssueKey> = stored
        .values()
        .map(|issue| (issue.id, issue.key.clone()))
        .collect();
    for issue in staged {
        if let Some(owner) = owners.get(&issue.key).filter(|owner| **owner != issue.id) {
            return Err(DataError::storage(format!(
                "issue key {} already belongs to issue {owner}",
                issue.key
            )));
        }
        if let Some(previous) = keys.insert(issue.id, issue.key.clone()) {
            owners.remove(&previous);
        }
        owners.insert(issue.key.clone(), issue.id);
    }
    Ok(())
}

/// Writes staged until the enclosing transaction commits.
#[derive(Default)]
pub struct InMemoryTransaction {
    staged: Vec<Issue>,
    bulk_writes: usize,
}

#[async_trait]
impl IssueRowWriter for InMemoryTransaction {
    async fn upsert_rows(&mut self, issues: &[Issue]) -> Result<(), DataError> {
        self.bulk_writes += 1;
        self.staged.extend_from_slice(issues);
        Ok(())
    }
}

#[async_trait]
impl TransactionBoundary for InMemoryIssueStore {
    type Transaction = InMemoryTransaction;

    async fn transaction<T, F>(&self, work: F) -> Result<T, DataError>
    where
        T: Send + 'static,
        F: for<'tx> FnOnce(&'tx mut Self::Transaction) -> BoxFuture<'tx, Result<T, DataError>>
            + Send
            + 'static,
    {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;

        let mut transaction = InMemoryTransaction::default();
        let value = work(&mut transaction).await?;

        self.bulk_writes
            .fetch_add(transaction.bulk_writes, Ordering::SeqCst);
        self.commit(transaction.staged).await?;
        Ok(value)
    }
}

#[async_trait]
impl ProjectKeySource for InMemoryIssueStore {
    async fn list_project_keys(&self) -> Result<Vec<ProjectKey>, DataError> {
        self.ensure_online()?;
        Ok(self
            .projects
            .read()
            .await
            .values()
            .map(|project| project.key.clone())
            .collect())
    }
}

#[async_trait]
impl ProjectRegistry for InMemoryIssueStore {
    async fn register_project(&self, project: Project) -> Result<(), DataError> {
        self.ensure_online()?;
        self.insert_project(project).await;
        Ok(())
    }
}

#[async_trait]
impl IssueQueries for InMemoryIssueStore {
    async fn find_by_ids(&self, ids: &[IssueId]) -> Result<Vec<Issue>, DataError> {
        self.bulk_lookups.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;
        let guard = self.issues.read().await;
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<IssueSlice, DataError> {
        self.ensure_online()?;
        let guard = self.issues.read().await;
        let items = guard
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(IssueSlice {
            items,
            total: guard.len() as u64,
        })
    }
}
