// SQLite implementation of the storage ports.
//
// Purpose
// - Durable local mirror of projects and issues.
//
// Responsibilities
// - Create the schema idempotently on open.
// - Stage writes per transaction and apply them inside one SQLite transaction on commit.
// - Upsert by issue id. An existing row keeps its created_at, everything else is overwritten.
// - Run every blocking call on the blocking thread pool.

use crate::modules::issues::core::issue::{Issue, IssueId, IssueKey, IssuePriority, IssueType};
use crate::modules::issues::core::ports::{
    IssueQueries, IssueRowWriter, IssueSlice, ProjectKeySource, ProjectRegistry,
    TransactionBoundary,
};
use crate::modules::issues::core::project::{Project, ProjectKey};
use crate::shared::core::errors::DataError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use rusqlite::{Connection, Row, params, params_from_iter};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS projects (
    id   INTEGER PRIMARY KEY,
    key  TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS issues (
    id          INTEGER PRIMARY KEY,
    key         TEXT NOT NULL UNIQUE,
    project_id  INTEGER NOT NULL,
    summary     TEXT NOT NULL,
    description TEXT,
    issue_type  TEXT NOT NULL,
    priority    TEXT NOT NULL,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS issues_project_id ON issues (project_id);
";

const UPSERT_ISSUE: &str = "
INSERT INTO issues (id, key, project_id, summary, description, issue_type, priority, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
ON CONFLICT (id) DO UPDATE SET
    key = excluded.key,
    project_id = excluded.project_id,
    summary = excluded.summary,
    description = excluded.description,
    issue_type = excluded.issue_type,
    priority = excluded.priority,
    updated_at = excluded.updated_at
";

/// Stays below SQLite's bound parameter limit for a single statement.
const MAX_IDS_PER_LOOKUP: usize = 900;

const ISSUE_COLUMNS: &str =
    "id, key, project_id, summary, description, issue_type, priority, created_at, updated_at";

fn storage_error(message: &str) -> impl FnOnce(rusqlite::Error) -> DataError + '_ {
    move |e| DataError::storage(message).with_cause(e)
}

#[derive(Clone)]
pub struct SqliteIssueStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteIssueStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let connection = Connection::open(path).map_err(storage_error("failed to open database"))?;
        Self::from_connection(connection)
    }

    pub fn open_in_memory() -> Result<Self, DataError> {
        let connection =
            Connection::open_in_memory().map_err(storage_error("failed to open database"))?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, DataError> {
        migrate(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    async fn with_connection<T, F>(&self, operation: &'static str, work: F) -> Result<T, DataError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let connection = self.connection.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = connection
                .lock()
                .map_err(|_| DataError::storage("database connection lock poisoned"))?;
            work(&mut guard).map_err(storage_error(operation))
        })
        .await
        .map_err(|e| DataError::storage("database task panicked").with_cause(e))?
    }
}

/// Creates the tables when missing. Safe to run on every open.
fn migrate(connection: &Connection) -> Result<(), DataError> {
    connection
        .execute_batch(SCHEMA)
        .map_err(storage_error("failed to migrate schema"))
}

struct IssueRecord {
    id: i64,
    key: String,
    project_id: i64,
    summary: String,
    description: Option<String>,
    issue_type: String,
    priority: String,
    created_at: i64,
    updated_at: i64,
}

impl IssueRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: row.get(1)?,
            project_id: row.get(2)?,
            summary: row.get(3)?,
            description: row.get(4)?,
            issue_type: row.get(5)?,
            priority: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_issue(self) -> Result<Issue, DataError> {
        let timestamp = |millis: i64| {
            DateTime::<Utc>::from_timestamp_millis(millis)
                .ok_or_else(|| DataError::storage(format!("stored timestamp {millis} out of range")))
        };
        Ok(Issue {
            id: IssueId::new(self.id)?,
            key: IssueKey::parse(&self.key)?,
            project_id: self.project_id,
            summary: self.summary,
            description: self.description,
            issue_type: IssueType::from_remote_name(&self.issue_type),
            priority: IssuePriority::from_remote_name(&self.priority),
            created_at: timestamp(self.created_at)?,
            updated_at: timestamp(self.updated_at)?,
        })
    }
}

fn into_issues(records: Vec<IssueRecord>) -> Result<Vec<Issue>, DataError> {
    records.into_iter().map(IssueRecord::into_issue).collect()
}

/// Writes staged until the enclosing transaction commits.
#[derive(Default)]
pub struct SqliteTransaction {
    staged: Vec<Issue>,
}

#[async_trait]
impl IssueRowWriter for SqliteTransaction {
    async fn upsert_rows(&mut self, issues: &[Issue]) -> Result<(), DataError> {
        self.staged.extend_from_slice(issues);
        Ok(())
    }
}

#[async_trait]
impl TransactionBoundary for SqliteIssueStore {
    type Transaction = SqliteTransaction;

    async fn transaction<T, F>(&self, work: F) -> Result<T, DataError>
    where
        T: Send + 'static,
        F: for<'tx> FnOnce(&'tx mut Self::Transaction) -> BoxFuture<'tx, Result<T, DataError>>
            + Send
            + 'static,
    {
        let mut transaction = SqliteTransaction::default();
        let value = work(&mut transaction).await?;
        let staged = transaction.staged;
        if staged.is_empty() {
            return Ok(value);
        }

        self.with_connection("failed to commit issues", move |connection| {
            let tx = connection.transaction()?;
            {
                let mut statement = tx.prepare_cached(UPSERT_ISSUE)?;
                for issue in &staged {
                    statement.execute(params![
                        issue.id.value(),
                        issue.key.as_str(),
                        issue.project_id,
                        issue.summary,
                        issue.description,
                        issue.issue_type.as_str(),
                        issue.priority.as_str(),
                        issue.created_at.timestamp_millis(),
                        issue.updated_at.timestamp_millis(),
                    ])?;
                }
            }
            tx.commit()
        })
        .await?;
        Ok(value)
    }
}

#[async_trait]
impl ProjectKeySource for SqliteIssueStore {
    async fn list_project_keys(&self) -> Result<Vec<ProjectKey>, DataError> {
        self.with_connection("failed to list project keys", |connection| {
            let mut statement = connection.prepare("SELECT key FROM projects ORDER BY key")?;
            let keys = statement
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(keys.into_iter().map(ProjectKey::new).collect())
        })
        .await
    }
}

#[async_trait]
impl ProjectRegistry for SqliteIssueStore {
    async fn register_project(&self, project: Project) -> Result<(), DataError> {
        self.with_connection("failed to register project", move |connection| {
            connection.execute(
                "INSERT INTO projects (id, key, name) VALUES (?1, ?2, ?3)
                 ON CONFLICT (id) DO UPDATE SET key = excluded.key, name = excluded.name",
                params![project.id, project.key.as_str(), project.name],
            )?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl IssueQueries for SqliteIssueStore {
    async fn find_by_ids(&self, ids: &[IssueId]) -> Result<Vec<Issue>, DataError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let values: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        let records = self
            .with_connection("failed to look up issues", move |connection| {
                let mut records = Vec::with_capacity(values.len());
                for chunk in values.chunks(MAX_IDS_PER_LOOKUP) {
                    let placeholders = vec!["?"; chunk.len()].join(", ");
                    let sql =
                        format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id IN ({placeholders})");
                    let mut statement = connection.prepare_cached(&sql)?;
                    for record in
                        statement.query_map(params_from_iter(chunk.iter()), IssueRecord::from_row)?
                    {
                        records.push(record?);
                    }
                }
                Ok(records)
            })
            .await?;
        into_issues(records)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<IssueSlice, DataError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let (records, total) = self
            .with_connection("failed to list issues", move |connection| {
                let total: i64 =
                    connection.query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
                let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues ORDER BY id LIMIT ?1 OFFSET ?2");
                let mut statement = connection.prepare(&sql)?;
                let records = statement
                    .query_map(params![limit, offset], IssueRecord::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok((records, total))
            })
            .await?;
        Ok(IssueSlice {
            items: into_issues(records)?,
            total: total.max(0) as u64,
        })
    }
}
