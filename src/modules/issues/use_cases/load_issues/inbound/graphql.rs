use async_graphql::dataloader::DataLoader;
use async_graphql::{Context, Object, Result as GqlResult, SimpleObject};
use chrono::{DateTime, Utc};

use crate::modules::issues::core::issue::Issue;
use crate::modules::issues::use_cases::load_issues::loader::{IssueBatchLoader, IssueLoadError};

#[derive(SimpleObject, Clone)]
#[graphql(name = "Issue")]
pub struct GqlIssue {
    pub id: String,
    pub key: String,
    pub project_id: i64,
    pub summary: String,
    pub description: Option<String>,
    pub issue_type: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Issue> for GqlIssue {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id.to_string(),
            key: issue.key.to_string(),
            project_id: issue.project_id,
            summary: issue.summary,
            description: issue.description,
            issue_type: issue.issue_type.as_str().to_string(),
            priority: issue.priority.as_str().to_string(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// Outcome for one requested id. Exactly one of `issue` and `error` is set.
#[derive(SimpleObject, Clone)]
#[graphql(name = "IssueLookup")]
pub struct GqlIssueLookup {
    pub requested_id: String,
    pub issue: Option<GqlIssue>,
    pub error: Option<String>,
}

impl GqlIssueLookup {
    fn from_outcome(requested_id: String, outcome: Result<Issue, IssueLoadError>) -> Self {
        match outcome {
            Ok(issue) => Self {
                requested_id,
                issue: Some(issue.into()),
                error: None,
            },
            Err(error) => Self {
                requested_id,
                issue: None,
                error: Some(error.to_string()),
            },
        }
    }
}

#[derive(Default)]
pub struct IssueLookupQuery;

#[Object]
impl IssueLookupQuery {
    /// Resolves through the schema wide, uncached DataLoader so concurrent lookups share one query.
    async fn issue(&self, context: &Context<'_>, id: String) -> GqlResult<Option<GqlIssue>> {
        let loader = context.data_unchecked::<DataLoader<IssueBatchLoader>>();
        match loader.load_one(id).await? {
            None | Some(Err(IssueLoadError::NotFound { .. })) => Ok(None),
            Some(Ok(issue)) => Ok(Some(issue.into())),
            Some(Err(error)) => Err(error.into()),
        }
    }

    async fn issues(&self, context: &Context<'_>, ids: Vec<String>) -> Vec<GqlIssueLookup> {
        let loader = context.data_unchecked::<IssueBatchLoader>();
        let outcomes = loader.load_many(&ids).await;
        // Duplicated ids repeat the same outcome at each requested position.
        ids.into_iter()
            .filter_map(|id| {
                let outcome = outcomes.get(&id).cloned()?;
                Some(GqlIssueLookup::from_outcome(id, outcome))
            })
            .collect()
    }
}
