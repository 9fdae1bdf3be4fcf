use crate::modules::issues::core::ports::IssueQueries;
use crate::modules::issues::use_cases::load_issues::loader::IssueBatchLoader;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<dyn IssueQueries + Send + Sync>,
    pub loader: IssueBatchLoader,
}

impl AppState {
    pub fn new(queries: Arc<dyn IssueQueries + Send + Sync>) -> Self {
        Self {
            loader: IssueBatchLoader::new(queries.clone()),
            queries,
        }
    }
}
