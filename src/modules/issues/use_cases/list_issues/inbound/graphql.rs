use async_graphql::{Context, Object, Result as GqlResult, SimpleObject};

use crate::modules::issues::use_cases::list_issues::window::ListWindow;
use crate::modules::issues::use_cases::load_issues::inbound::graphql::GqlIssue;
use crate::shell::state::AppState;

#[derive(SimpleObject, Clone)]
#[graphql(name = "IssueConnection")]
pub struct GqlIssueConnection {
    pub total: u64,
    pub items: Vec<GqlIssue>,
}

#[derive(Default)]
pub struct ListIssuesQuery;

#[Object]
impl ListIssuesQuery {
    async fn list_issues(
        &self,
        context: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> GqlResult<GqlIssueConnection> {
        let state = context.data_unchecked::<AppState>();
        let window = ListWindow::from_signed(offset, limit);
        let slice = state.queries.list(window.offset, window.limit).await?;
        Ok(GqlIssueConnection {
            total: slice.total,
            items: slice.items.into_iter().map(Into::into).collect(),
        })
    }
}
