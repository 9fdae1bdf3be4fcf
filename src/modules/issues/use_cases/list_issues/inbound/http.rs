use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::modules::issues::core::issue::Issue;
use crate::modules::issues::use_cases::list_issues::window::ListWindow;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct ListIssuesParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct ListIssuesResponse {
    pub total: u64,
    pub items: Vec<Issue>,
}

pub async fn handle(
    State(state): State<AppState>,
    Query(params): Query<ListIssuesParams>,
) -> impl IntoResponse {
    let window = ListWindow::new(params.offset, params.limit);
    match state.queries.list(window.offset, window.limit).await {
        Ok(slice) => Json(ListIssuesResponse {
            total: slice.total,
            items: slice.items,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "listing issues failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod list_issues_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::modules::issues::adapters::outbound::issue_store_in_memory::InMemoryIssueStore;
    use crate::modules::issues::core::ports::TransactionBoundary;
    use crate::modules::issues::use_cases::load_issues::loader::IssueBatchLoader;
    use crate::modules::issues::use_cases::sync_issues::upsert_issues::upsert_issues;
    use crate::shell::state::AppState;
    use crate::tests::fixtures::issues::issues_with_ids;

    use super::handle;

    async fn make_test_state(offline: bool) -> AppState {
        let store = Arc::new(InMemoryIssueStore::new());
        let issues = issues_with_ids(1..=25);
        store
            .transaction(move |tx| Box::pin(async move { upsert_issues(tx, issues).await }))
            .await
            .unwrap();
        store.set_offline(offline);
        AppState {
            queries: store.clone(),
            loader: IssueBatchLoader::new(store),
        }
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/issues", get(handle))
            .with_state(state)
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app(state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn it_should_return_the_default_window_ordered_by_id() {
        let (status, json) = get_json(make_test_state(false).await, "/issues").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 25);
        let items = json["items"].as_array().unwrap();
        assert_eq!(items.len(), 20);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[0]["key"], "CORE-1");
    }

    #[tokio::test]
    async fn it_should_honor_offset_and_limit() {
        let (status, json) =
            get_json(make_test_state(false).await, "/issues?offset=22&limit=10").await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = json["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![23, 24, 25]);
    }

    #[tokio::test]
    async fn it_should_return_500_when_storage_is_offline() {
        let (status, _) = get_json(make_test_state(true).await, "/issues").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
