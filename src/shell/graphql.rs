use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptyMutation, EmptySubscription, MergedObject, Schema};

pub use crate::modules::issues::use_cases::list_issues::inbound::graphql::ListIssuesQuery;
pub use crate::modules::issues::use_cases::load_issues::inbound::graphql::IssueLookupQuery;
pub use crate::shell::state::AppState;

#[derive(MergedObject, Default)]
pub struct QueryRoot(IssueLookupQuery, ListIssuesQuery);

pub type AppSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(state: AppState) -> AppSchema {
    let loader = DataLoader::new(state.loader.clone(), tokio::spawn);
    Schema::build(QueryRoot::default(), EmptyMutation, EmptySubscription)
        .data(loader)
        .data(state.loader.clone())
        .data(state)
        .finish()
}
