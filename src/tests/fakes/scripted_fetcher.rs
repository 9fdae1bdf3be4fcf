// Page fetcher that replays a fixed script of results and records every call.

use crate::modules::issues::core::page::IssuePage;
use crate::modules::issues::core::ports::{IssuePageFetcher, IssueSearchQuery};
use crate::shared::core::errors::DataError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

struct RecordedCall {
    token: Option<String>,
    at: Instant,
    query: IssueSearchQuery,
}

pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<IssuePage, DataError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Result<IssuePage, DataError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requested_tokens(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().iter().map(|c| c.token.clone()).collect()
    }

    pub fn call_offsets(&self, since: Instant) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.at.duration_since(since))
            .collect()
    }

    pub fn last_query(&self) -> Option<IssueSearchQuery> {
        self.calls.lock().unwrap().last().map(|c| c.query.clone())
    }
}

#[async_trait]
impl IssuePageFetcher for ScriptedFetcher {
    async fn fetch_page(
        &self,
        query: &IssueSearchQuery,
        page_token: Option<&str>,
    ) -> Result<IssuePage, DataError> {
        self.calls.lock().unwrap().push(RecordedCall {
            token: page_token.map(str::to_string),
            at: Instant::now(),
            query: query.clone(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DataError::transport("fetch script exhausted", false)))
    }
}
