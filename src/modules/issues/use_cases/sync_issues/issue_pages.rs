// Lazy, forward only sequence of search result pages.
//
// Purpose
// - Drive a page fetcher across pages by following the continuation token.
//
// Responsibilities
// - Start without a token and request pages strictly one after another.
// - Yield each page's issues, or a failure after which the stream ends.
// - End after a terminal page.
// - Wait the inter page delay before every request that follows a page.
// - Request nothing at all for an empty project set.
//
// Boundaries
// - Nothing is fetched ahead of the consumer. Dropping the stream stops all further requests.

use crate::modules::issues::core::issue::Issue;
use crate::modules::issues::core::ports::{IssuePageFetcher, IssueSearchQuery};
use crate::shared::core::errors::DataError;
use futures::stream::{self, Stream};
use std::time::Duration;
use tracing::debug;

enum Cursor {
    Start,
    Next(String),
    Done,
}

pub fn issue_pages<'a, TFetcher>(
    fetcher: &'a TFetcher,
    query: IssueSearchQuery,
    inter_page_delay: Duration,
) -> impl Stream<Item = Result<Vec<Issue>, DataError>> + Send + 'a
where
    TFetcher: IssuePageFetcher + ?Sized,
{
    let initial = if query.project_keys.is_empty() {
        Cursor::Done
    } else {
        Cursor::Start
    };

    stream::unfold((initial, query, 0usize), move |(cursor, query, page_number)| async move {
        let token = match cursor {
            Cursor::Done => return None,
            Cursor::Start => None,
            Cursor::Next(token) => {
                tokio::time::sleep(inter_page_delay).await;
                Some(token)
            }
        };

        match fetcher.fetch_page(&query, token.as_deref()).await {
            Ok(page) => {
                let page_number = page_number + 1;
                debug!(
                    page = page_number,
                    issues = page.issues.len(),
                    is_last = page.is_last,
                    "fetched issue page"
                );
                let next = match page.next_page_token {
                    Some(next_token) if !page.is_last => Cursor::Next(next_token),
                    _ => Cursor::Done,
                };
                Some((Ok(page.issues), (next, query, page_number)))
            }
            Err(error) => Some((Err(error), (Cursor::Done, query, page_number))),
        }
    })
}
