// One page of search results as returned by a single remote call.
//
// Invariant
// - Either the page is terminal, or it carries the token the next request resumes from.

use crate::modules::issues::core::issue::Issue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub next_page_token: Option<String>,
    pub is_last: bool,
}

impl IssuePage {
    /// Builds a page, treating a missing continuation token as the end of the results.
    pub fn new(issues: Vec<Issue>, next_page_token: Option<String>, is_last: bool) -> Self {
        let next_page_token = next_page_token.filter(|token| !token.is_empty());
        let is_last = is_last || next_page_token.is_none();
        Self {
            issues,
            next_page_token: if is_last { None } else { next_page_token },
            is_last,
        }
    }

    pub fn last(issues: Vec<Issue>) -> Self {
        Self::new(issues, None, true)
    }
}
