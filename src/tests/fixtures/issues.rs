// Shared issue fixtures for unit and end to end tests.

use crate::modules::issues::core::issue::{Issue, IssueId, IssueKey, IssuePriority, IssueType};
use crate::modules::issues::core::ports::IssueSearchQuery;
use crate::modules::issues::core::project::{Project, ProjectKey};
use chrono::{DateTime, TimeZone, Utc};
use std::ops::RangeInclusive;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
}

pub fn issue_id(value: i64) -> IssueId {
    IssueId::new(value).unwrap()
}

pub fn project(id: i64, key: &str) -> Project {
    Project {
        id,
        key: ProjectKey::new(key),
        name: format!("{key} project"),
    }
}

pub fn search_query() -> IssueSearchQuery {
    IssueSearchQuery {
        project_keys: vec![ProjectKey::new("CORE")],
        created_since: fixed_now() - chrono::Duration::days(180),
        page_size: 100,
    }
}

pub fn issues_with_ids(ids: RangeInclusive<i64>) -> Vec<Issue> {
    ids.map(|id| IssueBuilder::new().id(id).build()).collect()
}

pub struct IssueBuilder {
    inner: Issue,
}

impl Default for IssueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl IssueBuilder {
    pub fn new() -> Self {
        let created_at = fixed_now() - chrono::Duration::days(2);
        Self {
            inner: Issue {
                id: issue_id(1),
                key: IssueKey::parse("CORE-1").unwrap(),
                project_id: 10,
                summary: "Login button does nothing".to_string(),
                description: Some("Clicking login has no effect on Safari".to_string()),
                issue_type: IssueType::Bug,
                priority: IssuePriority::High,
                created_at,
                updated_at: created_at + chrono::Duration::hours(5),
            },
        }
    }

    /// Sets the id and derives a matching `CORE-<id>` key.
    pub fn id(mut self, id: i64) -> Self {
        self.inner.id = issue_id(id);
        self.inner.key = IssueKey::parse(&format!("CORE-{id}")).unwrap();
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.inner.key = IssueKey::parse(key).unwrap();
        self
    }

    pub fn project_id(mut self, project_id: i64) -> Self {
        self.inner.project_id = project_id;
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.inner.summary = summary.into();
        self
    }

    pub fn description(mut self, description: Option<&str>) -> Self {
        self.inner.description = description.map(str::to_string);
        self
    }

    pub fn issue_type(mut self, issue_type: IssueType) -> Self {
        self.inner.issue_type = issue_type;
        self
    }

    pub fn priority(mut self, priority: IssuePriority) -> Self {
        self.inner.priority = priority;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.inner.created_at = created_at;
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.inner.updated_at = updated_at;
        self
    }

    pub fn build(self) -> Issue {
        self.inner
    }
}

#[cfg(test)]
mod issue_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_keep_the_key_in_step_with_the_id() {
        let issue = IssueBuilder::new().id(42).build();
        assert_eq!(issue.id.value(), 42);
        assert_eq!(issue.key.as_str(), "CORE-42");
    }

    #[rstest]
    fn it_should_build_consecutive_issues() {
        let ids: Vec<i64> = issues_with_ids(3..=5).iter().map(|i| i.id.value()).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }
}
