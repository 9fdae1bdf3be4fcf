pub mod shared {
    pub mod core {
        pub mod errors;
    }
    pub mod infrastructure {
        pub mod clock;
        pub mod retry;
    }
}

pub mod modules {
    pub mod issues {
        pub mod core {
            pub mod issue;
            pub mod page;
            pub mod ports;
            pub mod project;
        }
        pub mod use_cases {
            pub mod sync_issues {
                pub mod config;
                pub mod handler;
                pub mod issue_pages;
                pub mod retrying_fetcher;
                pub mod upsert_issues;
            }
            pub mod load_issues {
                pub mod loader;
                pub mod inbound {
                    pub mod graphql;
                }
            }
            pub mod list_issues {
                pub mod window;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod http_issue_fetcher;
                pub mod issue_store_in_memory;
                pub mod issue_store_sqlite;
            }
        }
    }
}

pub mod shell;

#[cfg(test)]
pub mod tests {
    pub mod fakes;
    pub mod fixtures;

    pub mod e2e {
        pub mod sync_issues_tests;
    }
}
