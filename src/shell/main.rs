use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use issue_mirror::modules::issues::adapters::outbound::http_issue_fetcher::HttpIssuePageFetcher;
use issue_mirror::modules::issues::adapters::outbound::issue_store_sqlite::SqliteIssueStore;
use issue_mirror::modules::issues::core::ports::ProjectRegistry;
use issue_mirror::modules::issues::core::project::{Project, ProjectKey};
use issue_mirror::modules::issues::use_cases::sync_issues::handler::SyncIssuesHandler;
use issue_mirror::modules::issues::use_cases::sync_issues::retrying_fetcher::RetryingPageFetcher;
use issue_mirror::shared::infrastructure::clock::SystemClock;
use issue_mirror::shell::cli::{Cli, Command, ProjectCommand};
use issue_mirror::shell::config::AppConfig;
use issue_mirror::shell::http::router;
use issue_mirror::shell::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let store = Arc::new(
        SqliteIssueStore::open(&config.database_path)
            .with_context(|| format!("opening {}", config.database_path.display()))?,
    );

    match cli.command {
        Command::Sync => {
            let fetcher = HttpIssuePageFetcher::new(config.remote()?)?;
            let fetcher = Arc::new(RetryingPageFetcher::new(fetcher, config.retry.clone()));
            let handler = SyncIssuesHandler::new(
                store.clone(),
                fetcher,
                store,
                Arc::new(SystemClock),
                config.sync,
            );
            let total = handler.execute().await?;
            info!(total, "sync complete");
        }
        Command::Serve => {
            let app = router(AppState::new(store));
            let listener = tokio::net::TcpListener::bind(config.bind_addr)
                .await
                .with_context(|| format!("binding {}", config.bind_addr))?;
            info!("GraphQL endpoint: http://{}/gql", config.bind_addr);
            axum::serve(listener, app).await?;
        }
        Command::Project {
            command: ProjectCommand::Add { id, key, name },
        } => {
            let key = ProjectKey::new(key);
            store
                .register_project(Project {
                    id,
                    key: key.clone(),
                    name,
                })
                .await?;
            info!(id, %key, "project registered");
        }
    }
    Ok(())
}
