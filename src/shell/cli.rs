use clap::{Parser, Subcommand};

/// Local mirror of a remote issue tracker.
#[derive(Debug, Parser)]
#[command(name = "issue_mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one sync against the remote tracker
    Sync,

    /// Serve the GraphQL and HTTP query surface
    Serve,

    /// Manage the projects that bound a sync
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Register or update a project
    Add {
        /// Remote project id
        #[arg(long)]
        id: i64,

        /// Project key, e.g. CORE
        #[arg(long)]
        key: String,

        /// Display name
        #[arg(long)]
        name: String,
    },
}
