// Composition root for the issue mirror.
//
// Responsibilities
// - Read config from environment.
// - Parse the command line.
// - Expose the query surface (GraphQL schema and HTTP router) over shared state.

pub mod cli;
pub mod config;
pub mod graphql;
pub mod http;
pub mod state;
