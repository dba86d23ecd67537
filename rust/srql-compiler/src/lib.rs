//! SRQL compiler: parses SRQL text and lowers it to ClickHouse SQL, Proton SQL
//! or ArangoDB AQL, with typed parameters and pagination bookkeeping.

pub mod ast;
pub mod bind;
pub mod config;
pub mod dialect;
pub mod error;
pub mod lexer;
pub mod normalize;
pub mod pagination;
pub mod parser;
pub mod query;
pub mod schema;
pub mod server;
pub mod state;
pub mod telemetry;
pub mod time;

pub use ast::Query;
pub use dialect::Backend;
pub use parser::parse;
pub use query::{translate, translate_literal, translate_request, Artifact, TranslationMode};

use crate::{config::AppConfig, server::Server};

/// Bootstraps the SRQL compiler service using environment configuration.
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    Server::new(config).run().await
}
