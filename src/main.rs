mod cli;
mod constants;
mod doctor;
mod download;
mod engine;
mod query;
mod server;
mod session;
mod storage;
mod url_state;
mod view;

use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match args.cmd {
        cli::Command::Fetch(cmd) => download::ensure_payload(&cmd)
            .await
            .map(|path| tracing::info!("Doctor payload ready at {}", path.display()))
            .context("fetch failed"),
        cli::Command::Query(cmd) => query::run(cmd).await.context("query failed"),
        cli::Command::Serve(cmd) => server::run(cmd).await.context("serve failed"),
    }
}
