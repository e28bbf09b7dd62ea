use clap::{Parser, Subcommand};

use crate::constants::DEFAULT_SOURCE_URL;

const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

#[derive(Parser, Debug)]
#[command(name = "doctor-directory")]
#[command(about = "Doctor listing with search, filters and URL-synced state", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the doctor payload into the data directory (reused if present).
    Fetch(SourceArgs),
    /// Apply a URL query string to the doctor list and print the result as JSON.
    Query(QueryArgs),
    /// Serve the JSON API.
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Data directory holding the downloaded payload.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// URL of the JSON array of doctors.
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Use an already-downloaded payload file instead of the data directory copy.
    #[arg(long)]
    pub payload_file: Option<String>,

    /// Do not download a missing payload; error instead.
    #[arg(long)]
    pub offline: bool,

    /// Re-download the payload even if it already exists.
    #[arg(long)]
    pub force_download: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Query string as it would appear in the page URL, e.g. "specialties=Dentist&sortBy=fees".
    #[arg(long, default_value = "")]
    pub query: String,

    /// Also print type-ahead suggestions for this partial input.
    #[arg(long)]
    pub suggest: Option<String>,

    /// Submit a search term after applying the query string.
    #[arg(long)]
    pub search: Option<String>,

    /// Set the consultation mode: video, clinic, or all.
    #[arg(long)]
    pub consultation: Option<String>,

    /// Set the sort order: fees, experience, or none.
    #[arg(long)]
    pub sort: Option<String>,

    /// Toggle a specialty checkbox (repeatable).
    #[arg(long)]
    pub toggle_specialty: Vec<String>,

    /// Clear consultation, specialty and sort filters.
    #[arg(long)]
    pub clear_filters: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8788)]
    pub port: u16,
}
