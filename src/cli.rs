use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "lazyarticles",
    version,
    about = "TUI for reading and editing articles on a remote API"
)]
pub struct Args {
    /// Backend base URL (e.g., "http://localhost:9000/api")
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Prefill the login username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
