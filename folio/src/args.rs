use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Folio catalog service
#[derive(Debug, Parser)]
#[command(name = "folio", about = "Book, author and user catalog with uniform error payloads")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml", env = "FOLIO_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "FOLIO_LISTEN")]
    pub listen: Option<SocketAddr>,
}
