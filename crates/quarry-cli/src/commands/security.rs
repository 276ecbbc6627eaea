//! Security negotiation command
//!
//! Usage: quarry security --host <HOST> [--port <PORT>] [--conf-dir <DIR>]

use clap::Args;
use quarry_security::{SecurityClient, SecuritySite};
use std::path::PathBuf;

use super::runtime::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct SecurityArgs {
    #[arg(long)]
    pub host: String,

    #[arg(long, default_value_t = 8038)]
    pub port: u16,

    /// Directory holding sentry-site.xml (or sentry-site.yaml)
    #[arg(long, default_value = ".quarry")]
    pub conf_dir: PathBuf,

    /// Connecting user
    #[arg(long, default_value = "hue")]
    pub username: String,
}

/// Print the negotiated security descriptor as JSON
pub fn execute(args: SecurityArgs) -> CliResult {
    let site = SecuritySite::load_dir(&args.conf_dir)?;
    let client = SecurityClient::new(args.host, args.port, args.username, site);
    print_json(&client.security())
}
