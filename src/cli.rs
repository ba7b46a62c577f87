//! Command-line interface configuration.

use argh::FromArgs;
use std::{net::IpAddr, path::PathBuf};

/// Restricted web server for the VirtueMachine repository
#[derive(Debug, FromArgs)]
pub struct Cli {
    /// repository root directory to serve from
    #[argh(option)]
    pub root: PathBuf,

    /// bind address (default: '0.0.0.0')
    #[argh(option, default = "\"0.0.0.0\".parse().unwrap()")]
    pub bind: IpAddr,

    /// TCP port to listen on (default: 8080)
    #[argh(option, default = "8080")]
    pub port: u16,
}
