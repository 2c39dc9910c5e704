//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "breachcheck-server")]
#[command(about = "Breach lookup server: hashed email/phone search and k-anonymity password ranges")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "BREACHCHECK_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Persist to this snapshot file instead of keeping data in memory only
    #[arg(long, env = "BREACHCHECK_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Do not apply demo data at startup
    #[arg(long)]
    pub no_seed: bool,

    /// Do not mount the admin (write) routes
    #[arg(long)]
    pub no_admin: bool,

    /// Do not install the Prometheus recorder or serve /metrics
    #[arg(long)]
    pub no_metrics: bool,

    /// Per-request timeout
    #[arg(long, default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Maximum requests handled at once
    #[arg(long, default_value_t = 1024)]
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_file: None,
            no_seed: false,
            no_admin: false,
            no_metrics: false,
            request_timeout_secs: 10,
            max_concurrent_requests: 1024,
        }
    }
}
