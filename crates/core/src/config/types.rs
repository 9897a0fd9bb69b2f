use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::cost::StakeAmounts;
use crate::engine::EngineConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub offload: Option<OffloadConfig>,
    #[serde(default)]
    pub stakes: StakeAmounts,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Background solve jobs allowed to run at once (default: 4)
    #[serde(default = "default_max_running_jobs")]
    pub max_running_jobs: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_running_jobs: default_max_running_jobs(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_max_running_jobs() -> usize {
    4
}

/// Database configuration (saved selection)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("wheel.db")
}

/// Remote solver configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OffloadConfig {
    /// Remote solve service URL (e.g., "http://compute.local:8080")
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Candidate pool size above which solves are sent to the remote (default: 200000)
    #[serde(default = "default_threshold")]
    pub threshold: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_threshold() -> u64 {
    200_000
}
