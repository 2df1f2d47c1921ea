use crate::api::models::{ProjectRecord, TrackerConfig};
use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub forwarding: ForwardingConfig,
    /// Project registry keyed by project key; seeded into the ledger at
    /// startup.
    #[serde(default)]
    pub projects: HashMap<String, ProjectConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_fjall_path")]
    pub fjall_path: PathBuf,
    /// Upper bound on one uploaded attachment part.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            fjall_path: default_fjall_path(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_fjall_path() -> PathBuf {
    PathBuf::from("data/ledger")
}

fn default_max_upload_bytes() -> ByteSize {
    ByteSize(25 * 1024 * 1024) // 25 MB, enough for a short webm recording
}

/// Attachment storage provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Memory,
    Local,
}

/// Attachment storage configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    /// Root directory for the `local` provider.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Tracker forwarding configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForwardingConfig {
    /// Bound on the single forwarding attempt made per report.
    #[serde(default = "default_forward_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_forward_timeout_secs(),
        }
    }
}

fn default_forward_timeout_secs() -> u64 {
    15
}

/// One project entry from the `[projects]` table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub integration: Option<TrackerConfig>,
}

impl ProjectConfig {
    pub fn to_record(&self, key: &str) -> ProjectRecord {
        ProjectRecord {
            key: key.to_string(),
            name: self.name.clone(),
            integration: self.integration.clone(),
        }
    }
}
