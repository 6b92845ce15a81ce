//! Configuration types with serde defaults.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub rpc: RpcConfig,
    pub cache: CacheConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Upstream chain RPC settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint. The log endpoint returns 500 when unset.
    pub url: Option<String>,
    /// Clip contract address the log filter targets.
    pub contract: String,
    /// Provider's maximum block span per `eth_getLogs` call.
    pub block_range_limit: u64,
    /// Blocks to look back on a cold start with no cache tiers.
    pub lookback_blocks: u64,
    /// Block the contract was deployed at; backfill's default start.
    pub deploy_block: Option<u64>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: None,
            contract: String::new(),
            block_range_limit: 1000,
            lookback_blocks: 10_000,
            deploy_block: None,
        }
    }
}

/// Cache tier persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite file holding the cache tiers.
    pub db_path: String,
    /// How long a recent-tier snapshot stays usable.
    pub recent_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: "./gridclip.db".to_string(),
            recent_ttl_secs: 120,
        }
    }
}
