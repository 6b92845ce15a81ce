pub mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return the default config.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./gridclip.toml",
        "~/.config/gridclip/config.toml",
        "/etc/gridclip/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let config = Config::default();
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration.
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.rpc.url.is_some() {
        config
            .rpc
            .contract
            .parse::<gridclip_core::Address>()
            .map_err(|e| anyhow::anyhow!("Invalid contract address: {e}"))?;
    }

    if config.rpc.block_range_limit == 0 {
        anyhow::bail!("RPC block range limit cannot be 0");
    }

    if config.cache.recent_ttl_secs == 0 {
        anyhow::bail!("Recent cache TTL cannot be 0");
    }

    Ok(())
}
