mod cli;

use gridclip::{cache, config, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "gridclip=trace,gridclip_chain=trace,gridclip_db=debug,tower_http=debug".to_string()
        } else {
            "gridclip=debug,gridclip_chain=info,gridclip_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Backfill {
            from_block,
            to_block,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_backfill(from_block, to_block, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("gridclip {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn start_server(
    host: String,
    port: u16,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting gridclip log-cache server");
    server::start_server(config).await
}

async fn run_backfill(
    from_block: Option<u64>,
    to_block: Option<u64>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let Some(ref url) = config.rpc.url else {
        anyhow::bail!("Backfill requires an RPC endpoint in [rpc] url");
    };
    let contract = config
        .rpc
        .contract
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid contract address: {e}"))?;

    let db_path = shellexpand::tilde(&config.cache.db_path).into_owned();
    let db = gridclip_db::init_pool(&db_path)?;
    let provider = Arc::new(gridclip_chain::JsonRpcProvider::new(url.clone(), contract));

    let service = cache::LogCacheService::new(db, provider, &config.rpc, &config.cache);
    let snapshot = service.backfill(from_block, to_block).await?;

    println!(
        "Backfilled historical tier: {} logs through block {}",
        snapshot.logs.len(),
        snapshot.covered_through_block
    );
    Ok(())
}

fn validate_config(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Configuration is valid");
    if config.rpc.url.is_none() {
        println!("Note: no RPC endpoint configured; the log endpoint will answer 500");
    }
    Ok(())
}
