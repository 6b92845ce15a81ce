//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires an in-memory cache database and a
//! scripted log provider into a full [`AppContext`]. The [`with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use gridclip::cache::LogCacheService;
use gridclip::config::{CacheConfig, RpcConfig};
use gridclip::server::{build_router, AppContext};
use gridclip_chain::rpc::LogProvider;
use gridclip_core::{Fid, LogEntry, LogSnapshot};
use gridclip_db::queries::tiers::{self, Tier};
use gridclip_db::{get_conn, init_memory_pool, DbPool};

pub const OWNER: &str = "0xabcdef0123456789abcdef0123456789abcdef01";

/// Build a log entry with derived-but-unique hash for the block/index pair.
pub fn log_entry(block: u64, index: u64) -> LogEntry {
    LogEntry {
        user: OWNER.parse().unwrap(),
        fid: Fid(7),
        timestamp: block * 10,
        transaction_hash: format!("0x{block:060x}{index:04x}"),
        log_index: index,
        block_number: block,
    }
}

/// Provider serving a fixed chain state, counting fetches.
pub struct StaticProvider {
    pub head: u64,
    pub logs: Vec<LogEntry>,
    fetch_calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(head: u64, logs: Vec<LogEntry>) -> Arc<Self> {
        Arc::new(Self {
            head,
            logs,
            fetch_calls: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogProvider for StaticProvider {
    async fn head_block(&self) -> gridclip_chain::Result<u64> {
        Ok(self.head)
    }

    async fn fetch_logs(&self, from: u64, to: u64) -> gridclip_chain::Result<Vec<LogEntry>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .logs
            .iter()
            .filter(|l| l.block_number >= from && l.block_number <= to)
            .cloned()
            .collect())
    }
}

/// A fully-constructed [`AppContext`] backed by an in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub provider: Arc<StaticProvider>,
}

impl TestHarness {
    /// Harness with a scripted provider and empty cache tiers.
    pub fn new(head: u64, logs: Vec<LogEntry>) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let provider = StaticProvider::new(head, logs);

        let service = LogCacheService::new(
            db.clone(),
            provider.clone(),
            &RpcConfig::default(),
            &CacheConfig::default(),
        );

        Self {
            ctx: AppContext {
                cache: Some(Arc::new(service)),
            },
            db,
            provider,
        }
    }

    /// Harness simulating a deployment with no RPC endpoint configured.
    pub fn without_rpc() -> Self {
        Self {
            ctx: AppContext { cache: None },
            db: init_memory_pool().expect("failed to create in-memory pool"),
            provider: StaticProvider::new(0, Vec::new()),
        }
    }

    /// Seed the historical tier directly.
    pub fn seed_historical(&self, covered: u64, logs: Vec<LogEntry>) {
        let conn = get_conn(&self.db).unwrap();
        tiers::store(
            &conn,
            Tier::Historical,
            &LogSnapshot {
                logs,
                covered_through_block: covered,
                timestamp: Utc::now(),
            },
        )
        .unwrap();
    }

    /// Start an Axum server on a random port and return the harness
    /// together with the bound socket address.
    pub async fn with_server(head: u64, logs: Vec<LogEntry>) -> (Self, SocketAddr) {
        Self::new(head, logs).serve().await
    }

    /// Serve this harness's router on a random port.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = build_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }
}
