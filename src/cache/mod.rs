//! Three-tier log cache reconciliation.
//!
//! Every request merges up to three sources into one deduplicated,
//! timestamp-descending event set: the durable historical tier (seeded by
//! an offline backfill, trusted up to its recorded height), the short-TTL
//! recent tier (the last fully-merged result), and the chain RPC, which is
//! authoritative for anything newer. A block range covered by a tier is
//! never re-fetched; anything above the chosen base is paged from the RPC
//! in provider-limit-sized chunks.
//!
//! The cache is a performance layer, not a correctness boundary:
//! concurrent requests may both recompute the same delta and both write
//! the recent tier, last writer wins.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use gridclip_chain::rpc::{fetch_logs_paged, LogProvider};
use gridclip_core::{merge_and_dedup, Error, LogEntry, LogSnapshot, Result};
use gridclip_db::queries::tiers::{self, Tier};
use gridclip_db::{get_conn, DbPool};

use crate::config::{CacheConfig, RpcConfig};

/// Which source a response was ultimately based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    /// The historical tier alone covered the chain head.
    Historical,
    /// The recent tier alone covered the chain head.
    Recent,
    /// A tier was extended with freshly fetched logs.
    Rpc,
    /// No tier existed; a bounded-lookback fetch served the request.
    Cold,
}

/// One reconciliation result.
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    /// Deduplicated entries, newest first.
    pub logs: Vec<LogEntry>,
    /// Chain height the merged set covers.
    pub covered_through_block: u64,
    pub source: CacheSource,
}

/// The reconciliation service shared by all requests.
pub struct LogCacheService {
    db: DbPool,
    provider: Arc<dyn LogProvider>,
    block_range_limit: u64,
    lookback_blocks: u64,
    recent_ttl_secs: u64,
    deploy_block: Option<u64>,
}

impl LogCacheService {
    pub fn new(
        db: DbPool,
        provider: Arc<dyn LogProvider>,
        rpc: &RpcConfig,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            db,
            provider,
            block_range_limit: rpc.block_range_limit,
            lookback_blocks: rpc.lookback_blocks,
            recent_ttl_secs: cache.recent_ttl_secs,
            deploy_block: rpc.deploy_block,
        }
    }

    /// Whether a recent-tier snapshot is still within its TTL.
    fn is_fresh(&self, snapshot: &LogSnapshot) -> bool {
        Utc::now().signed_duration_since(snapshot.timestamp)
            <= chrono::Duration::seconds(self.recent_ttl_secs as i64)
    }

    /// Pick the base tier: the freshest covered height wins, with the
    /// recent tier preferred on ties. An expired recent snapshot is
    /// treated as absent.
    fn load_base(&self) -> Result<Option<(LogSnapshot, CacheSource)>> {
        let conn = get_conn(&self.db)?;
        let historical = tiers::load(&conn, Tier::Historical)?;
        let recent = tiers::load(&conn, Tier::Recent)?.filter(|s| self.is_fresh(s));

        Ok(match (historical, recent) {
            (Some(h), Some(r)) => {
                if r.covered_through_block >= h.covered_through_block {
                    Some((r, CacheSource::Recent))
                } else {
                    Some((h, CacheSource::Historical))
                }
            }
            (Some(h), None) => Some((h, CacheSource::Historical)),
            (None, Some(r)) => Some((r, CacheSource::Recent)),
            (None, None) => None,
        })
    }

    /// Produce the merged event set for one request.
    pub async fn reconcile(&self) -> Result<CacheOutcome> {
        let base = self.load_base()?;

        let head = self
            .provider
            .head_block()
            .await
            .map_err(|e| Error::rpc(e.to_string()))?;

        let (base_logs, base_covered, base_source) = match base {
            Some((snapshot, source)) => (
                snapshot.logs,
                snapshot.covered_through_block,
                Some(source),
            ),
            None => (Vec::new(), head.saturating_sub(self.lookback_blocks), None),
        };

        // A tier can claim more than the chain currently has after a
        // rollback; clamp rather than treating the tier as complete.
        let covered = base_covered.min(head);

        if let Some(source) = base_source {
            if covered >= head {
                return Ok(CacheOutcome {
                    logs: merge_and_dedup(base_logs),
                    covered_through_block: covered,
                    source,
                });
            }
        }

        let fetched =
            fetch_logs_paged(self.provider.as_ref(), covered + 1, head, self.block_range_limit)
                .await;
        tracing::debug!(
            from = covered + 1,
            to = head,
            fetched = fetched.len(),
            "Extended log cache from RPC"
        );

        let mut all = base_logs;
        all.extend(fetched);
        let logs = merge_and_dedup(all);

        self.store_recent(LogSnapshot {
            logs: logs.clone(),
            covered_through_block: head,
            timestamp: Utc::now(),
        });

        Ok(CacheOutcome {
            logs,
            covered_through_block: head,
            source: if base_source.is_some() {
                CacheSource::Rpc
            } else {
                CacheSource::Cold
            },
        })
    }

    /// Persist the merged result as the new recent tier, fire-and-forget:
    /// the response never blocks on the write, and the tier is only
    /// touched with a fully-merged snapshot.
    fn store_recent(&self, snapshot: LogSnapshot) {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let conn = match get_conn(&db) {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!("Skipping recent-tier write: {e}");
                    return;
                }
            };
            if let Err(e) = tiers::store(&conn, Tier::Recent, &snapshot) {
                tracing::warn!("Failed to write recent tier: {e}");
            }
        });
    }

    /// Seed or extend the historical tier from a block range sweep.
    ///
    /// Defaults: from the configured deploy block (or genesis) through the
    /// chain head. Existing historical entries are kept and merged.
    pub async fn backfill(&self, from: Option<u64>, to: Option<u64>) -> Result<LogSnapshot> {
        let head = self
            .provider
            .head_block()
            .await
            .map_err(|e| Error::rpc(e.to_string()))?;

        let to = to.unwrap_or(head).min(head);
        let from = from.or(self.deploy_block).unwrap_or(0).min(to);

        tracing::info!(from, to, "Backfilling historical tier");
        let fetched =
            fetch_logs_paged(self.provider.as_ref(), from, to, self.block_range_limit).await;

        let conn = get_conn(&self.db)?;
        let existing = tiers::load(&conn, Tier::Historical)?;
        let existing_covered = existing
            .as_ref()
            .map(|s| s.covered_through_block)
            .unwrap_or(0);
        let mut all = existing.map(|s| s.logs).unwrap_or_default();
        all.extend(fetched);

        let snapshot = LogSnapshot {
            logs: merge_and_dedup(all),
            covered_through_block: to.max(existing_covered),
            timestamp: Utc::now(),
        };
        tiers::store(&conn, Tier::Historical, &snapshot)?;

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gridclip_core::Fid;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const OWNER: &str = "0xabcdef0123456789abcdef0123456789abcdef01";

    fn log(block: u64, index: u64) -> LogEntry {
        LogEntry {
            user: OWNER.parse().unwrap(),
            fid: Fid(1),
            timestamp: block * 10,
            transaction_hash: format!("0x{block:060x}{index:04x}"),
            log_index: index,
            block_number: block,
        }
    }

    /// Provider serving a fixed log set, recording fetch ranges.
    struct ScriptedProvider {
        head: u64,
        logs: Vec<LogEntry>,
        fetch_calls: AtomicUsize,
        ranges: Mutex<Vec<(u64, u64)>>,
    }

    impl ScriptedProvider {
        fn new(head: u64, logs: Vec<LogEntry>) -> Arc<Self> {
            Arc::new(Self {
                head,
                logs,
                fetch_calls: AtomicUsize::new(0),
                ranges: Mutex::new(Vec::new()),
            })
        }

        fn fetches(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LogProvider for ScriptedProvider {
        async fn head_block(&self) -> gridclip_chain::Result<u64> {
            Ok(self.head)
        }

        async fn fetch_logs(&self, from: u64, to: u64) -> gridclip_chain::Result<Vec<LogEntry>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.ranges.lock().unwrap().push((from, to));
            Ok(self
                .logs
                .iter()
                .filter(|l| l.block_number >= from && l.block_number <= to)
                .cloned()
                .collect())
        }
    }

    fn service(provider: Arc<ScriptedProvider>) -> (LogCacheService, DbPool) {
        let db = gridclip_db::init_memory_pool().unwrap();
        let service = LogCacheService::new(
            db.clone(),
            provider,
            &RpcConfig::default(),
            &CacheConfig::default(),
        );
        (service, db)
    }

    fn seed_tier(db: &DbPool, tier: Tier, covered: u64, logs: Vec<LogEntry>) {
        let conn = get_conn(db).unwrap();
        tiers::store(
            &conn,
            tier,
            &LogSnapshot {
                logs,
                covered_through_block: covered,
                timestamp: Utc::now(),
            },
        )
        .unwrap();
    }

    async fn wait_for_recent(db: &DbPool) -> LogSnapshot {
        for _ in 0..100 {
            let conn = get_conn(db).unwrap();
            if let Some(snapshot) = tiers::load(&conn, Tier::Recent).unwrap() {
                return snapshot;
            }
            drop(conn);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("recent tier was never written");
    }

    #[tokio::test]
    async fn cold_start_fetches_bounded_lookback() {
        let provider = ScriptedProvider::new(20_000, vec![log(15_000, 0), log(19_999, 1)]);
        let (service, _db) = service(provider.clone());

        let outcome = service.reconcile().await.unwrap();
        assert_eq!(outcome.source, CacheSource::Cold);
        assert_eq!(outcome.covered_through_block, 20_000);
        assert_eq!(outcome.logs.len(), 2);

        // Lookback window: [head - 10000 + 1, head] in 1000-block chunks.
        let ranges = provider.ranges.lock().unwrap().clone();
        assert_eq!(ranges.first().unwrap().0, 10_001);
        assert_eq!(ranges.last().unwrap().1, 20_000);
        assert_eq!(ranges.len(), 10);
    }

    #[tokio::test]
    async fn covered_base_skips_the_rpc_entirely() {
        let provider = ScriptedProvider::new(5000, vec![]);
        let (service, db) = service(provider.clone());
        seed_tier(&db, Tier::Historical, 5000, vec![log(100, 0)]);

        let outcome = service.reconcile().await.unwrap();
        assert_eq!(outcome.source, CacheSource::Historical);
        assert_eq!(outcome.covered_through_block, 5000);
        assert_eq!(outcome.logs.len(), 1);
        assert_eq!(provider.fetches(), 0);
    }

    #[tokio::test]
    async fn stale_base_is_extended_from_the_rpc() {
        let provider = ScriptedProvider::new(3000, vec![log(2500, 0)]);
        let (service, db) = service(provider.clone());
        seed_tier(&db, Tier::Historical, 2000, vec![log(100, 0)]);

        let outcome = service.reconcile().await.unwrap();
        assert_eq!(outcome.source, CacheSource::Rpc);
        assert_eq!(outcome.covered_through_block, 3000);
        assert_eq!(outcome.logs.len(), 2);

        // Only the uncovered range was paged.
        let ranges = provider.ranges.lock().unwrap().clone();
        assert_eq!(ranges.first().unwrap().0, 2001);
        assert_eq!(ranges.last().unwrap().1, 3000);
    }

    #[tokio::test]
    async fn fresher_recent_tier_wins_over_historical() {
        let provider = ScriptedProvider::new(4000, vec![]);
        let (service, db) = service(provider.clone());
        seed_tier(&db, Tier::Historical, 2000, vec![log(100, 0)]);
        seed_tier(&db, Tier::Recent, 4000, vec![log(100, 0), log(3500, 1)]);

        let outcome = service.reconcile().await.unwrap();
        assert_eq!(outcome.source, CacheSource::Recent);
        assert_eq!(outcome.logs.len(), 2);
        assert_eq!(provider.fetches(), 0);
    }

    #[tokio::test]
    async fn expired_recent_tier_is_ignored() {
        let provider = ScriptedProvider::new(4000, vec![]);
        let (service, db) = service(provider.clone());
        seed_tier(&db, Tier::Historical, 4000, vec![log(100, 0)]);

        // A recent tier well past the 120s TTL, claiming more coverage.
        let conn = get_conn(&db).unwrap();
        tiers::store(
            &conn,
            Tier::Recent,
            &LogSnapshot {
                logs: vec![log(100, 0), log(3900, 9)],
                covered_through_block: 4000,
                timestamp: Utc::now() - chrono::Duration::seconds(600),
            },
        )
        .unwrap();
        drop(conn);

        let outcome = service.reconcile().await.unwrap();
        assert_eq!(outcome.source, CacheSource::Historical);
        assert_eq!(outcome.logs.len(), 1);
    }

    #[tokio::test]
    async fn rollback_clamps_covered_height_to_head() {
        let provider = ScriptedProvider::new(500, vec![]);
        let (service, db) = service(provider.clone());
        seed_tier(&db, Tier::Historical, 1000, vec![log(100, 0)]);

        let outcome = service.reconcile().await.unwrap();
        assert_eq!(outcome.covered_through_block, 500);
        assert_eq!(outcome.source, CacheSource::Historical);
        assert_eq!(provider.fetches(), 0);
    }

    #[tokio::test]
    async fn duplicate_entries_across_tiers_merge_to_one() {
        let shared = log(2500, 0);
        let provider = ScriptedProvider::new(3000, vec![shared.clone()]);
        let (service, db) = service(provider.clone());
        // The same identity is already present in the historical base.
        seed_tier(&db, Tier::Historical, 2000, vec![shared.clone(), log(100, 1)]);

        let outcome = service.reconcile().await.unwrap();
        assert_eq!(outcome.logs.len(), 2);
        assert_eq!(
            outcome
                .logs
                .iter()
                .filter(|l| l.key() == shared.key())
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn logs_are_returned_newest_first() {
        let provider =
            ScriptedProvider::new(3000, vec![log(2100, 0), log(2900, 0), log(2500, 0)]);
        let (service, _db) = service(provider);

        let outcome = service.reconcile().await.unwrap();
        let blocks: Vec<u64> = outcome.logs.iter().map(|l| l.block_number).collect();
        assert_eq!(blocks, vec![2900, 2500, 2100]);
    }

    #[tokio::test]
    async fn merged_result_is_persisted_as_recent_tier() {
        let provider = ScriptedProvider::new(3000, vec![log(2500, 0)]);
        let (service, db) = service(provider);
        seed_tier(&db, Tier::Historical, 2000, vec![log(100, 0)]);

        let outcome = service.reconcile().await.unwrap();
        let recent = wait_for_recent(&db).await;
        assert_eq!(recent.covered_through_block, 3000);
        assert_eq!(recent.logs, outcome.logs);
    }

    #[tokio::test]
    async fn reconcile_twice_with_no_new_blocks_is_stable() {
        let provider = ScriptedProvider::new(3000, vec![log(2500, 0)]);
        let (service, db) = service(provider);
        seed_tier(&db, Tier::Historical, 2000, vec![log(100, 0)]);

        let first = service.reconcile().await.unwrap();
        wait_for_recent(&db).await;
        let second = service.reconcile().await.unwrap();

        assert_eq!(first.logs, second.logs);
        assert_eq!(
            first.covered_through_block,
            second.covered_through_block
        );
        // The second pass rode the recent tier without fetching again.
        assert_eq!(second.source, CacheSource::Recent);
    }

    #[tokio::test]
    async fn backfill_seeds_the_historical_tier() {
        let provider = ScriptedProvider::new(2500, vec![log(10, 0), log(2400, 1)]);
        let (service, db) = service(provider);

        let snapshot = service.backfill(None, None).await.unwrap();
        assert_eq!(snapshot.covered_through_block, 2500);
        assert_eq!(snapshot.logs.len(), 2);

        let conn = get_conn(&db).unwrap();
        let stored = tiers::load(&conn, Tier::Historical).unwrap().unwrap();
        assert_eq!(stored.logs.len(), 2);
    }

    #[tokio::test]
    async fn backfill_merges_with_existing_historical() {
        let provider = ScriptedProvider::new(3000, vec![log(2500, 0)]);
        let (service, db) = service(provider);
        seed_tier(&db, Tier::Historical, 2000, vec![log(100, 0)]);

        let snapshot = service.backfill(Some(2001), None).await.unwrap();
        assert_eq!(snapshot.logs.len(), 2);
        assert_eq!(snapshot.covered_through_block, 3000);
    }
}
