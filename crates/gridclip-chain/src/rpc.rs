//! JSON-RPC log access.
//!
//! [`LogProvider`] is the seam the caching layer talks through;
//! [`JsonRpcProvider`] implements it over `eth_blockNumber` /
//! `eth_getLogs`. Providers cap the block span of a single log query, so
//! [`fetch_logs_paged`] pages a range in bounded chunks, skipping failed
//! chunks rather than failing the whole sweep.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use sha3::{Digest, Keccak256};

use gridclip_core::{Address, Fid, LogEntry};

use crate::error::{Error, Result};

/// Event signature the log filter matches on.
pub const CLIP_UPDATED_SIGNATURE: &str = "ClipUpdated(address,uint256,uint256)";

/// Connection timeout for RPC requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// topic0 of `ClipUpdated`: keccak-256 of the event signature.
pub fn clip_updated_topic() -> &'static str {
    static TOPIC: OnceLock<String> = OnceLock::new();
    TOPIC.get_or_init(|| {
        format!(
            "0x{}",
            hex::encode(Keccak256::digest(CLIP_UPDATED_SIGNATURE.as_bytes()))
        )
    })
}

/// Source of chain head and event logs.
#[async_trait]
pub trait LogProvider: Send + Sync {
    /// Current chain head block number.
    async fn head_block(&self) -> Result<u64>;

    /// `ClipUpdated` entries in `[from, to]` (inclusive). The span must
    /// respect the provider's block-range limit; use [`fetch_logs_paged`]
    /// for larger ranges.
    async fn fetch_logs(&self, from: u64, to: u64) -> Result<Vec<LogEntry>>;
}

/// [`LogProvider`] backed by an Ethereum JSON-RPC endpoint.
pub struct JsonRpcProvider {
    http: reqwest::Client,
    url: String,
    contract: Address,
}

impl JsonRpcProvider {
    pub fn new(url: impl Into<String>, contract: Address) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {e}");
                reqwest::Client::new()
            });

        Self {
            http,
            url: url.into(),
            contract,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::rpc(format!("{method} request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::rpc(format!("{method} returned {}", response.status())));
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::rpc(format!("{method} response parse error: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(Error::rpc(format!("{method}: {}", err.message)));
        }
        envelope
            .result
            .ok_or_else(|| Error::rpc(format!("{method} returned no result")))
    }
}

#[async_trait]
impl LogProvider for JsonRpcProvider {
    async fn head_block(&self) -> Result<u64> {
        let head: String = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&head)
    }

    async fn fetch_logs(&self, from: u64, to: u64) -> Result<Vec<LogEntry>> {
        let filter = json!([{
            "address": self.contract.as_str(),
            "topics": [clip_updated_topic()],
            "fromBlock": format_quantity(from),
            "toBlock": format_quantity(to),
        }]);

        let raw: Vec<RawLog> = self.call("eth_getLogs", filter).await?;
        raw.iter().map(decode_log).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLog {
    topics: Vec<String>,
    data: String,
    block_number: String,
    transaction_hash: String,
    log_index: String,
}

/// Decode one raw log into a [`LogEntry`].
///
/// The owner is the indexed first topic (right-aligned 20 bytes); the data
/// section holds two 32-byte words, fid then timestamp.
fn decode_log(raw: &RawLog) -> Result<LogEntry> {
    let owner_topic = raw
        .topics
        .get(1)
        .ok_or_else(|| Error::decode("log is missing the owner topic"))?;
    if owner_topic.len() < 40 {
        return Err(Error::decode(format!("owner topic too short: {owner_topic}")));
    }
    let user: Address = format!("0x{}", &owner_topic[owner_topic.len() - 40..])
        .parse()
        .map_err(|e: gridclip_core::Error| Error::decode(e.to_string()))?;

    let data = raw.data.strip_prefix("0x").unwrap_or(&raw.data);
    if data.len() < 128 {
        return Err(Error::decode(format!(
            "log data holds {} hex chars, expected at least 128",
            data.len()
        )));
    }
    let fid = parse_word(&data[..64])?;
    let timestamp = parse_word(&data[64..128])?;

    Ok(LogEntry {
        user,
        fid: Fid(fid),
        timestamp,
        transaction_hash: raw.transaction_hash.clone(),
        log_index: parse_quantity(&raw.log_index)?,
        block_number: parse_quantity(&raw.block_number)?,
    })
}

/// Parse a `0x`-prefixed hex quantity.
fn parse_quantity(s: &str) -> Result<u64> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| Error::decode(format!("quantity missing 0x prefix: {s}")))?;
    u64::from_str_radix(digits, 16).map_err(|e| Error::decode(format!("bad quantity {s}: {e}")))
}

/// Parse the low 64 bits of a 32-byte data word.
fn parse_word(word: &str) -> Result<u64> {
    u64::from_str_radix(&word[word.len() - 16..], 16)
        .map_err(|e| Error::decode(format!("bad data word {word}: {e}")))
}

fn format_quantity(n: u64) -> String {
    format!("0x{n:x}")
}

/// Fetch `[from, to]` in chunks of at most `chunk_size` blocks.
///
/// A failed chunk is logged and skipped; the sweep continues with the
/// remaining chunks and returns whatever was collected.
pub async fn fetch_logs_paged(
    provider: &dyn LogProvider,
    from: u64,
    to: u64,
    chunk_size: u64,
) -> Vec<LogEntry> {
    let chunk_size = chunk_size.max(1);
    let mut collected = Vec::new();

    let mut start = from;
    while start <= to {
        let end = to.min(start + chunk_size - 1);
        match provider.fetch_logs(start, end).await {
            Ok(mut logs) => {
                tracing::debug!(from = start, to = end, count = logs.len(), "Fetched log chunk");
                collected.append(&mut logs);
            }
            Err(e) => {
                tracing::warn!(from = start, to = end, "Skipping failed log chunk: {e}");
            }
        }
        start = end + 1;
    }

    collected
}
