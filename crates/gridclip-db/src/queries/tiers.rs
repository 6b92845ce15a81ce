//! Cache tier queries.
//!
//! Stores and retrieves the two log-cache tiers. Each tier is one row
//! keyed by tier name holding the serialized snapshot document; a store
//! replaces the previous document in a single statement, so readers never
//! observe a partially-written tier.

use rusqlite::{params, Connection};

use gridclip_core::{Error, LogSnapshot, Result};

/// The two cache layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Long-lived snapshot seeded by an offline backfill. No TTL.
    Historical,
    /// Short-TTL snapshot holding the last fully-merged reconciliation.
    Recent,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Historical => "historical",
            Tier::Recent => "recent",
        }
    }
}

/// Replace the tier's snapshot document.
pub fn store(conn: &Connection, tier: Tier, snapshot: &LogSnapshot) -> Result<()> {
    let document = serde_json::to_string(snapshot)
        .map_err(|e| Error::internal(format!("failed to serialize {} tier: {e}", tier.as_str())))?;

    conn.execute(
        "INSERT OR REPLACE INTO log_tiers (tier, document, updated_at) VALUES (?1, ?2, ?3)",
        params![
            tier.as_str(),
            document,
            chrono::Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Load the tier's snapshot, if present.
///
/// A corrupt document is treated as an absent tier (logged) rather than
/// failing the request; the chain remains authoritative.
pub fn load(conn: &Connection, tier: Tier) -> Result<Option<LogSnapshot>> {
    let document: Option<String> = match conn.query_row(
        "SELECT document FROM log_tiers WHERE tier = ?1",
        params![tier.as_str()],
        |row| row.get(0),
    ) {
        Ok(doc) => Some(doc),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(Error::database(e.to_string())),
    };

    let Some(document) = document else {
        return Ok(None);
    };

    match serde_json::from_str(&document) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            tracing::warn!(tier = tier.as_str(), "Discarding corrupt tier document: {e}");
            Ok(None)
        }
    }
}

/// Delete the tier. Returns whether a row was removed.
pub fn delete(conn: &Connection, tier: Tier) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM log_tiers WHERE tier = ?1", params![tier.as_str()])
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}
