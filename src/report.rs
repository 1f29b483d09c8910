use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::table::CanonicalTable;

/// One line of the published table: the bitmask-encoded secrets of every
/// canonical participant for `(threshold, parties)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingEntry {
    pub threshold: u8,
    pub parties: u8,
    pub sharing: Vec<Vec<u8>>,
}

/// Table entries in `(N, T)` order.
pub fn entries(table: &CanonicalTable) -> Vec<SharingEntry> {
    table
        .iter()
        .map(|(&(parties, threshold), assignment)| SharingEntry {
            threshold,
            parties,
            sharing: assignment.to_masks(),
        })
        .collect()
}

/// Renders one `T N [[mask, ...], ...]` line per entry.
///
/// # Examples
///
/// ```rust
/// use shard_recover::report::render_text;
/// use shard_recover::solver::EdmondsKarp;
/// use shard_recover::table::CanonicalTable;
///
/// let table = CanonicalTable::build(3, &EdmondsKarp).unwrap();
/// assert!(render_text(&table).starts_with("2 3 [["));
/// ```
pub fn render_text(table: &CanonicalTable) -> String {
    entries(table)
        .iter()
        .map(|entry| format!("{} {} {:?}\n", entry.threshold, entry.parties, entry.sharing))
        .collect()
}

pub fn render_json(table: &CanonicalTable) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&entries(table))
}

/// Hex-encoded SHA-256 of the compact JSON table. Hardcoded copies of the
/// table can be compared against it.
pub fn fingerprint(table: &CanonicalTable) -> Result<String, serde_json::Error> {
    let encoded = serde_json::to_vec(&entries(table))?;
    Ok(hex::encode(Sha256::digest(&encoded)))
}
