//! Content fingerprints used as memoization keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{CellValue, Table};

/// Hex-encoded SHA-256 content digest.
///
/// Computed over a table's column names and tagged cell contents, and over
/// classifier configurations. Two tables with the same names and cells
/// (including cell variants) share a fingerprint; any change to a name, a
/// value or a value's variant changes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub(crate) fn compute(table: &Table) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((table.num_columns() as u64).to_le_bytes());
        hasher.update((table.num_rows() as u64).to_le_bytes());

        for column in table.columns() {
            hash_str(&mut hasher, column.name());
            for value in column.values() {
                match value {
                    CellValue::Missing => hasher.update([0u8]),
                    CellValue::Number(n) => {
                        hasher.update([1u8]);
                        hasher.update(n.to_bits().to_le_bytes());
                    }
                    CellValue::Timestamp(ts) => {
                        hasher.update([2u8]);
                        let utc = ts.and_utc();
                        hasher.update(utc.timestamp().to_le_bytes());
                        hasher.update(utc.timestamp_subsec_nanos().to_le_bytes());
                    }
                    CellValue::Text(s) => {
                        hasher.update([3u8]);
                        hash_str(&mut hasher, s);
                    }
                }
            }
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Builds a fingerprint from arbitrary bytes, e.g. a serialized config.
    pub(crate) fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Length prefix keeps ("ab","c") and ("a","bc") apart.
fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
