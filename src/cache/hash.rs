//! Content hashing utilities for cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::TimeGrain;
use crate::query::Filter;
use crate::sql::dialect::Dialect;

/// Compute SHA256 hash of a serializable value.
///
/// The value is serialized to JSON before hashing, ensuring deterministic output.
/// Returns a 64-character lowercase hexadecimal string.
///
/// # Errors
/// Returns an error if the value cannot be serialized to JSON.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Canonical request fingerprint (hex SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a request from its canonical parts.
    ///
    /// `fields` are qualified names in request order. Both the set and the
    /// order are hashed, since the order fixes the SELECT list and the FROM
    /// cube. `filters` must be canonical with qualified members; the dialect
    /// is included since it changes the SQL.
    pub fn compute(
        fields: &[String],
        filters: &[Filter],
        role: &str,
        grain: Option<TimeGrain>,
        dialect: Dialect,
    ) -> Result<Self, serde_json::Error> {
        #[derive(Serialize)]
        struct Canonical<'a> {
            fields: Vec<&'a str>,
            columns: &'a [String],
            filters: &'a [Filter],
            role: &'a str,
            grain: Option<TimeGrain>,
            dialect: Dialect,
        }

        let mut sorted: Vec<&str> = fields.iter().map(String::as_str).collect();
        sorted.sort_unstable();

        compute_hash(&Canonical {
            fields: sorted,
            columns: fields,
            filters,
            role,
            grain,
            dialect,
        })
        .map(Fingerprint)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
