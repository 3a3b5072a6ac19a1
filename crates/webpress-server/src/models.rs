//! Persisted document models.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use webpress_core::compression_ratio;

/// Collection holding one document per successful conversion.
pub const STATS_COLLECTION: &str = "compression_stats";

/// Collection for status checks. Present in the data model but not wired
/// to any route.
pub const STATUS_COLLECTION: &str = "status_checks";

/// Timestamp (de)serialization as RFC 3339 with exactly six fractional
/// digits. Chrono's default trims trailing zeros, giving fractional parts
/// of varying width; a fixed width keeps lexicographic order on the
/// stored strings identical to chronological order.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// One conversion's statistics. Immutable once written; the service only
/// appends and reads. The timestamp is persisted as an RFC 3339 string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionRecord {
    pub id: String,
    pub original_filename: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub original_format: String,
    pub compression_ratio: f64,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
}

/// A client liveness ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
}

/// Produces identifiers and timestamps for new records.
///
/// Ids and clocks are injected as plain functions so tests can pin both
/// and assert on fully deterministic records.
pub struct RecordFactory {
    id_gen: fn() -> String,
    clock: fn() -> DateTime<Utc>,
}

impl Default for RecordFactory {
    fn default() -> Self {
        Self {
            id_gen: || Uuid::new_v4().to_string(),
            // Truncated to the microsecond so the in-memory value equals
            // what the stored string round-trips to.
            clock: || Utc::now().trunc_subsecs(6),
        }
    }
}

impl RecordFactory {
    pub fn new(id_gen: fn() -> String, clock: fn() -> DateTime<Utc>) -> Self {
        Self { id_gen, clock }
    }

    /// Build a `CompressionRecord` with a fresh id and the current time.
    /// The ratio is derived from the two sizes.
    pub fn compression_record(
        &self,
        original_filename: &str,
        original_size: u64,
        compressed_size: u64,
        original_format: &str,
    ) -> CompressionRecord {
        CompressionRecord {
            id: (self.id_gen)(),
            original_filename: original_filename.to_string(),
            original_size,
            compressed_size,
            original_format: original_format.to_string(),
            compression_ratio: compression_ratio(original_size, compressed_size),
            timestamp: (self.clock)(),
        }
    }

    /// Build a `StatusCheck` with a fresh id and the current time.
    pub fn status_check(&self, client_name: &str) -> StatusCheck {
        StatusCheck {
            id: (self.id_gen)(),
            client_name: client_name.to_string(),
            timestamp: (self.clock)(),
        }
    }
}
