//! MongoDB-backed stats recorder.
//!
//! One client is created at process start and shared by every request; the
//! driver pools connections internally. Dropping the `StatsStore` at
//! shutdown releases the client.

use std::future::Future;

use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};
use thiserror::Error;

use crate::config::Config;
use crate::models::{
    CompressionRecord, RecordFactory, StatusCheck, STATS_COLLECTION, STATUS_COLLECTION,
};

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A durable write failed.
    #[error("stats write failed: {0}")]
    Write(mongodb::error::Error),

    /// A read failed.
    #[error("stats read failed: {0}")]
    Read(mongodb::error::Error),
}

/// The recording interface the request handlers depend on. `StatsStore`
/// is the production implementation; tests substitute an in-memory one.
pub trait StatsRecorder: Send + Sync + 'static {
    /// Append one conversion's statistics and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the insert fails; nothing is written
    /// in that case.
    fn record(
        &self,
        original_filename: &str,
        original_size: u64,
        compressed_size: u64,
        original_format: &str,
    ) -> impl Future<Output = Result<CompressionRecord, StoreError>> + Send;

    /// Fetch up to `limit` records, most recent timestamp first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if the query fails.
    fn list(&self, limit: i64) -> impl Future<Output = Result<Vec<CompressionRecord>, StoreError>> + Send;
}

/// Appends and reads `CompressionRecord` documents.
pub struct StatsStore {
    records: Collection<CompressionRecord>,
    status_checks: Collection<StatusCheck>,
    factory: RecordFactory,
}

impl StatsStore {
    /// Connect to MongoDB and open the configured database.
    ///
    /// The driver connects lazily, so this succeeds even if the server is
    /// not yet reachable; failures surface on the first operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed.
    pub async fn connect(config: &Config) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(&config.mongo_url).await?;
        let db = client.database(&config.db_name);
        Ok(Self::new(db, RecordFactory::default()))
    }

    /// Build a store over an already-open database handle.
    pub fn new(db: Database, factory: RecordFactory) -> Self {
        Self {
            records: db.collection(STATS_COLLECTION),
            status_checks: db.collection(STATUS_COLLECTION),
            factory,
        }
    }

    /// Append a status check. Not exposed over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the insert fails.
    pub async fn record_status_check(&self, client_name: &str) -> Result<StatusCheck, StoreError> {
        let check = self.factory.status_check(client_name);
        self.status_checks
            .insert_one(&check)
            .await
            .map_err(StoreError::Write)?;
        Ok(check)
    }
}

impl StatsRecorder for StatsStore {
    async fn record(
        &self,
        original_filename: &str,
        original_size: u64,
        compressed_size: u64,
        original_format: &str,
    ) -> Result<CompressionRecord, StoreError> {
        let record = self.factory.compression_record(
            original_filename,
            original_size,
            compressed_size,
            original_format,
        );
        self.records
            .insert_one(&record)
            .await
            .map_err(StoreError::Write)?;
        Ok(record)
    }

    // Timestamps are stored as fixed-width RFC 3339 strings, which sort
    // lexicographically in time order, so the sort runs on the stored
    // string field directly.
    async fn list(&self, limit: i64) -> Result<Vec<CompressionRecord>, StoreError> {
        let mut cursor = self
            .records
            .find(doc! {})
            .sort(doc! { "timestamp": -1 })
            .limit(limit)
            .await
            .map_err(StoreError::Read)?;

        let mut records = Vec::new();
        while let Some(record) = cursor.try_next().await.map_err(StoreError::Read)? {
            records.push(record);
        }
        Ok(records)
    }
}
