//! WebPress Server - HTTP service over the transcoding pipeline
//!
//! Routes (under `/api`): a root banner, `POST /compress` for the
//! image-to-WebP conversion, and `GET /stats` for the recorded
//! compression statistics. Persistence is a MongoDB collection the
//! service only ever appends to and reads back.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use config::Config;
pub use error::ApiError;
pub use models::{CompressionRecord, RecordFactory, StatusCheck};
pub use routes::{app, AppState};
pub use store::{StatsRecorder, StatsStore, StoreError};
