//! Router-level tests. The rejection paths run against the production
//! store (the Mongo client connects lazily, so building the app against an
//! unused connection string is safe as long as no handler reaches it);
//! the success and listing paths run against an in-memory recorder.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use webpress_server::models::{CompressionRecord, RecordFactory};
use webpress_server::routes::app;
use webpress_server::store::{StatsRecorder, StatsStore, StoreError};
use webpress_server::{AppState, Config};

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn test_config() -> Config {
    Config {
        mongo_url: "mongodb://localhost:27017".to_string(),
        db_name: "webpress_test".to_string(),
        cors_origins: Vec::new(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    }
}

async fn mongo_app() -> Router {
    let config = test_config();
    let store = StatsStore::connect(&config).await.unwrap();
    app(Arc::new(AppState { store }), &config)
}

/// In-memory stand-in for the Mongo store, with the same append-and-read
/// contract.
#[derive(Default)]
struct MemoryStore {
    records: Mutex<Vec<CompressionRecord>>,
}

impl StatsRecorder for MemoryStore {
    async fn record(
        &self,
        original_filename: &str,
        original_size: u64,
        compressed_size: u64,
        original_format: &str,
    ) -> Result<CompressionRecord, StoreError> {
        let record = RecordFactory::default().compression_record(
            original_filename,
            original_size,
            compressed_size,
            original_format,
        );
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list(&self, limit: i64) -> Result<Vec<CompressionRecord>, StoreError> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit as usize);
        Ok(records)
    }
}

fn memory_app(store: MemoryStore) -> Router {
    app(Arc::new(AppState { store }), &test_config())
}

fn multipart_upload(filename: &str, content: &[u8]) -> Request<Body> {
    multipart_request("file", filename, content)
}

fn multipart_request(field_name: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/compress")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A 100x100 gradient, stored uncompressed, so the WebP output is
/// guaranteed to be smaller.
fn bmp_photo() -> Vec<u8> {
    let img = image::RgbImage::from_fn(100, 100, |x, y| {
        image::Rgb([(x * 2) as u8, (y * 2) as u8, ((x + y) / 2) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Bmp)
        .unwrap();
    buf.into_inner()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_returns_banner() {
    let app = mongo_app().await;
    let request = Request::builder().uri("/api/").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Image Compression API");
}

#[tokio::test]
async fn compress_returns_webp_attachment_with_size_headers() {
    let app = memory_app(MemoryStore::default());
    let bmp = bmp_photo();
    let original_size = bmp.len();

    let response = app
        .oneshot(multipart_upload("photo.bmp", &bmp))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    };
    assert_eq!(header("content-type"), "image/webp");
    assert_eq!(
        header("content-disposition"),
        "attachment; filename=\"photo.webp\""
    );
    assert_eq!(header("x-original-size"), original_size.to_string());
    assert_eq!(header("x-original-format"), "BMP");

    let compressed_size: usize = header("x-compressed-size").parse().unwrap();
    assert!(compressed_size < original_size);

    let ratio: f64 = header("x-compression-ratio").parse().unwrap();
    assert!(ratio > 0.0 && ratio <= 100.0);
    // One guaranteed decimal place, even for integral ratios.
    assert!(header("x-compression-ratio").contains('.'));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.len(), compressed_size);
    assert_eq!(&body[0..4], b"RIFF");
    assert_eq!(&body[8..12], b"WEBP");
}

#[tokio::test]
async fn compress_then_stats_lists_new_record_first() {
    let app = memory_app(MemoryStore::default());
    let bmp = bmp_photo();

    for filename in ["first.bmp", "second.bmp"] {
        let response = app
            .clone()
            .oneshot(multipart_upload(filename, &bmp))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/api/stats")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["original_filename"], "second.bmp");
    assert_eq!(records[1]["original_filename"], "first.bmp");
    assert_eq!(records[0]["original_size"], bmp.len() as u64);
    assert_eq!(records[0]["original_format"], "BMP");
}

#[tokio::test]
async fn stats_listing_is_capped_at_one_hundred() {
    let store = MemoryStore::default();
    for i in 0..150 {
        store
            .record(&format!("img-{i}.png"), 100, 50, "PNG")
            .await
            .unwrap();
    }
    let app = memory_app(store);

    let request = Request::builder()
        .uri("/api/stats")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn compress_rejects_non_image_upload() {
    let app = mongo_app().await;
    let request = multipart_upload("notes.txt", b"plain text is not an image");

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error processing image:"), "{detail}");
}

#[tokio::test]
async fn failed_compress_writes_no_stats_record() {
    let app = memory_app(MemoryStore::default());
    let request = multipart_upload("notes.txt", b"plain text is not an image");

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .uri("/api/stats")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let json = body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn compress_rejects_empty_upload() {
    let app = mongo_app().await;
    let request = multipart_upload("empty.png", b"");

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.contains("empty upload"), "{detail}");
}

#[tokio::test]
async fn compress_ignores_fields_other_than_file() {
    let app = mongo_app().await;
    let request = multipart_request("attachment", "photo.bmp", &bmp_photo());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.contains("missing file field"), "{detail}");
}

#[tokio::test]
async fn compress_rejects_missing_file_field() {
    let app = mongo_app().await;
    let body = format!("--{BOUNDARY}--\r\n");
    let request = Request::builder()
        .method("POST")
        .uri("/api/compress")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
