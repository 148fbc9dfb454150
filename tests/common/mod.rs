#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;

use tradejournal::adapters::fs_image_adapter::FsImageAdapter;
use tradejournal::adapters::sqlite_adapter::SqliteAdapter;
use tradejournal::adapters::web::{build_router, AppState};
use tradejournal::domain::entry::NewEntry;
use tradejournal::domain::error::JournalError;
use tradejournal::ports::pairs_port::{PairKind, PairList, PairsPort};

pub const TOKEN: &str = "test-bearer-token";
pub const BOUNDARY: &str = "----tradejournal-test-boundary";

/// Catalog stub so web tests never touch the network.
pub struct StaticPairs;

impl PairsPort for StaticPairs {
    fn list_pairs(
        &self,
        _kind: Option<PairKind>,
        _search: Option<&str>,
    ) -> Result<PairList, JournalError> {
        Ok(PairList {
            kind: Some(PairKind::Forex),
            pairs: vec!["EURUSD".to_string(), "GBPJPY".to_string()],
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteAdapter>,
    pub uploads: TempDir,
    pub owner_id: i64,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(SqliteAdapter::in_memory().unwrap());
    store.initialize_schema().unwrap();
    let owner = store.create_user("tester", TOKEN).unwrap();

    let uploads = TempDir::new().unwrap();
    let images = Arc::new(FsImageAdapter::new(uploads.path()));

    let state = AppState {
        journal: store.clone(),
        images,
        auth: store.clone(),
        pairs: Arc::new(StaticPairs),
    };
    let router = build_router(state, uploads.path().to_path_buf());

    TestApp {
        router,
        store,
        uploads,
        owner_id: owner.id,
    }
}

pub fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

pub fn authed_delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

pub fn multipart_request(method: &str, uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Hand-rolled multipart body: text fields plus optional file parts.
pub fn multipart_body(text: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in text {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn entry_on(date_str: &str) -> NewEntry {
    NewEntry {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok(),
        ..NewEntry::default()
    }
}
