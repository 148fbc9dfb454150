//! Web server adapter.
//!
//! Axum JSON API over the journal: CRUD with multipart image uploads, the
//! dashboard summary, the instrument catalog, and static service of the
//! upload directory. Every `/api` route requires a bearer token.

mod error;
mod extract;
mod handlers;

pub use error::WebError;
pub use extract::AuthOwner;
pub use handlers::*;

use axum::{
    routing::{get, put},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::ports::auth_port::AuthPort;
use crate::ports::image_port::ImageStorePort;
use crate::ports::journal_port::JournalPort;
use crate::ports::pairs_port::PairsPort;

pub struct AppState {
    pub journal: Arc<dyn JournalPort + Send + Sync>,
    pub images: Arc<dyn ImageStorePort + Send + Sync>,
    pub auth: Arc<dyn AuthPort + Send + Sync>,
    pub pairs: Arc<dyn PairsPort + Send + Sync>,
}

pub fn build_router(state: AppState, uploads_root: PathBuf) -> Router {
    Router::new()
        .route(
            "/api/journal",
            get(handlers::list_journal).post(handlers::create_entry),
        )
        .route(
            "/api/journal/{id}",
            put(handlers::update_entry).delete(handlers::delete_entry),
        )
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/pairs", get(handlers::list_pairs))
        .nest_service("/uploads", ServeDir::new(uploads_root))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}
