use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod handlers;
pub mod store;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::list_files))
        .route("/files/upload", post(handlers::upload_file))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}
