pub mod failure;
pub mod rest;
pub mod schema;
pub mod state;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use rest::{
    get_config_handler, list_versions_handler, question_options_handler, type_metadata_handler,
};
pub use state::AppState;

/// The configuration routes with request tracing. CORS and the Swagger UI are
/// layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/config/ielts", get(get_config_handler))
        .route("/config/ielts/versions", get(list_versions_handler))
        .route("/config/ielts/question-options", get(question_options_handler))
        .route("/config/ielts/type-metadata", get(type_metadata_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
