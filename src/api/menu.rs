//! Menu endpoint

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};

use super::ApiState;
use crate::menu::Catalog;

/// The catalog the backend was started with
async fn get_menu(State(state): State<Arc<ApiState>>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}

/// Build menu router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/", get(get_menu)).with_state(state)
}
