use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::links::handlers;
use crate::features::links::services::LinkService;

/// Create routes for the links feature
pub fn routes(service: Arc<LinkService>) -> Router {
    Router::new()
        .route(
            "/api/v1/links",
            get(handlers::list_links).post(handlers::create_link),
        )
        .route(
            "/api/v1/links/{id}",
            get(handlers::get_link)
                .put(handlers::replace_link)
                .delete(handlers::delete_link),
        )
        .with_state(service)
}
