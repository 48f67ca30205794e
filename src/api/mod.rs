pub mod dns;

use axum::{
    Extension, Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::SharedState;

pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/dns", post(dns::add_record))
        .route("/api/dns/add", post(dns::add_record))
        .route("/dns-remove", post(dns::remove_record))
        .route("/api/dns/remove", post(dns::remove_record))
        .route("/dns-list", get(dns::list_records))
        .route("/api/dns/list", get(dns::list_records))
        .layer(Extension(state))
        .layer(cors)
}
