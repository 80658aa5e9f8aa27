use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::bootstrap::state::AppState;
use social_accounts_adapters::incoming::http_axum::routes::build_application_router;
use social_accounts_adapters::shared::app_state::AppState as AdaptersAppState;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

pub fn create_router(state: AppState) -> Router {
    let adapters_state = state.to_adapters_state();
    let cors_layer = create_cors_layer(&adapters_state);

    build_application_router(&adapters_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(adapters_state)
}

fn create_cors_layer(state: &AdaptersAppState) -> CorsLayer {
    let base_cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")]);

    let origin = state
        .config
        .server
        .cors_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CORS_ORIGIN));

    base_cors.allow_origin(origin)
}
