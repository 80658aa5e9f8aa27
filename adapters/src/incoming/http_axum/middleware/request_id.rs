use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Tags every request with an id (the caller's, or a fresh one), runs the
/// handler inside a span carrying it and echoes it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|header| header.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);

    let header_value = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = &header_value {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, value.clone());
    }

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status();
    span.in_scope(|| {
        if status.is_server_error() {
            warn!(status = %status, "Request failed");
        } else {
            debug!(status = %status, "Request completed");
        }
    });

    response
}
