use axum::{Json, extract::State};

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::responses::ApiResponseHealth;
use crate::incoming::http_axum::dto::responses::{ApiResponse, HealthResponse};
use crate::shared::app_state::AppState;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up; lists the identity providers that accept sign-ins", body = ApiResponseHealth,
         example = json!({
             "ok": true,
             "data": {
                 "status": "ok",
                 "version": "0.1.0",
                 "providers": ["google", "facebook"]
             }
         })
        )
    ),
    tag = "system",
    summary = "Liveness check",
    operation_id = "health_check"
))]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success_with_data(Some(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        providers: state.sign_in_use_case.enabled_providers(),
    })))
}
