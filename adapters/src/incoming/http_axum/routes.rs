use std::path::Path;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;
use tracing::info;
#[cfg(feature = "docs")]
use utoipa::OpenApi;
#[cfg(feature = "docs")]
use utoipa_swagger_ui::SwaggerUi;

use crate::incoming::http_axum::{
    handlers::{
        accounts::{get_account, update_account, update_account_avatar},
        health::health_check,
        sign_in::{facebook_sign_in, google_sign_in},
    },
    router_ext::RouterExt,
};
use crate::shared::app_state::AppState;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::docs::ApiDoc;

pub fn build_application_router(state: &AppState) -> Router<AppState> {
    let core_routes = build_core_routes();
    let sign_in_routes = build_sign_in_routes();
    let account_routes = build_account_routes(state);
    let media_routes = build_media_routes(state);

    core_routes
        .merge(sign_in_routes)
        .merge(account_routes)
        .merge(media_routes)
}

fn build_core_routes() -> Router<AppState> {
    let router = Router::new().route("/health", get(health_check));

    #[cfg(feature = "docs")]
    {
        router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    #[cfg(not(feature = "docs"))]
    {
        router
    }
}

fn build_sign_in_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/google", post(google_sign_in))
        .route("/auth/facebook", post(facebook_sign_in))
        .with_request_id()
}

fn build_account_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/{id}", get(get_account).patch(update_account))
        .route("/users/{id}/avatar", put(update_account_avatar))
        .with_body_limit(state.config.server.request_body_limit_bytes)
        .with_request_id()
}

// Published avatars are served from disk only when the public prefix is a
// local path; an absolute URL means something else (a CDN) serves them.
fn build_media_routes(state: &AppState) -> Router<AppState> {
    let avatars = &state.config.avatars;
    let prefix = avatars.public_url_prefix.trim_end_matches('/');
    if !(prefix.is_empty() || prefix.starts_with('/')) {
        return Router::new();
    }

    let mount_path = format!("{prefix}/avatars");
    let avatars_dir = Path::new(&avatars.storage_dir).join("avatars");
    info!(
        "Serving avatars from {} at {}",
        avatars_dir.display(),
        mount_path
    );

    Router::new().nest_service(&mount_path, ServeDir::new(avatars_dir))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header::CONTENT_TYPE},
    };
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use time::OffsetDateTime;
    use tower::ServiceExt;

    use domain::{
        account::{Account, AccountId},
        profile::{GoogleProfile, RawProfile},
        provider::{AuthEvidence, Provider},
    };
    use social_accounts_application::{
        accounts::{
            service::AccountService,
            sign_in::{SignInService, SignInServiceDeps},
        },
        error::{AppError, AppResult},
        infrastructure_config::{Config, StorageBackend},
        ports::outgoing::{
            account_events::DynAccountEventsPort,
            account_store::{AccountStorePort, DynAccountStorePort},
            avatar_pipeline::DynAvatarPipelinePort,
            identity_provider::{IdentityProviderPort, IdentityProviders},
        },
    };

    use super::*;
    use crate::incoming::http_axum::middleware::request_id::REQUEST_ID_HEADER;
    use crate::outgoing::{
        avatars_fs::avatar_pipeline_fs::FilesystemAvatarPipeline,
        events_tracing::account_events_tracing::TracingAccountEventsAdapter,
        image_rs::webp_avatar_image::tests::png_bytes,
        memory::account_store_memory::InMemoryAccountStoreAdapter,
    };

    struct StubGoogle;

    #[async_trait::async_trait]
    impl IdentityProviderPort for StubGoogle {
        fn provider(&self) -> Provider {
            Provider::Google
        }

        async fn exchange_and_fetch_profile(
            &self,
            evidence: &AuthEvidence,
        ) -> AppResult<RawProfile> {
            match evidence {
                AuthEvidence::AuthorizationCode { code, .. } if code == "good-code" => {
                    Ok(RawProfile::Google(GoogleProfile {
                        sub: "g-1".to_string(),
                        email: Some("jane@example.com".to_string()),
                        email_verified: Some(true),
                        name: Some("Jane Doe".to_string()),
                        given_name: Some("Jane".to_string()),
                        family_name: Some("Doe".to_string()),
                        picture: Some("https://example.com/jane.png".to_string()),
                    }))
                }
                _ => Err(AppError::ProviderAuth {
                    provider: Provider::Google,
                    message: "invalid_grant".to_string(),
                }),
            }
        }
    }

    struct TestApp {
        router: Router,
        store: DynAccountStorePort,
        _media: TempDir,
    }

    fn app() -> TestApp {
        let media = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        config.avatars.storage_dir = media.path().display().to_string();

        let store: DynAccountStorePort = Arc::new(InMemoryAccountStoreAdapter::new());
        let avatars: DynAvatarPipelinePort =
            Arc::new(FilesystemAvatarPipeline::new(&config.avatars).unwrap());
        let events: DynAccountEventsPort = Arc::new(TracingAccountEventsAdapter::new());

        let sign_in = SignInService::new(SignInServiceDeps {
            identity_providers: IdentityProviders::new().with(Arc::new(StubGoogle)),
            account_store: Arc::clone(&store),
            avatar_pipeline: Arc::clone(&avatars),
            events: Arc::clone(&events),
        });
        let accounts = AccountService::new(Arc::clone(&store), avatars, events);

        let state = AppState::new(Arc::new(config), Arc::new(sign_in), Arc::new(accounts));
        let router = build_application_router(&state).with_state(state);

        TestApp {
            router,
            store,
            _media: media,
        }
    }

    async fn seed(store: &DynAccountStorePort, email: &str) -> Account {
        let account = Account {
            id: AccountId::new(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            avatar_url: None,
            google_external_id: None,
            facebook_external_id: None,
            registration_date: OffsetDateTime::UNIX_EPOCH,
        };
        store.insert(&account).await.unwrap()
    }

    fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health_lists_enabled_providers() {
        let app = app();
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["providers"], json!(["google"]));
    }

    #[tokio::test]
    async fn google_sign_in_links_account_with_same_email() {
        let app = app();
        let existing = seed(&app.store, "jane@example.com").await;

        let (status, body) = send(
            &app.router,
            json_request(Method::POST, "/auth/google", &json!({ "code": "good-code" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["data"]["id"], json!(existing.id.to_string()));
        assert_eq!(body["data"]["google_external_id"], json!("g-1"));
        assert_eq!(body["data"]["linked_providers"], json!(["google"]));
    }

    #[tokio::test]
    async fn rejected_code_is_unauthorized() {
        let app = app();

        let (status, body) = send(
            &app.router,
            json_request(Method::POST, "/auth/google", &json!({ "code": "bad-code" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], json!(false));
    }

    #[tokio::test]
    async fn unconfigured_provider_is_service_unavailable() {
        let app = app();

        let (status, _) = send(
            &app.router,
            json_request(
                Method::POST,
                "/auth/facebook",
                &json!({ "access_token": "token" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let app = app();
        let uri = format!("/users/{}", AccountId::new());

        let (status, _) = send(&app.router, Request::get(uri).body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_account_id_is_rejected() {
        let app = app();

        let (status, _) = send(
            &app.router,
            Request::get("/users/not-a-uuid").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn blank_first_name_reports_named_code() {
        let app = app();
        let account = seed(&app.store, "jane@example.com").await;

        let (status, body) = send(
            &app.router,
            json_request(
                Method::PATCH,
                &format!("/users/{}", account.id),
                &json!({ "first_name": "" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], json!("first_name_required"));
        let stored = app.store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Jane");
    }

    #[tokio::test]
    async fn patch_changes_only_named_fields() {
        let app = app();
        let account = seed(&app.store, "jane@example.com").await;

        let (status, body) = send(
            &app.router,
            json_request(
                Method::PATCH,
                &format!("/users/{}", account.id),
                &json!({ "last_name": "Smith", "avatar_url": "ignored" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["first_name"], json!("Jane"));
        assert_eq!(body["data"]["last_name"], json!("Smith"));
        assert_eq!(body["data"]["avatar_url"], Value::Null);
    }

    #[tokio::test]
    async fn uploaded_avatar_is_published_and_served() {
        let app = app();
        let account = seed(&app.store, "jane@example.com").await;

        let upload = Request::builder()
            .method(Method::PUT)
            .uri(format!("/users/{}/avatar", account.id))
            .header(CONTENT_TYPE, "image/png")
            .body(Body::from(png_bytes(32, 32)))
            .unwrap();
        let (status, body) = send(&app.router, upload).await;

        assert_eq!(status, StatusCode::OK);
        let avatar_url = body["data"]["avatar_url"].as_str().unwrap().to_string();
        assert!(avatar_url.starts_with(&format!("/media/avatars/{}/", account.id)));

        let response = app
            .router
            .clone()
            .oneshot(Request::get(avatar_url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_avatar_body_is_rejected() {
        let app = app();
        let account = seed(&app.store, "jane@example.com").await;

        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/users/{}/avatar", account.id))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn avatar_that_is_not_an_image_is_422() {
        let app = app();
        let account = seed(&app.store, "jane@example.com").await;

        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/users/{}/avatar", account.id))
            .header(CONTENT_TYPE, "image/png")
            .body(Body::from("definitely not a png"))
            .unwrap();
        let (status, body) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["ok"], json!(false));
        let stored = app.store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.avatar_url, None);
    }

    #[tokio::test]
    async fn malformed_email_in_patch_is_422() {
        let app = app();
        let account = seed(&app.store, "jane@example.com").await;

        let (status, _) = send(
            &app.router,
            json_request(
                Method::PATCH,
                &format!("/users/{}", account.id),
                &json!({ "email": "jane@example..com" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let stored = app.store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "jane@example.com");
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let app = app();
        let request = Request::get(format!("/users/{}", AccountId::new()))
            .header(REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "req-42"
        );
    }
}
