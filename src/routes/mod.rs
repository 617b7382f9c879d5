use axum::{routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod flags;
mod gate;
mod health;

pub use flags::{
    FlagsResponse, HelloResponse, SecretResponse, UserQuery, API_NEW_ENDPOINT_ENABLED, CTA_COLOR,
    FEATURE_DISABLED, HELLO_OFF, HELLO_ON, NEW_BADGE, SECRET,
};
pub use gate::require_flag;
pub use health::{healthz, HealthData, MODE};

use crate::config::Config;
use crate::state::AppState;

pub fn routes(config: &Config) -> Router<AppState> {
    let api_router = Router::new()
        .route("/healthz", get(healthz))
        .route("/flags", get(flags::routes::flags))
        .route("/hello", get(flags::routes::hello))
        .route("/secret", get(flags::routes::secret));

    Router::new()
        .nest("/api", api_router)
        .layer(cors(config))
        .layer(TraceLayer::new_for_http())
}

// Exactly one origin, any method and header from it
fn cors(config: &Config) -> CorsLayer {
    tracing::info!(origin = ?config.frontend_origin, "CORS: allowing origin");
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([config.frontend_origin.clone()]))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FlagClient;
    use crate::provider::{FlagProvider, FlagdProvider, InMemoryProvider};
    use axum::http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
    };
    use axum::http::{HeaderValue, Method};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn test_config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    fn server_with<P: FlagProvider + 'static>(provider: P) -> TestServer {
        let config = test_config();
        let client = FlagClient::new("backend", provider, Duration::from_millis(300));
        let app = routes(&config).with_state(AppState::new(client));
        TestServer::new(app).unwrap()
    }

    fn unreachable_backend() -> TestServer {
        let provider =
            FlagdProvider::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        server_with(provider)
    }

    fn all_on() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_flag(NEW_BADGE, true)
            .with_flag(CTA_COLOR, "green")
            .with_flag(API_NEW_ENDPOINT_ENABLED, true)
    }

    fn all_off() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_flag(NEW_BADGE, false)
            .with_flag(CTA_COLOR, "blue")
            .with_flag(API_NEW_ENDPOINT_ENABLED, false)
    }

    #[tokio::test]
    async fn test_healthz_ignores_backend_state() {
        for server in [server_with(all_on()), unreachable_backend()] {
            let response = server.get("/api/healthz").await;
            response.assert_status_ok();
            assert_eq!(
                response.json::<Value>(),
                json!({ "status": "ok", "mode": "openfeature+flagd-provider" })
            );
        }
    }

    #[tokio::test]
    async fn test_flags_from_backend() {
        let server = server_with(all_on());
        let response = server
            .get("/api/flags")
            .add_query_param("userId", "alice")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "newBadge": true, "ctaColor": "green", "apiNewEndpointEnabled": true })
        );
    }

    #[tokio::test]
    async fn test_flags_fall_back_to_defaults() {
        let server = unreachable_backend();
        let response = server.get("/api/flags").await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(
            body,
            json!({ "newBadge": false, "ctaColor": "blue", "apiNewEndpointEnabled": false })
        );
    }

    #[tokio::test]
    async fn test_hello_on_and_off() {
        let response = server_with(all_on()).get("/api/hello").await;
        response.assert_status_ok();
        assert_eq!(response.json::<HelloResponse>().message, HELLO_ON);

        let response = server_with(all_off())
            .get("/api/hello")
            .add_query_param("userId", "bob")
            .await;
        assert_eq!(response.json::<HelloResponse>().message, HELLO_OFF);

        let response = unreachable_backend().get("/api/hello").await;
        assert_eq!(response.json::<HelloResponse>().message, HELLO_OFF);
    }

    #[tokio::test]
    async fn test_secret_allowed() {
        let response = server_with(all_on())
            .get("/api/secret")
            .add_query_param("userId", "alice")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "secret": "🍪 super secret data" })
        );
    }

    #[tokio::test]
    async fn test_secret_denied_when_flag_off() {
        let response = server_with(all_off()).get("/api/secret").await;

        assert_eq!(response.status_code().as_u16(), 403);
        assert_eq!(
            response.json::<Value>(),
            json!({ "detail": "Feature disabled by flag" })
        );
    }

    #[tokio::test]
    async fn test_secret_denied_when_backend_down() {
        let response = unreachable_backend()
            .get("/api/secret")
            .add_query_param("userId", "alice")
            .await;

        assert_eq!(response.status_code().as_u16(), 403);
        assert_eq!(response.json::<Value>()["detail"], json!(FEATURE_DISABLED));
    }

    #[tokio::test]
    async fn test_cors_allows_frontend_origin() {
        let server = server_with(all_on());

        let response = server
            .get("/api/healthz")
            .add_header(ORIGIN, HeaderValue::from_static("http://localhost:3000"))
            .await;
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );

        let response = server
            .get("/api/healthz")
            .add_header(ORIGIN, HeaderValue::from_static("http://evil.example"))
            .await;
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight_from_frontend_origin() {
        let server = server_with(all_on());

        let response = server
            .method(Method::OPTIONS, "/api/secret")
            .add_header(ORIGIN, HeaderValue::from_static("http://localhost:3000"))
            .add_header(ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("GET"))
            .add_header(
                ACCESS_CONTROL_REQUEST_HEADERS,
                HeaderValue::from_static("x-requested-with"),
            )
            .await;

        response.assert_status_ok();
        let headers = response.headers();
        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(), "*");
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), "*");
    }

    #[tokio::test]
    async fn test_cors_preflight_from_other_origin() {
        let server = server_with(all_on());

        let response = server
            .method(Method::OPTIONS, "/api/secret")
            .add_header(ORIGIN, HeaderValue::from_static("http://evil.example"))
            .add_header(ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("GET"))
            .await;

        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = server_with(all_on()).get("/api/unknown").await;
        response.assert_status_not_found();
    }
}
