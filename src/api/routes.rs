//! API Routes
//!
//! Configures the Axum router with every region endpoint.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    after_insert_handler, after_update_handler, evict_all_handler, evict_handler, get_handler,
    health_handler, insert_handler, lock_handler, put_from_load_handler, remove_all_handler,
    remove_handler, stats_handler, timestamp_handler, unlock_handler, update_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/regions/:region/timestamp", get(timestamp_handler))
        .route("/regions/:region/get", post(get_handler))
        .route("/regions/:region/put_from_load", post(put_from_load_handler))
        .route("/regions/:region/insert", post(insert_handler))
        .route("/regions/:region/update", post(update_handler))
        .route("/regions/:region/lock", post(lock_handler))
        .route("/regions/:region/unlock", post(unlock_handler))
        .route("/regions/:region/after_insert", post(after_insert_handler))
        .route("/regions/:region/after_update", post(after_update_handler))
        .route("/regions/:region/remove", post(remove_handler))
        .route("/regions/:region/remove_all", post(remove_all_handler))
        .route("/regions/:region/evict", post(evict_handler))
        .route("/regions/:region/evict_all", post(evict_all_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::from_config(&Config::default()).unwrap();
        create_router(state)
    }

    fn post_json(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_timestamp_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/regions/default/timestamp")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_put_from_load_endpoint() {
        let response = create_test_app()
            .oneshot(post_json(
                "/regions/default/put_from_load",
                r#"{"key":"user#1","value":{"name":"alice"},"version":1}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_region_not_found() {
        let response = create_test_app()
            .oneshot(post_json("/regions/missing/get", r#"{"key":"k"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
