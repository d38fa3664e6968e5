pub mod auth;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::ConfigError;
use crate::web::state::AppState;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use middleware::require_auth;
pub use ws_handler::ws_handler;

/// Builds the application router: public auth routes, token-protected submission
/// routes, the presence socket and the uploaded-file directory.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ConfigError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(|| async { "Backend is running..." }))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/ws", get(ws_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/test/submissions", post(rest::submit_handler))
        .route("/api/test/submissions/mine", get(rest::list_mine_handler))
        .route("/api/test/submissions/all", get(rest::list_all_handler))
        .route(
            "/api/test/submissions/{id}",
            patch(rest::edit_handler).delete(rest::delete_handler),
        )
        .route(
            "/api/test/submissions/{id}/status",
            patch(rest::update_status_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let uploads = ServeDir::new(&app_state.config.upload_dir);

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state))
}
