use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers,
    middleware::{optional_auth, require_auth},
    state::AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    // Credentials required
    let protected_routes = Router::new()
        .route("/auth/session", get(handlers::session))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/logout-all", post(handlers::logout_all))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_auth,
        ));

    // Credentials optional
    let optional_routes = Router::new()
        .route("/auth/whoami", get(handlers::whoami))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            optional_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ids", post(handlers::create_id))
        .route("/ids/{id}", get(handlers::decode_id))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(optional_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
