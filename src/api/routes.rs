use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::auth::{auth_middleware, AuthService};
use super::handlers::{health_check, invoke_tool, list_tools, AppState};
use crate::tool::ToolRegistry;

pub fn create_api_router(registry: Arc<ToolRegistry>, auth_service: Arc<AuthService>) -> Router {
    let state = Arc::new(AppState { registry });

    let protected_routes = Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(invoke_tool))
        .route_layer(middleware::from_fn_with_state(auth_service, auth_middleware))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
