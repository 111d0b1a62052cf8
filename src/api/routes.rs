//! API route configuration.

use axum::{Router, middleware, routing::get};
use rmcp::ServerHandler;

use super::gatekeeper::{self, AllowList};
use super::handlers;
use super::state::AppState;

/// Create the HTTP router.
///
/// `/health` is public; `/mcp` sits behind the Host/Origin gatekeeper.
pub fn create_router<S: ServerHandler>(state: AppState<S>, allow: AllowList) -> Router {
    let mcp_routes = Router::new()
        .route(
            "/mcp",
            get(handlers::mcp::get::<S>)
                .post(handlers::mcp::post::<S>)
                .delete(handlers::mcp::delete::<S>),
        )
        .route_layer(middleware::from_fn_with_state(allow, gatekeeper::enforce));

    let system_routes = Router::new().route("/health", get(handlers::health::<S>));

    system_routes.merge(mcp_routes).with_state(state)
}
