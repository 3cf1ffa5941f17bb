use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_internal_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/internal/events/account-created",
            post(handlers::events::account_created_handler),
        )
        .route(
            "/api/internal/users/{uid}",
            get(handlers::events::user_profile_handler),
        )
        .route_layer(from_fn_with_state(
            app_state,
            middleware::require_internal_token,
        ))
}
