use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use consorciatech_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

mod cors;
mod internal;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let operator_routes = Router::new()
        .route(
            "/api/update-rules",
            post(handlers::integrations::update_rules_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_operator_token,
        ));

    let proxy_routes = Router::new()
        .route(
            "/api/cep/{cep}",
            get(handlers::integrations::postal_code_handler),
        )
        .route(
            "/api/validate-email/{email}",
            get(handlers::integrations::validate_email_handler),
        )
        .route(
            "/api/download",
            get(handlers::integrations::download_handler),
        )
        .route("/api/pixel", post(handlers::integrations::pixel_handler))
        .route(
            "/api/sign-cloudinary-upload",
            post(handlers::integrations::sign_upload_handler),
        )
        .route(
            "/api/notifications/whatsapp",
            post(handlers::integrations::whatsapp_notification_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(proxy_routes)
        .merge(operator_routes)
        .merge(internal::build_internal_routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
