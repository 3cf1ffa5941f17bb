use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{HealthDependencyStatus, HealthResponse};
use crate::state::AppState;

mod checks;

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let profile_store = checks::check_profile_store(state.postgres_pool.clone()).await;

    let ready = profile_store.status != "error";
    let (status, http_status) = if ready {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            profile_store,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use axum::http::StatusCode;

    use super::health_handler;
    use crate::handlers::test_support::TestApp;

    #[tokio::test]
    async fn in_memory_store_reports_ok_with_disabled_check() {
        let app = TestApp::new();

        let (status, response) = health_handler(State(app.state())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.status, "ok");
        assert_eq!(response.profile_store.status, "disabled");
    }
}
