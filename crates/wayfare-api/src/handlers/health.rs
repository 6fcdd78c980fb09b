use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;

use crate::{AppState, Backing};

/// Liveness plus database reachability. Always 200 so the process is not
/// restarted while it serves degraded responses.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.backing {
        Backing::Postgres(db) => match db.health_check().await {
            Ok(()) => "connected",
            Err(e) => {
                warn!(subsystem = "api", component = "health", error = %e, "Database ping failed");
                "unavailable"
            }
        },
        Backing::Memory => "connected",
        Backing::Unavailable(_) => "unavailable",
    };
    let status = if database == "connected" { "ok" } else { "degraded" };

    Json(serde_json::json!({
        "status": status,
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
