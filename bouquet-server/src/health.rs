//! Health check endpoints for Kubernetes probes.
//!
//! Provides liveness and readiness probes for container orchestration:
//! - `/health/live` - Liveness probe (restart if fails)
//! - `/health/ready` - Readiness probe (remove from LB if fails)
//! - `/health` - Combined check

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Individual component checks
    pub checks: HealthChecks,
}

/// Individual health checks.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Bouquet store (and its data directory) accessible
    pub store: bool,
    /// Flower catalog loaded with at least one entry
    pub catalog: bool,
}

impl HealthChecks {
    /// Whether every component check passed.
    #[must_use]
    pub const fn all_ok(&self) -> bool {
        self.store && self.catalog
    }
}

/// Liveness probe - is the server running?
///
/// Returns 200 OK if the process is alive.
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe - is the server ready to accept traffic?
///
/// Returns 503 with the failing checks if the store or catalog is unusable.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let checks = HealthChecks {
        store: state.store.is_healthy(),
        catalog: !state.catalog.is_empty(),
    };
    let all_ok = checks.all_ok();

    let status = HealthStatus {
        status: if all_ok { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        checks,
    };

    let code = if all_ok {
        StatusCode::OK
    } else {
        tracing::warn!(checks = ?status.checks, "Readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus {
            status: "healthy",
            version: "0.2.0",
            checks: HealthChecks {
                store: true,
                catalog: true,
            },
        };

        let json = serde_json::to_string(&status).expect("should serialize");
        assert!(json.contains("healthy"));
        assert!(json.contains("0.2.0"));
        assert!(json.contains("store"));
        assert!(json.contains("catalog"));
    }

    #[test]
    fn test_any_failed_check_is_unhealthy() {
        let checks = HealthChecks {
            store: true,
            catalog: false,
        };
        assert!(!checks.all_ok());
    }
}
