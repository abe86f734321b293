//! Health probe payloads.

use serde::Serialize;

use crate::application::services::HealthReport;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when every probe passed, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: ProbeStatus,
    pub cache: ProbeStatus,
}

#[derive(Debug, Serialize)]
pub struct ProbeStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl ProbeStatus {
    fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn failed(message: &'static str) -> Self {
        Self {
            status: "error",
            message: Some(message),
        }
    }
}

impl From<&HealthReport> for HealthResponse {
    fn from(report: &HealthReport) -> Self {
        let database = if report.store {
            ProbeStatus::ok()
        } else {
            ProbeStatus::failed("Link store unreachable")
        };
        let cache = if report.cache {
            ProbeStatus::ok()
        } else {
            ProbeStatus::failed("Cache unreachable")
        };

        Self {
            status: if report.is_healthy() { "healthy" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            checks: HealthChecks { database, cache },
        }
    }
}
