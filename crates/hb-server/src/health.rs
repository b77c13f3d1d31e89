//! Health checks
//!
//! `/health` and `/health/live` only prove the process answers. `/health/ready` also pings the
//! database, when one is configured, and answers 503 while it is unreachable.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use hb_db::Database;
use serde::Serialize;
use tokio::sync::RwLock;

/// Time allowed for the database ping
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Readiness reports are reused for this long
const REPORT_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
    pub pool_size: u32,
    pub idle_connections: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub version: &'static str,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseHealth>,
    pub checked_at: DateTime<Utc>,
}

impl ReadinessReport {
    pub fn http_status(&self) -> StatusCode {
        if self.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub struct HealthChecker {
    started: Instant,
    database: Option<Database>,
    ttl: Duration,
    last: RwLock<Option<(Instant, ReadinessReport)>>,
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            database: None,
            ttl: REPORT_TTL,
            last: RwLock::new(None),
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// The latest report, recomputed once it is older than the TTL
    pub async fn check(&self) -> ReadinessReport {
        if let Some((at, report)) = self.last.read().await.as_ref() {
            if at.elapsed() < self.ttl {
                return report.clone();
            }
        }

        let database = match &self.database {
            Some(db) => Some(ping(db).await),
            None => None,
        };
        let report = ReadinessReport {
            ready: database.as_ref().map_or(true, |d| d.reachable),
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: self.started.elapsed().as_secs(),
            database,
            checked_at: Utc::now(),
        };

        *self.last.write().await = Some((Instant::now(), report.clone()));
        report
    }
}

async fn ping(database: &Database) -> DatabaseHealth {
    let start = Instant::now();
    let error = match tokio::time::timeout(PING_TIMEOUT, database.ping()).await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(_) => Some("ping timed out".to_string()),
    };
    if let Some(ref e) = error {
        tracing::warn!(error = %e, "Database is not reachable");
    }

    let stats = database.stats();
    DatabaseHealth {
        reachable: error.is_none(),
        error,
        latency_ms: start.elapsed().as_millis() as u64,
        pool_size: stats.size,
        idle_connections: stats.idle,
    }
}

pub async fn liveness() -> &'static str {
    "OK"
}

pub async fn readiness(State(health): State<Arc<HealthChecker>>) -> (StatusCode, Json<ReadinessReport>) {
    let report = health.check().await;
    (report.http_status(), Json(report))
}
