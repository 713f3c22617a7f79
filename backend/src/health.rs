use crate::analytics::usecase::AnalyticsUseCase;
use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::time::timeout;

const ATTEMPT_LOG_TIMEOUT: Duration = Duration::from_secs(5);

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: unix_timestamp(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Whether the attempt log can be loaded and validated right now.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AttemptLogHealth {
    pub status: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contestants: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub attempt_log: AttemptLogHealth,
}

async fn check_attempt_log(usecase: &AnalyticsUseCase) -> AttemptLogHealth {
    let repo = usecase.repository();
    let source = repo.describe();
    let start = Instant::now();

    match timeout(ATTEMPT_LOG_TIMEOUT, repo.load_log()).await {
        Ok(Ok(log)) => AttemptLogHealth {
            status: "healthy".to_string(),
            source,
            records: Some(log.len()),
            contestants: Some(log.runs().len()),
            message: None,
            response_time_ms: Some(start.elapsed().as_millis() as u64),
        },
        Ok(Err(e)) => AttemptLogHealth {
            status: "unhealthy".to_string(),
            source,
            records: None,
            contestants: None,
            message: Some(e.to_string()),
            response_time_ms: None,
        },
        Err(_) => AttemptLogHealth {
            status: "unhealthy".to_string(),
            source,
            records: None,
            contestants: None,
            message: Some("attempt log load timed out".to_string()),
            response_time_ms: None,
        },
    }
}

#[utoipa::path(
    get,
    path = "/health/detailed",
    tag = "health",
    responses(
        (status = 200, description = "Attempt log is readable", body = DetailedHealthResponse),
        (status = 503, description = "Attempt log is missing or invalid", body = DetailedHealthResponse)
    )
)]
#[get("/health/detailed")]
pub async fn detailed_health_check(usecase: web::Data<AnalyticsUseCase>) -> impl Responder {
    let attempt_log = check_attempt_log(&usecase).await;
    let healthy = attempt_log.status == "healthy";
    if !healthy {
        log::warn!(
            "Attempt log {} unhealthy: {}",
            attempt_log.source,
            attempt_log.message.as_deref().unwrap_or("unknown")
        );
    }

    let body = DetailedHealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: unix_timestamp(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        attempt_log,
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
