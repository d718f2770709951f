/// Liveness and readiness checks (JSON)
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize, Debug)]
pub struct ComponentCheck {
    pub status: ComponentStatus,
    pub message: String,
    pub latency_ms: u64,
}

#[derive(Serialize, Debug)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub status: ComponentStatus,
    pub checks: HashMap<String, ComponentCheck>,
    pub timestamp: String,
}

pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    match state.store.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "yatube-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("Database check failed: {}", e),
            "service": "yatube-service"
        })),
    }
}

fn component(result: Result<(), String>, ok: &str, started: Instant) -> ComponentCheck {
    let latency_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: ok.to_string(),
            latency_ms,
        },
        Err(message) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message,
            latency_ms,
        },
    }
}

pub async fn readiness_summary(state: web::Data<AppState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let db = state
        .store
        .health_check()
        .await
        .map_err(|e| format!("Database check failed: {}", e));
    checks.insert(
        "database".to_string(),
        component(db, "Database query successful", start),
    );

    let start = Instant::now();
    let cache = state
        .cache
        .ping()
        .await
        .map_err(|e| format!("Cache ping failed: {}", e));
    checks.insert(
        "cache".to_string(),
        component(cache, "Cache ping successful", start),
    );

    let ready = checks
        .values()
        .all(|check| check.status == ComponentStatus::Healthy);
    let response = ReadinessResponse {
        ready,
        status: if ready {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        },
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
