use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use serde::Serialize;
use std::time::Duration;

use crate::{constants::START_TIME, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    uptime: String,
    start_at: String,
    email_configured: bool,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let uptime = Utc::now().signed_duration_since(*START_TIME);
    let uptime = Duration::from_secs(uptime.num_seconds().max(0) as u64);

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment.to_string(),
        uptime: format_duration(uptime).to_string(),
        start_at: START_TIME.to_rfc3339(),
        email_configured: state.contact_handler.is_configured(),
    })
}
