use crate::configuration::HealthSettings;
use crate::health::{CheckContext, ComponentStatus, HealthChecker, OverallReport};
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// Mounts the three probe endpoints on the configured paths.
pub fn configure(cfg: &mut web::ServiceConfig, settings: &HealthSettings) {
    cfg.route(&settings.liveness_path, web::get().to(liveness))
        .route(&settings.readiness_path, web::get().to(readiness))
        .route(&settings.health_path, web::get().to(health));
}

/// The process is up and answering. Does not look at any component.
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// 200 while serving, otherwise 503 with one line per failed or timed out component.
#[tracing::instrument(name = "Readiness probe", skip_all)]
pub async fn readiness(
    health_checker: web::Data<Arc<HealthChecker>>,
    settings: web::Data<HealthSettings>,
) -> HttpResponse {
    let ctx = CheckContext::with_timeout(settings.check_timeout());
    let report = health_checker.check(&ctx).await;

    if report.is_serving() {
        return HttpResponse::Ok().body("OK");
    }

    HttpResponse::ServiceUnavailable()
        .content_type("text/plain; charset=utf-8")
        .body(render_diagnostics(&report))
}

/// Full report as JSON.
#[tracing::instrument(name = "Health report", skip_all)]
pub async fn health(
    health_checker: web::Data<Arc<HealthChecker>>,
    settings: web::Data<HealthSettings>,
) -> HttpResponse {
    let ctx = CheckContext::with_timeout(settings.check_timeout());
    let report = health_checker.check(&ctx).await;

    HttpResponse::Ok().json(report)
}

pub fn render_diagnostics(report: &OverallReport) -> String {
    let mut out = String::new();
    for component in &report.components {
        match component.status {
            ComponentStatus::Fail => out.push_str(&format!(
                "- {} {}: {}\n",
                component.name, component.status, component.description
            )),
            ComponentStatus::Timeout => out.push_str(&format!(
                "- {} {}: {} {:?}\n",
                component.name, component.status, component.description, component.duration
            )),
            _ => {}
        }
    }
    out
}
