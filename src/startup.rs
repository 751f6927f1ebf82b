use crate::configuration::Settings;
use crate::health::HealthChecker;
use crate::routes;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub fn run(
    listener: TcpListener,
    health_checker: Arc<HealthChecker>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let health_checker = web::Data::new(health_checker);
    let health_settings = web::Data::new(settings.health);

    let server = HttpServer::new(move || {
        let paths = health_settings.clone();
        App::new()
            .wrap(TracingLogger::default())
            .app_data(health_checker.clone())
            .app_data(health_settings.clone())
            .configure(move |cfg| routes::configure(cfg, &paths))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
