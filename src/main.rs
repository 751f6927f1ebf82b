use anyhow::Context;
use healthd::checkers::{PostgresChecker, StaticChecker};
use healthd::configuration::get_configuration;
use healthd::health::{ComponentResult, HealthChecker, Presence, RetryPolicy};
use healthd::startup::run;
use healthd::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("healthd".into(), "info".into());
    init_subscriber(subscriber)?;

    let settings = get_configuration().context("Failed to read configuration.")?;

    let health_checker = Arc::new(HealthChecker::with_retry_policy(RetryPolicy::from(
        &settings.health.retry,
    )));

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    health_checker.register(
        "http",
        StaticChecker::new(ComponentResult::on(format!("listening on {}", address))),
    )?;

    match &settings.database {
        Some(database) => {
            tracing::info!(
                db_host = %database.host,
                db_port = database.port,
                db_name = %database.database_name,
                required = database.required,
                "Registering PostgreSQL health check"
            );
            // lazy so that an unavailable database shows up in readiness instead of failing startup
            let pg_pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(5))
                .connect_lazy(&database.connection_string())
                .context("Invalid database settings.")?;
            health_checker.register_with(
                "database",
                PostgresChecker::new(pg_pool),
                database.presence(),
            )?;
        }
        None => {
            health_checker.register_with("database", PostgresChecker::disabled(), Presence::Optional)?;
        }
    }

    tracing::info!(
        components = ?health_checker.registry().names(),
        "Start server at {:?}",
        &address
    );
    let listener =
        TcpListener::bind(&address).with_context(|| format!("failed to bind to {}", address))?;

    run(listener, health_checker, settings)?.await?;
    Ok(())
}
