use crate::health::{CheckContext, Checker, ComponentResult};
use async_trait::async_trait;
use sqlx::PgPool;

/// Pings Postgres through the shared pool.
///
/// A checker without a pool reports `Off`: the database is simply not configured.
pub struct PostgresChecker {
    pool: Option<PgPool>,
}

impl PostgresChecker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    pub fn disabled() -> Self {
        Self { pool: None }
    }
}

#[async_trait]
impl Checker for PostgresChecker {
    #[tracing::instrument(name = "Check database health", skip_all)]
    async fn check(&self, ctx: &CheckContext) -> ComponentResult {
        let pool = match &self.pool {
            Some(pool) => pool,
            None => return ComponentResult::off("component doesn't have a database pool"),
        };

        let ping = sqlx::query("SELECT 1 as health_check").execute(pool);
        let result = tokio::select! {
            result = ping => match result {
                Ok(_) => ComponentResult::on("connected"),
                Err(e) => {
                    tracing::error!("Database health check failed: {:?}", e);
                    ComponentResult::fail(e.to_string())
                }
            },
            err = ctx.done() => ComponentResult::fail(err.to_string()),
        };

        let open = pool.size() as i64;
        let idle = pool.num_idle() as i64;
        result
            .with_stat("open_connections", open)
            .with_stat("idle_connections", idle)
    }
}
