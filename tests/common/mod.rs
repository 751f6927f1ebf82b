use async_trait::async_trait;
use healthd::configuration::Settings;
use healthd::health::{CheckContext, Checker, ComponentResult, ComponentStatus, HealthChecker};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub address: String,
    pub health_checker: Arc<HealthChecker>,
}

/// Boots the server on a random port around `health_checker`.
pub async fn spawn_app(health_checker: Arc<HealthChecker>, mut settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    settings.app_port = port;

    let server = healthd::startup::run(listener, health_checker.clone(), settings)
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        health_checker,
    }
}

/// Sleeps `delay` on every call and fails the first `count_fail` calls.
pub struct MockComponent {
    delay: Duration,
    count_fail: u32,
    calls: AtomicU32,
    status: ComponentStatus,
    description: &'static str,
}

impl MockComponent {
    pub fn new(status: ComponentStatus, description: &'static str) -> Self {
        Self {
            delay: Duration::ZERO,
            count_fail: 0,
            calls: AtomicU32::new(0),
            status,
            description,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, count_fail: u32) -> Self {
        self.count_fail = count_fail;
        self
    }
}

#[async_trait]
impl Checker for MockComponent {
    async fn check(&self, _ctx: &CheckContext) -> ComponentResult {
        tokio::time::sleep(self.delay).await;
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.count_fail {
            return ComponentResult::fail("server not found");
        }
        ComponentResult::new(self.status, self.description)
    }
}
