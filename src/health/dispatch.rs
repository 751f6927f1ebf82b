use super::context::CheckContext;
use super::models::{ComponentReport, ComponentResult, ComponentStatus, Presence};
use super::probe::{run_probe, RetryPolicy};
use super::registry::Component;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::Instrument;

/// One component's report plus the presence needed to classify it.
#[derive(Debug, Clone)]
pub(crate) struct ProbeOutcome {
    pub presence: Presence,
    pub report: ComponentReport,
}

/// Spawns one probe task per component. The returned channel yields exactly one
/// outcome per component, in completion order, and closes after the last one.
pub(crate) fn dispatch(
    components: Vec<Component>,
    ctx: &CheckContext,
    started: Instant,
    policy: &RetryPolicy,
) -> mpsc::Receiver<ProbeOutcome> {
    // every task sends once, so a full-size buffer means no sender ever waits
    let (tx, rx) = mpsc::channel(components.len().max(1));

    for component in components {
        let tx = tx.clone();
        let ctx = ctx.clone();
        let policy = policy.clone();
        let span = tracing::debug_span!("probe", component = %component.name);

        tokio::spawn(
            async move {
                let report = probe_until_done(&component, &ctx, started, &policy).await;
                let outcome = ProbeOutcome {
                    presence: component.presence,
                    report,
                };
                if tx.send(outcome).await.is_err() {
                    tracing::debug!("Check abandoned before the report was collected");
                }
            }
            .instrument(span),
        );
    }

    rx
}

/// Races the probe against the context. The probe is polled first, so a result that
/// is already available wins over a deadline that fired in the same instant.
async fn probe_until_done(
    component: &Component,
    ctx: &CheckContext,
    started: Instant,
    policy: &RetryPolicy,
) -> ComponentReport {
    let probe = AssertUnwindSafe(run_probe(
        &component.name,
        component.checker.as_ref(),
        ctx,
        started,
        policy,
    ))
    .catch_unwind();

    tokio::select! {
        biased;
        outcome = probe => match outcome {
            Ok(report) => report,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(component = %component.name, "Checker panicked: {}", message);
                ComponentReport::from_result(
                    component.name.as_str(),
                    ComponentResult::new(ComponentStatus::Unknown, format!("checker panicked: {}", message)),
                    started.elapsed(),
                )
            }
        },
        err = ctx.done() => {
            tracing::warn!(component = %component.name, "Component did not answer before deadline: {}", err);
            ComponentReport::timeout(component.name.as_str(), err.to_string(), started.elapsed())
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
