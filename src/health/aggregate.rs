use super::dispatch::ProbeOutcome;
use super::models::{ComponentReport, OverallReport, OverallStatus, Presence};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Folds component reports into one verdict.
///
/// The verdict does not depend on arrival order: any required component that is
/// not `On` makes it `NotServing`, otherwise a single `On` anywhere makes it
/// `Serving`, otherwise it is `NotServing`.
#[derive(Debug, Default)]
pub struct Aggregator {
    status: OverallStatus,
    stats: BTreeMap<String, usize>,
    components: Vec<ComponentReport>,
    required_failure: bool,
    any_on: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, presence: Presence, report: ComponentReport) {
        *self.stats.entry(report.status.as_str().to_string()).or_insert(0) += 1;

        if report.status.is_failure() {
            if presence == Presence::Required {
                self.required_failure = true;
                self.status = OverallStatus::NotServing;
            }
        } else {
            self.any_on = true;
            if self.status == OverallStatus::Unknown {
                self.status = OverallStatus::Serving;
            }
        }

        self.components.push(report);
    }

    /// Verdict over the reports seen so far. `Unknown` until something decides it.
    pub fn status(&self) -> OverallStatus {
        self.status
    }

    pub fn finish(mut self, duration: Duration) -> OverallReport {
        let status = if self.required_failure || !self.any_on {
            OverallStatus::NotServing
        } else {
            OverallStatus::Serving
        };
        self.components.sort_by_key(|c| c.duration);

        OverallReport {
            status,
            stats: self.stats,
            components: self.components,
            duration,
        }
    }
}

pub(crate) async fn collect(mut outcomes: mpsc::Receiver<ProbeOutcome>, started: Instant) -> OverallReport {
    let mut aggregator = Aggregator::new();
    while let Some(outcome) = outcomes.recv().await {
        aggregator.observe(outcome.presence, outcome.report);
    }
    aggregator.finish(started.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::models::{ComponentResult, ComponentStatus};

    fn report(name: &str, status: ComponentStatus, millis: u64) -> ComponentReport {
        ComponentReport::from_result(
            name,
            ComponentResult::new(status, ""),
            Duration::from_millis(millis),
        )
    }

    fn aggregate(reports: &[(Presence, ComponentReport)]) -> OverallReport {
        let mut aggregator = Aggregator::new();
        for (presence, report) in reports {
            aggregator.observe(*presence, report.clone());
        }
        aggregator.finish(Duration::from_millis(1))
    }

    #[test]
    fn test_empty_is_not_serving() {
        let report = Aggregator::new().finish(Duration::ZERO);
        assert_eq!(report.status, OverallStatus::NotServing);
        assert!(report.stats.is_empty());
        assert!(report.components.is_empty());
    }

    #[test]
    fn test_optional_off_does_not_downgrade() {
        let report = aggregate(&[
            (Presence::Required, report("a", ComponentStatus::On, 5)),
            (Presence::Optional, report("b", ComponentStatus::Off, 1)),
        ]);

        assert_eq!(report.status, OverallStatus::Serving);
        assert_eq!(report.count(ComponentStatus::On), 1);
        assert_eq!(report.count(ComponentStatus::Off), 1);
    }

    #[test]
    fn test_any_required_failure_wins() {
        for failure in [
            ComponentStatus::Off,
            ComponentStatus::Fail,
            ComponentStatus::Timeout,
            ComponentStatus::Unknown,
        ] {
            let report = aggregate(&[
                (Presence::Required, report("a", ComponentStatus::On, 1)),
                (Presence::Optional, report("b", ComponentStatus::On, 2)),
                (Presence::Required, report("c", failure, 3)),
            ]);
            assert_eq!(report.status, OverallStatus::NotServing, "required {}", failure);
        }
    }

    #[test]
    fn test_verdict_ignores_arrival_order() {
        let reports = [
            (Presence::Required, report("a", ComponentStatus::On, 1)),
            (Presence::Optional, report("b", ComponentStatus::Fail, 2)),
            (Presence::Required, report("c", ComponentStatus::Timeout, 3)),
            (Presence::Optional, report("d", ComponentStatus::On, 4)),
        ];

        // every rotation and its reverse
        for shift in 0..reports.len() {
            let mut order = reports.to_vec();
            order.rotate_left(shift);
            assert_eq!(aggregate(&order).status, OverallStatus::NotServing);
            order.reverse();
            assert_eq!(aggregate(&order).status, OverallStatus::NotServing);
        }
    }

    #[test]
    fn test_late_required_failure_downgrades_tentative_serving() {
        let mut aggregator = Aggregator::new();
        assert_eq!(aggregator.status(), OverallStatus::Unknown);

        aggregator.observe(Presence::Required, report("a", ComponentStatus::On, 1));
        assert_eq!(aggregator.status(), OverallStatus::Serving);

        aggregator.observe(Presence::Optional, report("b", ComponentStatus::Fail, 2));
        assert_eq!(aggregator.status(), OverallStatus::Serving);

        aggregator.observe(Presence::Required, report("c", ComponentStatus::Fail, 3));
        assert_eq!(aggregator.status(), OverallStatus::NotServing);

        aggregator.observe(Presence::Required, report("d", ComponentStatus::On, 4));
        assert_eq!(aggregator.status(), OverallStatus::NotServing);
        assert_eq!(aggregator.finish(Duration::ZERO).status, OverallStatus::NotServing);
    }

    #[test]
    fn test_all_optional_off_is_not_serving() {
        let report = aggregate(&[
            (Presence::Optional, report("a", ComponentStatus::Off, 1)),
            (Presence::Optional, report("b", ComponentStatus::Fail, 2)),
        ]);
        assert_eq!(report.status, OverallStatus::NotServing);
    }

    #[test]
    fn test_optional_on_alone_is_serving() {
        let report = aggregate(&[(Presence::Optional, report("a", ComponentStatus::On, 1))]);
        assert_eq!(report.status, OverallStatus::Serving);
    }

    #[test]
    fn test_components_sorted_and_counted() {
        let report = aggregate(&[
            (Presence::Required, report("slow", ComponentStatus::On, 30)),
            (Presence::Required, report("fast", ComponentStatus::On, 1)),
            (Presence::Optional, report("mid", ComponentStatus::Off, 10)),
        ]);

        let names: Vec<_> = report.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["fast", "mid", "slow"]);
        assert_eq!(report.stats.values().sum::<usize>(), 3);
        assert_eq!(report.duration, Duration::from_millis(1));
    }
}
