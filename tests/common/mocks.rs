use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use newsml_validator::{
    OrchestratorConfig, RunnerSet, StandardName, StandardRunner, Target, ValidationOrchestrator,
    ValidationResult,
};

/// Every runner invocation, in call order
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<(StandardName, Option<String>)>>>,
    in_flight: Rc<Cell<usize>>,
    max_in_flight: Rc<Cell<usize>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(StandardName, Option<String>)> {
        self.calls.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Guids seen by `standard`, in call order
    pub fn guids_for(&self, standard: StandardName) -> Vec<Option<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|(s, _)| *s == standard)
            .map(|(_, guid)| guid.clone())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.get()
    }

    fn enter(&self, standard: StandardName, guid: Option<&str>) {
        self.calls
            .borrow_mut()
            .push((standard, guid.map(str::to_string)));
        let now = self.in_flight.get() + 1;
        self.in_flight.set(now);
        self.max_in_flight.set(self.max_in_flight.get().max(now));
    }

    fn leave(&self) {
        self.in_flight.set(self.in_flight.get() - 1);
    }
}

/// Records its invocations and passes every target.
///
/// With `staggered`, later items finish first, so completion order differs
/// from report order.
pub struct RecordingRunner {
    standard: StandardName,
    log: CallLog,
    staggered: bool,
}

impl RecordingRunner {
    pub fn new(standard: StandardName, log: CallLog) -> Self {
        Self {
            standard,
            log,
            staggered: false,
        }
    }

    pub fn staggered(mut self) -> Self {
        self.staggered = true;
        self
    }
}

#[async_trait(?Send)]
impl StandardRunner for RecordingRunner {
    fn standard(&self) -> StandardName {
        self.standard
    }

    async fn run(&self, target: Target<'_>, item_id: Option<&str>) -> ValidationResult {
        self.log.enter(self.standard, item_id);

        if self.staggered {
            let position = target.item().map(|item| item.position()).unwrap_or(0) as u64;
            let delay = 5 * 10_u64.saturating_sub(position);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.log.leave();
        ValidationResult::passed(self.standard, item_id)
    }
}

/// A runner whose dependency is never available
pub struct UnavailableRunner(pub StandardName);

#[async_trait(?Send)]
impl StandardRunner for UnavailableRunner {
    fn standard(&self) -> StandardName {
        self.0
    }

    async fn run(&self, _target: Target<'_>, item_id: Option<&str>) -> ValidationResult {
        ValidationResult::inconclusive(self.0, item_id, "service unavailable")
    }
}

/// Orchestrator with a recording runner for every standard
pub fn recording_orchestrator(log: &CallLog, max_concurrent_runs: usize) -> ValidationOrchestrator {
    let runners = StandardName::ALL
        .into_iter()
        .fold(RunnerSet::new(), |set, standard| {
            set.with(RecordingRunner::new(standard, log.clone()))
        });
    ValidationOrchestrator::new(runners, OrchestratorConfig { max_concurrent_runs })
}

/// Orchestrator whose runners finish in reverse item order
pub fn staggered_orchestrator(log: &CallLog, max_concurrent_runs: usize) -> ValidationOrchestrator {
    let runners = StandardName::ALL
        .into_iter()
        .fold(RunnerSet::new(), |set, standard| {
            set.with(RecordingRunner::new(standard, log.clone()).staggered())
        });
    ValidationOrchestrator::new(runners, OrchestratorConfig { max_concurrent_runs })
}
