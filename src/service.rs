//! Host for the laundry engine.
//!
//! Shares one [`LaundryState`] between the tick loop and user actions behind a
//! tokio mutex, so a tick and an action never interleave. Fault messages go to
//! the configured [`FaultReporter`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn, Instrument};

use crate::engine::{EngineError, LaundryState, TickSummary};
use crate::reporting::{FaultReport, FaultReporter, TracingFaultReporter};
use crate::scheduler::{TickHandle, TickScheduler};
use crate::telemetry::machine_span;
use crate::types::{LaundryRoom, LaundrySnapshot, Machine, MachineId, MachineStatus};

/// What pressing a machine's action button leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The machine was available and a cycle is now running
    Started(Machine),
    /// The machine is busy; the user should be asked what is wrong with it
    NeedsReport(Machine),
    /// Broken machines have no action
    Disabled(Machine),
}

pub struct LaundryService {
    state: Arc<Mutex<LaundryState>>,
    reporter: Arc<dyn FaultReporter>,
    ticker: Mutex<Option<TickHandle>>,
}

impl Default for LaundryService {
    fn default() -> Self {
        Self::new(LaundryState::default())
    }
}

impl LaundryService {
    pub fn new(state: LaundryState) -> Self {
        Self::with_reporter(state, Arc::new(TracingFaultReporter))
    }

    pub fn with_reporter(state: LaundryState, reporter: Arc<dyn FaultReporter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            reporter,
            ticker: Mutex::new(None),
        }
    }

    pub async fn snapshot(&self) -> LaundrySnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn room(&self, room_id: &str) -> Option<LaundryRoom> {
        self.state.lock().await.find_room(room_id).cloned()
    }

    pub async fn machine(&self, machine_id: MachineId) -> Option<Machine> {
        self.state.lock().await.find_machine(machine_id).cloned()
    }

    /// Apply one tick by hand. The scheduler calls the same engine operation.
    pub async fn tick(&self) -> TickSummary {
        self.state.lock().await.tick()
    }

    pub async fn start_cycle(&self, machine_id: MachineId) -> Result<Machine, EngineError> {
        let span = machine_span("start_cycle", machine_id);
        async { self.state.lock().await.start_cycle(machine_id) }
            .instrument(span)
            .await
    }

    /// Mark the machine broken, then hand the message to the reporter.
    ///
    /// A reporter failure is logged and does not undo the state change.
    pub async fn report_fault(
        &self,
        machine_id: MachineId,
        message: &str,
    ) -> Result<Machine, EngineError> {
        let span = machine_span("report_fault", machine_id);
        async {
            let machine = self.state.lock().await.report_fault(machine_id, message)?;

            let report = FaultReport::new(machine_id, message);
            if let Err(e) = self.reporter.record(&report).await {
                warn!(
                    report_id = %report.report_id,
                    error = %e,
                    "Failed to record fault report"
                );
            }
            Ok::<_, EngineError>(machine)
        }
        .instrument(span)
        .await
    }

    /// Route a button press the way the dashboard does: start an available
    /// machine, ask for a report on a busy one, ignore a broken one.
    pub async fn handle_action(&self, machine_id: MachineId) -> Result<ActionOutcome, EngineError> {
        let mut state = self.state.lock().await;
        let machine = state
            .find_machine(machine_id)
            .cloned()
            .ok_or(EngineError::NotFound { machine_id })?;

        match machine.status {
            MachineStatus::Available => state.start_cycle(machine_id).map(ActionOutcome::Started),
            MachineStatus::Broken => Ok(ActionOutcome::Disabled(machine)),
            MachineStatus::InUse | MachineStatus::Finishing => {
                Ok(ActionOutcome::NeedsReport(machine))
            }
        }
    }

    /// Start the tick loop. A loop that is already running is stopped first.
    pub async fn start_ticking(&self, period: Duration) {
        let mut ticker = self.ticker.lock().await;
        if let Some(previous) = ticker.take() {
            previous.stop().await;
        }
        *ticker = Some(TickScheduler::new(period).spawn(Arc::clone(&self.state)));
    }

    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(TickHandle::is_running)
    }

    /// Stop the tick loop if one is running. Returns the ticks it applied.
    pub async fn stop(&self) -> Option<u64> {
        let handle = self.ticker.lock().await.take()?;
        let ticks = handle.stop().await;
        info!(ticks = %ticks, "Laundry service stopped ticking");
        Some(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::{MemoryFaultReporter, MockFaultReporter};

    #[tokio::test]
    async fn test_report_fault_forwards_message() {
        let reporter = Arc::new(MemoryFaultReporter::new());
        let service = LaundryService::with_reporter(LaundryState::default(), reporter.clone());

        let machine = service.report_fault(2, "leaking").await.unwrap();

        assert_eq!(machine.status, MachineStatus::Broken);
        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].machine_id, 2);
        assert_eq!(reports[0].message, "leaking");
    }

    #[tokio::test]
    async fn test_unknown_machine_is_not_reported() {
        let mut reporter = MockFaultReporter::new();
        reporter.expect_record().times(0);
        let service = LaundryService::with_reporter(LaundryState::default(), Arc::new(reporter));

        let err = service.report_fault(9999, "gone").await.unwrap_err();
        assert_eq!(err, EngineError::NotFound { machine_id: 9999 });
    }

    #[tokio::test]
    async fn test_reporter_failure_keeps_machine_broken() {
        let mut reporter = MockFaultReporter::new();
        reporter
            .expect_record()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("sink unavailable")));
        let service = LaundryService::with_reporter(LaundryState::default(), Arc::new(reporter));

        service.report_fault(1, "door stuck").await.unwrap();

        assert_eq!(service.machine(1).await.unwrap().status, MachineStatus::Broken);
    }

    #[tokio::test]
    async fn test_handle_action_routes_by_status() {
        let service = LaundryService::default();

        match service.handle_action(1).await.unwrap() {
            ActionOutcome::Started(machine) => assert_eq!(machine.timer, 1800),
            other => panic!("expected Started, got {other:?}"),
        }
        assert!(matches!(
            service.handle_action(1).await.unwrap(),
            ActionOutcome::NeedsReport(_)
        ));
        assert!(matches!(
            service.handle_action(3).await.unwrap(),
            ActionOutcome::Disabled(_)
        ));
        assert!(service.handle_action(9999).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_ticking() {
        let service = LaundryService::default();
        assert!(!service.is_ticking().await);

        service.start_ticking(Duration::from_secs(1)).await;
        assert!(service.is_ticking().await);

        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert_eq!(service.stop().await, Some(5));
        assert!(!service.is_ticking().await);
        assert_eq!(service.stop().await, None);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(service.machine(11).await.unwrap().timer, 1195);
    }
}
