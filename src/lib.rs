// Laundry Tracker Library - Campus laundry room status engine
// This exposes the core components for the dashboard binary and for testing

pub mod types;
pub mod seed;
pub mod engine;
pub mod scheduler;
pub mod reporting;
pub mod service;
pub mod display;
pub mod telemetry;
pub mod config;
pub mod shutdown;

// Re-export key types for easy access
pub use types::{
    LaundryRoom, LaundrySnapshot, Machine, MachineId, MachineKind, MachineStatus, RoomId,
};
pub use engine::{EngineError, EngineSettings, LaundryState, StatusChange, TickSummary};
pub use scheduler::{TickHandle, TickScheduler, TickTarget};
pub use reporting::{FaultReport, FaultReporter, MemoryFaultReporter, TracingFaultReporter};
pub use service::{ActionOutcome, LaundryService};
pub use telemetry::{init_telemetry, shutdown_telemetry, generate_correlation_id};
pub use config::LaundryTrackerConfig;
pub use shutdown::ShutdownCoordinator;
