//! Laundry state engine.
//!
//! Owns every room and machine, advances running cycles once per tick and
//! applies start-cycle / report-fault actions to a single machine by id.
//! All operations take `&mut self`; callers that share the engine across
//! tasks serialize access themselves (see [`crate::service::LaundryService`]).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::seed::seed_rooms;
use crate::types::{
    LaundryRoom, LaundrySnapshot, Machine, MachineId, MachineKind, MachineStatus,
};

pub const WASHER_CYCLE_SECS: u32 = 1800;
pub const DRYER_CYCLE_SECS: u32 = 2700;
pub const FINISHING_THRESHOLD_SECS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Machine #{machine_id} not found")]
    NotFound { machine_id: MachineId },
    #[error("Machine #{machine_id} is {status}, expected available")]
    InvalidPrecondition {
        machine_id: MachineId,
        status: MachineStatus,
    },
    #[error("Machine #{machine_id} appears in more than one place")]
    DuplicateMachine { machine_id: MachineId },
    #[error("Room '{room_id}' appears more than once")]
    DuplicateRoom { room_id: String },
}

/// Cycle lengths and the finishing cutoff, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub washer_cycle_secs: u32,
    pub dryer_cycle_secs: u32,
    pub finishing_threshold_secs: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            washer_cycle_secs: WASHER_CYCLE_SECS,
            dryer_cycle_secs: DRYER_CYCLE_SECS,
            finishing_threshold_secs: FINISHING_THRESHOLD_SECS,
        }
    }
}

impl EngineSettings {
    pub fn cycle_length(&self, kind: MachineKind) -> u32 {
        match kind {
            MachineKind::Washer => self.washer_cycle_secs,
            MachineKind::Dryer => self.dryer_cycle_secs,
        }
    }
}

/// A status change caused by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub machine_id: MachineId,
    pub from: MachineStatus,
    pub to: MachineStatus,
}

/// What a single tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Machines whose timer was decremented
    pub advanced: usize,
    pub changes: Vec<StatusChange>,
}

#[derive(Debug, Clone)]
pub struct LaundryState {
    rooms: Vec<LaundryRoom>,
    settings: EngineSettings,
}

impl Default for LaundryState {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl LaundryState {
    /// Fresh engine over the seed dataset.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            rooms: seed_rooms(),
            settings,
        }
    }

    /// Engine over a custom room list. Room ids and machine ids must be unique.
    pub fn with_rooms(
        rooms: Vec<LaundryRoom>,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        let mut room_ids = HashSet::new();
        let mut machine_ids = HashSet::new();
        for room in &rooms {
            if !room_ids.insert(room.id.as_str()) {
                return Err(EngineError::DuplicateRoom {
                    room_id: room.id.clone(),
                });
            }
            for machine in &room.machines {
                if !machine_ids.insert(machine.id) {
                    return Err(EngineError::DuplicateMachine {
                        machine_id: machine.id,
                    });
                }
            }
        }

        Ok(Self { rooms, settings })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn rooms(&self) -> &[LaundryRoom] {
        &self.rooms
    }

    pub fn snapshot(&self) -> LaundrySnapshot {
        LaundrySnapshot {
            rooms: self.rooms.clone(),
        }
    }

    pub fn find_room(&self, room_id: &str) -> Option<&LaundryRoom> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    pub fn find_machine(&self, machine_id: MachineId) -> Option<&Machine> {
        self.rooms.iter().find_map(|r| r.machine(machine_id))
    }

    fn find_machine_mut(&mut self, machine_id: MachineId) -> Result<&mut Machine, EngineError> {
        self.rooms
            .iter_mut()
            .flat_map(|r| r.machines.iter_mut())
            .find(|m| m.id == machine_id)
            .ok_or(EngineError::NotFound { machine_id })
    }

    /// Advance every running cycle by one second.
    ///
    /// Available and broken machines are never touched, whatever their timer
    /// holds. Missed ticks are not replayed: each call moves time by exactly
    /// one second.
    pub fn tick(&mut self) -> TickSummary {
        let threshold = self.settings.finishing_threshold_secs;
        let mut summary = TickSummary::default();

        for machine in self.rooms.iter_mut().flat_map(|r| r.machines.iter_mut()) {
            if !machine.status.is_running() || machine.timer == 0 {
                continue;
            }

            let previous = machine.status;
            machine.timer -= 1;
            machine.status = if machine.timer == 0 {
                MachineStatus::Available
            } else if machine.timer <= threshold {
                MachineStatus::Finishing
            } else {
                previous
            };
            summary.advanced += 1;

            if machine.status != previous {
                tracing::debug!(
                    machine_id = %machine.id,
                    from = %previous,
                    to = %machine.status,
                    timer = %machine.timer,
                    "Machine status changed on tick"
                );
                summary.changes.push(StatusChange {
                    machine_id: machine.id,
                    from: previous,
                    to: machine.status,
                });
            }
        }

        summary
    }

    /// Start a cycle on an available machine.
    pub fn start_cycle(&mut self, machine_id: MachineId) -> Result<Machine, EngineError> {
        let settings = self.settings;
        let machine = self.find_machine_mut(machine_id)?;
        if machine.status != MachineStatus::Available {
            tracing::warn!(
                machine_id = %machine_id,
                status = %machine.status,
                "Rejected start on machine that is not available"
            );
            return Err(EngineError::InvalidPrecondition {
                machine_id,
                status: machine.status,
            });
        }

        machine.status = MachineStatus::InUse;
        machine.timer = settings.cycle_length(machine.kind);
        tracing::info!(
            machine_id = %machine_id,
            kind = %machine.kind,
            timer = %machine.timer,
            "Cycle started"
        );
        Ok(machine.clone())
    }

    /// Mark a machine out of order. Repeated reports leave it broken.
    ///
    /// The message is only logged here; recording it is the caller's job.
    pub fn report_fault(
        &mut self,
        machine_id: MachineId,
        message: &str,
    ) -> Result<Machine, EngineError> {
        let machine = self.find_machine_mut(machine_id)?;
        let previous = machine.status;
        machine.status = MachineStatus::Broken;
        machine.timer = 0;
        tracing::info!(
            machine_id = %machine_id,
            previous = %previous,
            fault = %message,
            "Machine reported broken"
        );
        Ok(machine.clone())
    }
}
