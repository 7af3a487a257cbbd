// Core types for laundry rooms and the machines inside them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine identifier, unique across every room.
pub type MachineId = u64;

/// Room identifier such as `sentinelHall`.
pub type RoomId = String;

/// What a machine does. Fixed for the lifetime of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineKind {
    Washer,
    Dryer,
}

impl MachineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineKind::Washer => "washer",
            MachineKind::Dryer => "dryer",
        }
    }
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine status as shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MachineStatus {
    /// Idle and ready to start a cycle
    Available,
    /// Running a cycle with more than the finishing threshold left
    InUse,
    /// Running a cycle that ends within the finishing threshold
    Finishing,
    /// Reported out of order. Nothing moves a machine out of this state.
    Broken,
}

impl MachineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Available => "available",
            MachineStatus::InUse => "in-use",
            MachineStatus::Finishing => "finishing",
            MachineStatus::Broken => "broken",
        }
    }

    /// Whether a cycle is counting down
    pub fn is_running(&self) -> bool {
        matches!(self, MachineStatus::InUse | MachineStatus::Finishing)
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single washer or dryer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    #[serde(rename = "type")]
    pub kind: MachineKind,
    pub status: MachineStatus,
    /// Remaining seconds of the current cycle
    pub timer: u32,
}

impl Machine {
    pub fn new(id: MachineId, kind: MachineKind, status: MachineStatus, timer: u32) -> Self {
        Self {
            id,
            kind,
            status,
            timer,
        }
    }

    /// An idle machine with no time on the clock.
    pub fn available(id: MachineId, kind: MachineKind) -> Self {
        Self::new(id, kind, MachineStatus::Available, 0)
    }

    pub fn is_available(&self) -> bool {
        self.status == MachineStatus::Available
    }

    pub fn is_broken(&self) -> bool {
        self.status == MachineStatus::Broken
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaundryRoom {
    pub id: RoomId,
    pub name: String,
    pub machines: Vec<Machine>,
}

impl LaundryRoom {
    pub fn new(id: impl Into<RoomId>, name: impl Into<String>, machines: Vec<Machine>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            machines,
        }
    }

    pub fn machine(&self, machine_id: MachineId) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == machine_id)
    }

    /// Count machines of a kind that can be started right now
    pub fn available_count(&self, kind: MachineKind) -> usize {
        self.machines
            .iter()
            .filter(|m| m.kind == kind && m.is_available())
            .count()
    }
}

/// Read-only copy of every room, in seed order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaundrySnapshot {
    #[serde(rename = "laundryRooms")]
    pub rooms: Vec<LaundryRoom>,
}

impl LaundrySnapshot {
    pub fn room(&self, room_id: &str) -> Option<&LaundryRoom> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    pub fn machine(&self, machine_id: MachineId) -> Option<&Machine> {
        self.rooms.iter().find_map(|r| r.machine(machine_id))
    }

    pub fn machines(&self) -> impl Iterator<Item = &Machine> {
        self.rooms.iter().flat_map(|r| r.machines.iter())
    }
}
