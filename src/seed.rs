//! Seed dataset loaded at startup.
//!
//! Two rooms with twelve machines between them. The dataset is rebuilt on
//! every call, so each engine starts from a fresh copy.

use crate::types::{LaundryRoom, Machine, MachineKind, MachineStatus};

use MachineKind::{Dryer, Washer};
use MachineStatus::{Available, Broken, Finishing, InUse};

pub const SENTINEL_HALL: &str = "sentinelHall";
pub const PIONEER_POINT: &str = "pioneerPoint";

pub fn seed_rooms() -> Vec<LaundryRoom> {
    vec![
        LaundryRoom::new(
            SENTINEL_HALL,
            "Sentinel Hall",
            vec![
                Machine::new(1, Washer, Available, 0),
                Machine::new(2, Washer, InUse, 1800),
                Machine::new(3, Washer, Broken, 0),
                Machine::new(4, Washer, Available, 0),
                Machine::new(5, Dryer, InUse, 2700),
                Machine::new(6, Dryer, Available, 0),
                Machine::new(7, Dryer, Finishing, 240),
                Machine::new(8, Dryer, Available, 0),
            ],
        ),
        LaundryRoom::new(
            PIONEER_POINT,
            "Pioneer Point",
            vec![
                Machine::new(9, Washer, Available, 0),
                Machine::new(10, Washer, Available, 0),
                Machine::new(11, Dryer, InUse, 1200),
                Machine::new(12, Dryer, Broken, 0),
            ],
        ),
    ]
}
