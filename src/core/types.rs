//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// World time in whole seconds since the colony was founded
pub type WorldTime = u64;

/// Simulation tick counter
pub type Tick = u64;

/// Identifier of a colony lineage, stamped into every save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub struct ColonyId(pub Uuid);

impl ColonyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ColonyId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display(fmt = "citizen-{}", _0)]
pub struct ActorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display(fmt = "task-{}", _0)]
pub struct TaskId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display(fmt = "hotspot-{}", _0)]
pub struct HotspotId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display(fmt = "zone-{}", _0)]
pub struct ZoneId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display(fmt = "structure-{}", _0)]
pub struct StructureId(pub u32);

/// Raids are identified by the world time they started at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display(fmt = "raid-{}", _0)]
pub struct RaidId(pub WorldTime);

/// Monotonic id source owned by the world state.
///
/// Every entity kind draws from the same counter, so ids are unique across
/// kinds and deterministic for a given command sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn peek(&self) -> u32 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer ground position (x, z); y is irrelevant to the colony core
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dz = f64::from(self.z) - f64::from(other.z);
        (dx * dx + dz * dz).sqrt()
    }
}

/// Parse helper for command-facing enums: trims, upper-cases and folds `-` into `_`
pub(crate) fn normalize_token(value: &str) -> String {
    value.trim().to_ascii_uppercase().replace('-', "_")
}
