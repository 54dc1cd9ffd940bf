use thiserror::Error;

use crate::city::stockpile::Material;
use crate::core::types::{ActorId, HotspotId, StructureId, TaskId, WorldTime, ZoneId};
use crate::entity::tasks::TaskStatus;
use crate::simulation::hotspot::HotspotFamily;

#[derive(Error, Debug)]
pub enum ColonyError {
    // === invalid input ===
    #[error("Unknown {kind}: {value:?}")]
    UnknownIdentifier { kind: &'static str, value: String },

    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Hotspot not found: {0}")]
    HotspotNotFound(HotspotId),

    #[error("Structure not found: {0}")]
    StructureNotFound(StructureId),

    // === business rules ===
    #[error("Hotspot placement at ({x}, {z}) requires a hotspot zone")]
    NoHotspotZone { x: i32, z: i32 },

    #[error("Family cap reached for {0}")]
    FamilyCapReached(HotspotFamily),

    #[error("Per-zone hotspot cap reached for {0}")]
    ZoneCapReached(ZoneId),

    #[error("Hotspot too close to existing site {existing} ({distance:.2}m)")]
    SpacingViolation { existing: HotspotId, distance: f64 },

    #[error("Structure {0} is already complete")]
    StructureAlreadyComplete(StructureId),

    #[error("Hotspot {0} already at max tier")]
    MaxTier(HotspotId),

    #[error("Insufficient {material}: need {needed}, have {available}")]
    InsufficientStock {
        material: Material,
        needed: u32,
        available: u32,
    },

    #[error("Task {task} is quarantined until {until}s")]
    TaskQuarantined { task: TaskId, until: WorldTime },

    #[error("Task {task} cannot {action} from status {status:?}")]
    InvalidTransition {
        task: TaskId,
        status: TaskStatus,
        action: &'static str,
    },

    // === configuration / persistence ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Save schema mismatch: expected {expected}, found {found}. Restore from a rotated backup")]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("No save file found at {0}")]
    SaveNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl ColonyError {
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownIdentifier {
            kind,
            value: value.into(),
        }
    }

    /// True for errors the caller caused by naming something that does not exist
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ColonyError::UnknownIdentifier { .. }
                | ColonyError::ActorNotFound(_)
                | ColonyError::TaskNotFound(_)
                | ColonyError::HotspotNotFound(_)
                | ColonyError::StructureNotFound(_)
        )
    }

    /// Persistence and configuration failures are not recoverable by the command layer
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ColonyError::SchemaMismatch { .. }
                | ColonyError::SaveNotFound(_)
                | ColonyError::IoError(_)
                | ColonyError::SerdeError(_)
                | ColonyError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ColonyError>;
