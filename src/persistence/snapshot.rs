//! Versioned save snapshot

use serde::{Deserialize, Serialize};

use crate::core::error::{ColonyError, Result};
use crate::core::types::Tick;
use crate::world::WorldState;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonySnapshot {
    pub schema_version: u32,
    pub tick: Tick,
    pub world: WorldState,
}

impl ColonySnapshot {
    pub fn capture(world: &WorldState, tick: Tick) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            tick,
            world: world.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a save, refusing any other schema version.
    ///
    /// The version is read before the body so an old or future layout
    /// reports a mismatch rather than a field error.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let found = value
            .get("schema_version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0) as u32;
        if found != SCHEMA_VERSION {
            return Err(ColonyError::SchemaMismatch { expected: SCHEMA_VERSION, found });
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_is_fatal() {
        let json = r#"{ "schema_version": 2, "tick": 0, "world": {} }"#;
        let err = ColonySnapshot::from_json(json).unwrap_err();
        assert!(matches!(err, ColonyError::SchemaMismatch { expected: 1, found: 2 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_version_reads_as_zero() {
        let err = ColonySnapshot::from_json("{}").unwrap_err();
        assert!(matches!(err, ColonyError::SchemaMismatch { found: 0, .. }));
    }

    #[test]
    fn test_snapshot_keeps_colony_identity() {
        let world = WorldState::new();
        let json = ColonySnapshot::capture(&world, 25).to_json().unwrap();
        let restored = ColonySnapshot::from_json(&json).unwrap();
        assert_eq!(restored.tick, 25);
        assert_eq!(restored.world.colony_id, world.colony_id);
    }
}
