//! Colony zones - designated rectangles of ground

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::{ColonyError, Result};
use crate::core::types::{normalize_token, Position, ZoneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    Home,
    Hotspot,
    Farm,
    Storage,
    Defense,
}

impl FromStr for ZoneType {
    type Err = ColonyError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "HOME" => Ok(ZoneType::Home),
            "HOTSPOT" => Ok(ZoneType::Hotspot),
            "FARM" => Ok(ZoneType::Farm),
            "STORAGE" => Ok(ZoneType::Storage),
            "DEFENSE" => Ok(ZoneType::Defense),
            _ => Err(ColonyError::unknown("zone type", s)),
        }
    }
}

/// Axis-aligned zone; both bounds are inclusive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub zone_type: ZoneType,
    pub min: Position,
    pub max: Position,
}

impl Zone {
    /// Build a zone from any two opposite corners
    pub fn new(id: ZoneId, zone_type: ZoneType, a: Position, b: Position) -> Self {
        Self {
            id,
            zone_type,
            min: Position::new(a.x.min(b.x), a.z.min(b.z)),
            max: Position::new(a.x.max(b.x), a.z.max(b.z)),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.z >= self.min.z && pos.z <= self.max.z
    }
}
