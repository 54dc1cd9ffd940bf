//! Blueprints and placed structures

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::city::stockpile::Material;
use crate::core::error::{ColonyError, Result};
use crate::core::types::{normalize_token, Position, StructureId, WorldTime};

/// Buildable blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlueprintId {
    TownCore,
    House,
    Stockpile,
    Watchtower,
    FarmShed,
    Workshop,
    TrapPost,
    Infirmary,
}

impl BlueprintId {
    pub const ALL: [BlueprintId; 8] = [
        BlueprintId::TownCore,
        BlueprintId::House,
        BlueprintId::Stockpile,
        BlueprintId::Watchtower,
        BlueprintId::FarmShed,
        BlueprintId::Workshop,
        BlueprintId::TrapPost,
        BlueprintId::Infirmary,
    ];

    /// Seconds of world time from placement to completion
    pub fn build_time(&self) -> WorldTime {
        match self {
            BlueprintId::TownCore => 0,
            BlueprintId::House => 90,
            BlueprintId::Stockpile => 120,
            BlueprintId::Watchtower => 110,
            BlueprintId::FarmShed => 95,
            BlueprintId::Workshop => 140,
            BlueprintId::TrapPost => 70,
            BlueprintId::Infirmary => 130,
        }
    }

    /// Materials required to place this blueprint
    pub fn cost(&self) -> Vec<(Material, u32)> {
        match self {
            BlueprintId::TownCore => vec![],
            BlueprintId::House => vec![(Material::Wood, 35), (Material::Stone, 20), (Material::Fiber, 10)],
            BlueprintId::Stockpile => vec![(Material::Wood, 45), (Material::Stone, 30), (Material::Fiber, 15)],
            BlueprintId::Watchtower => vec![(Material::Wood, 30), (Material::Stone, 40), (Material::Fiber, 5)],
            BlueprintId::FarmShed => vec![(Material::Wood, 30), (Material::Stone, 15), (Material::Fiber, 20)],
            BlueprintId::Workshop => vec![(Material::Wood, 60), (Material::Stone, 45), (Material::Ore, 20)],
            BlueprintId::TrapPost => vec![(Material::Wood, 20), (Material::Stone, 20), (Material::Fiber, 10)],
            BlueprintId::Infirmary => vec![(Material::Wood, 50), (Material::Stone, 35), (Material::Herbs, 15)],
        }
    }

    /// Housing added once complete
    pub fn housing_capacity(&self) -> u32 {
        match self {
            BlueprintId::House => 2,
            _ => 0,
        }
    }
}

impl FromStr for BlueprintId {
    type Err = ColonyError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "TOWN_CORE" => Ok(BlueprintId::TownCore),
            "HOUSE" => Ok(BlueprintId::House),
            "STOCKPILE" => Ok(BlueprintId::Stockpile),
            "WATCHTOWER" => Ok(BlueprintId::Watchtower),
            "FARM_SHED" => Ok(BlueprintId::FarmShed),
            "WORKSHOP" => Ok(BlueprintId::Workshop),
            "TRAP_POST" => Ok(BlueprintId::TrapPost),
            "INFIRMARY" => Ok(BlueprintId::Infirmary),
            _ => Err(ColonyError::unknown("blueprint", s)),
        }
    }
}

/// A blueprint placed in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub id: StructureId,
    pub blueprint: BlueprintId,
    pub position: Position,
    /// Degrees in [0, 360)
    pub rotation: u16,
    pub complete: bool,
    pub started_at: WorldTime,
    pub completes_at: WorldTime,
}

impl Structure {
    pub fn new(id: StructureId, blueprint: BlueprintId, position: Position, rotation: i32, now: WorldTime) -> Self {
        let build_time = blueprint.build_time();
        Self {
            id,
            blueprint,
            position,
            rotation: rotation.rem_euclid(360) as u16,
            complete: build_time == 0,
            started_at: now,
            completes_at: now + build_time,
        }
    }

    /// A structure that already stands, e.g. from colony bootstrap
    pub fn prebuilt(id: StructureId, blueprint: BlueprintId, position: Position) -> Self {
        let mut structure = Self::new(id, blueprint, position, 0, 0);
        structure.completes_at = 0;
        structure.complete = true;
        structure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let s = Structure::new(StructureId(1), BlueprintId::House, Position::new(0, 0), -90, 10);
        assert_eq!(s.rotation, 270);
        let s = Structure::new(StructureId(2), BlueprintId::House, Position::new(0, 0), 720, 10);
        assert_eq!(s.rotation, 0);
    }

    #[test]
    fn test_instant_blueprints_complete_on_placement() {
        let core = Structure::new(StructureId(1), BlueprintId::TownCore, Position::new(0, 0), 0, 5);
        assert!(core.complete);

        let house = Structure::new(StructureId(2), BlueprintId::House, Position::new(0, 0), 0, 5);
        assert!(!house.complete);
        assert_eq!(house.completes_at, 95);
    }

    #[test]
    fn test_parse_blueprint() {
        assert_eq!("town-core".parse::<BlueprintId>().unwrap(), BlueprintId::TownCore);
        assert_eq!("Farm_Shed".parse::<BlueprintId>().unwrap(), BlueprintId::FarmShed);
        assert!("castle".parse::<BlueprintId>().is_err());
    }

    #[test]
    fn test_every_blueprint_but_core_has_a_cost() {
        for blueprint in BlueprintId::ALL {
            if blueprint == BlueprintId::TownCore {
                assert!(blueprint.cost().is_empty());
            } else {
                assert!(!blueprint.cost().is_empty(), "{:?} should cost materials", blueprint);
            }
        }
    }
}
