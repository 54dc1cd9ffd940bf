//! Unlock stages gate the colony's tech progression

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnlockStage {
    Stage1,
    Stage2,
    Stage3,
}

/// Colony milestones the stage gate looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Milestones {
    pub population: u32,
    pub watchtowers: u32,
    pub upgraded_hotspots: u32,
    pub raids_survived: u32,
}

/// Evaluate the highest stage whose gate the milestones pass
pub fn current_stage(m: Milestones) -> UnlockStage {
    if m.population >= 5 && m.raids_survived >= 3 && m.upgraded_hotspots >= 4 {
        return UnlockStage::Stage3;
    }
    if m.population >= 3 && m.watchtowers >= 1 && m.upgraded_hotspots >= 2 {
        return UnlockStage::Stage2;
    }
    UnlockStage::Stage1
}
