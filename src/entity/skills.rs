//! Experience thresholds and per-activity rewards

/// Cumulative XP needed to reach level 2, 3, ... 10
pub const XP_THRESHOLDS: [u32; 9] = [100, 250, 450, 700, 1000, 1350, 1750, 2200, 2700];

pub const MIN_SKILL: u8 = 1;
pub const MAX_SKILL: u8 = 10;

pub const BUILD_XP: u32 = 8;
pub const FARM_XP: u32 = 6;
pub const GATHER_XP: u32 = 5;
pub const HAUL_XP: u32 = 4;
pub const GUARD_TAKEDOWN_XP: u32 = 10;
pub const GUARD_PATROL_XP: u32 = 4;

/// Skill level implied by an experience total
pub fn level_for(experience: u32) -> u8 {
    let passed = XP_THRESHOLDS.iter().take_while(|&&t| experience >= t).count() as u8;
    (MIN_SKILL + passed).min(MAX_SKILL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
        assert_eq!(level_for(449), 3);
        assert_eq!(level_for(2700), 10);
        assert_eq!(level_for(u32::MAX), 10);
    }
}
