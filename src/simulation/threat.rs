//! Threat director: scheduled and reactive raids, one at a time

use serde::{Deserialize, Serialize};

use crate::core::config::{LimitsSection, ThreatSection};
use crate::core::types::{RaidId, WorldTime};
use crate::simulation::events::EventSink;
use crate::world::WorldState;

pub const MAX_RAID_TIER: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatState {
    /// 0 until the first raid has been scheduled
    pub next_raid_at: WorldTime,
    pub threat_score: u32,
    pub active_enemies: u32,
    pub raids_survived: u32,
    pub last_raid_at: WorldTime,
    pub threat_at_last_raid: u32,
}

impl ThreatState {
    pub fn raid_active(&self) -> bool {
        self.active_enemies > 0
    }

    /// Raids are named after the time they started
    pub fn current_raid(&self) -> RaidId {
        RaidId(self.last_raid_at)
    }
}

/// Combat scaling derived from the threat score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaidScaling {
    pub tier: u32,
    pub health_multiplier: f64,
    pub damage_multiplier: f64,
}

pub fn raid_tier(threat_score: u32) -> u32 {
    (1 + threat_score / 18).clamp(1, MAX_RAID_TIER)
}

pub fn health_multiplier(tier: u32) -> f64 {
    1.0 + 0.25 * f64::from(tier.clamp(1, MAX_RAID_TIER) - 1)
}

pub fn damage_multiplier(tier: u32) -> f64 {
    1.0 + 0.15 * f64::from(tier.clamp(1, MAX_RAID_TIER) - 1)
}

pub fn raid_scaling(threat_score: u32) -> RaidScaling {
    let tier = raid_tier(threat_score);
    RaidScaling {
        tier,
        health_multiplier: health_multiplier(tier),
        damage_multiplier: damage_multiplier(tier),
    }
}

/// Recompute threat and start a raid when either trigger fires.
///
/// Returns the id of the raid started this tick, if any.
pub fn tick(
    world: &mut WorldState,
    cfg: &ThreatSection,
    limits: &LimitsSection,
    sink: &mut dyn EventSink,
) -> Option<RaidId> {
    let now = world.world_time;
    let threat_score = world.population() as u32 * 4 + world.non_home_zone_count() as u32 * 6;
    let threat = &mut world.threat;
    threat.threat_score = threat_score;

    if threat.next_raid_at == 0 {
        threat.next_raid_at = now + cfg.grace_seconds;
        tracing::debug!(at = threat.next_raid_at, "first raid scheduled");
        sink.raid_scheduled(threat.next_raid_at);
        return None;
    }

    let scheduled_due = now >= threat.next_raid_at;
    let triggered_due = threat_score.saturating_sub(threat.threat_at_last_raid) >= cfg.trigger_threat_delta
        && now.saturating_sub(threat.last_raid_at) >= cfg.trigger_cooldown_seconds
        && now >= cfg.grace_seconds;

    if !(scheduled_due || triggered_due) || threat.active_enemies >= limits.max_active_raid_enemies {
        return None;
    }

    threat.active_enemies = limits.max_active_raid_enemies;
    threat.last_raid_at = now;
    threat.threat_at_last_raid = threat_score;
    threat.next_raid_at = now + cfg.base_interval_seconds;

    let raid = threat.current_raid();
    tracing::info!(%raid, threat_score, scheduled_due, triggered_due, "raid started");
    sink.raid_started(raid, threat_score);
    sink.raid_scheduled(threat.next_raid_at);
    Some(raid)
}

/// End the active raid. No-op (returns `None`) when nothing is active.
pub fn resolve_raid(world: &mut WorldState, sink: &mut dyn EventSink, success: bool) -> Option<RaidId> {
    let threat = &mut world.threat;
    if !threat.raid_active() {
        return None;
    }
    threat.active_enemies = 0;
    if success {
        threat.raids_survived += 1;
    }
    let raid = threat.current_raid();
    tracing::info!(%raid, success, survived = threat.raids_survived, "raid resolved");
    sink.raid_ended(raid, success);
    Some(raid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::events::{ColonyEvent, NullSink, RecordingSink};

    #[test]
    fn test_resolve_without_raid_is_noop() {
        let mut world = WorldState::new();
        let mut sink = RecordingSink::new();
        assert_eq!(resolve_raid(&mut world, &mut sink, true), None);
        assert_eq!(world.threat.raids_survived, 0);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_no_raid_while_at_enemy_limit() {
        let mut world = WorldState::new();
        let cfg = ThreatSection::default();
        let limits = LimitsSection::default();
        tick(&mut world, &cfg, &limits, &mut NullSink);

        world.world_time = 1800;
        world.threat.active_enemies = limits.max_active_raid_enemies;
        assert_eq!(tick(&mut world, &cfg, &limits, &mut NullSink), None);
        assert_eq!(world.threat.next_raid_at, 1800);

        world.threat.active_enemies = 0;
        let mut sink = RecordingSink::new();
        assert_eq!(tick(&mut world, &cfg, &limits, &mut sink), Some(RaidId(1800)));
        assert_eq!(
            sink.events(),
            &[
                ColonyEvent::RaidStarted { raid: RaidId(1800), threat_score: 0 },
                ColonyEvent::RaidScheduled { at: 2700 },
            ]
        );
    }

    #[test]
    fn test_raid_tier_bounds() {
        assert_eq!(raid_tier(0), 1);
        assert_eq!(raid_tier(17), 1);
        assert_eq!(raid_tier(18), 2);
        assert_eq!(raid_tier(1000), 5);
    }

    #[test]
    fn test_multipliers() {
        let scaling = raid_scaling(36);
        assert_eq!(scaling.tier, 3);
        assert!((scaling.health_multiplier - 1.5).abs() < 1e-9);
        assert!((scaling.damage_multiplier - 1.3).abs() < 1e-9);
        assert!((health_multiplier(0) - 1.0).abs() < 1e-9);
        assert!((damage_multiplier(9) - 1.6).abs() < 1e-9);
    }
}
