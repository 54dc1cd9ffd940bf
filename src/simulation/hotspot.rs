//! Hotspots: tiered resource nodes with capacity, degradation and reset cycles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::city::stockpile::Material;
use crate::city::zone::ZoneType;
use crate::core::config::LimitsSection;
use crate::core::error::{ColonyError, Result};
use crate::core::types::{normalize_token, ActorId, HotspotId, Position, WorldTime, ZoneId};
use crate::simulation::events::EventSink;
use crate::world::WorldState;

pub const MAX_TIER: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HotspotFamily {
    Wood,
    Stone,
    Fiber,
    Ore,
    Crystal,
    Herbs,
}

impl HotspotFamily {
    pub const ALL: [HotspotFamily; 6] = [
        HotspotFamily::Wood,
        HotspotFamily::Stone,
        HotspotFamily::Fiber,
        HotspotFamily::Ore,
        HotspotFamily::Crystal,
        HotspotFamily::Herbs,
    ];

    /// Stockpile material credited by a harvest
    pub fn material(&self) -> Material {
        match self {
            HotspotFamily::Wood => Material::Wood,
            HotspotFamily::Stone => Material::Stone,
            HotspotFamily::Fiber => Material::Fiber,
            HotspotFamily::Ore => Material::Ore,
            HotspotFamily::Crystal => Material::Crystal,
            HotspotFamily::Herbs => Material::Herbs,
        }
    }
}

impl fmt::Display for HotspotFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.material().name())
    }
}

impl FromStr for HotspotFamily {
    type Err = ColonyError;

    fn from_str(s: &str) -> Result<Self> {
        let token = normalize_token(s);
        HotspotFamily::ALL
            .into_iter()
            .find(|f| f.material().name().eq_ignore_ascii_case(&token))
            .ok_or_else(|| ColonyError::unknown("hotspot family", s))
    }
}

/// Fixed numbers for one hotspot tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierProfile {
    pub capacity: u32,
    pub reset_seconds: WorldTime,
    pub base_yield: u32,
    pub degradation_step: f64,
    pub degradation_floor: f64,
    pub min_quality: u8,
    pub max_quality: u8,
}

const TIER_PROFILES: [TierProfile; 3] = [
    TierProfile {
        capacity: 120,
        reset_seconds: 600,
        base_yield: 6,
        degradation_step: 0.015,
        degradation_floor: 0.40,
        min_quality: 1,
        max_quality: 2,
    },
    TierProfile {
        capacity: 180,
        reset_seconds: 480,
        base_yield: 8,
        degradation_step: 0.010,
        degradation_floor: 0.40,
        min_quality: 2,
        max_quality: 3,
    },
    TierProfile {
        capacity: 260,
        reset_seconds: 360,
        base_yield: 10,
        degradation_step: 0.008,
        degradation_floor: 0.40,
        min_quality: 3,
        max_quality: 5,
    },
];

/// Profile for a tier; out-of-range tiers read as the nearest valid one
pub fn tier_profile(tier: u8) -> &'static TierProfile {
    let index = usize::from(tier.clamp(1, MAX_TIER)) - 1;
    &TIER_PROFILES[index]
}

/// Materials charged to go from `from_tier` to the next tier
pub fn upgrade_cost(from_tier: u8) -> Option<Vec<(Material, u32)>> {
    match from_tier {
        1 => Some(vec![(Material::Wood, 30), (Material::Stone, 20), (Material::Fiber, 10)]),
        2 => Some(vec![
            (Material::Wood, 50),
            (Material::Stone, 35),
            (Material::Ore, 20),
            (Material::Crystal, 10),
        ]),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestResult {
    pub yield_amount: u32,
    pub quality: u8,
}

/// A placed resource node.
///
/// `capacity_now <= capacity_max` and `degradation` stays in
/// `[profile floor, 1.0]` across every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: HotspotId,
    pub family: HotspotFamily,
    pub tier: u8,
    pub capacity_max: u32,
    pub capacity_now: u32,
    pub degradation: f64,
    pub cycle_started_at: Option<WorldTime>,
    pub reset_at: Option<WorldTime>,
    pub zone: ZoneId,
    pub position: Position,
}

impl Hotspot {
    pub fn new(id: HotspotId, family: HotspotFamily, zone: ZoneId, position: Position) -> Self {
        let profile = tier_profile(1);
        Self {
            id,
            family,
            tier: 1,
            capacity_max: profile.capacity,
            capacity_now: profile.capacity,
            degradation: 1.0,
            cycle_started_at: None,
            reset_at: None,
            zone,
            position,
        }
    }

    pub fn profile(&self) -> &'static TierProfile {
        tier_profile(self.tier)
    }

    /// Take one harvest. Returns the result and whether it opened a new cycle.
    pub fn take_harvest(&mut self, now: WorldTime, gather_skill: u8) -> (HarvestResult, bool) {
        let profile = self.profile();

        let first = self.cycle_started_at.is_none();
        if first {
            self.cycle_started_at = Some(now);
            self.reset_at = Some(now + profile.reset_seconds);
        }

        let raw = (f64::from(profile.base_yield) * self.degradation).floor() as u32;
        let yield_amount = raw.max(1);
        self.capacity_now = self.capacity_now.saturating_sub(yield_amount);
        self.degradation = (self.degradation - profile.degradation_step).max(profile.degradation_floor);

        let quality = (profile.min_quality + (gather_skill.max(1) - 1) / 4)
            .clamp(profile.min_quality, profile.max_quality);

        (HarvestResult { yield_amount, quality }, first)
    }

    /// Move up one tier, restoring a fifth of the new capacity
    fn raise_tier(&mut self) {
        self.tier += 1;
        let profile = self.profile();
        self.capacity_max = profile.capacity;
        self.capacity_now = (self.capacity_now + profile.capacity / 5).min(profile.capacity);
    }

    pub fn reset_due(&self, now: WorldTime) -> bool {
        matches!(self.reset_at, Some(at) if now >= at)
    }

    fn reset_cycle(&mut self) {
        let profile = self.profile();
        self.capacity_max = profile.capacity;
        self.capacity_now = profile.capacity;
        self.degradation = 1.0;
        self.cycle_started_at = None;
        self.reset_at = None;
    }
}

/// Validate and place a tier-1 hotspot
pub fn place_hotspot(
    world: &mut WorldState,
    limits: &LimitsSection,
    sink: &mut dyn EventSink,
    family: HotspotFamily,
    position: Position,
) -> Result<HotspotId> {
    let zone = world
        .zones
        .iter()
        .find(|z| z.zone_type == ZoneType::Hotspot && z.contains(position))
        .map(|z| z.id)
        .ok_or(ColonyError::NoHotspotZone { x: position.x, z: position.z })?;

    if world.family_count(family) >= limits.max_hotspots_per_family as usize {
        return Err(ColonyError::FamilyCapReached(family));
    }

    if world.hotspots_in_zone(zone) >= limits.hotspot_per_zone_cap as usize {
        return Err(ColonyError::ZoneCapReached(zone));
    }

    if let Some((existing, distance)) = world
        .hotspots
        .iter()
        .map(|h| (h.id, h.position.distance(&position)))
        .find(|(_, distance)| *distance < limits.hotspot_spacing_meters)
    {
        return Err(ColonyError::SpacingViolation { existing, distance });
    }

    let id = HotspotId(world.ids.next_id());
    let hotspot = Hotspot::new(id, family, zone, position);
    tracing::debug!(%id, %family, x = position.x, z = position.z, "hotspot placed");
    sink.hotspot_placed(&hotspot);
    world.hotspots.push(hotspot);
    Ok(id)
}

/// Pay the tier cost and raise the hotspot one tier. Returns the new tier.
pub fn upgrade_hotspot(world: &mut WorldState, sink: &mut dyn EventSink, id: HotspotId) -> Result<u8> {
    let from = world.hotspot(id)?.tier;
    let cost = upgrade_cost(from).ok_or(ColonyError::MaxTier(id))?;
    world.stockpile.consume_materials(&cost)?;

    let hotspot = world.hotspot_mut(id)?;
    hotspot.raise_tier();
    let to = hotspot.tier;
    tracing::debug!(%id, from, to, "hotspot upgraded");
    sink.hotspot_upgraded(hotspot, from, to);
    Ok(to)
}

/// Harvest once and credit the family's material to the stockpile
pub fn harvest(
    world: &mut WorldState,
    sink: &mut dyn EventSink,
    id: HotspotId,
    actor: ActorId,
    gather_skill: u8,
) -> Result<HarvestResult> {
    let now = world.world_time;
    let hotspot = world.hotspot_mut(id)?;
    let (result, first) = hotspot.take_harvest(now, gather_skill);
    if first {
        sink.hotspot_first_harvest(hotspot, actor);
    }
    let material = hotspot.family.material();
    sink.hotspot_harvested(hotspot, actor, result);

    world.stockpile.add(material, result.yield_amount);
    Ok(result)
}

/// Reset every hotspot whose cycle has run out
pub fn tick(world: &mut WorldState, sink: &mut dyn EventSink) {
    let now = world.world_time;
    for hotspot in world.hotspots.iter_mut().filter(|h| h.reset_due(now)) {
        hotspot.reset_cycle();
        tracing::debug!(id = %hotspot.id, "hotspot cycle reset");
        sink.hotspot_reset(hotspot);
    }
}
