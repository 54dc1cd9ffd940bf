//! The colony aggregate root

use serde::{Deserialize, Serialize};

use crate::city::building::{BlueprintId, Structure};
use crate::city::stockpile::{Material, Stockpile};
use crate::city::zone::{Zone, ZoneType};
use crate::core::error::{ColonyError, Result};
use crate::core::types::{
    ActorId, ColonyId, HotspotId, IdAllocator, StructureId, TaskId, WorldTime, ZoneId,
};
use crate::entity::actor::Actor;
use crate::entity::tasks::Task;
use crate::simulation::hotspot::{Hotspot, HotspotFamily};
use crate::simulation::insurance::ReservePool;
use crate::simulation::policy::{PolicyId, PolicyWeights};
use crate::simulation::threat::ThreatState;

/// All mutable colony state.
///
/// Cross references (task assignee, hotspot zone) are plain ids resolved
/// through the lookup helpers below. List order is significant: actors are
/// scheduled and trimmed in list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub colony_id: ColonyId,
    pub world_time: WorldTime,
    pub paused: bool,
    pub active_policy: PolicyId,
    pub weights: PolicyWeights,
    pub population_cap: u32,
    pub actors: Vec<Actor>,
    pub tasks: Vec<Task>,
    pub hotspots: Vec<Hotspot>,
    pub zones: Vec<Zone>,
    pub structures: Vec<Structure>,
    pub threat: ThreatState,
    pub reserve: ReservePool,
    pub stockpile: Stockpile,
    pub ids: IdAllocator,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState {
    /// An unpopulated colony with the starting stockpile
    pub fn new() -> Self {
        Self {
            colony_id: ColonyId::new(),
            world_time: 0,
            paused: false,
            active_policy: PolicyId::default(),
            weights: PolicyWeights::default(),
            population_cap: 0,
            actors: Vec::new(),
            tasks: Vec::new(),
            hotspots: Vec::new(),
            zones: Vec::new(),
            structures: Vec::new(),
            threat: ThreatState::default(),
            reserve: ReservePool::default(),
            stockpile: Stockpile::starting(),
            ids: IdAllocator::new(),
        }
    }

    pub fn population(&self) -> usize {
        self.actors.len()
    }

    pub fn actor(&self, id: ActorId) -> Result<&Actor> {
        self.actors
            .iter()
            .find(|a| a.id == id)
            .ok_or(ColonyError::ActorNotFound(id))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor> {
        self.actors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ColonyError::ActorNotFound(id))
    }

    pub fn task(&self, id: TaskId) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(ColonyError::TaskNotFound(id))
    }

    pub fn task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ColonyError::TaskNotFound(id))
    }

    pub fn hotspot(&self, id: HotspotId) -> Result<&Hotspot> {
        self.hotspots
            .iter()
            .find(|h| h.id == id)
            .ok_or(ColonyError::HotspotNotFound(id))
    }

    pub fn hotspot_mut(&mut self, id: HotspotId) -> Result<&mut Hotspot> {
        self.hotspots
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(ColonyError::HotspotNotFound(id))
    }

    pub fn structure_mut(&mut self, id: StructureId) -> Result<&mut Structure> {
        self.structures
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ColonyError::StructureNotFound(id))
    }

    pub fn non_home_zone_count(&self) -> usize {
        self.zones.iter().filter(|z| z.zone_type != ZoneType::Home).count()
    }

    pub fn family_count(&self, family: HotspotFamily) -> usize {
        self.hotspots.iter().filter(|h| h.family == family).count()
    }

    pub fn hotspots_in_zone(&self, zone: ZoneId) -> usize {
        self.hotspots.iter().filter(|h| h.zone == zone).count()
    }

    pub fn count_completed_structures(&self, blueprint: BlueprintId) -> usize {
        self.structures
            .iter()
            .filter(|s| s.complete && s.blueprint == blueprint)
            .count()
    }

    /// Hotspots above tier 1
    pub fn upgraded_hotspot_count(&self) -> usize {
        self.hotspots.iter().filter(|h| h.tier > 1).count()
    }

    /// The single active task an actor holds, if any
    pub fn active_task_index(&self, actor: ActorId) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.is_active() && t.assignee == Some(actor))
    }

    /// One-line status
    pub fn status_brief(&self) -> String {
        format!(
            "status t={}s pop={}/{} hotspots={} tasks={} raidEnemies={} policy={}",
            self.world_time,
            self.population(),
            self.population_cap,
            self.hotspots.len(),
            self.tasks.len(),
            self.threat.active_enemies,
            self.active_policy,
        )
    }

    /// Multi-line status with raid timing and stock levels
    pub fn status_verbose(&self) -> String {
        let stock = [Material::Wood, Material::Stone, Material::Fiber, Material::Food]
            .iter()
            .map(|m| format!("{}={}", m, self.stockpile.get(*m)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "status\n timeSec={}\n population={}/{}\n policy={}\n hotspots={}\n tasks={}\n raid.activeEnemies={}\n raid.nextRaidAtSec={}\n stock=[{}]",
            self.world_time,
            self.population(),
            self.population_cap,
            self.active_policy,
            self.hotspots.len(),
            self.tasks.len(),
            self.threat.active_enemies,
            self.threat.next_raid_at,
            stock,
        )
    }
}
