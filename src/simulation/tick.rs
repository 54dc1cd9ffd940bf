//! Simulation engine - orchestrates one fixed-rate tick
//!
//! Per tick:
//! 1. Advance world time (`tick_count / tick_hz`)
//! 2. Pre-tick notify; a paused engine stops here after post-tick notify
//! 3. Drain deferred actions (FIFO)
//! 4. Recompute the population cap, trimming excess colonists
//! 5. Task broker assignment
//! 6. Hotspot cycle resets
//! 7. Threat director (raids open a crisis with an emergency defend task)
//! 8. Autosave when due
//! 9. Post-tick notify
//!
//! Commands outside the tick are direct calls on the engine; `&mut self`
//! keeps them serialized with the tick.

use crate::city::building::{BlueprintId, Structure};
use crate::city::progression::{current_stage, Milestones, UnlockStage};
use crate::city::zone::{Zone, ZoneType};
use crate::core::config::SimulationConfig;
use crate::core::error::{ColonyError, Result};
use crate::core::types::{ActorId, HotspotId, Position, RaidId, StructureId, TaskId, Tick, WorldTime, ZoneId};
use crate::entity::actor::{Actor, Role};
use crate::entity::skills::{BUILD_XP, GATHER_XP, GUARD_TAKEDOWN_XP};
use crate::entity::tasks::{TaskStatus, TaskTarget, TaskType};
use crate::persistence::{ColonySnapshot, MemorySaveStore, SaveStore};
use crate::simulation::deferred::{DeferredQueue, DeferredSender};
use crate::simulation::events::{EventSink, NullSink, TickContext};
use crate::simulation::hotspot::{self, HarvestResult, HotspotFamily};
use crate::simulation::policy::PolicyId;
use crate::simulation::threat::{self, RaidScaling};
use crate::simulation::{insurance, population, task_broker};
use crate::world::WorldState;

/// Base priority of the defend task a raid opens
pub const CRISIS_PRIORITY: f64 = 2.0;

/// Base priority of the build task a placed blueprint opens
pub const BUILD_PRIORITY: f64 = 1.0;

pub struct SimulationEngine<S: EventSink = NullSink> {
    world: WorldState,
    config: SimulationConfig,
    sink: S,
    deferred: DeferredQueue<SimulationEngine<S>>,
    store: Box<dyn SaveStore>,
    tick_count: Tick,
    last_autosave_at: WorldTime,
}

impl SimulationEngine<NullSink> {
    /// A bootstrapped colony that discards notifications
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_sink(config, NullSink)
    }
}

impl<S: EventSink> SimulationEngine<S> {
    /// Validate the config and bootstrap a new colony
    pub fn with_sink(config: SimulationConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let mut engine = Self {
            world: WorldState::new(),
            config,
            sink,
            deferred: DeferredQueue::new(),
            store: Box::new(MemorySaveStore::new()),
            tick_count: 0,
            last_autosave_at: 0,
        };
        engine.bootstrap();
        Ok(engine)
    }

    /// Replace the save backend
    pub fn with_store(mut self, store: Box<dyn SaveStore>) -> Self {
        self.store = store;
        self
    }

    fn bootstrap(&mut self) {
        for _ in 0..self.config.sim.starting_citizens {
            let id = ActorId(self.world.ids.next_id());
            self.world.actors.push(Actor::new(id, Role::Builder));
        }

        let core = StructureId(self.world.ids.next_id());
        self.world
            .structures
            .push(Structure::prebuilt(core, BlueprintId::TownCore, Position::new(0, 0)));
        let house = StructureId(self.world.ids.next_id());
        self.world
            .structures
            .push(Structure::prebuilt(house, BlueprintId::House, Position::new(6, 0)));

        population::refresh_population_cap(&mut self.world, &self.config.limits);
        tracing::info!(
            colony = %self.world.colony_id,
            citizens = self.world.population(),
            cap = self.world.population_cap,
            "colony bootstrapped"
        );
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn tick_count(&self) -> Tick {
        self.tick_count
    }

    /// Run one tick. Only a failed autosave makes this return an error.
    pub fn tick(&mut self) -> Result<()> {
        self.tick_count += 1;
        self.world.world_time = self.tick_count / u64::from(self.config.sim.tick_hz);
        let ctx = TickContext {
            tick: self.tick_count,
            world_time: self.world.world_time,
            paused: self.world.paused,
        };
        self.sink.pre_tick(ctx);

        if self.world.paused {
            self.sink.post_tick(ctx);
            return Ok(());
        }

        self.drain_deferred();
        population::refresh_population_cap(&mut self.world, &self.config.limits);
        task_broker::assign(&mut self.world, &self.config.tasks, &mut self.sink);
        hotspot::tick(&mut self.world, &mut self.sink);
        if let Some(raid) = threat::tick(
            &mut self.world,
            &self.config.threat,
            &self.config.limits,
            &mut self.sink,
        ) {
            self.open_crisis(raid);
        }

        self.maybe_autosave()?;
        self.sink.post_tick(ctx);
        Ok(())
    }

    fn drain_deferred(&mut self) {
        for action in self.deferred.drain() {
            if let Err(err) = action(self) {
                tracing::warn!(%err, "deferred action rejected");
            }
        }
    }

    fn maybe_autosave(&mut self) -> Result<()> {
        if !self.config.sim.autosave {
            return Ok(());
        }
        if self.world.world_time.saturating_sub(self.last_autosave_at) >= self.config.sim.autosave_seconds {
            self.save_now()?;
        }
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.world.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.world.paused
    }

    /// Run `action` at the start of the next unpaused tick
    pub fn queue_deferred(&self, action: impl FnOnce(&mut Self) -> Result<()> + Send + 'static) {
        self.deferred.push(Box::new(action));
    }

    /// Enqueue handle usable from other threads
    pub fn deferred_sender(&self) -> DeferredSender<Self> {
        self.deferred.sender()
    }

    pub fn create_zone(&mut self, zone_type: ZoneType, a: Position, b: Position) -> ZoneId {
        let id = ZoneId(self.world.ids.next_id());
        self.world.zones.push(Zone::new(id, zone_type, a, b));
        tracing::debug!(%id, ?zone_type, "zone created");
        id
    }

    /// Remove a zone. Hotspots inside it stay where they are.
    pub fn clear_zone(&mut self, id: ZoneId) -> bool {
        let before = self.world.zones.len();
        self.world.zones.retain(|z| z.id != id);
        before != self.world.zones.len()
    }

    pub fn place_hotspot(&mut self, family: HotspotFamily, x: i32, z: i32) -> Result<HotspotId> {
        hotspot::place_hotspot(
            &mut self.world,
            &self.config.limits,
            &mut self.sink,
            family,
            Position::new(x, z),
        )
    }

    pub fn upgrade_hotspot(&mut self, id: HotspotId) -> Result<u8> {
        hotspot::upgrade_hotspot(&mut self.world, &mut self.sink, id)
    }

    /// Harvest with the actor's gatherer skill, then credit gatherer XP
    pub fn harvest(&mut self, id: HotspotId, actor: ActorId) -> Result<HarvestResult> {
        let skill = self.world.actor(actor)?.skill(Role::Gatherer);
        let result = hotspot::harvest(&mut self.world, &mut self.sink, id, actor, skill)?;
        self.grant_xp(actor, Role::Gatherer, GATHER_XP);
        Ok(result)
    }

    pub fn create_task(&mut self, task_type: TaskType, target: TaskTarget, base_priority: f64, emergency: bool) -> TaskId {
        task_broker::create_task(&mut self.world, &mut self.sink, task_type, target, base_priority, emergency)
    }

    pub fn start_task(&mut self, id: TaskId) -> Result<()> {
        task_broker::start_task(&mut self.world, id)
    }

    /// Mark a task done and credit the actor with the task type's XP
    pub fn complete_task(&mut self, id: TaskId, actor: ActorId) -> Result<()> {
        self.world.actor(actor)?;
        task_broker::complete_task(&mut self.world, &mut self.sink, id, actor)?;
        if let Some((role, amount)) = self.world.task(id)?.task_type.experience_reward() {
            self.grant_xp(actor, role, amount);
        }
        Ok(())
    }

    /// Returns true when the task just failed into quarantine
    pub fn report_path_failure(&mut self, id: TaskId) -> Result<bool> {
        task_broker::mark_path_failure(&mut self.world, &self.config.tasks, &mut self.sink, id)
    }

    pub fn requeue_task(&mut self, id: TaskId) -> Result<()> {
        task_broker::requeue_task(&mut self.world, id)
    }

    pub fn apply_policy(&mut self, policy: PolicyId) {
        let from = self.world.active_policy;
        self.world.active_policy = policy;
        self.world.weights = policy.weights();
        self.sink.policy_changed(from, policy);
    }

    /// Override one weight of the active table; negative values clamp to 0
    pub fn set_priority(&mut self, task_type: TaskType, weight: f64) {
        self.world.weights.set(task_type, weight);
    }

    /// Pay for a blueprint and place it. Anything that takes time to build
    /// also gets a build task.
    pub fn place_blueprint(&mut self, blueprint: BlueprintId, x: i32, z: i32, rotation: i32) -> Result<StructureId> {
        self.world.stockpile.consume_materials(&blueprint.cost())?;

        let id = StructureId(self.world.ids.next_id());
        let structure = Structure::new(id, blueprint, Position::new(x, z), rotation, self.world.world_time);
        let complete = structure.complete;
        self.world.structures.push(structure);
        tracing::debug!(%id, ?blueprint, x, z, "blueprint placed");

        if !complete {
            self.create_task(TaskType::Build, TaskTarget::Structure(id), BUILD_PRIORITY, false);
        }
        Ok(id)
    }

    /// Finish a structure, closing its open build tasks
    pub fn complete_structure(&mut self, id: StructureId, actor: ActorId) -> Result<()> {
        self.world.actor(actor)?;
        let structure = self.world.structure_mut(id)?;
        if structure.complete {
            return Err(ColonyError::StructureAlreadyComplete(id));
        }
        structure.complete = true;

        // Credit whoever held the build reservation
        let target = TaskTarget::Structure(id);
        let open: Vec<(TaskId, Option<ActorId>)> = self
            .world
            .tasks
            .iter()
            .filter(|t| t.task_type == TaskType::Build && t.target == target && t.is_open())
            .map(|t| (t.id, t.assignee))
            .collect();
        for (task, assignee) in open {
            task_broker::complete_task(&mut self.world, &mut self.sink, task, assignee.unwrap_or(actor))?;
        }

        self.grant_xp(actor, Role::Builder, BUILD_XP);
        Ok(())
    }

    fn open_crisis(&mut self, raid: RaidId) {
        self.sink.crisis_started(raid);
        self.create_task(TaskType::Defend, TaskTarget::Raid(raid), CRISIS_PRIORITY, true);
    }

    /// End the active raid and its crisis. `None` when no raid was active.
    pub fn resolve_raid(&mut self, success: bool) -> Option<RaidId> {
        let raid = threat::resolve_raid(&mut self.world, &mut self.sink, success)?;
        self.sink.crisis_ended(raid, success);

        let target = TaskTarget::Raid(raid);
        let defenders: Vec<(TaskId, Option<ActorId>)> = self
            .world
            .tasks
            .iter()
            .filter(|t| t.task_type == TaskType::Defend && t.target == target && t.is_open())
            .map(|t| (t.id, t.assignee))
            .collect();
        for (task, assignee) in defenders {
            match assignee {
                Some(actor) => {
                    if task_broker::complete_task(&mut self.world, &mut self.sink, task, actor).is_ok() && success {
                        self.grant_xp(actor, Role::Guard, GUARD_TAKEDOWN_XP);
                    }
                }
                // nobody answered the call; close it quietly
                None => {
                    if let Ok(t) = self.world.task_mut(task) {
                        t.status = TaskStatus::Done;
                    }
                }
            }
        }
        Some(raid)
    }

    pub fn handle_actor_death(&mut self, actor: ActorId, cause: &str) -> Result<ActorId> {
        insurance::handle_death(&mut self.world, &self.config.insurance, &mut self.sink, actor, cause)
    }

    pub fn fund_reserve(&mut self, points: i64) {
        self.world.reserve.fund(points);
    }

    pub fn unlock_stage(&self) -> UnlockStage {
        current_stage(Milestones {
            population: self.world.population() as u32,
            watchtowers: self.world.count_completed_structures(BlueprintId::Watchtower) as u32,
            upgraded_hotspots: self.world.upgraded_hotspot_count() as u32,
            raids_survived: self.world.threat.raids_survived,
        })
    }

    pub fn raid_scaling(&self) -> RaidScaling {
        threat::raid_scaling(self.world.threat.threat_score)
    }

    pub fn status(&self, verbose: bool) -> String {
        if verbose {
            self.world.status_verbose()
        } else {
            self.world.status_brief()
        }
    }

    pub fn save_now(&mut self) -> Result<()> {
        let snapshot = ColonySnapshot::capture(&self.world, self.tick_count);
        self.store.save(&snapshot)?;
        self.last_autosave_at = self.world.world_time;
        Ok(())
    }

    /// Replace the world with the stored snapshot
    pub fn load(&mut self) -> Result<()> {
        let snapshot = self.store.load()?;
        self.world = snapshot.world;
        self.tick_count = snapshot.tick;
        self.last_autosave_at = self.world.world_time;
        tracing::info!(colony = %self.world.colony_id, tick = self.tick_count, "colony loaded");
        Ok(())
    }

    fn grant_xp(&mut self, actor: ActorId, role: Role, amount: u32) {
        if let Ok(a) = self.world.actor_mut(actor) {
            if let Some(level) = a.grant_experience(role, amount) {
                tracing::info!(%actor, %role, level, "skill level up");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::events::{ColonyEvent, RecordingSink};

    fn engine() -> SimulationEngine<RecordingSink> {
        SimulationEngine::with_sink(SimulationConfig::default(), RecordingSink::new()).unwrap()
    }

    fn run_seconds<S: EventSink>(engine: &mut SimulationEngine<S>, seconds: u64) {
        for _ in 0..seconds * u64::from(engine.config().sim.tick_hz) {
            engine.tick().unwrap();
        }
    }

    #[test]
    fn test_bootstrap() {
        let engine = engine();
        let world = engine.world();
        assert_eq!(world.population(), 2);
        assert_eq!(world.actors[0].id.to_string(), "citizen-1");
        assert!(world.actors.iter().all(|a| a.role == Role::Builder));
        assert_eq!(world.structures.len(), 2);
        assert!(world.structures.iter().all(|s| s.complete));
        assert_eq!(world.population_cap, 4);
    }

    #[test]
    fn test_world_time_advances_at_tick_rate() {
        let mut engine = engine();
        for _ in 0..4 {
            engine.tick().unwrap();
        }
        assert_eq!(engine.world().world_time, 0);
        engine.tick().unwrap();
        assert_eq!(engine.world().world_time, 1);
    }

    #[test]
    fn test_paused_tick_skips_subsystems_and_deferred() {
        let mut engine = engine();
        engine.set_paused(true);
        engine.queue_deferred(|e: &mut SimulationEngine<RecordingSink>| {
            e.fund_reserve(7);
            Ok(())
        });
        engine.tick().unwrap();
        assert_eq!(engine.world().reserve.balance, 0);
        assert_eq!(engine.world().threat.next_raid_at, 0);

        engine.set_paused(false);
        engine.tick().unwrap();
        assert_eq!(engine.world().reserve.balance, 7);
        assert_eq!(engine.world().threat.next_raid_at, 1800);
    }

    #[test]
    fn test_failed_deferred_action_does_not_stop_tick() {
        let mut engine = engine();
        engine.queue_deferred(|e: &mut SimulationEngine<RecordingSink>| {
            e.upgrade_hotspot(HotspotId(404)).map(|_| ())
        });
        engine.queue_deferred(|e: &mut SimulationEngine<RecordingSink>| {
            e.fund_reserve(1);
            Ok(())
        });
        engine.tick().unwrap();
        assert_eq!(engine.world().reserve.balance, 1);
    }

    #[test]
    fn test_place_blueprint_debits_and_creates_build_task() {
        let mut engine = engine();
        let id = engine.place_blueprint(BlueprintId::House, 12, 0, 450).unwrap();
        let world = engine.world();
        assert_eq!(world.stockpile.get(crate::city::stockpile::Material::Wood), 65);
        let structure = world.structures.iter().find(|s| s.id == id).unwrap();
        assert_eq!(structure.rotation, 90);
        assert!(!structure.complete);
        let task = world.tasks.last().unwrap();
        assert_eq!(task.task_type, TaskType::Build);
        assert_eq!(task.target, TaskTarget::Structure(id));
        assert_eq!(task.base_priority(), 1.0);
    }

    #[test]
    fn test_place_blueprint_without_stock_changes_nothing() {
        let mut engine = engine();
        assert!(engine.place_blueprint(BlueprintId::Workshop, 0, 0, 0).is_err());
        assert_eq!(engine.world().structures.len(), 2);
        assert!(engine.world().tasks.is_empty());
        assert_eq!(engine.world().stockpile.get(crate::city::stockpile::Material::Wood), 100);
    }

    #[test]
    fn test_complete_structure_closes_build_task_and_grants_xp() {
        let mut engine = engine();
        let builder = engine.world().actors[0].id;
        let id = engine.place_blueprint(BlueprintId::House, 12, 0, 0).unwrap();
        engine.complete_structure(id, builder).unwrap();

        let world = engine.world();
        assert!(world.tasks.iter().all(|t| t.status == TaskStatus::Done));
        assert_eq!(world.actor(builder).unwrap().experience(Role::Builder), BUILD_XP);
        assert_eq!(crate::simulation::population::housing_capacity(world), 6);
    }

    #[test]
    fn test_complete_structure_twice_is_rejected() {
        let mut engine = engine();
        let builder = engine.world().actors[0].id;
        let id = engine.place_blueprint(BlueprintId::House, 12, 0, 0).unwrap();
        engine.complete_structure(id, builder).unwrap();

        let err = engine.complete_structure(id, builder).unwrap_err();
        assert!(matches!(err, ColonyError::StructureAlreadyComplete(s) if s == id));
        assert!(!err.is_invalid_input());
        assert_eq!(engine.world().actor(builder).unwrap().experience(Role::Builder), BUILD_XP);

        let town_core = engine.world().structures[0].id;
        assert!(engine.complete_structure(town_core, builder).is_err());
        assert_eq!(engine.world().actor(builder).unwrap().experience(Role::Builder), BUILD_XP);
    }

    #[test]
    fn test_build_task_credited_to_its_holder() {
        let mut engine = engine();
        let holder = engine.world().actors[0].id;
        let other = engine.world().actors[1].id;
        let id = engine.place_blueprint(BlueprintId::House, 12, 0, 0).unwrap();
        engine.tick().unwrap();
        let build = engine.world().tasks[0].id;
        assert_eq!(engine.world().tasks[0].assignee, Some(holder));

        engine.complete_structure(id, other).unwrap();
        assert!(engine
            .sink()
            .events()
            .contains(&ColonyEvent::TaskCompleted { task: build, actor: holder }));
    }

    #[test]
    fn test_assignment_follows_policy_in_force_at_tick() {
        let mut engine = engine();
        engine.world_mut().actors.truncate(1);
        engine.apply_policy(PolicyId::Fortify);
        let defend = engine.create_task(TaskType::Defend, TaskTarget::None, 1.0, false);
        let farm = engine.create_task(TaskType::Farm, TaskTarget::None, 1.0, false);

        engine.apply_policy(PolicyId::HarvestRush);
        engine.tick().unwrap();

        let world = engine.world();
        assert_eq!(world.task(farm).unwrap().status, TaskStatus::Reserved);
        assert_eq!(world.task(farm).unwrap().assignee, Some(world.actors[0].id));
        assert_eq!(world.task(defend).unwrap().status, TaskStatus::Queued);
    }

    #[test]
    fn test_apply_policy_notifies() {
        let mut engine = engine();
        engine.apply_policy(PolicyId::Fortify);
        assert_eq!(engine.world().active_policy, PolicyId::Fortify);
        assert_eq!(engine.world().weights.get(TaskType::Defend), 1.5);
        assert_eq!(
            engine.sink().events(),
            &[ColonyEvent::PolicyChanged { from: PolicyId::Recovery, to: PolicyId::Fortify }]
        );

        engine.set_priority(TaskType::Defend, -1.0);
        assert_eq!(engine.world().weights.get(TaskType::Defend), 0.0);
    }

    #[test]
    fn test_first_raid_after_grace_opens_crisis() {
        let mut engine = engine();
        run_seconds(&mut engine, 1800);

        let world = engine.world();
        assert_eq!(world.threat.active_enemies, 1);
        assert_eq!(world.threat.next_raid_at, 1800 + 900);
        let raid = RaidId(1800);
        assert!(engine.sink().events().contains(&ColonyEvent::CrisisStarted { raid }));
        let defend = world.tasks.iter().find(|t| t.target == TaskTarget::Raid(raid)).unwrap();
        assert!(defend.emergency);
        assert_eq!(defend.task_type, TaskType::Defend);
    }

    #[test]
    fn test_resolve_raid_closes_crisis() {
        let mut engine = engine();
        assert_eq!(engine.resolve_raid(true), None);

        run_seconds(&mut engine, 1800);
        let raid = engine.resolve_raid(true).unwrap();
        assert_eq!(engine.world().threat.raids_survived, 1);
        assert!(engine.sink().events().contains(&ColonyEvent::CrisisEnded { raid, success: true }));
        assert!(engine
            .world()
            .tasks
            .iter()
            .filter(|t| t.target == TaskTarget::Raid(raid))
            .all(|t| t.status == TaskStatus::Done));
        assert_eq!(engine.resolve_raid(true), None);
        assert_eq!(engine.world().threat.raids_survived, 1);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let mut engine = engine();
        assert!(engine.harvest(HotspotId(77), ActorId(1)).unwrap_err().is_invalid_input());
        assert!(engine.handle_actor_death(ActorId(77), "fall").unwrap_err().is_invalid_input());
        assert!(engine.complete_structure(StructureId(77), ActorId(1)).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_status_line() {
        let engine = engine();
        assert_eq!(
            engine.status(false),
            "status t=0s pop=2/4 hotspots=0 tasks=0 raidEnemies=0 policy=RECOVERY"
        );
        assert!(engine.status(true).starts_with("status\n timeSec=0\n"));
    }

    #[test]
    fn test_unlock_stage_starts_at_one() {
        assert_eq!(engine().unlock_stage(), UnlockStage::Stage1);
    }
}
