//! Lifecycle notifications emitted by the simulation

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, HotspotId, RaidId, TaskId, Tick, WorldTime};
use crate::entity::actor::Actor;
use crate::entity::tasks::{Task, TaskType};
use crate::simulation::hotspot::{HarvestResult, Hotspot, HotspotFamily};
use crate::simulation::policy::PolicyId;

/// Snapshot handed to pre/post tick hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    pub tick: Tick,
    pub world_time: WorldTime,
    pub paused: bool,
}

/// Receiver for every lifecycle transition.
///
/// All methods default to no-ops, so a sink only overrides what it cares
/// about. Notifications are fire-and-forget.
pub trait EventSink {
    fn pre_tick(&mut self, _ctx: TickContext) {}
    fn post_tick(&mut self, _ctx: TickContext) {}

    fn task_created(&mut self, _task: &Task) {}
    fn task_assigned(&mut self, _task: &Task, _actor: ActorId) {}
    fn task_preempted(&mut self, _task: &Task, _actor: ActorId) {}
    fn task_completed(&mut self, _task: &Task, _actor: ActorId) {}
    fn task_failed(&mut self, _task: &Task) {}

    fn hotspot_placed(&mut self, _hotspot: &Hotspot) {}
    fn hotspot_first_harvest(&mut self, _hotspot: &Hotspot, _actor: ActorId) {}
    fn hotspot_harvested(&mut self, _hotspot: &Hotspot, _actor: ActorId, _result: HarvestResult) {}
    fn hotspot_upgraded(&mut self, _hotspot: &Hotspot, _from: u8, _to: u8) {}
    fn hotspot_reset(&mut self, _hotspot: &Hotspot) {}

    fn raid_scheduled(&mut self, _at: WorldTime) {}
    fn raid_started(&mut self, _raid: RaidId, _threat_score: u32) {}
    fn raid_ended(&mut self, _raid: RaidId, _success: bool) {}

    fn actor_died(&mut self, _actor: &Actor, _cause: &str) {}
    fn claim_paid(&mut self, _actor: ActorId, _cost: i64, _balance: i64) {}
    fn replacement_spawned(&mut self, _deceased: ActorId, _replacement: &Actor) {}

    fn policy_changed(&mut self, _from: PolicyId, _to: PolicyId) {}
    fn crisis_started(&mut self, _raid: RaidId) {}
    fn crisis_ended(&mut self, _raid: RaidId, _success: bool) {}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {}

/// Forwards notifications to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn task_created(&mut self, task: &Task) {
        tracing::debug!(task = %task.id, kind = %task.task_type, target = %task.target, "task created");
    }

    fn task_assigned(&mut self, task: &Task, actor: ActorId) {
        tracing::debug!(task = %task.id, %actor, "task assigned");
    }

    fn task_preempted(&mut self, task: &Task, actor: ActorId) {
        tracing::debug!(task = %task.id, %actor, "task preempted");
    }

    fn task_completed(&mut self, task: &Task, actor: ActorId) {
        tracing::debug!(task = %task.id, %actor, "task completed");
    }

    fn task_failed(&mut self, task: &Task) {
        tracing::warn!(task = %task.id, until = task.quarantine_until, "task failed, quarantined");
    }

    fn hotspot_placed(&mut self, hotspot: &Hotspot) {
        tracing::info!(hotspot = %hotspot.id, family = %hotspot.family, "hotspot placed");
    }

    fn hotspot_first_harvest(&mut self, hotspot: &Hotspot, _actor: ActorId) {
        tracing::debug!(hotspot = %hotspot.id, reset_at = ?hotspot.reset_at, "hotspot cycle started");
    }

    fn hotspot_harvested(&mut self, hotspot: &Hotspot, actor: ActorId, result: HarvestResult) {
        tracing::debug!(
            hotspot = %hotspot.id,
            %actor,
            amount = result.yield_amount,
            quality = result.quality,
            "hotspot harvested"
        );
    }

    fn hotspot_upgraded(&mut self, hotspot: &Hotspot, from: u8, to: u8) {
        tracing::info!(hotspot = %hotspot.id, from, to, "hotspot upgraded");
    }

    fn hotspot_reset(&mut self, hotspot: &Hotspot) {
        tracing::debug!(hotspot = %hotspot.id, "hotspot reset");
    }

    fn raid_scheduled(&mut self, at: WorldTime) {
        tracing::debug!(at, "raid scheduled");
    }

    fn raid_started(&mut self, raid: RaidId, threat_score: u32) {
        tracing::info!(%raid, threat_score, "raid started");
    }

    fn raid_ended(&mut self, raid: RaidId, success: bool) {
        tracing::info!(%raid, success, "raid ended");
    }

    fn actor_died(&mut self, actor: &Actor, cause: &str) {
        tracing::info!(actor = %actor.id, role = %actor.role, cause, "colonist died");
    }

    fn claim_paid(&mut self, actor: ActorId, cost: i64, balance: i64) {
        tracing::info!(%actor, cost, balance, "insurance claim paid");
    }

    fn replacement_spawned(&mut self, deceased: ActorId, replacement: &Actor) {
        tracing::info!(%deceased, replacement = %replacement.id, "replacement spawned");
    }

    fn policy_changed(&mut self, from: PolicyId, to: PolicyId) {
        tracing::info!(%from, %to, "policy changed");
    }

    fn crisis_started(&mut self, raid: RaidId) {
        tracing::info!(%raid, "crisis started");
    }

    fn crisis_ended(&mut self, raid: RaidId, success: bool) {
        tracing::info!(%raid, success, "crisis ended");
    }
}

/// Owned form of a notification, for recording and inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColonyEvent {
    PreTick { tick: Tick },
    PostTick { tick: Tick },
    TaskCreated { task: TaskId, task_type: TaskType },
    TaskAssigned { task: TaskId, actor: ActorId },
    TaskPreempted { task: TaskId, actor: ActorId },
    TaskCompleted { task: TaskId, actor: ActorId },
    TaskFailed { task: TaskId, quarantine_until: WorldTime },
    HotspotPlaced { hotspot: HotspotId, family: HotspotFamily },
    HotspotFirstHarvest { hotspot: HotspotId, reset_at: Option<WorldTime> },
    HotspotHarvested { hotspot: HotspotId, actor: ActorId, amount: u32, quality: u8 },
    HotspotUpgraded { hotspot: HotspotId, from: u8, to: u8 },
    HotspotReset { hotspot: HotspotId },
    RaidScheduled { at: WorldTime },
    RaidStarted { raid: RaidId, threat_score: u32 },
    RaidEnded { raid: RaidId, success: bool },
    ActorDied { actor: ActorId, cause: String },
    ClaimPaid { actor: ActorId, cost: i64, balance: i64 },
    ReplacementSpawned { deceased: ActorId, replacement: ActorId },
    PolicyChanged { from: PolicyId, to: PolicyId },
    CrisisStarted { raid: RaidId },
    CrisisEnded { raid: RaidId, success: bool },
}

/// Keeps every notification in arrival order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<ColonyEvent>,
    include_ticks: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record pre/post tick markers
    pub fn with_ticks(mut self) -> Self {
        self.include_ticks = true;
        self
    }

    pub fn events(&self) -> &[ColonyEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<ColonyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, pred: impl Fn(&ColonyEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    fn push(&mut self, event: ColonyEvent) {
        self.events.push(event);
    }
}

impl EventSink for RecordingSink {
    fn pre_tick(&mut self, ctx: TickContext) {
        if self.include_ticks {
            self.push(ColonyEvent::PreTick { tick: ctx.tick });
        }
    }

    fn post_tick(&mut self, ctx: TickContext) {
        if self.include_ticks {
            self.push(ColonyEvent::PostTick { tick: ctx.tick });
        }
    }

    fn task_created(&mut self, task: &Task) {
        self.push(ColonyEvent::TaskCreated { task: task.id, task_type: task.task_type });
    }

    fn task_assigned(&mut self, task: &Task, actor: ActorId) {
        self.push(ColonyEvent::TaskAssigned { task: task.id, actor });
    }

    fn task_preempted(&mut self, task: &Task, actor: ActorId) {
        self.push(ColonyEvent::TaskPreempted { task: task.id, actor });
    }

    fn task_completed(&mut self, task: &Task, actor: ActorId) {
        self.push(ColonyEvent::TaskCompleted { task: task.id, actor });
    }

    fn task_failed(&mut self, task: &Task) {
        self.push(ColonyEvent::TaskFailed { task: task.id, quarantine_until: task.quarantine_until });
    }

    fn hotspot_placed(&mut self, hotspot: &Hotspot) {
        self.push(ColonyEvent::HotspotPlaced { hotspot: hotspot.id, family: hotspot.family });
    }

    fn hotspot_first_harvest(&mut self, hotspot: &Hotspot, _actor: ActorId) {
        self.push(ColonyEvent::HotspotFirstHarvest { hotspot: hotspot.id, reset_at: hotspot.reset_at });
    }

    fn hotspot_harvested(&mut self, hotspot: &Hotspot, actor: ActorId, result: HarvestResult) {
        self.push(ColonyEvent::HotspotHarvested {
            hotspot: hotspot.id,
            actor,
            amount: result.yield_amount,
            quality: result.quality,
        });
    }

    fn hotspot_upgraded(&mut self, hotspot: &Hotspot, from: u8, to: u8) {
        self.push(ColonyEvent::HotspotUpgraded { hotspot: hotspot.id, from, to });
    }

    fn hotspot_reset(&mut self, hotspot: &Hotspot) {
        self.push(ColonyEvent::HotspotReset { hotspot: hotspot.id });
    }

    fn raid_scheduled(&mut self, at: WorldTime) {
        self.push(ColonyEvent::RaidScheduled { at });
    }

    fn raid_started(&mut self, raid: RaidId, threat_score: u32) {
        self.push(ColonyEvent::RaidStarted { raid, threat_score });
    }

    fn raid_ended(&mut self, raid: RaidId, success: bool) {
        self.push(ColonyEvent::RaidEnded { raid, success });
    }

    fn actor_died(&mut self, actor: &Actor, cause: &str) {
        self.push(ColonyEvent::ActorDied { actor: actor.id, cause: cause.to_string() });
    }

    fn claim_paid(&mut self, actor: ActorId, cost: i64, balance: i64) {
        self.push(ColonyEvent::ClaimPaid { actor, cost, balance });
    }

    fn replacement_spawned(&mut self, deceased: ActorId, replacement: &Actor) {
        self.push(ColonyEvent::ReplacementSpawned { deceased, replacement: replacement.id });
    }

    fn policy_changed(&mut self, from: PolicyId, to: PolicyId) {
        self.push(ColonyEvent::PolicyChanged { from, to });
    }

    fn crisis_started(&mut self, raid: RaidId) {
        self.push(ColonyEvent::CrisisStarted { raid });
    }

    fn crisis_ended(&mut self, raid: RaidId, success: bool) {
        self.push(ColonyEvent::CrisisEnded { raid, success });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::tasks::TaskTarget;

    #[test]
    fn test_null_sink_accepts_everything() {
        let mut sink = NullSink;
        let task = Task::new(TaskId(1), TaskType::Build, TaskTarget::None, 1.0, false);
        sink.task_created(&task);
        sink.raid_ended(RaidId(0), true);
    }

    #[test]
    fn test_recording_sink_skips_ticks_by_default() {
        let ctx = TickContext { tick: 1, world_time: 0, paused: false };
        let mut sink = RecordingSink::new();
        sink.pre_tick(ctx);
        sink.raid_scheduled(1800);
        assert_eq!(sink.events(), &[ColonyEvent::RaidScheduled { at: 1800 }]);

        let mut sink = RecordingSink::new().with_ticks();
        sink.pre_tick(ctx);
        sink.post_tick(ctx);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.events().is_empty());
    }
}
