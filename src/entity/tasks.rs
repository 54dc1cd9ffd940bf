//! Colony work items and their lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{ColonyError, Result};
use crate::core::types::{
    normalize_token, ActorId, HotspotId, Position, RaidId, StructureId, TaskId, WorldTime, ZoneId,
};
use crate::entity::actor::Role;
use crate::entity::skills::{BUILD_XP, FARM_XP, GATHER_XP, GUARD_PATROL_XP, HAUL_XP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Build,
    Farm,
    Gather,
    Haul,
    Defend,
    Repair,
    Emergency,
}

impl TaskType {
    pub const ALL: [TaskType; 7] = [
        TaskType::Build,
        TaskType::Farm,
        TaskType::Gather,
        TaskType::Haul,
        TaskType::Defend,
        TaskType::Repair,
        TaskType::Emergency,
    ];

    /// Position in weight tables
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskType::Build => "build",
            TaskType::Farm => "farm",
            TaskType::Gather => "gather",
            TaskType::Haul => "haul",
            TaskType::Defend => "defend",
            TaskType::Repair => "repair",
            TaskType::Emergency => "emergency",
        }
    }

    /// Experience credited to the finishing actor
    pub fn experience_reward(&self) -> Option<(Role, u32)> {
        match self {
            TaskType::Build | TaskType::Repair => Some((Role::Builder, BUILD_XP)),
            TaskType::Farm => Some((Role::Farmer, FARM_XP)),
            TaskType::Gather => Some((Role::Gatherer, GATHER_XP)),
            TaskType::Haul => Some((Role::Hauler, HAUL_XP)),
            TaskType::Defend => Some((Role::Guard, GUARD_PATROL_XP)),
            TaskType::Emergency => None,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskType {
    type Err = ColonyError;

    fn from_str(s: &str) -> Result<Self> {
        let token = normalize_token(s);
        TaskType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(&token))
            .ok_or_else(|| ColonyError::unknown("task type", s))
    }
}

/// Lifecycle: `Queued -> Reserved -> Running -> {Preempted -> Queued | Done | Failed}`.
///
/// `Preempted` is transient: the broker requeues the task in the same step,
/// so sinks see it but the task list never holds it between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Queued,
    Reserved,
    Running,
    Preempted,
    Done,
    Failed,
}

/// What a task is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskTarget {
    None,
    Structure(StructureId),
    Hotspot(HotspotId),
    Zone(ZoneId),
    Raid(RaidId),
    Position(Position),
    Named(String),
}

impl fmt::Display for TaskTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskTarget::None => f.write_str("-"),
            TaskTarget::Structure(id) => write!(f, "{}", id),
            TaskTarget::Hotspot(id) => write!(f, "{}", id),
            TaskTarget::Zone(id) => write!(f, "{}", id),
            TaskTarget::Raid(id) => write!(f, "{}", id),
            TaskTarget::Position(pos) => write!(f, "({}, {})", pos.x, pos.z),
            TaskTarget::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task_type: TaskType,
    pub target: TaskTarget,
    pub emergency: bool,
    pub status: TaskStatus,
    pub assignee: Option<ActorId>,
    pub path_failures: u32,
    pub quarantine_until: WorldTime,
    base_priority: f64,
}

impl Task {
    /// Negative or NaN priorities are stored as 0
    pub fn new(id: TaskId, task_type: TaskType, target: TaskTarget, base_priority: f64, emergency: bool) -> Self {
        Self {
            id,
            task_type,
            target,
            emergency,
            status: TaskStatus::Queued,
            assignee: None,
            path_failures: 0,
            quarantine_until: 0,
            base_priority: if base_priority > 0.0 { base_priority } else { 0.0 },
        }
    }

    pub fn base_priority(&self) -> f64 {
        self.base_priority
    }

    /// Reserved or running
    pub fn is_active(&self) -> bool {
        matches!(self.status, TaskStatus::Reserved | TaskStatus::Running)
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.status, TaskStatus::Done | TaskStatus::Failed)
    }

    pub fn is_quarantined(&self, now: WorldTime) -> bool {
        self.quarantine_until > now
    }

    /// Queued and out of quarantine
    pub fn is_eligible(&self, now: WorldTime) -> bool {
        self.status == TaskStatus::Queued && !self.is_quarantined(now)
    }

    pub fn reserve(&mut self, actor: ActorId) {
        self.status = TaskStatus::Reserved;
        self.assignee = Some(actor);
    }

    /// Back to the queue with no assignee
    pub fn clear_reservation(&mut self) {
        self.status = TaskStatus::Queued;
        self.assignee = None;
    }

    pub fn fail(&mut self, quarantine_until: WorldTime) {
        self.status = TaskStatus::Failed;
        self.assignee = None;
        self.quarantine_until = quarantine_until;
        self.path_failures = 0;
    }
}
