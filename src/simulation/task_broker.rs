//! Task broker: priority assignment, preemption and path-failure quarantine

use ordered_float::OrderedFloat;
use std::cmp::Reverse;

use crate::core::config::TaskSection;
use crate::core::error::{ColonyError, Result};
use crate::core::types::{ActorId, TaskId};
use crate::entity::tasks::{Task, TaskStatus, TaskTarget, TaskType};
use crate::simulation::events::EventSink;
use crate::simulation::policy::PolicyWeights;
use crate::world::WorldState;

/// `base priority x policy weight`, read from the weights in force now
pub fn score(weights: &PolicyWeights, task: &Task) -> f64 {
    task.base_priority() * weights.get(task.task_type)
}

pub fn create_task(
    world: &mut WorldState,
    sink: &mut dyn EventSink,
    task_type: TaskType,
    target: TaskTarget,
    base_priority: f64,
    emergency: bool,
) -> TaskId {
    let id = TaskId(world.ids.next_id());
    let task = Task::new(id, task_type, target, base_priority, emergency);
    sink.task_created(&task);
    world.tasks.push(task);
    id
}

/// One assignment pass over every actor, in list order.
///
/// The eligible pool is snapshotted and sorted once; ties keep task-list
/// order. Whether a pool task is still free is checked live, so a task
/// reserved earlier in the pass is never handed out twice.
pub fn assign(world: &mut WorldState, cfg: &TaskSection, sink: &mut dyn EventSink) {
    let now = world.world_time;
    let mut pool: Vec<(usize, f64)> = world
        .tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_eligible(now))
        .map(|(i, t)| (i, score(&world.weights, t)))
        .collect();
    pool.sort_by_key(|&(_, s)| Reverse(OrderedFloat(s)));

    for a in 0..world.actors.len() {
        let actor = world.actors[a].id;

        if let Some(held) = world.active_task_index(actor) {
            let held_score = score(&world.weights, &world.tasks[held]);
            let locked = world.actors[a].is_locked(now);
            // First eligible in sorted order, not the best eligible
            let candidate = pool
                .iter()
                .find(|&&(i, s)| {
                    let t = &world.tasks[i];
                    t.assignee.is_none() && s > held_score && (t.emergency || !locked)
                })
                .map(|&(i, _)| i);

            if let Some(next) = candidate {
                let task = &mut world.tasks[held];
                task.status = TaskStatus::Preempted;
                sink.task_preempted(task, actor);
                task.clear_reservation();
                world.actors[a].preempt_lock_until = now + cfg.preempt_lock_seconds;
                tracing::debug!(%actor, from = %world.tasks[held].id, to = %world.tasks[next].id, "preempted");
                reserve(world, sink, next, actor);
            }
            continue;
        }

        if let Some(next) = pool
            .iter()
            .map(|&(i, _)| i)
            .find(|&i| world.tasks[i].assignee.is_none())
        {
            reserve(world, sink, next, actor);
        }
    }
}

fn reserve(world: &mut WorldState, sink: &mut dyn EventSink, index: usize, actor: ActorId) {
    let task = &mut world.tasks[index];
    task.reserve(actor);
    sink.task_assigned(task, actor);
}

/// `Reserved -> Running`
pub fn start_task(world: &mut WorldState, id: TaskId) -> Result<()> {
    let task = world.task_mut(id)?;
    if task.status != TaskStatus::Reserved {
        return Err(ColonyError::InvalidTransition { task: id, status: task.status, action: "start" });
    }
    task.status = TaskStatus::Running;
    Ok(())
}

/// Count a path failure. Returns true when this failure exhausted the retry
/// budget and the task was failed into quarantine.
pub fn mark_path_failure(
    world: &mut WorldState,
    cfg: &TaskSection,
    sink: &mut dyn EventSink,
    id: TaskId,
) -> Result<bool> {
    let now = world.world_time;
    let task = world.task_mut(id)?;
    if !task.is_open() {
        return Err(ColonyError::InvalidTransition { task: id, status: task.status, action: "report path failure" });
    }

    task.path_failures += 1;
    if task.path_failures <= cfg.path_retries {
        return Ok(false);
    }

    task.fail(now + cfg.quarantine_seconds);
    tracing::debug!(task = %id, until = task.quarantine_until, "task quarantined after path failures");
    sink.task_failed(task);
    Ok(true)
}

pub fn complete_task(world: &mut WorldState, sink: &mut dyn EventSink, id: TaskId, actor: ActorId) -> Result<()> {
    let task = world.task_mut(id)?;
    if !task.is_open() {
        return Err(ColonyError::InvalidTransition { task: id, status: task.status, action: "complete" });
    }
    task.status = TaskStatus::Done;
    sink.task_completed(task, actor);
    Ok(())
}

/// Put a failed task back in the queue once its quarantine is over
pub fn requeue_task(world: &mut WorldState, id: TaskId) -> Result<()> {
    let now = world.world_time;
    let task = world.task_mut(id)?;
    if task.status != TaskStatus::Failed {
        return Err(ColonyError::InvalidTransition { task: id, status: task.status, action: "requeue" });
    }
    if task.is_quarantined(now) {
        return Err(ColonyError::TaskQuarantined { task: id, until: task.quarantine_until });
    }
    task.clear_reservation();
    task.path_failures = 0;
    Ok(())
}

/// Return every active task an actor holds to the queue
pub fn release_actor(world: &mut WorldState, actor: ActorId) -> usize {
    let mut released = 0;
    for task in world
        .tasks
        .iter_mut()
        .filter(|t| t.is_active() && t.assignee == Some(actor))
    {
        task.clear_reservation();
        released += 1;
    }
    released
}
