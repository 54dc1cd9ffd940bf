//! Failure recovery: death claims against the reserve pool and replacements

use serde::{Deserialize, Serialize};

use crate::core::config::InsuranceSection;
use crate::core::error::{ColonyError, Result};
use crate::core::types::ActorId;
use crate::simulation::events::EventSink;
use crate::simulation::task_broker;
use crate::world::WorldState;

/// Reserve points and the claims paid from them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePool {
    /// Allowed to go negative
    pub balance: i64,
    pub claims: Vec<ActorId>,
}

impl ReservePool {
    pub fn fund(&mut self, points: i64) {
        self.balance += points;
    }

    fn charge(&mut self, actor: ActorId, cost: i64) {
        self.balance -= cost;
        self.claims.push(actor);
    }
}

/// Replace a dead colonist, charging one claim.
///
/// The replacement keeps the role, skills and experience, takes a new id and
/// goes to the end of the actor list. Tasks the deceased held are requeued.
pub fn handle_death(
    world: &mut WorldState,
    cfg: &InsuranceSection,
    sink: &mut dyn EventSink,
    actor: ActorId,
    cause: &str,
) -> Result<ActorId> {
    let index = world
        .actors
        .iter()
        .position(|a| a.id == actor)
        .ok_or(ColonyError::ActorNotFound(actor))?;

    sink.actor_died(&world.actors[index], cause);

    world.reserve.charge(actor, cfg.claim_cost);
    sink.claim_paid(actor, cfg.claim_cost, world.reserve.balance);

    task_broker::release_actor(world, actor);
    let deceased = world.actors.remove(index);
    let replacement = deceased.replacement(ActorId(world.ids.next_id()));
    let replacement_id = replacement.id;
    tracing::info!(%actor, replacement = %replacement_id, cause, balance = world.reserve.balance, "claim paid");
    sink.replacement_spawned(actor, &replacement);
    world.actors.push(replacement);
    Ok(replacement_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::actor::{Actor, Role};
    use crate::entity::tasks::{TaskStatus, TaskTarget, TaskType};
    use crate::simulation::events::{ColonyEvent, NullSink, RecordingSink};

    fn colony() -> WorldState {
        let mut world = WorldState::new();
        for role in [Role::Builder, Role::Gatherer, Role::Guard] {
            let id = ActorId(world.ids.next_id());
            world.actors.push(Actor::new(id, role));
        }
        world
    }

    #[test]
    fn test_replacement_goes_to_end_of_list() {
        let mut world = colony();
        let replacement = handle_death(&mut world, &InsuranceSection::default(), &mut NullSink, ActorId(1), "fall").unwrap();

        assert_eq!(replacement, ActorId(4));
        let order: Vec<_> = world.actors.iter().map(|a| a.id).collect();
        assert_eq!(order, vec![ActorId(2), ActorId(3), ActorId(4)]);
        assert_eq!(world.actors[2].role, Role::Builder);
    }

    #[test]
    fn test_pool_goes_negative() {
        let mut world = colony();
        world.reserve.fund(15);
        let cfg = InsuranceSection { claim_cost: 10 };
        handle_death(&mut world, &cfg, &mut NullSink, ActorId(1), "raid").unwrap();
        handle_death(&mut world, &cfg, &mut NullSink, ActorId(2), "raid").unwrap();
        assert_eq!(world.reserve.balance, -5);
        assert_eq!(world.reserve.claims, vec![ActorId(1), ActorId(2)]);
    }

    #[test]
    fn test_notifications_in_order() {
        let mut world = colony();
        let mut sink = RecordingSink::new();
        let replacement = handle_death(&mut world, &InsuranceSection::default(), &mut sink, ActorId(3), "arrow").unwrap();
        assert_eq!(
            sink.events(),
            &[
                ColonyEvent::ActorDied { actor: ActorId(3), cause: "arrow".into() },
                ColonyEvent::ClaimPaid { actor: ActorId(3), cost: 10, balance: -10 },
                ColonyEvent::ReplacementSpawned { deceased: ActorId(3), replacement },
            ]
        );
    }

    #[test]
    fn test_held_task_released() {
        let mut world = colony();
        let task = task_broker::create_task(&mut world, &mut NullSink, TaskType::Haul, TaskTarget::None, 1.0, false);
        world.task_mut(task).unwrap().reserve(ActorId(2));

        handle_death(&mut world, &InsuranceSection::default(), &mut NullSink, ActorId(2), "illness").unwrap();
        let t = world.task(task).unwrap();
        assert_eq!(t.status, TaskStatus::Queued);
        assert_eq!(t.assignee, None);
    }

    #[test]
    fn test_unknown_actor_charges_nothing() {
        let mut world = colony();
        let err = handle_death(&mut world, &InsuranceSection::default(), &mut NullSink, ActorId(42), "?").unwrap_err();
        assert!(matches!(err, ColonyError::ActorNotFound(ActorId(42))));
        assert_eq!(world.reserve.balance, 0);
        assert_eq!(world.population(), 3);
    }
}
