//! Population cap from completed housing
//!
//! The colony always houses two colonists; each completed house adds its
//! capacity. The cap never exceeds `limits.max_citizens`.

use crate::core::config::LimitsSection;
use crate::core::types::ActorId;
use crate::simulation::task_broker;
use crate::world::WorldState;

pub const BASE_HOUSING: u32 = 2;

/// Beds available from completed structures
pub fn housing_capacity(world: &WorldState) -> u32 {
    let from_buildings: u32 = world
        .structures
        .iter()
        .filter(|s| s.complete)
        .map(|s| s.blueprint.housing_capacity())
        .sum();
    BASE_HOUSING + from_buildings
}

/// Recompute the cap and drop colonists above it from the end of the list.
///
/// Returns the removed ids, last-in-list first. Their tasks go back to the queue.
pub fn refresh_population_cap(world: &mut WorldState, limits: &LimitsSection) -> Vec<ActorId> {
    let cap = housing_capacity(world).min(limits.max_citizens);
    world.population_cap = cap;

    let mut removed = Vec::new();
    while world.actors.len() > cap as usize {
        let Some(actor) = world.actors.pop() else { break };
        task_broker::release_actor(world, actor.id);
        tracing::info!(actor = %actor.id, cap, "colonist removed over population cap");
        removed.push(actor.id);
    }
    removed
}
