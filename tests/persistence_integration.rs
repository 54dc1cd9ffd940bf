//! Integration tests for colony saves
//!
//! These tests cover the on-disk save store:
//! - Active save plus rotated backups
//! - Load restoring the whole world and tick counter
//! - Schema version checks and missing saves

use std::fs;
use std::path::{Path, PathBuf};

use colony_sim::city::zone::ZoneType;
use colony_sim::core::config::SimulationConfig;
use colony_sim::core::error::ColonyError;
use colony_sim::core::types::Position;
use colony_sim::entity::actor::Role;
use colony_sim::entity::tasks::{TaskTarget, TaskType};
use colony_sim::persistence::store::ACTIVE_SAVE;
use colony_sim::persistence::{ColonySnapshot, JsonSaveStore, MemorySaveStore, SaveStore, SCHEMA_VERSION};
use colony_sim::simulation::hotspot::HotspotFamily;
use colony_sim::simulation::policy::PolicyId;
use colony_sim::simulation::SimulationEngine;
use colony_sim::world::WorldState;

fn temp_save_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("colony-sim-{}-{}", label, uuid::Uuid::new_v4()))
}

fn read_tick(path: &Path) -> u64 {
    let json = fs::read_to_string(path).unwrap();
    ColonySnapshot::from_json(&json).unwrap().tick
}

// ============================================================================
// JSON Save Store
// ============================================================================

#[test]
fn test_save_rotates_backups() {
    let dir = temp_save_dir("rotate");
    let mut store = JsonSaveStore::new(&dir, 2);
    let world = WorldState::new();

    for tick in 1..=4 {
        store.save(&ColonySnapshot::capture(&world, tick)).unwrap();
    }

    assert_eq!(read_tick(&store.active_path()), 4);
    assert_eq!(read_tick(&store.backup_path(1)), 3);
    assert_eq!(read_tick(&store.backup_path(2)), 2);
    assert!(!store.backup_path(3).exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_first_save_has_no_backups() {
    let dir = temp_save_dir("first");
    let mut store = JsonSaveStore::new(&dir, 5);
    store.save(&ColonySnapshot::capture(&WorldState::new(), 7)).unwrap();

    assert!(dir.join(ACTIVE_SAVE).exists());
    assert!(!store.backup_path(1).exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_without_save_is_not_found() {
    let dir = temp_save_dir("missing");
    let store = JsonSaveStore::new(&dir, 5);
    let err = store.load().unwrap_err();
    assert!(matches!(err, ColonyError::SaveNotFound(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_tampered_schema_version_is_rejected() {
    let dir = temp_save_dir("schema");
    let mut store = JsonSaveStore::new(&dir, 1);
    store.save(&ColonySnapshot::capture(&WorldState::new(), 3)).unwrap();

    let path = store.active_path();
    let mut value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    value["schema_version"] = serde_json::json!(SCHEMA_VERSION + 1);
    fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(
        err,
        ColonyError::SchemaMismatch { expected, found } if expected == SCHEMA_VERSION && found == SCHEMA_VERSION + 1
    ));
    assert!(err.to_string().contains("Restore from a rotated backup"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_garbage_save_is_serialization_error() {
    let store = MemorySaveStore::with_json("not json");
    assert!(matches!(store.load(), Err(ColonyError::SerdeError(_))));
}

// ============================================================================
// Engine Round Trip
// ============================================================================

#[test]
fn test_engine_save_and_load_round_trip() {
    let dir = temp_save_dir("engine");
    let config = SimulationConfig::default();
    let rotations = config.save.backup_rotations;

    let mut engine = SimulationEngine::new(config.clone())
        .unwrap()
        .with_store(Box::new(JsonSaveStore::new(&dir, rotations)));
    engine.create_zone(ZoneType::Hotspot, Position::new(0, 0), Position::new(40, 40));
    let hotspot = engine.place_hotspot(HotspotFamily::Wood, 5, 5).unwrap();
    let actor = engine.world().actors[0].id;
    engine.harvest(hotspot, actor).unwrap();
    engine.create_task(TaskType::Haul, TaskTarget::Hotspot(hotspot), 1.2, false);
    engine.apply_policy(PolicyId::HarvestRush);
    engine.fund_reserve(30);
    for _ in 0..50 {
        engine.tick().unwrap();
    }
    engine.save_now().unwrap();
    let saved_colony = engine.world().colony_id;

    let mut restored = SimulationEngine::new(config)
        .unwrap()
        .with_store(Box::new(JsonSaveStore::new(&dir, rotations)));
    assert_ne!(restored.world().colony_id, saved_colony);
    restored.load().unwrap();

    let world = restored.world();
    assert_eq!(restored.tick_count(), 50);
    assert_eq!(world.colony_id, saved_colony);
    assert_eq!(world.world_time, 10);
    assert_eq!(world.active_policy, PolicyId::HarvestRush);
    assert_eq!(world.reserve.balance, 30);
    assert_eq!(world.hotspot(hotspot).unwrap().capacity_now, 114);
    assert_eq!(world.tasks.len(), 1);
    assert_eq!(world.tasks[0].assignee, Some(actor));
    assert_eq!(world.actor(actor).unwrap().experience(Role::Gatherer), 5);
    assert_eq!(world.ids.peek(), engine.world().ids.peek());
    assert_eq!(restored.status(false), engine.status(false));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_autosave_writes_on_interval() {
    let dir = temp_save_dir("autosave");
    let mut config = SimulationConfig::default();
    config.sim.autosave = true;
    config.sim.autosave_seconds = 2;

    let mut engine = SimulationEngine::new(config)
        .unwrap()
        .with_store(Box::new(JsonSaveStore::new(&dir, 3)));
    for _ in 0..9 {
        engine.tick().unwrap();
    }
    assert!(!dir.join(ACTIVE_SAVE).exists());

    engine.tick().unwrap();
    assert_eq!(read_tick(&dir.join(ACTIVE_SAVE)), 10);

    fs::remove_dir_all(&dir).unwrap();
}
