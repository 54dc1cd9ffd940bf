//! Where snapshots are kept

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{ColonyError, Result};
use crate::persistence::snapshot::ColonySnapshot;

pub const ACTIVE_SAVE: &str = "active-save.json";

/// Durable home for colony snapshots
pub trait SaveStore: Send {
    fn save(&mut self, snapshot: &ColonySnapshot) -> Result<()>;
    fn load(&self) -> Result<ColonySnapshot>;
}

/// Pretty JSON on disk with rotated backups.
///
/// Each save shifts `backup-N.json` to `backup-N+1.json` (dropping the
/// oldest), copies the current active save to `backup-1.json`, then writes
/// the new `active-save.json`.
#[derive(Debug, Clone)]
pub struct JsonSaveStore {
    dir: PathBuf,
    backup_rotations: u32,
}

impl JsonSaveStore {
    pub fn new(dir: impl Into<PathBuf>, backup_rotations: u32) -> Self {
        Self {
            dir: dir.into(),
            backup_rotations,
        }
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_SAVE)
    }

    pub fn backup_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("backup-{}.json", index))
    }

    fn rotate_backups(&self) -> Result<()> {
        for index in (1..=self.backup_rotations).rev() {
            let source = if index == 1 {
                self.active_path()
            } else {
                self.backup_path(index - 1)
            };
            if source.exists() {
                fs::copy(&source, self.backup_path(index))?;
            }
        }
        Ok(())
    }
}

impl SaveStore for JsonSaveStore {
    fn save(&mut self, snapshot: &ColonySnapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.rotate_backups()?;
        fs::write(self.active_path(), snapshot.to_json()?)?;
        tracing::info!(path = %self.active_path().display(), tick = snapshot.tick, "colony saved");
        Ok(())
    }

    fn load(&self) -> Result<ColonySnapshot> {
        let path = self.active_path();
        if !path.exists() {
            return Err(ColonyError::SaveNotFound(path.display().to_string()));
        }
        load_file(&path)
    }
}

fn load_file(path: &Path) -> Result<ColonySnapshot> {
    let json = fs::read_to_string(path)?;
    ColonySnapshot::from_json(&json)
}

/// Keeps the latest save as JSON text in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    json: Option<String>,
    saves: usize,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw save text
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
            saves: 0,
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn json(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl SaveStore for MemorySaveStore {
    fn save(&mut self, snapshot: &ColonySnapshot) -> Result<()> {
        self.json = Some(snapshot.to_json()?);
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<ColonySnapshot> {
        let json = self
            .json
            .as_deref()
            .ok_or_else(|| ColonyError::SaveNotFound("memory".into()))?;
        ColonySnapshot::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldState;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemorySaveStore::new();
        assert!(matches!(store.load(), Err(ColonyError::SaveNotFound(_))));

        let world = WorldState::new();
        store.save(&ColonySnapshot::capture(&world, 10)).unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap().tick, 10);
    }
}
