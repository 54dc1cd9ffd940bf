//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here with notes on how they interact.
//! Every section deserializes with defaults, so a TOML file only needs to
//! name the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{ColonyError, Result};

/// Configuration for the simulation systems
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub sim: SimSection,
    pub limits: LimitsSection,
    pub tasks: TaskSection,
    pub threat: ThreatSection,
    pub insurance: InsuranceSection,
    pub save: SaveSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSection {
    /// Ticks per second of world time.
    ///
    /// World time is `tick_count / tick_hz`, truncated to whole seconds, so
    /// every domain timer below is counted in seconds, never in ticks.
    pub tick_hz: u32,

    /// Builders spawned when a new colony is bootstrapped
    pub starting_citizens: u32,

    /// Whether the engine saves on its own every `autosave_seconds`
    pub autosave: bool,

    pub autosave_seconds: u64,
}

impl Default for SimSection {
    fn default() -> Self {
        Self {
            tick_hz: 5,
            starting_citizens: 2,
            autosave: false,
            autosave_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    /// Hard ceiling on the population cap, regardless of housing
    pub max_citizens: u32,

    pub max_hotspots_per_family: u32,

    /// Raids are single-flight: the director never starts one while this
    /// many enemies are active
    pub max_active_raid_enemies: u32,

    /// Minimum distance between any two hotspots (meters).
    ///
    /// Placement at exactly this distance is allowed.
    pub hotspot_spacing_meters: f64,

    pub hotspot_per_zone_cap: u32,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_citizens: 5,
            max_hotspots_per_family: 1,
            max_active_raid_enemies: 1,
            hotspot_spacing_meters: 12.0,
            hotspot_per_zone_cap: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSection {
    /// Cooldown after a preemption during which only emergency tasks may
    /// strip the actor of its new task
    pub preempt_lock_seconds: u64,

    /// Path failures tolerated before a task is failed.
    ///
    /// The task fails on the failure that pushes the counter *past* this
    /// value, i.e. on failure number `path_retries + 1`.
    pub path_retries: u32,

    /// How long a failed task stays out of the eligible pool
    pub quarantine_seconds: u64,
}

impl Default for TaskSection {
    fn default() -> Self {
        Self {
            preempt_lock_seconds: 10,
            path_retries: 2,
            quarantine_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatSection {
    /// Delay before the first raid; reactive raids are also suppressed until
    /// world time passes this mark
    pub grace_seconds: u64,

    /// Interval between scheduled raids
    pub base_interval_seconds: u64,

    /// Minimum gap between the last raid and a reactive one
    pub trigger_cooldown_seconds: u64,

    /// Threat growth since the last raid that arms the reactive trigger
    pub trigger_threat_delta: u32,
}

impl Default for ThreatSection {
    fn default() -> Self {
        Self {
            grace_seconds: 30 * 60,
            base_interval_seconds: 15 * 60,
            trigger_cooldown_seconds: 8 * 60,
            trigger_threat_delta: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsuranceSection {
    /// Reserve points debited per death. The pool is allowed to go negative.
    pub claim_cost: i64,
}

impl Default for InsuranceSection {
    fn default() -> Self {
        Self { claim_cost: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSection {
    /// Number of `backup-N.json` files kept behind the active save
    pub backup_rotations: u32,
}

impl Default for SaveSection {
    fn default() -> Self {
        Self { backup_rotations: 5 }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| ColonyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.sim.tick_hz == 0 {
            return Err(ColonyError::Config("sim.tick_hz must be positive".into()));
        }

        if self.limits.max_active_raid_enemies == 0 {
            return Err(ColonyError::Config(
                "limits.max_active_raid_enemies must be at least 1".into(),
            ));
        }

        let spacing = self.limits.hotspot_spacing_meters;
        if spacing.is_nan() || spacing < 0.0 {
            return Err(ColonyError::Config(format!(
                "limits.hotspot_spacing_meters ({}) must be non-negative",
                self.limits.hotspot_spacing_meters
            )));
        }

        if self.sim.starting_citizens > self.limits.max_citizens {
            return Err(ColonyError::Config(format!(
                "sim.starting_citizens ({}) exceeds limits.max_citizens ({})",
                self.sim.starting_citizens, self.limits.max_citizens
            )));
        }

        if self.sim.autosave && self.sim.autosave_seconds == 0 {
            return Err(ColonyError::Config(
                "sim.autosave_seconds must be positive when autosave is on".into(),
            ));
        }

        Ok(())
    }
}
