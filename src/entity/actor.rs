//! Colonists: role, skills, experience and needs

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{ColonyError, Result};
use crate::core::types::{normalize_token, ActorId, WorldTime};
use crate::entity::needs::Needs;
use crate::entity::skills::{level_for, MAX_SKILL, MIN_SKILL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Builder,
    Farmer,
    Gatherer,
    Hauler,
    Guard,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Builder => "builder",
            Role::Farmer => "farmer",
            Role::Gatherer => "gatherer",
            Role::Hauler => "hauler",
            Role::Guard => "guard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = ColonyError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "BUILDER" => Ok(Role::Builder),
            "FARMER" => Ok(Role::Farmer),
            "GATHERER" => Ok(Role::Gatherer),
            "HAULER" => Ok(Role::Hauler),
            "GUARD" => Ok(Role::Guard),
            _ => Err(ColonyError::unknown("role", s)),
        }
    }
}

/// A colonist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
    skills: AHashMap<Role, u8>,
    experience: AHashMap<Role, u32>,
    pub needs: Needs,
    /// Non-emergency preemption is refused until world time reaches this
    pub preempt_lock_until: WorldTime,
}

impl Actor {
    pub fn new(id: ActorId, role: Role) -> Self {
        Self {
            id,
            role,
            skills: AHashMap::new(),
            experience: AHashMap::new(),
            needs: Needs::default(),
            preempt_lock_until: 0,
        }
    }

    pub fn with_skill(mut self, role: Role, level: u8) -> Self {
        self.set_skill(role, level);
        self
    }

    /// Skill level for a role; untrained roles read as 1
    pub fn skill(&self, role: Role) -> u8 {
        self.skills.get(&role).copied().unwrap_or(MIN_SKILL)
    }

    pub fn set_skill(&mut self, role: Role, level: u8) {
        self.skills.insert(role, level.clamp(MIN_SKILL, MAX_SKILL));
    }

    pub fn skills(&self) -> &AHashMap<Role, u8> {
        &self.skills
    }

    pub fn experience(&self, role: Role) -> u32 {
        self.experience.get(&role).copied().unwrap_or(0)
    }

    /// Add XP to a role and raise its skill to the level the new total implies.
    ///
    /// Returns the new level when the skill went up. Skills never drop here,
    /// so a skill set above its XP level is left alone.
    pub fn grant_experience(&mut self, role: Role, amount: u32) -> Option<u8> {
        let total = self.experience.entry(role).or_insert(0);
        *total = total.saturating_add(amount);
        let level = level_for(*total);
        if level > self.skill(role) {
            self.set_skill(role, level);
            Some(level)
        } else {
            None
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.needs.wellbeing().max(0.2)
    }

    pub fn is_locked(&self, now: WorldTime) -> bool {
        self.preempt_lock_until > now
    }

    /// A fresh colonist who inherits this one's role, skills and experience
    pub fn replacement(&self, id: ActorId) -> Actor {
        Actor {
            id,
            role: self.role,
            skills: self.skills.clone(),
            experience: self.experience.clone(),
            needs: Needs::default(),
            preempt_lock_until: 0,
        }
    }
}
