//! Stockpile - colony-level material storage

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{ColonyError, Result};
use crate::core::types::normalize_token;

/// Materials tracked by the colony stockpile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Material {
    Wood,
    Stone,
    Fiber,
    Food,
    Hide,
    Crystal,
    Ore,
    Herbs,
}

impl Material {
    pub const ALL: [Material; 8] = [
        Material::Wood,
        Material::Stone,
        Material::Fiber,
        Material::Food,
        Material::Hide,
        Material::Crystal,
        Material::Ore,
        Material::Herbs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Material::Wood => "wood",
            Material::Stone => "stone",
            Material::Fiber => "fiber",
            Material::Food => "food",
            Material::Hide => "hide",
            Material::Crystal => "crystal",
            Material::Ore => "ore",
            Material::Herbs => "herbs",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = ColonyError;

    fn from_str(s: &str) -> Result<Self> {
        Material::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(&normalize_token(s)))
            .ok_or_else(|| ColonyError::unknown("material", s))
    }
}

/// Material counters. Counts never go negative: every debit is checked first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stockpile {
    amounts: AHashMap<Material, u32>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock a freshly founded colony starts with
    pub fn starting() -> Self {
        let mut stockpile = Self::new();
        stockpile.add(Material::Wood, 100);
        stockpile.add(Material::Stone, 70);
        stockpile.add(Material::Fiber, 30);
        stockpile.add(Material::Food, 40);
        stockpile.add(Material::Hide, 10);
        stockpile
    }

    /// Get current amount of a material
    pub fn get(&self, material: Material) -> u32 {
        self.amounts.get(&material).copied().unwrap_or(0)
    }

    pub fn add(&mut self, material: Material, amount: u32) {
        let entry = self.amounts.entry(material).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Check if the stockpile covers every requirement
    pub fn has_materials(&self, requirements: &[(Material, u32)]) -> bool {
        sum_by_material(requirements)
            .into_iter()
            .all(|(m, total)| self.get(m) >= total)
    }

    /// Debit every requirement, or nothing at all.
    ///
    /// Requirements naming the same material are summed before the check.
    /// Fails with the first short material; the stockpile is untouched on error.
    pub fn consume_materials(&mut self, requirements: &[(Material, u32)]) -> Result<()> {
        let totals = sum_by_material(requirements);
        if let Some(&(material, needed)) = totals.iter().find(|(m, total)| self.get(*m) < *total) {
            return Err(ColonyError::InsufficientStock {
                material,
                needed,
                available: self.get(material),
            });
        }
        for (material, total) in totals {
            if let Some(current) = self.amounts.get_mut(&material) {
                *current = current.saturating_sub(total);
            }
        }
        Ok(())
    }

    /// (material, amount) pairs in a stable order, for status output
    pub fn entries(&self) -> Vec<(Material, u32)> {
        Material::ALL.into_iter().map(|m| (m, self.get(m))).collect()
    }
}

/// Merge requirements that name the same material, keeping first-seen order
fn sum_by_material(requirements: &[(Material, u32)]) -> Vec<(Material, u32)> {
    let mut totals: Vec<(Material, u32)> = Vec::with_capacity(requirements.len());
    for &(material, amount) in requirements {
        match totals.iter_mut().find(|(m, _)| *m == material) {
            Some((_, total)) => *total = total.saturating_add(amount),
            None => totals.push((material, amount)),
        }
    }
    totals
}
