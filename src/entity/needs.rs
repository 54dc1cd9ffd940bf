//! Actor needs on a 0-100 scale

use serde::{Deserialize, Serialize};

pub const NEED_MIN: f32 = 0.0;
pub const NEED_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedType {
    Food,
    Rest,
    Safety,
}

/// 100 = fully satisfied, 0 = desperate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    food: f32,
    rest: f32,
    safety: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            food: NEED_MAX,
            rest: NEED_MAX,
            safety: NEED_MAX,
        }
    }
}

impl Needs {
    pub fn new(food: f32, rest: f32, safety: f32) -> Self {
        Self {
            food: clamp_need(food),
            rest: clamp_need(rest),
            safety: clamp_need(safety),
        }
    }

    pub fn food(&self) -> f32 {
        self.food
    }

    pub fn rest(&self) -> f32 {
        self.rest
    }

    pub fn safety(&self) -> f32 {
        self.safety
    }

    pub fn get(&self, need: NeedType) -> f32 {
        match need {
            NeedType::Food => self.food,
            NeedType::Rest => self.rest,
            NeedType::Safety => self.safety,
        }
    }

    /// Shift a need by `delta`, staying inside [0, 100]
    pub fn adjust(&mut self, need: NeedType, delta: f32) {
        let slot = match need {
            NeedType::Food => &mut self.food,
            NeedType::Rest => &mut self.rest,
            NeedType::Safety => &mut self.safety,
        };
        *slot = clamp_need(*slot + delta);
    }

    /// Mean satisfaction as a fraction of full
    pub fn wellbeing(&self) -> f32 {
        (self.food + self.rest + self.safety) / (3.0 * NEED_MAX)
    }
}

fn clamp_need(value: f32) -> f32 {
    if value.is_nan() {
        return NEED_MIN;
    }
    value.clamp(NEED_MIN, NEED_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_start_full() {
        let needs = Needs::default();
        assert_eq!(needs.food(), 100.0);
        assert_eq!(needs.rest(), 100.0);
        assert_eq!(needs.safety(), 100.0);
    }

    #[test]
    fn test_needs_are_clamped() {
        let mut needs = Needs::new(150.0, -5.0, 40.0);
        assert_eq!(needs.food(), 100.0);
        assert_eq!(needs.rest(), 0.0);

        needs.adjust(NeedType::Safety, -70.0);
        assert_eq!(needs.safety(), 0.0);
        needs.adjust(NeedType::Safety, 30.0);
        assert_eq!(needs.get(NeedType::Safety), 30.0);
    }
}
