//! Hit points for anything that can be damaged
//!
//! `ActorHealth` only mutates its own counters and reports what happened.
//! Observer notifications and scene changes are the owner's job.

use serde::{Deserialize, Serialize};

/// Outcome of a heal or damage call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    /// Call was a no-op (non-positive amount, already dead)
    Unchanged,
    /// Health moved and the actor is still alive
    Changed { current: i32, max: i32 },
    /// This call took health to zero. Reported exactly once per actor.
    Died { max: i32 },
}

impl HealthChange {
    /// New `(current, max)` if anything changed
    pub fn snapshot(&self) -> Option<(i32, i32)> {
        match *self {
            HealthChange::Unchanged => None,
            HealthChange::Changed { current, max } => Some((current, max)),
            HealthChange::Died { max } => Some((0, max)),
        }
    }

    pub fn died(&self) -> bool {
        matches!(self, HealthChange::Died { .. })
    }
}

/// Hit points, always within `0..=max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorHealth {
    max: i32,
    current: i32,
}

impl ActorHealth {
    /// Full health. `max` is floored at 1.
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { max, current: max }
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Fraction of max health (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Non-positive amounts are ignored. Healing a dead actor also does
    /// nothing: a revive would let `take_damage` report `Died` a second time.
    pub fn heal(&mut self, amount: i32) -> HealthChange {
        if amount <= 0 || self.current <= 0 {
            return HealthChange::Unchanged;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
        HealthChange::Changed {
            current: self.current,
            max: self.max,
        }
    }

    pub fn take_damage(&mut self, amount: i32) -> HealthChange {
        if amount <= 0 || self.current <= 0 {
            return HealthChange::Unchanged;
        }
        self.current = self.current.saturating_sub(amount).max(0);
        if self.current == 0 {
            HealthChange::Died { max: self.max }
        } else {
            HealthChange::Changed {
                current: self.current,
                max: self.max,
            }
        }
    }
}

impl Default for ActorHealth {
    fn default() -> Self {
        Self::new(100)
    }
}
