//! Weighted random task selection.
//!
//! Each candidate owns a half-open slice of `[0, total_weight)` proportional
//! to its weight; one uniform draw picks the slice it lands in. Re-rolls are
//! uniform over every candidate except the one currently shown.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::domain::models::Task;

/// Index of the candidate whose cumulative weight first exceeds `draw`.
///
/// `draw` must lie in `[0, total_weight)`. Zero-weight candidates own an
/// empty slice and are never returned.
pub fn index_for_draw(candidates: &[Task], draw: u64) -> Option<usize> {
    let mut upper = 0u64;
    for (i, task) in candidates.iter().enumerate() {
        upper += u64::from(task.weight);
        if draw < upper {
            return Some(i);
        }
    }
    None
}

/// Sum of candidate weights.
pub fn total_weight(candidates: &[Task]) -> u64 {
    candidates.iter().map(|t| u64::from(t.weight)).sum()
}

/// Random task picker with an injectable source of randomness.
pub struct WeightedSelector {
    rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for WeightedSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedSelector").finish_non_exhaustive()
    }
}

impl Default for WeightedSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl WeightedSelector {
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Deterministic selector for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Pick a candidate with probability proportional to its weight.
    ///
    /// `None` means there is nothing to show: either no candidates or no
    /// candidate with a positive weight.
    pub fn pick(&mut self, candidates: &[Task]) -> Option<usize> {
        let total = total_weight(candidates);
        if total == 0 {
            return None;
        }
        let draw = self.rng.gen_range(0..total);
        index_for_draw(candidates, draw)
    }

    /// Pick uniformly among the candidates other than `current`.
    ///
    /// With a single candidate the same index comes back. A `current` that
    /// is unset or out of range excludes nothing.
    pub fn pick_different(&mut self, candidates: &[Task], current: Option<usize>) -> Option<usize> {
        let len = candidates.len();
        match (len, current) {
            (0, _) => None,
            (1, _) => Some(0),
            (_, Some(current)) if current < len => {
                // draw over the len - 1 other slots and step over `current`
                let draw = self.rng.gen_range(0..len - 1);
                Some(if draw >= current { draw + 1 } else { draw })
            }
            _ => Some(self.rng.gen_range(0..len)),
        }
    }
}
