// Demodata - Weighted choice
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Cumulative-weight selection over small static tables.
//!
//! Every table consumes exactly one uniform `[0, 1)` draw, which keeps the
//! draw order of a snapshot fixed regardless of the value picked.

use rand::Rng;

/// Ordered `(value, weight)` table.
#[derive(Debug, Clone, Copy)]
pub struct WeightedTable<T: 'static> {
    entries: &'static [(T, f64)],
}

impl<T: Copy + 'static> WeightedTable<T> {
    /// Wrap a static table. Weights should sum to at most 1.
    pub const fn new(entries: &'static [(T, f64)]) -> Self {
        Self { entries }
    }

    /// Table entries in scan order.
    pub fn entries(&self) -> &'static [(T, f64)] {
        self.entries
    }

    /// Pick the first entry whose cumulative weight reaches `roll`.
    ///
    /// Falls back to the last entry when rounding leaves `roll` above the
    /// final cumulative sum.
    pub fn select(&self, roll: f64) -> T {
        let mut cumulative = 0.0;
        for &(value, weight) in self.entries {
            cumulative += weight;
            if roll <= cumulative {
                return value;
            }
        }
        self.entries[self.entries.len() - 1].0
    }

    /// Draw one uniform value and select.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.select(rng.gen::<f64>())
    }
}
