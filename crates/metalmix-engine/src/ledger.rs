//! Pour ledger: how much of each bottle went into the glass
//!
//! Pouring is frame-driven: while the trigger is held, the active bottle
//! adds `units_per_second * dt`. The glass never holds more than
//! `max_total_units`; a pour that would overflow is shortened to the room
//! left, never refused.
//!
//! Which session states allow pouring is decided by the session, not here.

use std::collections::BTreeMap;

use metalmix_common::{IngredientFamily, IngredientId, MixerConfig};

/// Accumulated pour amounts for one drink
#[derive(Debug, Clone)]
pub struct PourLedger {
    /// Ordered so attribute sums are evaluated in the same order every time
    amounts: BTreeMap<IngredientId, f64>,
    total_units: f64,
    max_total_units: f64,
    units_per_second: f64,
    selected: Option<IngredientId>,
}

impl PourLedger {
    pub fn new(units_per_second: f64, max_total_units: f64) -> Self {
        Self {
            amounts: BTreeMap::new(),
            total_units: 0.0,
            max_total_units,
            units_per_second,
            selected: None,
        }
    }

    pub fn from_config(config: &MixerConfig) -> Self {
        Self::new(config.units_per_second, config.max_total_units)
    }

    /// Make `id` the bottle that subsequent pours draw from
    pub fn select(&mut self, id: IngredientId) {
        if self.selected != Some(id) {
            tracing::debug!("Active bottle: {}", id);
        }
        self.selected = Some(id);
    }

    /// The active bottle (for highlighting)
    pub fn selected(&self) -> Option<IngredientId> {
        self.selected
    }

    /// Advance one frame of pouring. Returns the units actually added.
    pub fn pour(&mut self, dt: f64, trigger_held: bool) -> f64 {
        if !trigger_held || !(dt > 0.0) {
            return 0.0;
        }
        let Some(id) = self.selected else {
            return 0.0;
        };
        self.add_units(id, self.units_per_second * dt)
    }

    /// Add `units` of `id`, shortened to the room left in the glass.
    /// Returns the units actually added.
    pub fn add_units(&mut self, id: IngredientId, units: f64) -> f64 {
        if !(units > 0.0) {
            return 0.0;
        }

        let room = (self.max_total_units - self.total_units).max(0.0);
        if room <= 0.0 {
            return 0.0;
        }

        let added = if units >= room {
            // Land exactly on the cap
            self.total_units = self.max_total_units;
            room
        } else {
            self.total_units += units;
            units
        };

        *self.amounts.entry(id).or_insert(0.0) += added;
        added
    }

    /// Poured amount of one ingredient
    pub fn amount(&self, id: IngredientId) -> f64 {
        self.amounts.get(&id).copied().unwrap_or(0.0)
    }

    /// Every poured ingredient with its amount, in id order
    pub fn amounts(&self) -> impl Iterator<Item = (IngredientId, f64)> + '_ {
        self.amounts.iter().map(|(&id, &amount)| (id, amount))
    }

    /// Total liquid poured from one shelf
    pub fn family_total(&self, family: IngredientFamily) -> f64 {
        self.amounts
            .iter()
            .filter(|(id, _)| id.family == family)
            .map(|(_, amount)| amount)
            .sum()
    }

    pub fn total_units(&self) -> f64 {
        self.total_units
    }

    pub fn max_total_units(&self) -> f64 {
        self.max_total_units
    }

    /// How full the glass is, in `[0, 1]`
    pub fn fill_fraction(&self) -> f64 {
        if self.max_total_units <= 0.0 {
            return 0.0;
        }
        (self.total_units / self.max_total_units).clamp(0.0, 1.0)
    }

    pub fn is_full(&self) -> bool {
        self.total_units >= self.max_total_units
    }

    pub fn is_empty(&self) -> bool {
        self.total_units <= 0.0
    }

    /// Empty the glass and drop the active bottle
    pub fn clear(&mut self) {
        self.amounts.clear();
        self.total_units = 0.0;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn ledger() -> PourLedger {
        PourLedger::new(100.0, 500.0)
    }

    #[test]
    fn pour_needs_selection_and_trigger() {
        let mut l = ledger();
        assert_eq!(l.pour(1.0, true), 0.0, "no bottle selected");

        l.select(IngredientId::alko(1));
        assert_eq!(l.pour(1.0, false), 0.0, "trigger released");
        assert_eq!(l.pour(0.5, true), 50.0);
        assert_eq!(l.amount(IngredientId::alko(1)), 50.0);
        assert_eq!(l.total_units(), 50.0);
    }

    #[test]
    fn switching_bottles_accumulates_separately() {
        let mut l = ledger();
        l.select(IngredientId::alko(1));
        l.pour(1.0, true);
        l.select(IngredientId::energy(2));
        l.pour(0.25, true);
        l.select(IngredientId::alko(1));
        l.pour(0.5, true);

        assert_eq!(l.amount(IngredientId::alko(1)), 150.0);
        assert_eq!(l.amount(IngredientId::energy(2)), 25.0);
        assert_eq!(l.total_units(), 175.0);
        assert_eq!(l.family_total(IngredientFamily::Alko), 150.0);
        assert_eq!(l.family_total(IngredientFamily::Energy), 25.0);
    }

    #[test]
    fn partial_increment_near_cap() {
        let mut l = ledger();
        l.select(IngredientId::alko(3));
        l.add_units(IngredientId::alko(3), 480.0);

        // 0.5s would add 50 units, only 20 fit
        let added = l.pour(0.5, true);
        assert_eq!(added, 20.0);
        assert_eq!(l.total_units(), 500.0);
        assert_eq!(l.amount(IngredientId::alko(3)), 500.0);
        assert!(l.is_full());

        // Full glass: further pours add nothing
        assert_eq!(l.pour(1.0, true), 0.0);
        assert_eq!(l.total_units(), 500.0);
    }

    #[test]
    fn negative_or_nan_input_adds_nothing() {
        let mut l = ledger();
        l.select(IngredientId::alko(1));
        assert_eq!(l.pour(-1.0, true), 0.0);
        assert_eq!(l.pour(f64::NAN, true), 0.0);
        assert_eq!(l.add_units(IngredientId::alko(1), -5.0), 0.0);
        assert!(l.is_empty());
    }

    #[test]
    fn fill_fraction_is_clamped() {
        let mut l = ledger();
        assert_eq!(l.fill_fraction(), 0.0);
        l.add_units(IngredientId::energy(1), 350.0);
        assert_eq!(l.fill_fraction(), 0.7);
        l.add_units(IngredientId::energy(1), 1000.0);
        assert_eq!(l.fill_fraction(), 1.0);
    }

    #[test]
    fn random_pours_never_overshoot() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let mut l = ledger();
            for _ in 0..rng.gen_range(1..400) {
                let slot = rng.gen_range(1..=5);
                let id = if rng.gen_bool(0.5) {
                    IngredientId::alko(slot)
                } else {
                    IngredientId::energy(slot)
                };
                l.select(id);
                l.pour(rng.gen_range(0.0..0.2), rng.gen_bool(0.8));
                assert!(
                    l.total_units() <= l.max_total_units(),
                    "overshoot: {} > {}",
                    l.total_units(),
                    l.max_total_units()
                );
            }
        }
    }

    #[test]
    fn clear_resets_everything() {
        let mut l = ledger();
        l.select(IngredientId::alko(2));
        l.pour(2.0, true);
        l.clear();
        assert!(l.is_empty());
        assert_eq!(l.selected(), None);
        assert_eq!(l.amounts().count(), 0);
    }
}
