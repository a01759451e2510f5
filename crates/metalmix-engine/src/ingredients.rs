//! Ingredient table: per-unit effect of every bottle on the three latent axes
//!
//! Each ingredient pushes a drink along:
//!   - `aggro`    how hard it hits
//!   - `energy`   how much it keeps the vocalist going
//!   - `clarity`  how clean the head stays (negative = muddled)
//!
//! The built-in table has five bottles per shelf. A custom table can be
//! loaded from JSON:
//!
//! ```json
//! [{ "id": "Alko1", "aggro": 3, "energy": 0, "clarity": -3 }]
//! ```

use std::collections::HashMap;

use metalmix_common::{IngredientFamily, IngredientId};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Effect of one full factor (see `units_per_factor`) of an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IngredientEffect {
    pub aggro: f64,
    pub energy: f64,
    pub clarity: f64,
}

impl IngredientEffect {
    pub const fn new(aggro: f64, energy: f64, clarity: f64) -> Self {
        Self { aggro, energy, clarity }
    }

    fn is_finite(&self) -> bool {
        self.aggro.is_finite() && self.energy.is_finite() && self.clarity.is_finite()
    }
}

/// Latent attributes of a mixed drink (summed over all poured ingredients)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatentAttributes {
    pub aggro: f64,
    pub energy_stat: f64,
    pub clarity: f64,
}

impl LatentAttributes {
    /// Combined punch of the drink
    pub fn power(&self) -> f64 {
        self.aggro + self.energy_stat
    }

    pub fn abs_clarity(&self) -> f64 {
        self.clarity.abs()
    }
}

/// Built-in bottles: (id, aggro, energy, clarity)
const BUILTIN_EFFECTS: [(IngredientId, IngredientEffect); 10] = [
    (IngredientId::alko(1), IngredientEffect::new(3.0, 0.0, -3.0)),   // classic
    (IngredientId::alko(2), IngredientEffect::new(5.0, 1.0, -5.0)),   // hardcore
    (IngredientId::alko(3), IngredientEffect::new(2.0, 3.0, -2.0)),   // whisky
    (IngredientId::alko(4), IngredientEffect::new(6.0, 2.0, -6.0)),   // metal fuel
    (IngredientId::alko(5), IngredientEffect::new(2.0, -3.0, 2.0)),   // beer
    (IngredientId::energy(1), IngredientEffect::new(0.0, 4.0, -2.0)), // energy drink
    (IngredientId::energy(2), IngredientEffect::new(1.0, 8.0, -2.0)), // double-strength energy drink
    (IngredientId::energy(3), IngredientEffect::new(0.0, 3.0, 2.0)),  // mate
    (IngredientId::energy(4), IngredientEffect::new(-2.0, -2.0, 4.0)), // isotonic
    (IngredientId::energy(5), IngredientEffect::new(-0.5, -0.5, 0.5)), // balancer
];

#[derive(Debug, Deserialize)]
struct TableEntry {
    id: IngredientId,
    #[serde(default)]
    aggro: f64,
    #[serde(default)]
    energy: f64,
    #[serde(default)]
    clarity: f64,
}

// ---------------------------------------------------------------------------
// Ingredient table
// ---------------------------------------------------------------------------

/// Lookup from ingredient to its effect
#[derive(Debug, Clone)]
pub struct IngredientTable {
    effects: HashMap<IngredientId, IngredientEffect>,
}

impl Default for IngredientTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IngredientTable {
    /// The ten bottles behind the bar
    pub fn builtin() -> Self {
        Self {
            effects: BUILTIN_EFFECTS.iter().copied().collect(),
        }
    }

    /// Parse a table from a JSON array of `{id, aggro, energy, clarity}` entries
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<TableEntry> = serde_json::from_str(json)?;
        if entries.is_empty() {
            return Err(EngineError::EmptyTable);
        }

        let mut effects = HashMap::with_capacity(entries.len());
        for entry in entries {
            let effect = IngredientEffect::new(entry.aggro, entry.energy, entry.clarity);
            if !effect.is_finite() {
                return Err(EngineError::InvalidEffect { id: entry.id });
            }
            if effects.insert(entry.id, effect).is_some() {
                return Err(EngineError::DuplicateIngredient(entry.id));
            }
        }

        tracing::info!("Ingredient table loaded: {} ingredients", effects.len());
        Ok(Self { effects })
    }

    /// Get an ingredient's effect
    pub fn get(&self, id: IngredientId) -> Option<&IngredientEffect> {
        self.effects.get(&id)
    }

    pub fn contains(&self, id: IngredientId) -> bool {
        self.effects.contains_key(&id)
    }

    /// All known ids, sorted by family then slot
    pub fn ids(&self) -> Vec<IngredientId> {
        let mut ids: Vec<IngredientId> = self.effects.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Known ids on one shelf, sorted by slot
    pub fn ids_in_family(&self, family: IngredientFamily) -> Vec<IngredientId> {
        self.ids().into_iter().filter(|id| id.family == family).collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    // -----------------------------------------------------------------------
    // Attribute aggregation
    // -----------------------------------------------------------------------

    /// Sum the effect of every poured amount.
    ///
    /// Each amount contributes `effect * (amount / units_per_factor)`.
    /// Ids missing from the table contribute nothing. No clamping is applied.
    pub fn compute_latent_attributes<I>(&self, amounts: I, units_per_factor: f64) -> LatentAttributes
    where
        I: IntoIterator<Item = (IngredientId, f64)>,
    {
        let mut attrs = LatentAttributes::default();
        for (id, amount) in amounts {
            let Some(effect) = self.effects.get(&id) else {
                tracing::debug!("Ignoring {:.1} units of unknown ingredient {}", amount, id);
                continue;
            };

            let factor = amount / units_per_factor;
            attrs.aggro += effect.aggro * factor;
            attrs.energy_stat += effect.energy * factor;
            attrs.clarity += effect.clarity * factor;
        }
        attrs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
