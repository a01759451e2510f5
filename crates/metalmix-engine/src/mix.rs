//! Mix engine: turns a finished pour into a result, a score and a variant
//!
//! Pipeline:
//!   1. latent attributes = Σ effect × (amount / units_per_factor)
//!   2. result  = ThresholdSet::classify(power, |clarity|)
//!   3. score   = max(0, base[result] + round(power × 4 × balance × fill))
//!   4. variant = VariantThresholds::compute_variant(result, attributes)
//!
//! `MixEngine::compute` is a pure function of the ledger. Mixing only once
//! per drink is the session's job.

use metalmix_common::{DrinkResult, IngredientFamily, MixerConfig};
use serde::Serialize;

use crate::ingredients::{IngredientTable, LatentAttributes};
use crate::ledger::PourLedger;
use crate::thresholds::{ThresholdSet, VariantThresholds};

/// Everything decided when the mix button is pressed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixOutcome {
    pub attributes: LatentAttributes,
    pub power: f64,
    pub abs_clarity: f64,
    pub result: DrinkResult,
    pub base_score: i64,
    pub balance: f64,
    pub fill_fraction: f64,
    pub combo_bonus: i64,
    pub score: u32,
    pub variant: u8,
    /// Liquid poured from the Alko shelf
    pub alko_units: f64,
    /// Liquid poured from the Energy shelf
    pub energy_units: f64,
    pub total_units: f64,
}

/// Score breakdown for one result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub base: i64,
    pub balance: f64,
    pub combo_bonus: i64,
    pub total: u32,
}

pub struct MixEngine {
    table: IngredientTable,
    thresholds: ThresholdSet,
    variants: VariantThresholds,
    units_per_factor: f64,
}

impl MixEngine {
    pub fn new(
        table: IngredientTable,
        thresholds: ThresholdSet,
        variants: VariantThresholds,
        units_per_factor: f64,
    ) -> Self {
        Self {
            table,
            thresholds,
            variants,
            units_per_factor,
        }
    }

    /// Engine with the configured threshold revision
    pub fn from_config(table: IngredientTable, config: &MixerConfig) -> Self {
        Self::new(
            table,
            ThresholdSet::from_config(&config.thresholds),
            VariantThresholds::default(),
            config.units_per_factor,
        )
    }

    pub fn table(&self) -> &IngredientTable {
        &self.table
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    pub fn variants(&self) -> &VariantThresholds {
        &self.variants
    }

    /// Latent attributes of the ledger's current contents
    pub fn latent_attributes(&self, ledger: &PourLedger) -> LatentAttributes {
        self.table
            .compute_latent_attributes(ledger.amounts(), self.units_per_factor)
    }

    /// Compute the full outcome for the ledger's current contents.
    /// An empty glass is a valid (boring) drink.
    pub fn compute(&self, ledger: &PourLedger) -> MixOutcome {
        let attributes = self.latent_attributes(ledger);
        let power = attributes.power();
        let abs_clarity = attributes.abs_clarity();

        let result = self.thresholds.classify(power, abs_clarity);
        let fill_fraction = ledger.fill_fraction();
        let score = self.score(result, &attributes, fill_fraction);
        let variant = self.variants.compute_variant(result, &attributes);

        MixOutcome {
            attributes,
            power,
            abs_clarity,
            result,
            base_score: score.base,
            balance: score.balance,
            fill_fraction,
            combo_bonus: score.combo_bonus,
            score: score.total,
            variant,
            alko_units: ledger.family_total(IngredientFamily::Alko),
            energy_units: ledger.family_total(IngredientFamily::Energy),
            total_units: ledger.total_units(),
        }
    }

    /// Base score plus combo bonus, floored at zero.
    ///
    /// The bonus rounds half to even.
    pub fn score(&self, result: DrinkResult, attrs: &LatentAttributes, fill_fraction: f64) -> ScoreBreakdown {
        let base = self.thresholds.base_scores.for_result(result);
        let combo = &self.thresholds.combo;
        let balance = combo.balance(attrs.abs_clarity());
        let fill = fill_fraction.clamp(0.0, 1.0);

        let raw = attrs.power() * combo.power_multiplier * balance * fill;
        let combo_bonus = if raw.is_finite() {
            raw.round_ties_even() as i64
        } else {
            0
        };

        let total = base.saturating_add(combo_bonus).clamp(0, u32::MAX as i64) as u32;

        ScoreBreakdown {
            base,
            balance,
            combo_bonus,
            total,
        }
    }

    pub fn variant(&self, result: DrinkResult, attrs: &LatentAttributes) -> u8 {
        self.variants.compute_variant(result, attrs)
    }
}
