//! Threshold tables for classification, scoring and presentation variants
//!
//! Tuning went through several revisions. Each revision is a plain data
//! table here; the shipped one is `ThresholdSet::standard()`, older drafts
//! are kept as named presets.

use metalmix_common::{DrinkResult, ThresholdConfig, ThresholdPreset};

use crate::ingredients::LatentAttributes;

/// Highest presentation variant index
pub const MAX_VARIANT: u8 = 8;

// ---------------------------------------------------------------------------
// Scoring tables
// ---------------------------------------------------------------------------

/// Fixed score per result, before the combo bonus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseScores {
    pub boring: i64,
    pub decent: i64,
    pub overkill: i64,
    pub death: i64,
}

impl Default for BaseScores {
    fn default() -> Self {
        Self {
            boring: 41,
            decent: 163,
            overkill: 287,
            death: 69,
        }
    }
}

impl BaseScores {
    pub fn for_result(&self, result: DrinkResult) -> i64 {
        match result {
            DrinkResult::None => 0,
            DrinkResult::Boring => self.boring,
            DrinkResult::Decent => self.decent,
            DrinkResult::Overkill => self.overkill,
            DrinkResult::Death => self.death,
        }
    }
}

/// Combo bonus shape: `power * power_multiplier * balance * fill`
/// with `balance = clamp01(1 - |clarity| / clarity_span)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboTuning {
    pub power_multiplier: f64,
    pub clarity_span: f64,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            power_multiplier: 4.0,
            clarity_span: 15.0,
        }
    }
}

impl ComboTuning {
    /// How clean the drink is, in `[0, 1]`
    pub fn balance(&self, abs_clarity: f64) -> f64 {
        if self.clarity_span <= 0.0 {
            return 0.0;
        }
        (1.0 - abs_clarity / self.clarity_span).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Classification thresholds
// ---------------------------------------------------------------------------

/// One revision of the result classifier plus its scoring table
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSet {
    pub name: &'static str,
    /// Below this power the drink is boring
    pub boring_below_power: f64,
    /// Upper (inclusive) power bound of a decent drink
    pub decent_max_power: f64,
    pub decent_max_abs_clarity: f64,
    pub overkill_max_abs_clarity: f64,
    pub base_scores: BaseScores,
    pub combo: ComboTuning,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl ThresholdSet {
    /// The shipped revision
    pub fn standard() -> Self {
        Self {
            name: "standard",
            boring_below_power: 6.0,
            decent_max_power: 18.0,
            decent_max_abs_clarity: 4.0,
            overkill_max_abs_clarity: 8.0,
            base_scores: BaseScores::default(),
            combo: ComboTuning::default(),
        }
    }

    /// Earlier draft with a narrower decent band and less tolerance for mud
    pub fn strict() -> Self {
        Self {
            name: "strict",
            boring_below_power: 8.0,
            decent_max_power: 16.0,
            decent_max_abs_clarity: 3.0,
            overkill_max_abs_clarity: 6.0,
            base_scores: BaseScores::default(),
            combo: ComboTuning::default(),
        }
    }

    pub fn preset(preset: ThresholdPreset) -> Self {
        match preset {
            ThresholdPreset::Standard => Self::standard(),
            ThresholdPreset::Strict => Self::strict(),
        }
    }

    /// Preset named in the config with per-field overrides applied
    pub fn from_config(config: &ThresholdConfig) -> Self {
        let mut set = Self::preset(config.preset);
        if let Some(v) = config.boring_below_power {
            set.boring_below_power = v;
        }
        if let Some(v) = config.decent_max_power {
            set.decent_max_power = v;
        }
        if let Some(v) = config.decent_max_abs_clarity {
            set.decent_max_abs_clarity = v;
        }
        if let Some(v) = config.overkill_max_abs_clarity {
            set.overkill_max_abs_clarity = v;
        }
        set
    }

    /// Classify a drink. Rules are checked top to bottom, first match wins:
    ///
    /// ```text
    /// power <  boring_below                                → Boring
    /// boring_below <= power <= decent_max, |c| <= decent_c → Decent
    /// power > decent_max,                  |c| <= over_c   → Overkill
    /// otherwise                                            → Death
    /// ```
    pub fn classify(&self, power: f64, abs_clarity: f64) -> DrinkResult {
        if power < self.boring_below_power {
            DrinkResult::Boring
        } else if power >= self.boring_below_power
            && power <= self.decent_max_power
            && abs_clarity <= self.decent_max_abs_clarity
        {
            DrinkResult::Decent
        } else if power > self.decent_max_power && abs_clarity <= self.overkill_max_abs_clarity {
            DrinkResult::Overkill
        } else {
            DrinkResult::Death
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation variants
// ---------------------------------------------------------------------------

/// Thresholds for refining a result into one of the nine concert variants.
///
/// Independent from `ThresholdSet`: variants only pick presentation assets,
/// so the two tables are allowed to disagree.
///
/// | result   | variants |
/// |----------|----------|
/// | Boring   | 0 calm, 1 mild, 2 flat |
/// | Decent   | 3 light, 4 balanced, 5 loud |
/// | Overkill | 6 clean, 7 muddy |
/// | Death    | 8 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantThresholds {
    /// Boring: both aggro and energy below this → calm
    pub boring_calm_max: f64,
    /// Boring: calm also needs clarity above this
    pub boring_calm_min_clarity: f64,
    /// Boring: both aggro and energy below this → mild
    pub boring_mild_max: f64,
    /// Decent: |aggro - energy| below this → balanced
    pub decent_balance_max_gap: f64,
    /// Decent: balanced also needs clarity above this
    pub decent_balance_min_clarity: f64,
    /// Decent: power below this → light
    pub decent_light_below_power: f64,
    /// Overkill: clarity above this → clean
    pub overkill_clean_min_clarity: f64,
}

impl Default for VariantThresholds {
    fn default() -> Self {
        Self {
            boring_calm_max: 3.0,
            boring_calm_min_clarity: -1.0,
            boring_mild_max: 6.0,
            decent_balance_max_gap: 3.0,
            decent_balance_min_clarity: -2.0,
            decent_light_below_power: 10.0,
            overkill_clean_min_clarity: -3.0,
        }
    }
}

impl VariantThresholds {
    /// Pick a presentation variant in `[0, MAX_VARIANT]`
    pub fn compute_variant(&self, result: DrinkResult, attrs: &LatentAttributes) -> u8 {
        let LatentAttributes { aggro, energy_stat: energy, clarity } = *attrs;

        let variant: i32 = match result {
            DrinkResult::Boring => {
                if energy < self.boring_calm_max
                    && aggro < self.boring_calm_max
                    && clarity > self.boring_calm_min_clarity
                {
                    0
                } else if energy < self.boring_mild_max && aggro < self.boring_mild_max {
                    1
                } else {
                    2
                }
            }
            DrinkResult::Decent => {
                if (aggro - energy).abs() < self.decent_balance_max_gap
                    && clarity > self.decent_balance_min_clarity
                {
                    4
                } else if aggro + energy < self.decent_light_below_power {
                    3
                } else {
                    5
                }
            }
            DrinkResult::Overkill => {
                if clarity > self.overkill_clean_min_clarity {
                    6
                } else {
                    7
                }
            }
            DrinkResult::Death => 8,
            DrinkResult::None => 2,
        };

        variant.clamp(0, MAX_VARIANT as i32) as u8
    }
}
