//! Common types shared across the MetalMix crates
//!
//! Holds the vocabulary every crate speaks: which bottles exist, what a
//! finished drink is called, and the configuration tables loaded from TOML.

pub mod config;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{AppConfig, ConfigError, MixerConfig, PresentationTiming, ThresholdConfig, ThresholdPreset};

// ---------------------------------------------------------------------------
// Ingredients
// ---------------------------------------------------------------------------

/// The two bottle shelves behind the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IngredientFamily {
    Alko,
    Energy,
}

impl IngredientFamily {
    /// Prefix used in ingredient identifiers ("Alko3", "Energy1")
    pub fn prefix(&self) -> &'static str {
        match self {
            IngredientFamily::Alko => "Alko",
            IngredientFamily::Energy => "Energy",
        }
    }

    /// Get all families
    pub fn all() -> [IngredientFamily; 2] {
        [IngredientFamily::Alko, IngredientFamily::Energy]
    }
}

/// A bottle identifier: family plus a 1-based slot on that shelf.
///
/// How many slots exist is decided by the ingredient table, not by this type.
/// The textual form is `<Family><slot>`, e.g. `Alko2` or `Energy5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IngredientId {
    pub family: IngredientFamily,
    pub slot: u8,
}

impl IngredientId {
    pub const fn new(family: IngredientFamily, slot: u8) -> Self {
        Self { family, slot }
    }

    pub const fn alko(slot: u8) -> Self {
        Self::new(IngredientFamily::Alko, slot)
    }

    pub const fn energy(slot: u8) -> Self {
        Self::new(IngredientFamily::Energy, slot)
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.prefix(), self.slot)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngredientParseError {
    #[error("Unknown ingredient family in '{0}' (expected Alko<n> or Energy<n>)")]
    UnknownFamily(String),

    #[error("Invalid ingredient slot in '{0}' (expected a number from 1 to 255)")]
    InvalidSlot(String),
}

impl FromStr for IngredientId {
    type Err = IngredientParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();

        let family = IngredientFamily::all()
            .into_iter()
            .find(|f| lower.starts_with(&f.prefix().to_ascii_lowercase()))
            .ok_or_else(|| IngredientParseError::UnknownFamily(s.to_string()))?;

        let digits = &trimmed[family.prefix().len()..];
        let slot: u8 = digits
            .parse()
            .map_err(|_| IngredientParseError::InvalidSlot(s.to_string()))?;
        if slot == 0 {
            return Err(IngredientParseError::InvalidSlot(s.to_string()));
        }

        Ok(Self { family, slot })
    }
}

impl TryFrom<String> for IngredientId {
    type Error = IngredientParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IngredientId> for String {
    fn from(id: IngredientId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Drink result
// ---------------------------------------------------------------------------

/// Coarse outcome of a mixed drink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrinkResult {
    /// Nothing mixed yet
    #[default]
    None,
    Boring,
    Decent,
    Overkill,
    Death,
}

impl DrinkResult {
    /// Whether this is a real outcome rather than the pre-mix sentinel
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DrinkResult::None)
    }

    /// Get the display name for this result
    pub fn display_name(&self) -> &str {
        match self {
            DrinkResult::None => "Nothing yet",
            DrinkResult::Boring => "Boring",
            DrinkResult::Decent => "Decent",
            DrinkResult::Overkill => "Overkill",
            DrinkResult::Death => "Death",
        }
    }

    /// Get all terminal results
    pub fn all_terminal() -> [DrinkResult; 4] {
        [
            DrinkResult::Boring,
            DrinkResult::Decent,
            DrinkResult::Overkill,
            DrinkResult::Death,
        ]
    }
}

impl fmt::Display for DrinkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredient_id_round_trips_through_text() {
        let id: IngredientId = "Energy4".parse().unwrap();
        assert_eq!(id, IngredientId::energy(4));
        assert_eq!(id.to_string(), "Energy4");
    }

    #[test]
    fn ingredient_id_parse_is_case_insensitive() {
        assert_eq!("alko2".parse::<IngredientId>().unwrap(), IngredientId::alko(2));
        assert_eq!(" ENERGY1 ".parse::<IngredientId>().unwrap(), IngredientId::energy(1));
    }

    #[test]
    fn ingredient_id_rejects_garbage() {
        assert!(matches!(
            "Vodka1".parse::<IngredientId>(),
            Err(IngredientParseError::UnknownFamily(_))
        ));
        assert!(matches!(
            "Alko".parse::<IngredientId>(),
            Err(IngredientParseError::InvalidSlot(_))
        ));
        assert!(matches!(
            "Alko0".parse::<IngredientId>(),
            Err(IngredientParseError::InvalidSlot(_))
        ));
    }

    #[test]
    fn drink_result_terminal_values() {
        assert!(!DrinkResult::None.is_terminal());
        assert!(DrinkResult::all_terminal().iter().all(|r| r.is_terminal()));
        assert_eq!(DrinkResult::default(), DrinkResult::None);
    }
}
