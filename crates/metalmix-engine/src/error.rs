use metalmix_common::{ConfigError, IngredientId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to parse ingredient table: {0}")]
    TableParseError(#[from] serde_json::Error),

    #[error("Ingredient {0} is listed more than once")]
    DuplicateIngredient(IngredientId),

    #[error("Ingredient {id} has a non-finite effect value")]
    InvalidEffect { id: IngredientId },

    #[error("Ingredient table is empty")]
    EmptyTable,

    #[error("Invalid mixer configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
