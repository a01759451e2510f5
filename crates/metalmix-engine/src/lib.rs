//! MetalMix engine: mix scoring, outcome selection and session flow
//!
//! Architecture:
//!   ingredients   per-bottle effects, latent attribute aggregation
//!   ledger        poured amounts, capacity clamp
//!   thresholds    classifier / score / variant tables
//!   mix           the mix computation
//!   session       state machine (pour → mix → serve → done, reset)
//!   presentation  cancellable serve cue timeline
//!   game          per-frame host loop tying it together

pub mod error;
pub mod events;
pub mod game;
pub mod ingredients;
pub mod ledger;
pub mod mix;
pub mod presentation;
pub mod session;
pub mod thresholds;

pub use error::{EngineError, Result};
pub use events::{NullPresenter, OutcomePresenter, ServeRejection, SessionEvent};
pub use game::{FrameInput, FrameReport, MixerGame};
pub use ingredients::{IngredientEffect, IngredientTable, LatentAttributes};
pub use ledger::PourLedger;
pub use mix::{MixEngine, MixOutcome, ScoreBreakdown};
pub use presentation::{PresentationCue, PresentationSequence, TimedCue};
pub use session::{ServeOutcome, Session, SessionState};
pub use thresholds::{BaseScores, ComboTuning, ThresholdSet, VariantThresholds, MAX_VARIANT};

pub use metalmix_common::{DrinkResult, IngredientFamily, IngredientId, MixerConfig};
