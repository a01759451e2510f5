//! Session state machine: pour, mix, serve, retry
//!
//! ```text
//!   Idle ──select──▶ Pouring ──mix──▶ Mixed ──serve (fill ≥ 70%)──▶ Serving ──presentation done──▶ Done
//!     │                 │               │                              ▲
//!     └────mix──────────┼───────────────┘                              │
//!     └─────────────────┴──────countdown expired (forfeit, Boring)─────┘
//!
//!   any state ──reset──▶ Idle
//! ```
//!
//! Mix and serve are one-shot latches: once they succeed, repeating the
//! action is a silent no-op until the next reset. Invalid actions are never
//! errors, they are ignored.

use metalmix_common::{DrinkResult, IngredientId, MixerConfig};
use serde::Serialize;

use crate::events::{ServeRejection, SessionEvent};
use crate::ingredients::{IngredientTable, LatentAttributes};
use crate::ledger::PourLedger;
use crate::mix::{MixEngine, MixOutcome};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Pouring,
    Mixed,
    Serving,
    Done,
}

impl SessionState {
    /// Mixing (and pouring) is over
    pub fn is_mixed_or_later(&self) -> bool {
        matches!(self, SessionState::Mixed | SessionState::Serving | SessionState::Done)
    }

    /// The drink has been handed over
    pub fn is_served(&self) -> bool {
        matches!(self, SessionState::Serving | SessionState::Done)
    }
}

/// What was handed to the vocalist
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServeOutcome {
    pub result: DrinkResult,
    pub score: u32,
    pub variant: u8,
    /// The countdown ran out before a manual serve
    pub forfeit: bool,
}

/// One drink, from empty glass to served
pub struct Session {
    engine: MixEngine,
    ledger: PourLedger,
    state: SessionState,
    mix: Option<MixOutcome>,
    served: Option<ServeOutcome>,
    countdown_limit: f64,
    countdown_elapsed: f64,
    serve_fill_threshold: f64,
    /// Bumped on every reset so stale presentation signals can be told apart
    epoch: u64,
}

impl Session {
    pub fn new(engine: MixEngine, config: &MixerConfig) -> Self {
        Self {
            engine,
            ledger: PourLedger::from_config(config),
            state: SessionState::Idle,
            mix: None,
            served: None,
            countdown_limit: config.countdown_seconds,
            countdown_elapsed: 0.0,
            serve_fill_threshold: config.serve_fill_threshold,
            epoch: 0,
        }
    }

    /// Session with the built-in ingredient table
    pub fn with_config(config: &MixerConfig) -> Self {
        Self::new(MixEngine::from_config(IngredientTable::builtin(), config), config)
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    /// Pick the bottle to pour from. Ignored once mixed.
    pub fn select_ingredient(&mut self, id: IngredientId) {
        if self.state.is_mixed_or_later() {
            tracing::debug!("Ignoring bottle {} in state {:?}", id, self.state);
            return;
        }
        self.ledger.select(id);
        if self.state == SessionState::Idle {
            self.state = SessionState::Pouring;
        }
    }

    /// One frame of pouring. Returns the units added.
    pub fn pour(&mut self, dt: f64, trigger_held: bool) -> f64 {
        if self.state != SessionState::Pouring {
            return 0.0;
        }
        self.ledger.pour(dt, trigger_held)
    }

    /// Freeze the drink. Only the first call per session computes anything.
    pub fn trigger_mix(&mut self) -> Option<SessionEvent> {
        if self.state.is_mixed_or_later() {
            tracing::debug!("Mix ignored in state {:?}", self.state);
            return None;
        }

        let outcome = self.engine.compute(&self.ledger);
        tracing::info!(
            "Mixed: result={} aggro={:.2} energy={:.2} clarity={:.2} power={:.2} score={} (base {} + combo {}) variant={}",
            outcome.result,
            outcome.attributes.aggro,
            outcome.attributes.energy_stat,
            outcome.attributes.clarity,
            outcome.power,
            outcome.score,
            outcome.base_score,
            outcome.combo_bonus,
            outcome.variant
        );

        let event = SessionEvent::MixComputed {
            result: outcome.result,
            aggro: outcome.attributes.aggro,
            energy_stat: outcome.attributes.energy_stat,
            clarity: outcome.attributes.clarity,
            score: outcome.score,
        };
        self.mix = Some(outcome);
        self.state = SessionState::Mixed;
        Some(event)
    }

    /// Hand the mixed drink over, if the glass is full enough
    pub fn trigger_serve(&mut self) -> Option<SessionEvent> {
        if self.state != SessionState::Mixed {
            tracing::debug!("Serve ignored in state {:?}", self.state);
            return None;
        }
        let mix = self.mix.as_ref()?;

        let fill_fraction = self.ledger.fill_fraction();
        if fill_fraction < self.serve_fill_threshold {
            tracing::warn!(
                "Serve rejected: glass at {:.0}% (need {:.0}%)",
                fill_fraction * 100.0,
                self.serve_fill_threshold * 100.0
            );
            return Some(SessionEvent::ServeRejected {
                reason: ServeRejection::InsufficientFill,
                fill_fraction,
            });
        }

        let outcome = ServeOutcome {
            result: mix.result,
            score: mix.score,
            variant: mix.variant,
            forfeit: false,
        };
        Some(self.enter_serving(outcome))
    }

    /// Run the global countdown. When it expires before a serve, the drink
    /// is forfeited as boring.
    pub fn tick_countdown(&mut self, dt: f64) -> Option<SessionEvent> {
        if self.state.is_served() {
            return None;
        }
        if dt > 0.0 {
            self.countdown_elapsed += dt;
        }
        if self.countdown_elapsed < self.countdown_limit {
            return None;
        }

        let attributes = self
            .mix
            .as_ref()
            .map(|m| m.attributes)
            .unwrap_or_default();
        let outcome = ServeOutcome {
            result: DrinkResult::Boring,
            score: self.mix.as_ref().map(|m| m.score).unwrap_or(0),
            variant: self.engine.variant(DrinkResult::Boring, &attributes),
            forfeit: true,
        };
        tracing::warn!("Time is up after {:.1}s, auto-serving a boring drink", self.countdown_elapsed);
        Some(self.enter_serving(outcome))
    }

    /// The presenter finished the serve sequence of `epoch`
    pub fn presentation_finished(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            tracing::debug!("Ignoring presentation signal from epoch {} (now {})", epoch, self.epoch);
            return false;
        }
        if self.state != SessionState::Serving {
            return false;
        }
        self.state = SessionState::Done;
        tracing::info!("Session done");
        true
    }

    /// Wipe the session for a retry
    pub fn reset(&mut self) -> SessionEvent {
        self.ledger.clear();
        self.state = SessionState::Idle;
        self.mix = None;
        self.served = None;
        self.countdown_elapsed = 0.0;
        self.epoch += 1;
        tracing::info!("Session reset (epoch {})", self.epoch);
        SessionEvent::SessionReset
    }

    fn enter_serving(&mut self, outcome: ServeOutcome) -> SessionEvent {
        tracing::info!(
            "Served: result={} score={} variant={}{}",
            outcome.result,
            outcome.score,
            outcome.variant,
            if outcome.forfeit { " (forfeit)" } else { "" }
        );
        self.served = Some(outcome);
        self.state = SessionState::Serving;
        SessionEvent::ServeAccepted {
            result: outcome.result,
            score: outcome.score,
            variant: outcome.variant,
            forfeit: outcome.forfeit,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn ledger(&self) -> &PourLedger {
        &self.ledger
    }

    pub fn engine(&self) -> &MixEngine {
        &self.engine
    }

    /// Active bottle (for highlighting)
    pub fn selected(&self) -> Option<IngredientId> {
        self.ledger.selected()
    }

    pub fn fill_fraction(&self) -> f64 {
        self.ledger.fill_fraction()
    }

    /// Frozen mix outcome, once mixed
    pub fn mix_outcome(&self) -> Option<&MixOutcome> {
        self.mix.as_ref()
    }

    /// Frozen latent attributes (zeros before mixing)
    pub fn attributes(&self) -> LatentAttributes {
        self.mix.as_ref().map(|m| m.attributes).unwrap_or_default()
    }

    /// Result as presented: the served result once served, else the mixed one
    pub fn result(&self) -> DrinkResult {
        self.served
            .map(|s| s.result)
            .or_else(|| self.mix.as_ref().map(|m| m.result))
            .unwrap_or(DrinkResult::None)
    }

    pub fn serve_outcome(&self) -> Option<&ServeOutcome> {
        self.served.as_ref()
    }

    /// Seconds left before the forced serve
    pub fn countdown_remaining(&self) -> f64 {
        (self.countdown_limit - self.countdown_elapsed).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::with_config(&MixerConfig::default())
    }

    /// Pour `units` of `id` (100 units per second)
    fn pour_units(s: &mut Session, id: IngredientId, units: f64) {
        s.select_ingredient(id);
        s.pour(units / 100.0, true);
    }

    #[test]
    fn starts_idle_and_selection_starts_pouring() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.pour(1.0, true), 0.0, "no pouring while idle");

        s.select_ingredient(IngredientId::alko(1));
        assert_eq!(s.state(), SessionState::Pouring);
        assert_eq!(s.selected(), Some(IngredientId::alko(1)));
        assert_eq!(s.pour(1.0, true), 100.0);
    }

    #[test]
    fn mix_is_a_one_shot_latch() {
        let mut s = session();
        pour_units(&mut s, IngredientId::alko(2), 200.0);

        let first = s.trigger_mix();
        assert!(matches!(first, Some(SessionEvent::MixComputed { .. })));
        let frozen = s.mix_outcome().cloned().unwrap();

        assert_eq!(s.trigger_mix(), None);
        assert_eq!(s.mix_outcome(), Some(&frozen));
        assert_eq!(s.state(), SessionState::Mixed);
    }

    #[test]
    fn ledger_is_frozen_after_mix() {
        let mut s = session();
        pour_units(&mut s, IngredientId::alko(1), 100.0);
        s.trigger_mix();

        s.select_ingredient(IngredientId::energy(1));
        assert_eq!(s.selected(), Some(IngredientId::alko(1)), "selection ignored after mix");
        assert_eq!(s.pour(1.0, true), 0.0);
        assert_eq!(s.ledger().total_units(), 100.0);
    }

    #[test]
    fn mix_from_idle_is_boring() {
        let mut s = session();
        let event = s.trigger_mix();
        assert_eq!(
            event,
            Some(SessionEvent::MixComputed {
                result: DrinkResult::Boring,
                aggro: 0.0,
                energy_stat: 0.0,
                clarity: 0.0,
                score: 41,
            })
        );
    }

    #[test]
    fn serve_before_mix_is_ignored() {
        let mut s = session();
        pour_units(&mut s, IngredientId::alko(1), 500.0);
        assert_eq!(s.trigger_serve(), None);
        assert_eq!(s.state(), SessionState::Pouring);
    }

    #[test]
    fn serve_threshold_is_exact() {
        let mut low = session();
        pour_units(&mut low, IngredientId::energy(1), 349.5);
        low.trigger_mix();
        assert!((low.fill_fraction() - 0.699).abs() < 1e-12);
        let rejected = low.trigger_serve();
        assert!(matches!(
            rejected,
            Some(SessionEvent::ServeRejected { reason: ServeRejection::InsufficientFill, .. })
        ));
        assert_eq!(low.state(), SessionState::Mixed, "rejection is recoverable");

        let mut exact = session();
        pour_units(&mut exact, IngredientId::energy(1), 350.0);
        exact.trigger_mix();
        assert_eq!(exact.fill_fraction(), 0.70);
        assert!(matches!(exact.trigger_serve(), Some(SessionEvent::ServeAccepted { forfeit: false, .. })));
        assert_eq!(exact.state(), SessionState::Serving);
    }

    #[test]
    fn rejected_serve_can_be_retried() {
        let mut s = session();
        pour_units(&mut s, IngredientId::alko(3), 100.0);
        s.trigger_mix();
        assert!(matches!(s.trigger_serve(), Some(SessionEvent::ServeRejected { .. })));
        assert!(matches!(s.trigger_serve(), Some(SessionEvent::ServeRejected { .. })));
        assert_eq!(s.state(), SessionState::Mixed);
    }

    #[test]
    fn serve_is_a_one_shot_latch() {
        let mut s = session();
        pour_units(&mut s, IngredientId::alko(3), 400.0);
        s.trigger_mix();
        assert!(s.trigger_serve().is_some());
        assert_eq!(s.trigger_serve(), None);
        assert_eq!(s.tick_countdown(100.0), None, "countdown after serve is a no-op");
        assert_eq!(s.serve_outcome().map(|o| o.forfeit), Some(false));
    }

    #[test]
    fn countdown_forfeits_as_boring() {
        let mut s = session();
        // Would be death if served normally
        pour_units(&mut s, IngredientId::alko(2), 500.0);
        s.trigger_mix();
        assert_eq!(s.mix_outcome().unwrap().result, DrinkResult::Death);

        assert_eq!(s.tick_countdown(59.9), None);
        assert!((s.countdown_remaining() - 0.1).abs() < 1e-9);

        let event = s.tick_countdown(0.1);
        assert!(matches!(
            event,
            Some(SessionEvent::ServeAccepted { result: DrinkResult::Boring, forfeit: true, .. })
        ));
        assert_eq!(s.state(), SessionState::Serving);
        assert_eq!(s.result(), DrinkResult::Boring);
        // Frozen mix stays as it was
        assert_eq!(s.mix_outcome().unwrap().result, DrinkResult::Death);

        assert_eq!(s.tick_countdown(1.0), None);
        assert_eq!(s.trigger_serve(), None);
    }

    #[test]
    fn countdown_forfeit_without_mix() {
        let mut s = session();
        pour_units(&mut s, IngredientId::alko(1), 100.0);
        let event = s.tick_countdown(60.0);
        assert_eq!(
            event,
            Some(SessionEvent::ServeAccepted {
                result: DrinkResult::Boring,
                score: 0,
                variant: 0,
                forfeit: true,
            })
        );
        assert_eq!(s.trigger_mix(), None, "no mixing after the forfeit");
    }

    #[test]
    fn presentation_finish_moves_to_done() {
        let mut s = session();
        pour_units(&mut s, IngredientId::alko(3), 400.0);
        s.trigger_mix();
        s.trigger_serve();

        assert!(!s.presentation_finished(s.epoch() + 1), "wrong epoch");
        assert!(s.presentation_finished(s.epoch()));
        assert_eq!(s.state(), SessionState::Done);
        assert!(!s.presentation_finished(s.epoch()), "already done");
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = session();
        pour_units(&mut s, IngredientId::alko(3), 400.0);
        s.trigger_mix();
        s.trigger_serve();
        s.tick_countdown(10.0);
        let old_epoch = s.epoch();

        assert_eq!(s.reset(), SessionEvent::SessionReset);
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.epoch(), old_epoch + 1);
        assert!(s.ledger().is_empty());
        assert_eq!(s.selected(), None);
        assert!(s.mix_outcome().is_none());
        assert!(s.serve_outcome().is_none());
        assert_eq!(s.result(), DrinkResult::None);
        assert_eq!(s.attributes(), LatentAttributes::default());
        assert_eq!(s.countdown_remaining(), 60.0);

        // Stale completion from the previous drink does nothing
        assert!(!s.presentation_finished(old_epoch));
    }
}
