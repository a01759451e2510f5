//! Events emitted by the session for the outcome presenter
//!
//! The core never draws anything. It reports what happened and the
//! presenter decides how to show it.

use metalmix_common::DrinkResult;
use serde::Serialize;

use crate::presentation::PresentationCue;

/// Why a serve was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServeRejection {
    /// Glass is below the serve fill threshold
    InsufficientFill,
}

impl ServeRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServeRejection::InsufficientFill => "insufficient_fill",
        }
    }
}

/// Session-level events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    /// The drink was mixed and its outcome frozen
    MixComputed {
        result: DrinkResult,
        aggro: f64,
        energy_stat: f64,
        clarity: f64,
        score: u32,
    },
    /// Serve refused; the session can be served again right away
    ServeRejected {
        reason: ServeRejection,
        fill_fraction: f64,
    },
    /// Drink handed over. `forfeit` is set when the countdown ran out.
    ServeAccepted {
        result: DrinkResult,
        score: u32,
        variant: u8,
        forfeit: bool,
    },
    /// Session wiped for a retry
    SessionReset,
}

impl SessionEvent {
    /// Forward this event to the matching presenter callback
    pub fn dispatch(&self, presenter: &mut dyn OutcomePresenter) {
        match *self {
            SessionEvent::MixComputed { result, aggro, energy_stat, clarity, score } => {
                presenter.on_mix_computed(result, aggro, energy_stat, clarity, score)
            }
            SessionEvent::ServeRejected { reason, .. } => presenter.on_serve_rejected(reason),
            SessionEvent::ServeAccepted { result, score, variant, .. } => {
                presenter.on_serve_accepted(result, score, variant)
            }
            SessionEvent::SessionReset => presenter.on_session_reset(),
        }
    }
}

/// Receiver of session outcomes (animation, audio, score UI).
///
/// Every callback defaults to a no-op so presenters only implement what
/// they show.
pub trait OutcomePresenter {
    fn on_mix_computed(
        &mut self,
        _result: DrinkResult,
        _aggro: f64,
        _energy_stat: f64,
        _clarity: f64,
        _score: u32,
    ) {
    }

    fn on_serve_rejected(&mut self, _reason: ServeRejection) {}

    fn on_serve_accepted(&mut self, _result: DrinkResult, _score: u32, _variant: u8) {}

    fn on_session_reset(&mut self) {}

    /// A timed step of the serve sequence became due
    fn on_cue(&mut self, _cue: &PresentationCue) {}
}

/// Presenter that ignores everything
pub struct NullPresenter;

impl OutcomePresenter for NullPresenter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl OutcomePresenter for Recorder {
        fn on_mix_computed(&mut self, result: DrinkResult, _a: f64, _e: f64, _c: f64, score: u32) {
            self.calls.push(format!("mix:{}:{}", result, score));
        }

        fn on_serve_rejected(&mut self, reason: ServeRejection) {
            self.calls.push(format!("rejected:{}", reason.as_str()));
        }

        fn on_serve_accepted(&mut self, result: DrinkResult, score: u32, variant: u8) {
            self.calls.push(format!("served:{}:{}:{}", result, score, variant));
        }
    }

    #[test]
    fn dispatch_routes_to_callbacks() {
        let mut rec = Recorder::default();
        SessionEvent::MixComputed {
            result: DrinkResult::Decent,
            aggro: 1.0,
            energy_stat: 2.0,
            clarity: 0.0,
            score: 200,
        }
        .dispatch(&mut rec);
        SessionEvent::ServeRejected {
            reason: ServeRejection::InsufficientFill,
            fill_fraction: 0.5,
        }
        .dispatch(&mut rec);
        SessionEvent::ServeAccepted {
            result: DrinkResult::Decent,
            score: 200,
            variant: 4,
            forfeit: false,
        }
        .dispatch(&mut rec);
        // Uses the default no-op
        SessionEvent::SessionReset.dispatch(&mut rec);

        assert_eq!(
            rec.calls,
            vec!["mix:Decent:200", "rejected:insufficient_fill", "served:Decent:200:4"]
        );
    }
}
