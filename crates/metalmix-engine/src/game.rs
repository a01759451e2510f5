//! Host loop glue: one frame of input in, events and cues out
//!
//! `MixerGame` owns the session and the running serve presentation. Each
//! frame is processed in a fixed order so races resolve the same way every
//! time:
//!
//!   1. retry (reset, cancels the presentation, ends the frame)
//!   2. bottle selection
//!   3. pouring
//!   4. mix
//!   5. countdown
//!   6. manual serve
//!   7. presentation tick
//!
//! Countdown runs before the manual serve, so when both fire in one frame
//! the forfeit wins and the serve hits the closed latch.

use metalmix_common::{IngredientId, MixerConfig, PresentationTiming};

use crate::error::Result;
use crate::events::{OutcomePresenter, SessionEvent};
use crate::ingredients::IngredientTable;
use crate::mix::MixEngine;
use crate::presentation::{PresentationCue, PresentationSequence};
use crate::session::{Session, SessionState};

/// Player input sampled for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Bottle clicked this frame
    pub select: Option<IngredientId>,
    /// Pour trigger held down
    pub pour_held: bool,
    pub mix: bool,
    pub serve: bool,
    pub retry: bool,
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub events: Vec<SessionEvent>,
    pub cues: Vec<PresentationCue>,
    pub poured: f64,
}

pub struct MixerGame {
    session: Session,
    timing: PresentationTiming,
    presentation: Option<PresentationSequence>,
}

impl MixerGame {
    pub fn new(session: Session, timing: PresentationTiming) -> Self {
        Self {
            session,
            timing,
            presentation: None,
        }
    }

    pub fn from_config(table: IngredientTable, config: &MixerConfig) -> Self {
        let engine = MixEngine::from_config(table, config);
        Self::new(Session::new(engine, config), config.timing.clone())
    }

    /// Like `from_config`, but refuses a config that fails validation
    pub fn try_from_config(table: IngredientTable, config: &MixerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(table, config))
    }

    /// Process one frame of `dt` seconds
    pub fn update(
        &mut self,
        dt: f64,
        input: &FrameInput,
        presenter: &mut dyn OutcomePresenter,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        if input.retry {
            report.events.push(self.reset(presenter));
            return report;
        }

        if let Some(id) = input.select {
            self.session.select_ingredient(id);
        }
        report.poured = self.session.pour(dt, input.pour_held);

        if input.mix {
            if let Some(event) = self.session.trigger_mix() {
                report.events.push(event);
            }
        }

        if let Some(event) = self.session.tick_countdown(dt) {
            report.events.push(event);
        }

        if input.serve {
            if let Some(event) = self.session.trigger_serve() {
                report.events.push(event);
            }
        }

        for event in &report.events {
            event.dispatch(presenter);
        }

        let started = self.start_presentation_if_served(&report.events);
        report.cues = self.tick_presentation(if started { 0.0 } else { dt }, presenter);
        report
    }

    /// Reset for a retry, dropping any presentation in flight
    pub fn reset(&mut self, presenter: &mut dyn OutcomePresenter) -> SessionEvent {
        if let Some(mut seq) = self.presentation.take() {
            seq.cancel();
        }
        let event = self.session.reset();
        event.dispatch(presenter);
        event
    }

    fn start_presentation_if_served(&mut self, events: &[SessionEvent]) -> bool {
        let accepted = events
            .iter()
            .any(|e| matches!(e, SessionEvent::ServeAccepted { .. }));
        if !accepted {
            return false;
        }
        let Some(outcome) = self.session.serve_outcome() else {
            return false;
        };

        let seq = PresentationSequence::serve(outcome, &self.timing, self.session.epoch());
        tracing::debug!("Serve presentation started ({} cues, {:.2}s)", seq.cues().len(), seq.duration());
        self.presentation = Some(seq);
        true
    }

    fn tick_presentation(&mut self, dt: f64, presenter: &mut dyn OutcomePresenter) -> Vec<PresentationCue> {
        let Some(seq) = self.presentation.as_mut() else {
            return Vec::new();
        };

        let cues = seq.tick(dt as f32);
        for cue in &cues {
            presenter.on_cue(cue);
        }

        if seq.is_finished() {
            let epoch = seq.epoch();
            self.presentation = None;
            self.session.presentation_finished(epoch);
        }
        cues
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn presentation(&self) -> Option<&PresentationSequence> {
        self.presentation.as_ref()
    }

    pub fn is_presenting(&self) -> bool {
        self.presentation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullPresenter;
    use metalmix_common::DrinkResult;

    const DT: f64 = 1.0 / 30.0;

    fn game() -> MixerGame {
        MixerGame::from_config(IngredientTable::builtin(), &MixerConfig::default())
    }

    fn press(input: FrameInput, game: &mut MixerGame) -> FrameReport {
        game.update(DT, &input, &mut NullPresenter)
    }

    #[test]
    fn full_round_reaches_done() {
        let mut g = game();
        press(FrameInput { select: Some(IngredientId::alko(3)), ..Default::default() }, &mut g);
        for _ in 0..150 {
            press(FrameInput { pour_held: true, ..Default::default() }, &mut g);
        }
        assert!(g.session().fill_fraction() >= 0.7);

        let mixed = press(FrameInput { mix: true, ..Default::default() }, &mut g);
        assert!(matches!(mixed.events[..], [SessionEvent::MixComputed { .. }]));

        let served = press(FrameInput { serve: true, ..Default::default() }, &mut g);
        assert!(matches!(served.events[..], [SessionEvent::ServeAccepted { forfeit: false, .. }]));
        assert!(served.cues.contains(&PresentationCue::HideGlass), "t=0 cues fire on the serve frame");
        assert!(g.is_presenting());

        let mut frames = 0;
        while g.state() == SessionState::Serving {
            press(FrameInput::default(), &mut g);
            frames += 1;
            assert!(frames < 1000, "presentation never finished");
        }
        assert_eq!(g.state(), SessionState::Done);
        assert!(!g.is_presenting());
    }

    #[test]
    fn countdown_and_serve_in_same_frame_forfeit_once() {
        let mut config = MixerConfig::default();
        config.countdown_seconds = 5.0;
        let mut g = MixerGame::from_config(IngredientTable::builtin(), &config);

        press(FrameInput { select: Some(IngredientId::alko(3)), ..Default::default() }, &mut g);
        g.update(4.0, &FrameInput { pour_held: true, ..Default::default() }, &mut NullPresenter);
        g.update(0.5, &FrameInput { mix: true, ..Default::default() }, &mut NullPresenter);
        assert_eq!(g.state(), SessionState::Mixed);
        assert!(g.session().fill_fraction() >= 0.7, "a manual serve alone would be accepted");

        let report = g.update(1.0, &FrameInput { serve: true, ..Default::default() }, &mut NullPresenter);
        let accepted: Vec<&SessionEvent> = report
            .events
            .iter()
            .filter(|e| matches!(e, SessionEvent::ServeAccepted { .. }))
            .collect();
        assert_eq!(accepted.len(), 1);
        assert!(matches!(
            accepted[0],
            SessionEvent::ServeAccepted { result: DrinkResult::Boring, forfeit: true, .. }
        ));
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = MixerConfig::default();
        config.units_per_factor = 0.0;
        assert!(MixerGame::try_from_config(IngredientTable::builtin(), &config).is_err());
        assert!(MixerGame::try_from_config(IngredientTable::builtin(), &MixerConfig::default()).is_ok());
    }

    #[test]
    fn retry_mid_presentation_cancels_it() {
        let mut g = game();
        press(FrameInput { select: Some(IngredientId::alko(3)), ..Default::default() }, &mut g);
        g.update(4.0, &FrameInput { pour_held: true, ..Default::default() }, &mut NullPresenter);
        press(FrameInput { mix: true, serve: true, ..Default::default() }, &mut g);
        assert!(g.is_presenting());

        let report = press(FrameInput { retry: true, ..Default::default() }, &mut g);
        assert_eq!(report.events, vec![SessionEvent::SessionReset]);
        assert!(!g.is_presenting());
        assert_eq!(g.state(), SessionState::Idle);

        for _ in 0..300 {
            let report = press(FrameInput::default(), &mut g);
            assert!(report.cues.is_empty());
            assert!(report.events.is_empty());
        }
    }
}
