//! Pour scripts: what the headless player does with the bar
//!
//! A script is a list of pour steps (bottle + seconds the trigger is held)
//! followed by the mix and serve presses. `run` feeds it to a `MixerGame`
//! at a fixed frame rate and keeps ticking until the session is done.

use metalmix_engine::{
    FrameInput, IngredientId, IngredientTable, MixOutcome, MixerGame, OutcomePresenter,
    ServeOutcome, SessionEvent, SessionState,
};
use rand::Rng;
use serde::Serialize;

pub const FPS: f64 = 30.0;
pub const FRAME_DT: f64 = 1.0 / FPS;

/// Extra simulated time allowed after the countdown for the presentation
const PRESENTATION_SLACK_SECS: f64 = 30.0;

/// Hold the pour trigger on one bottle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PourStep {
    pub id: IngredientId,
    pub seconds: f64,
}

/// Parse `Alko2=2.5` into a pour step
pub fn parse_pour(text: &str) -> Result<PourStep, String> {
    let (id, secs) = text
        .split_once('=')
        .ok_or_else(|| format!("expected BOTTLE=SECONDS, got '{}'", text))?;
    let id: IngredientId = id.trim().parse().map_err(|e| format!("{}", e))?;
    let seconds: f64 = secs
        .trim()
        .parse()
        .map_err(|_| format!("invalid pour duration '{}'", secs))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("pour duration must be >= 0, got {}", seconds));
    }
    Ok(PourStep { id, seconds })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub pours: Vec<PourStep>,
    /// Idle seconds between the last pour and the mix press
    pub wait: f64,
    pub mix: bool,
    pub serve: bool,
}

impl Script {
    /// `count` random pours over the bottles in `table`
    pub fn random<R: Rng>(rng: &mut R, table: &IngredientTable, count: usize) -> Vec<PourStep> {
        let ids = table.ids();
        if ids.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|_| PourStep {
                id: ids[rng.gen_range(0..ids.len())],
                seconds: (rng.gen_range(0.2..1.5_f64) * 10.0).round() / 10.0,
            })
            .collect()
    }
}

/// Number of whole frames covering `seconds`
fn frames_for(seconds: f64) -> u64 {
    (seconds * FPS).round().max(0.0) as u64
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub pours: Vec<PourStep>,
    pub frames: u64,
    pub elapsed_secs: f64,
    pub final_state: SessionState,
    pub fill_fraction: f64,
    pub rejected_serves: u32,
    pub mix: Option<MixOutcome>,
    pub served: Option<ServeOutcome>,
}

struct Runner<'a> {
    game: MixerGame,
    presenter: &'a mut dyn OutcomePresenter,
    frames: u64,
    rejected_serves: u32,
}

impl Runner<'_> {
    fn step(&mut self, input: &FrameInput) {
        let report = self.game.update(FRAME_DT, input, &mut *self.presenter);
        self.frames += 1;
        self.rejected_serves += report
            .events
            .iter()
            .filter(|e| matches!(e, SessionEvent::ServeRejected { .. }))
            .count() as u32;
    }

    fn step_many(&mut self, count: u64, input: &FrameInput) {
        for _ in 0..count {
            if self.game.state().is_served() {
                return;
            }
            self.step(input);
        }
    }
}

/// Play `script` to the end of the session
pub fn run(game: MixerGame, script: &Script, presenter: &mut dyn OutcomePresenter) -> RunSummary {
    let frame_limit = frames_for(game.session().countdown_remaining() + PRESENTATION_SLACK_SECS);
    let mut runner = Runner {
        game,
        presenter,
        frames: 0,
        rejected_serves: 0,
    };

    for pour in &script.pours {
        let frames = frames_for(pour.seconds);
        tracing::debug!("Pouring {} for {:.2}s ({} frames)", pour.id, pour.seconds, frames);
        runner.step_many(
            1,
            &FrameInput {
                select: Some(pour.id),
                pour_held: frames > 0,
                ..Default::default()
            },
        );
        runner.step_many(
            frames.saturating_sub(1),
            &FrameInput {
                pour_held: true,
                ..Default::default()
            },
        );
    }

    runner.step_many(frames_for(script.wait), &FrameInput::default());

    if script.mix {
        runner.step_many(1, &FrameInput { mix: true, ..Default::default() });
    }
    if script.serve {
        runner.step_many(1, &FrameInput { serve: true, ..Default::default() });
    }

    // Idle until the countdown or the presentation ends the session
    while runner.game.state() != SessionState::Done && runner.frames < frame_limit {
        runner.step(&FrameInput::default());
    }
    if runner.game.state() != SessionState::Done {
        tracing::warn!("Stopped after {} frames in state {:?}", runner.frames, runner.game.state());
    }

    let session = runner.game.session();
    RunSummary {
        pours: script.pours.clone(),
        frames: runner.frames,
        elapsed_secs: runner.frames as f64 * FRAME_DT,
        final_state: session.state(),
        fill_fraction: session.fill_fraction(),
        rejected_serves: runner.rejected_serves,
        mix: session.mix_outcome().cloned(),
        served: session.serve_outcome().copied(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
