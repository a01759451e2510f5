//! Serve presentation: a timeline of cues played after the drink is handed over
//!
//! The sequence is a flat list of `(start time, cue)` pairs. The host ticks
//! it every frame and forwards due cues to the presenter. A reset cancels
//! the sequence: nothing after the cancel point is ever emitted.
//!
//! Default serve timeline (seconds, from PresentationTiming):
//!   0.00  hide glass, drink frame 0
//!   0.15  drink frame 1 … frame n-1, then outcome pose
//!   +1.0  fade out (2.0)
//!   +2.0  concert (result + variant), fade in, score, retry
//!   +1.0  extra vocalist joins
//!   2.00  glass back (runs in parallel)

use metalmix_common::{DrinkResult, PresentationTiming};
use serde::Serialize;

use crate::session::ServeOutcome;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single presentation instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PresentationCue {
    HideGlass,
    ShowGlass,
    /// Show frame `n` of the vocalist's drink animation
    VocalistDrinkFrame(u32),
    /// Vocalist reacts to the drink
    VocalistOutcomePose(DrinkResult),
    FadeOut { duration: f32 },
    /// Reveal the concert scene for this result/variant
    ShowConcert { result: DrinkResult, variant: u8 },
    FadeIn,
    /// Start the extra vocalist clip for this variant
    ExtraVocalist { variant: u8 },
    RevealScore(u32),
    OfferRetry,
}

/// A cue with its start time relative to the sequence start
#[derive(Debug, Clone, PartialEq)]
pub struct TimedCue {
    pub at: f32,
    pub cue: PresentationCue,
}

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// A running, cancellable cue timeline
#[derive(Debug, Clone)]
pub struct PresentationSequence {
    cues: Vec<TimedCue>,
    cursor: usize,
    elapsed: f32,
    /// Session epoch this sequence belongs to
    epoch: u64,
    cancelled: bool,
}

impl PresentationSequence {
    pub fn new(epoch: u64) -> Self {
        Self {
            cues: Vec::new(),
            cursor: 0,
            elapsed: 0.0,
            epoch,
            cancelled: false,
        }
    }

    /// Build a sequential track: each step waits `duration` after the
    /// previous one, then fires its cue.
    pub fn from_steps<I>(epoch: u64, steps: I) -> Self
    where
        I: IntoIterator<Item = (f32, PresentationCue)>,
    {
        let mut seq = Self::new(epoch);
        let mut t = 0.0_f32;
        for (wait, cue) in steps {
            t += wait.max(0.0);
            seq.cues.push(TimedCue { at: t, cue });
        }
        seq
    }

    /// Add a cue at an absolute time (after any cue already at that time)
    pub fn insert_at(&mut self, at: f32, cue: PresentationCue) {
        let at = at.max(0.0);
        let idx = self.cues.partition_point(|c| c.at <= at);
        self.cues.insert(idx.max(self.cursor), TimedCue { at, cue });
    }

    /// The standard serve timeline for a handed-over drink
    pub fn serve(outcome: &ServeOutcome, timing: &PresentationTiming, epoch: u64) -> Self {
        let mut steps = vec![(0.0, PresentationCue::HideGlass)];

        for frame in 0..timing.drink_frame_count {
            let wait = if frame == 0 { 0.0 } else { timing.drink_frame_time };
            steps.push((wait, PresentationCue::VocalistDrinkFrame(frame)));
        }
        let pose_wait = if timing.drink_frame_count == 0 { 0.0 } else { timing.drink_frame_time };
        steps.push((pose_wait, PresentationCue::VocalistOutcomePose(outcome.result)));

        steps.push((timing.drink_hold, PresentationCue::FadeOut { duration: timing.fade }));
        steps.push((
            timing.fade,
            PresentationCue::ShowConcert {
                result: outcome.result,
                variant: outcome.variant,
            },
        ));
        steps.push((0.0, PresentationCue::FadeIn));
        steps.push((0.0, PresentationCue::RevealScore(outcome.score)));
        steps.push((0.0, PresentationCue::OfferRetry));
        steps.push((
            timing.extra_vocalist_delay,
            PresentationCue::ExtraVocalist { variant: outcome.variant },
        ));

        let mut seq = Self::from_steps(epoch, steps);
        seq.insert_at(timing.glass_hide, PresentationCue::ShowGlass);
        seq
    }

    /// Advance the clock and return every cue that became due, in order
    pub fn tick(&mut self, dt: f32) -> Vec<PresentationCue> {
        if self.cancelled || self.cursor >= self.cues.len() {
            return Vec::new();
        }
        if dt > 0.0 {
            self.elapsed += dt;
        }

        let mut due = Vec::new();
        while let Some(next) = self.cues.get(self.cursor) {
            if next.at > self.elapsed {
                break;
            }
            due.push(next.cue.clone());
            self.cursor += 1;
        }
        due
    }

    /// Stop the sequence for good
    pub fn cancel(&mut self) {
        if !self.cancelled && !self.is_finished() {
            tracing::debug!(
                "Presentation cancelled at {:.2}s with {} cues pending",
                self.elapsed,
                self.pending()
            );
        }
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// All cues fired (a cancelled sequence never finishes)
    pub fn is_finished(&self) -> bool {
        !self.cancelled && self.cursor >= self.cues.len()
    }

    pub fn pending(&self) -> usize {
        self.cues.len() - self.cursor
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Start time of the last cue
    pub fn duration(&self) -> f32 {
        self.cues.last().map(|c| c.at).unwrap_or(0.0)
    }

    pub fn cues(&self) -> &[TimedCue] {
        &self.cues
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
