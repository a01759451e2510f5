//! Console presenter: turns session events and serve cues into log lines

use metalmix_engine::{DrinkResult, OutcomePresenter, PresentationCue, ServeRejection};

#[derive(Debug, Default)]
pub struct LogPresenter {
    /// Cues seen since the last reset
    pub cues: Vec<PresentationCue>,
}

impl OutcomePresenter for LogPresenter {
    fn on_mix_computed(&mut self, result: DrinkResult, aggro: f64, energy_stat: f64, clarity: f64, score: u32) {
        tracing::info!(
            "Shaker: {} (aggro {:.2}, energy {:.2}, clarity {:.2}) worth {} points",
            result.display_name(),
            aggro,
            energy_stat,
            clarity,
            score
        );
    }

    fn on_serve_rejected(&mut self, reason: ServeRejection) {
        tracing::warn!("Vocalist refuses the glass: {}", reason.as_str());
    }

    fn on_serve_accepted(&mut self, result: DrinkResult, score: u32, variant: u8) {
        tracing::info!("Drink handed over: {} / variant {} / {} points", result, variant, score);
    }

    fn on_session_reset(&mut self) {
        self.cues.clear();
        tracing::info!("Bar wiped for another round");
    }

    fn on_cue(&mut self, cue: &PresentationCue) {
        match cue {
            PresentationCue::VocalistDrinkFrame(frame) => tracing::trace!("drink frame {}", frame),
            PresentationCue::ShowConcert { result, variant } => {
                tracing::info!("Concert: {} (variant {})", result, variant)
            }
            other => tracing::debug!("cue {:?}", other),
        }
        self.cues.push(cue.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_recorded_cues() {
        let mut p = LogPresenter::default();
        p.on_cue(&PresentationCue::HideGlass);
        p.on_cue(&PresentationCue::ShowConcert {
            result: DrinkResult::Decent,
            variant: 3,
        });
        assert_eq!(p.cues.len(), 2);

        p.on_session_reset();
        assert!(p.cues.is_empty());
    }
}
