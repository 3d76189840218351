use super::{FrameInput, Game};
use crate::config::{ControlConfig, DrainPolicy};
use crate::error::Result;
use crate::render::{InputEvent, Key, RenderSurface};
use crate::stream::Inlet;
use crate::types::Sample;
use serde::Serialize;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub frame_period: Duration,
    pub drain: DrainPolicy,
    /// Stop after this many frames; `None` runs until quit
    pub max_frames: Option<u64>,
}

impl SessionOptions {
    pub fn from_config(config: &ControlConfig) -> Self {
        Self {
            frame_period: config.frame_period(),
            drain: config.drain,
            max_frames: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Quit,
    Escape,
    FrameLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub samples_consumed: u64,
    /// Frames in which no sample was available
    pub idle_frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
    pub exit: ExitReason,
}

/// Run `game` until the surface reports quit/escape or the frame limit is hit.
///
/// Per frame: poll events, drain the inlet (never blocking), step the game,
/// present its scene, then wait for the next tick. Missed ticks are skipped
/// rather than replayed, so a slow frame never causes a burst of catch-up
/// frames. A transport error ends the session.
pub async fn run_session<G: Game>(
    mut game: G,
    inlet: &mut dyn Inlet,
    surface: &mut dyn RenderSurface,
    options: &SessionOptions,
) -> Result<(G, SessionSummary)> {
    let mut ticker = tokio::time::interval(options.frame_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    let mut frames = 0u64;
    let mut samples_consumed = 0u64;
    let mut idle_frames = 0u64;

    log::info!(
        "Entering frame loop at {:.0} Hz on '{}'",
        1.0 / options.frame_period.as_secs_f64(),
        inlet.descriptor().name
    );

    let exit = loop {
        if let Some(reason) = exit_requested(&surface.poll_events()) {
            break reason;
        }
        if options.max_frames.is_some_and(|max| frames >= max) {
            break ExitReason::FrameLimit;
        }

        let (sample, pulled) = drain(inlet, options.drain).await.map_err(|e| {
            log::error!("Input stream failed: {}", e);
            e
        })?;
        samples_consumed += pulled;

        let input = FrameInput::from_sample(sample.as_ref());
        if input == FrameInput::Idle {
            idle_frames += 1;
        }

        game = game.step(input);
        surface.present(&game.scene())?;
        frames += 1;

        ticker.tick().await;
    };

    let summary = SessionSummary {
        frames,
        samples_consumed,
        idle_frames,
        score: game.score(),
        exit,
    };
    log::info!(
        "Session ended ({:?}) after {} frames, {} samples",
        exit,
        frames,
        samples_consumed
    );
    Ok((game, summary))
}

fn exit_requested(events: &[InputEvent]) -> Option<ExitReason> {
    events.iter().find(|e| e.ends_session()).map(|e| match e {
        InputEvent::KeyPressed(Key::Escape) => ExitReason::Escape,
        _ => ExitReason::Quit,
    })
}

/// Pull this frame's sample. Returns the sample acted on and how many were
/// taken off the queue.
async fn drain(inlet: &mut dyn Inlet, policy: DrainPolicy) -> Result<(Option<Sample>, u64)> {
    match policy {
        DrainPolicy::OnePerFrame => {
            let sample = inlet.pull_sample(Duration::ZERO).await?;
            let pulled = sample.is_some() as u64;
            Ok((sample, pulled))
        }
        DrainPolicy::Latest => {
            let mut latest = None;
            let mut pulled = 0u64;
            while let Some(sample) = inlet.pull_sample(Duration::ZERO).await? {
                latest = Some(sample);
                pulled += 1;
            }
            if pulled > 1 {
                log::trace!("Skipped {} stale samples", pulled - 1);
            }
            Ok((latest, pulled))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_reason_prefers_first_event() {
        let events = [
            InputEvent::KeyPressed(Key::Other),
            InputEvent::KeyPressed(Key::Escape),
            InputEvent::Quit,
        ];
        assert_eq!(exit_requested(&events), Some(ExitReason::Escape));
        assert_eq!(exit_requested(&[InputEvent::Quit]), Some(ExitReason::Quit));
        assert_eq!(exit_requested(&[InputEvent::KeyPressed(Key::Other)]), None);
    }

    #[test]
    fn test_options_from_config() {
        let options = SessionOptions::from_config(&ControlConfig::default());
        assert_eq!(options.drain, DrainPolicy::OnePerFrame);
        assert_eq!(options.max_frames, None);
    }
}
