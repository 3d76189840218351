// Frame-synchronized control loop
//
// Architecture:
// - `smoothing`: EMA conditioning of the raw control value
// - `actuator`: one-dimensional position with clamping bounds
// - `ball`, `coins`: the two feedback views, each an owned state with a pure
//   `step` per frame
// - `session`: drains the inlet, steps a `Game`, presents the scene, paces frames

pub mod actuator;
pub mod ball;
pub mod coins;
pub mod session;
pub mod smoothing;

pub use actuator::{Actuator, Bounds};
pub use ball::{BallGame, BallState};
pub use coins::{Catcher, Coin, CoinGame, CoinState, FrameEvents};
pub use session::{run_session, ExitReason, SessionOptions, SessionSummary};
pub use smoothing::{Conditioner, Ema};

use crate::render::DrawCommand;
use crate::types::Sample;

/// Input available to one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameInput {
    /// First channel of the sample consumed this frame
    Sample(f64),
    /// Nothing arrived
    Idle,
}

impl FrameInput {
    /// Empty and non-finite samples count as no input.
    pub fn from_sample(sample: Option<&Sample>) -> Self {
        match sample.and_then(Sample::control_value) {
            Some(v) if v.is_finite() => FrameInput::Sample(v),
            Some(v) => {
                log::warn!("Dropping non-finite control value {}", v);
                FrameInput::Idle
            }
            None => FrameInput::Idle,
        }
    }

    /// Raw value shown to the operator; zero when idle.
    pub fn raw(&self) -> f64 {
        match self {
            FrameInput::Sample(v) => *v,
            FrameInput::Idle => 0.0,
        }
    }
}

/// A feedback view driven one frame at a time
pub trait Game: Sized {
    fn step(self, input: FrameInput) -> Self;

    fn scene(&self) -> Vec<DrawCommand>;

    fn score(&self) -> Option<u64> {
        None
    }
}
