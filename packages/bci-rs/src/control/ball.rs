//! Ball feedback view: the smoothed control signal pushes a ball left or right.

use super::actuator::{Actuator, Bounds};
use super::smoothing::Conditioner;
use super::{FrameInput, Game};
use crate::config::{BallConfig, ScreenConfig};
use crate::render::{DrawCommand, Rgb, TextSize};

const BACKGROUND: Rgb = Rgb(30, 30, 30);
const CENTER_LINE: Rgb = Rgb(100, 100, 100);
const LABEL: Rgb = Rgb(255, 255, 255);
const HINT: Rgb = Rgb(0, 200, 255);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallState {
    pub actuator: Actuator,
    pub conditioner: Conditioner,
    /// Raw value of the latest frame, zero when no sample arrived
    pub last_raw: f64,
}

impl BallState {
    /// Ball centered on screen with a zeroed filter.
    pub fn new(config: &BallConfig, screen: &ScreenConfig) -> Self {
        let bounds = Bounds::for_entity(config.radius, screen.width);
        Self {
            actuator: Actuator::new(screen.width / 2.0, bounds, config.speed_scale),
            conditioner: Conditioner::from_config(&config.smoothing),
            last_raw: 0.0,
        }
    }

    /// Advance one frame.
    pub fn step(self, input: FrameInput) -> Self {
        let mut next = self;
        next.last_raw = input.raw();
        if let FrameInput::Sample(raw) = input {
            let signal = next.conditioner.apply(raw);
            next.actuator.actuate(signal);
        }
        next.actuator.clamp();
        next
    }

    pub fn position(&self) -> f64 {
        self.actuator.position()
    }

    pub fn smoothed(&self) -> f64 {
        self.conditioner.value()
    }
}

pub struct BallGame {
    state: BallState,
    config: BallConfig,
    screen: ScreenConfig,
}

impl BallGame {
    pub fn new(config: BallConfig, screen: ScreenConfig) -> Self {
        Self {
            state: BallState::new(&config, &screen),
            config,
            screen,
        }
    }

    pub fn state(&self) -> &BallState {
        &self.state
    }
}

impl Game for BallGame {
    fn step(self, input: FrameInput) -> Self {
        Self {
            state: self.state.step(input),
            ..self
        }
    }

    fn scene(&self) -> Vec<DrawCommand> {
        let (w, h) = (self.screen.width, self.screen.height);
        let smoothed = self.state.smoothed();

        // green at rest, shifting to red-yellow as the signal grows
        let intensity = (smoothed.abs() * 100.0).min(255.0) as u8;
        let ball_color = Rgb(intensity, 255 - intensity, 0);

        vec![
            DrawCommand::Clear(BACKGROUND),
            DrawCommand::Line {
                from: (w / 2.0, 0.0),
                to: (w / 2.0, h),
                width: 2.0,
                color: CENTER_LINE,
            },
            DrawCommand::Circle {
                x: self.state.position(),
                y: h / 2.0,
                radius: self.config.radius,
                color: ball_color,
            },
            DrawCommand::Text {
                x: 10.0,
                y: 10.0,
                size: TextSize::Medium,
                text: format!(
                    "LDA Out: {:.3} | Smooth: {:.3}",
                    self.state.last_raw, smoothed
                ),
                color: LABEL,
            },
            DrawCommand::Text {
                x: 50.0,
                y: h / 2.0,
                size: TextSize::Medium,
                text: "<- Left Hand".to_string(),
                color: HINT,
            },
            DrawCommand::Text {
                x: w - 200.0,
                y: h / 2.0,
                size: TextSize::Medium,
                text: "Right Hand ->".to_string(),
                color: HINT,
            },
        ]
    }
}
