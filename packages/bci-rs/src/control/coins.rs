//! Coin catcher: the raw control signal steers a catcher under falling coins.

use super::actuator::{Actuator, Bounds};
use super::smoothing::Conditioner;
use super::{FrameInput, Game};
use crate::config::{CoinConfig, ScreenConfig};
use crate::render::{DrawCommand, Rgb, TextSize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BACKGROUND: Rgb = Rgb(25, 25, 35);
const HORIZON: Rgb = Rgb(50, 50, 100);
const COIN_RIM: Rgb = Rgb(255, 215, 0);
const COIN_FACE: Rgb = Rgb(255, 255, 0);
const PLAYER: Rgb = Rgb(100, 200, 50);
const SCORE: Rgb = Rgb(255, 215, 0);
const INFO: Rgb = Rgb(200, 200, 200);
const HINT: Rgb = Rgb(100, 150, 255);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Coin {
    /// A coin entering from just above the top edge.
    pub fn spawn_at(x: f64, radius: f64) -> Self {
        Self { x, y: -radius, radius }
    }

    pub fn fall(&mut self, speed: f64) {
        self.y += speed;
    }

    pub fn is_off_screen(&self, screen_height: f64) -> bool {
        self.y > screen_height
    }
}

/// Axis-aligned catch box, all edges inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Catcher {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Catcher {
    pub fn catches(&self, coin: &Coin) -> bool {
        self.left <= coin.x && coin.x <= self.right && self.top <= coin.y && coin.y <= self.bottom
    }
}

/// What happened to the coin field during one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameEvents {
    pub spawned: bool,
    pub caught: usize,
    pub missed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoinState {
    pub actuator: Actuator,
    pub conditioner: Conditioner,
    pub last_raw: f64,
    /// Top edge of the catcher, fixed for the session
    pub player_top: f64,
    pub coins: Vec<Coin>,
    pub score: u64,
    pub spawn_timer: u32,
}

impl CoinState {
    pub fn new(config: &CoinConfig, screen: &ScreenConfig) -> Self {
        let bounds = Bounds::for_entity(config.player_width / 2.0, screen.width);
        Self {
            actuator: Actuator::new(screen.width / 2.0, bounds, config.speed_scale),
            conditioner: Conditioner::from_config(&config.smoothing),
            last_raw: 0.0,
            player_top: screen.height - config.player_offset,
            coins: Vec::new(),
            score: 0,
            spawn_timer: 0,
        }
    }

    pub fn catcher(&self, config: &CoinConfig) -> Catcher {
        let x = self.actuator.position();
        Catcher {
            left: x - config.player_width / 2.0,
            right: x + config.player_width / 2.0,
            top: self.player_top,
            bottom: self.player_top + config.player_height,
        }
    }

    /// Whole-pixel horizontal range new coins spawn in, inclusive. Rounded
    /// inwards so a fractional clearance is never undercut.
    pub fn spawn_range(config: &CoinConfig, screen: &ScreenConfig) -> (i64, i64) {
        let clearance = config.coin_radius + config.spawn_margin;
        (
            clearance.ceil() as i64,
            (screen.width - clearance).floor() as i64,
        )
    }

    /// Advance one frame: move the catcher, spawn, let coins fall, resolve
    /// catches and misses.
    pub fn step<R: Rng>(
        mut self,
        input: FrameInput,
        config: &CoinConfig,
        screen: &ScreenConfig,
        rng: &mut R,
    ) -> (Self, FrameEvents) {
        let mut events = FrameEvents::default();

        self.last_raw = input.raw();
        if let FrameInput::Sample(raw) = input {
            let signal = self.conditioner.apply(raw);
            self.actuator.actuate(signal);
        }
        self.actuator.clamp();

        self.spawn_timer += 1;
        if self.spawn_timer >= config.spawn_interval {
            let (lo, hi) = Self::spawn_range(config, screen);
            let x = rng.random_range(lo..=hi) as f64;
            self.coins.push(Coin::spawn_at(x, config.coin_radius));
            self.spawn_timer = 0;
            events.spawned = true;
        }

        // collect first, remove afterwards
        let catcher = self.catcher(config);
        let mut finished = Vec::new();
        for (i, coin) in self.coins.iter_mut().enumerate() {
            coin.fall(config.fall_speed);
            if catcher.catches(coin) {
                events.caught += 1;
                finished.push(i);
            } else if coin.is_off_screen(screen.height) {
                events.missed += 1;
                finished.push(i);
            }
        }
        for i in finished.into_iter().rev() {
            self.coins.remove(i);
        }
        self.score += events.caught as u64;

        (self, events)
    }
}

pub struct CoinGame {
    state: CoinState,
    config: CoinConfig,
    screen: ScreenConfig,
    rng: StdRng,
    last_events: FrameEvents,
}

impl CoinGame {
    pub fn new(config: CoinConfig, screen: ScreenConfig) -> Self {
        Self::with_rng(config, screen, StdRng::from_os_rng())
    }

    /// Reproducible coin positions.
    pub fn seeded(config: CoinConfig, screen: ScreenConfig, seed: u64) -> Self {
        Self::with_rng(config, screen, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: CoinConfig, screen: ScreenConfig, rng: StdRng) -> Self {
        Self {
            state: CoinState::new(&config, &screen),
            config,
            screen,
            rng,
            last_events: FrameEvents::default(),
        }
    }

    pub fn state(&self) -> &CoinState {
        &self.state
    }

    pub fn last_events(&self) -> FrameEvents {
        self.last_events
    }
}

impl Game for CoinGame {
    fn step(mut self, input: FrameInput) -> Self {
        let (state, events) = self
            .state
            .step(input, &self.config, &self.screen, &mut self.rng);
        if events.caught > 0 {
            log::debug!("Caught {} coin(s), score {}", events.caught, state.score);
        }
        Self {
            state,
            last_events: events,
            ..self
        }
    }

    fn scene(&self) -> Vec<DrawCommand> {
        let (w, h) = (self.screen.width, self.screen.height);
        let mut scene = Vec::with_capacity(self.state.coins.len() * 2 + 8);

        scene.push(DrawCommand::Clear(BACKGROUND));
        scene.push(DrawCommand::Line {
            from: (0.0, h - 150.0),
            to: (w, h - 150.0),
            width: 2.0,
            color: HORIZON,
        });

        for coin in &self.state.coins {
            scene.push(DrawCommand::Circle {
                x: coin.x,
                y: coin.y,
                radius: coin.radius,
                color: COIN_RIM,
            });
            scene.push(DrawCommand::Circle {
                x: coin.x,
                y: coin.y,
                radius: (coin.radius - 3.0).max(0.0),
                color: COIN_FACE,
            });
        }

        let catcher = self.state.catcher(&self.config);
        scene.push(DrawCommand::Rect {
            x: catcher.left,
            y: catcher.top,
            width: self.config.player_width,
            height: self.config.player_height,
            color: PLAYER,
        });

        scene.push(DrawCommand::Text {
            x: 20.0,
            y: 20.0,
            size: TextSize::Large,
            text: format!("Score: {}", self.state.score),
            color: SCORE,
        });
        scene.push(DrawCommand::Text {
            x: 20.0,
            y: h - 40.0,
            size: TextSize::Small,
            text: format!("BCI Output: {:.3}", self.state.last_raw),
            color: INFO,
        });
        scene.push(DrawCommand::Text {
            x: 20.0,
            y: 60.0,
            size: TextSize::Small,
            text: "Left Hand <- Move Left".to_string(),
            color: HINT,
        });
        scene.push(DrawCommand::Text {
            x: w - 250.0,
            y: 60.0,
            size: TextSize::Small,
            text: "Right Hand -> Move Right".to_string(),
            color: HINT,
        });
        scene.push(DrawCommand::Text {
            x: w - 200.0,
            y: h - 40.0,
            size: TextSize::Small,
            text: format!("Coins falling: {}", self.state.coins.len()),
            color: INFO,
        });

        scene
    }

    fn score(&self) -> Option<u64> {
        Some(self.state.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CoinConfig, ScreenConfig, StdRng) {
        (
            CoinConfig::default(),
            ScreenConfig::default(),
            StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn test_catch_box_edges_are_inclusive() {
        let catcher = Catcher {
            left: 360.0,
            right: 440.0,
            top: 500.0,
            bottom: 580.0,
        };
        for (x, y) in [(360.0, 540.0), (440.0, 540.0), (400.0, 500.0), (400.0, 580.0)] {
            assert!(catcher.catches(&Coin { x, y, radius: 15.0 }), "({}, {})", x, y);
        }
        assert!(!catcher.catches(&Coin {
            x: 359.999,
            y: 540.0,
            radius: 15.0
        }));
        assert!(!catcher.catches(&Coin {
            x: 400.0,
            y: 580.001,
            radius: 15.0
        }));
    }

    #[test]
    fn test_one_spawn_per_interval() {
        let (config, screen, mut rng) = setup();
        let mut state = CoinState::new(&config, &screen);
        let mut spawns = 0;
        for frame in 1..=config.spawn_interval {
            let (next, events) = state.step(FrameInput::Idle, &config, &screen, &mut rng);
            state = next;
            if events.spawned {
                spawns += 1;
                assert_eq!(frame, config.spawn_interval);
            }
        }
        assert_eq!(spawns, 1);
        assert_eq!(state.coins.len(), 1);
        assert_eq!(state.spawn_timer, 0);

        let (lo, hi) = CoinState::spawn_range(&config, &screen);
        assert_eq!((lo, hi), (35, 765));
        let x = state.coins[0].x;
        assert!(x >= lo as f64 && x <= hi as f64);
        assert_eq!(x, x.trunc());
    }

    #[test]
    fn test_spawn_positions_stay_in_range() {
        let (config, screen, mut rng) = setup();
        let config = CoinConfig {
            spawn_interval: 1,
            fall_speed: 0.5,
            ..config
        };
        let mut state = CoinState::new(&config, &screen);
        for _ in 0..300 {
            state = state.step(FrameInput::Idle, &config, &screen, &mut rng).0;
        }
        assert!(state.coins.iter().all(|c| c.x >= 35.0 && c.x <= 765.0));
    }

    #[test]
    fn test_fractional_radius_keeps_full_clearance() {
        let (config, screen, mut rng) = setup();
        let config = CoinConfig {
            coin_radius: 15.5,
            spawn_interval: 1,
            fall_speed: 0.5,
            ..config
        };
        assert_eq!(CoinState::spawn_range(&config, &screen), (36, 764));

        let clearance = config.coin_radius + config.spawn_margin;
        let mut state = CoinState::new(&config, &screen);
        for _ in 0..300 {
            state = state.step(FrameInput::Idle, &config, &screen, &mut rng).0;
        }
        assert!(!state.coins.is_empty());
        assert!(state
            .coins
            .iter()
            .all(|c| c.x >= clearance && c.x <= screen.width - clearance));
    }

    #[test]
    fn test_missed_coin_removed_after_expected_frames() {
        let (config, screen, mut rng) = setup();
        let config = CoinConfig {
            spawn_interval: u32::MAX,
            ..config
        };
        let mut state = CoinState::new(&config, &screen);
        // far from the catcher, which stays centered
        state.coins.push(Coin::spawn_at(40.0, config.coin_radius));

        // ceil((600 + 15) / 2) = 308
        let expected = ((screen.height + config.coin_radius) / config.fall_speed).ceil() as usize;
        assert_eq!(expected, 308);

        for frame in 1..=expected {
            let (next, events) = state.step(FrameInput::Idle, &config, &screen, &mut rng);
            state = next;
            if frame < expected {
                assert_eq!(state.coins.len(), 1, "removed early at frame {}", frame);
            } else {
                assert_eq!(events.missed, 1);
                assert!(state.coins.is_empty());
            }
        }
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_catch_and_miss_in_same_frame() {
        let (config, screen, mut rng) = setup();
        let config = CoinConfig {
            spawn_interval: u32::MAX,
            ..config
        };
        let mut state = CoinState::new(&config, &screen);
        // lands exactly on the catcher's left edge after falling
        state.coins.push(Coin {
            x: 360.0,
            y: 498.0,
            radius: 15.0,
        });
        // leaves the screen this frame
        state.coins.push(Coin {
            x: 100.0,
            y: 599.5,
            radius: 15.0,
        });
        // keeps falling
        state.coins.push(Coin {
            x: 700.0,
            y: 10.0,
            radius: 15.0,
        });

        let (state, events) = state.step(FrameInput::Idle, &config, &screen, &mut rng);
        assert_eq!(events.caught, 1);
        assert_eq!(events.missed, 1);
        assert_eq!(state.score, 1);
        assert_eq!(state.coins.len(), 1);
        assert_eq!(state.coins[0].x, 700.0);
        assert_eq!(state.coins[0].y, 12.0);
    }

    #[test]
    fn test_catcher_moves_with_raw_signal() {
        let (config, screen, mut rng) = setup();
        let state = CoinState::new(&config, &screen);
        assert_eq!(state.actuator.position(), 400.0);
        assert_eq!(state.player_top, 500.0);

        let (state, _) = state.step(FrameInput::Sample(-1.5), &config, &screen, &mut rng);
        assert_eq!(state.actuator.position(), 391.0);

        let (state, _) = state.step(FrameInput::Sample(1_000.0), &config, &screen, &mut rng);
        assert_eq!(state.actuator.position(), 760.0);
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let make = || {
            let mut game = CoinGame::seeded(CoinConfig::default(), ScreenConfig::default(), 42);
            for _ in 0..200 {
                game = game.step(FrameInput::Idle);
            }
            game.state().coins.clone()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn test_scene_contains_score_and_player() {
        let game = CoinGame::seeded(CoinConfig::default(), ScreenConfig::default(), 1);
        let scene = game.scene();
        assert!(scene.iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text == "Score: 0"
        )));
        assert!(scene.contains(&DrawCommand::Rect {
            x: 360.0,
            y: 500.0,
            width: 80.0,
            height: 80.0,
            color: PLAYER,
        }));
        assert_eq!(game.score(), Some(0));
    }
}
