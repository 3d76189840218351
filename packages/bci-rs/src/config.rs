//! Startup configuration.
//!
//! Every tunable of the feedback views lives here with defaults matching the
//! values the classifier pipeline was calibrated with. A JSON file can
//! override any subset of keys; the CLI applies flag overrides on top.

use crate::error::{BciError, Result};
use crate::types::DEFAULT_STREAM_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// UDP port the control stream travels on when no address is given
pub const DEFAULT_PORT: u16 = 16571;

/// UDP port the relay listens on for classifier output
pub const RELAY_PORT: u16 = 16572;

/// Stream transport
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// JSON datagrams over UDP
    #[default]
    Udp,
    /// Lab Streaming Layer through liblsl (feature `lsl-support`)
    Lsl,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Backend::Udp),
            "lsl" => Ok(Backend::Lsl),
            other => Err(format!("Unknown backend '{}': expected udp or lsl", other)),
        }
    }
}

/// How many queued samples a frame consumes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DrainPolicy {
    /// Pull at most one sample; the rest wait for later frames.
    #[default]
    OnePerFrame,
    /// Empty the queue and act on the newest sample only.
    Latest,
}

impl std::str::FromStr for DrainPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "one-per-frame" => Ok(DrainPolicy::OnePerFrame),
            "latest" => Ok(DrainPolicy::Latest),
            other => Err(format!(
                "Unknown drain policy '{}': expected one-per-frame or latest",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Exact name of the control stream
    pub name: String,
    /// Discovery window in seconds
    pub wait_secs: f64,
    pub backend: Backend,
    /// Local address inlets listen on (UDP backend)
    pub bind_addr: String,
    /// Address outlets send to (UDP backend)
    pub target_addr: String,
    /// Local address the relay reads classifier output on (UDP backend)
    pub relay_bind_addr: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_STREAM_NAME.to_string(),
            wait_secs: 1.0,
            backend: Backend::Udp,
            bind_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            target_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            relay_bind_addr: format!("0.0.0.0:{}", RELAY_PORT),
        }
    }
}

impl StreamConfig {
    pub fn wait_time(&self) -> Duration {
        Duration::from_secs_f64(self.wait_secs.max(0.0))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Exponential moving average switch and coefficient
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmoothingConfig {
    pub enabled: bool,
    /// 0.05 is very smooth with high lag, 0.5 is responsive but jittery
    pub alpha: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alpha: 0.1,
        }
    }
}

impl SmoothingConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f64,
    /// Pixels per frame per unit of signal
    pub speed_scale: f64,
    pub smoothing: SmoothingConfig,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: 25.0,
            speed_scale: 4.0,
            smoothing: SmoothingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoinConfig {
    pub player_width: f64,
    pub player_height: f64,
    /// Distance from the bottom of the screen to the catcher's top edge
    pub player_offset: f64,
    pub speed_scale: f64,
    pub smoothing: SmoothingConfig,
    pub coin_radius: f64,
    /// Pixels per frame
    pub fall_speed: f64,
    /// Frames between spawns
    pub spawn_interval: u32,
    /// Extra horizontal clearance kept from each screen edge when spawning
    pub spawn_margin: f64,
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self {
            player_width: 80.0,
            player_height: 80.0,
            player_offset: 100.0,
            speed_scale: 6.0,
            smoothing: SmoothingConfig::disabled(),
            coin_radius: 15.0,
            fall_speed: 2.0,
            spawn_interval: 50,
            spawn_margin: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlConfig {
    pub stream: StreamConfig,
    pub screen: ScreenConfig,
    /// Target frames per second
    pub frame_rate: u32,
    pub drain: DrainPolicy,
    pub ball: BallConfig,
    pub coins: CoinConfig,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            screen: ScreenConfig::default(),
            frame_rate: 60,
            drain: DrainPolicy::OnePerFrame,
            ball: BallConfig::default(),
            coins: CoinConfig::default(),
        }
    }
}

impl ControlConfig {
    /// Load from `path`, or from the per-user default location when it exists,
    /// or fall back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::default_path() {
                Some(p) if p.is_file() => {
                    log::info!("Using configuration from {}", p.display());
                    Self::from_file(&p)
                }
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BciError::InvalidConfig(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            BciError::InvalidConfig(format!("Cannot parse '{}': {}", path.display(), e))
        })
    }

    /// `<config dir>/bci/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("bci").join("config.json"))
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stream.name.is_empty() {
            return Err(BciError::InvalidConfig("stream name must not be empty".into()));
        }
        if !(self.stream.wait_secs >= 0.0) {
            return Err(BciError::InvalidConfig(format!(
                "wait time must be >= 0, got {}",
                self.stream.wait_secs
            )));
        }
        if self.frame_rate == 0 {
            return Err(BciError::InvalidConfig("frame rate must be > 0".into()));
        }
        if !(self.screen.width > 0.0 && self.screen.height > 0.0) {
            return Err(BciError::InvalidConfig(format!(
                "screen must be positive, got {}x{}",
                self.screen.width, self.screen.height
            )));
        }

        check_smoothing("ball", &self.ball.smoothing)?;
        check_smoothing("coins", &self.coins.smoothing)?;

        if !(self.ball.radius > 0.0) || 2.0 * self.ball.radius > self.screen.width {
            return Err(BciError::InvalidConfig(format!(
                "ball radius {} does not fit a {} px wide screen",
                self.ball.radius, self.screen.width
            )));
        }
        if !(self.coins.player_width > 0.0 && self.coins.player_height > 0.0)
            || self.coins.player_width > self.screen.width
        {
            return Err(BciError::InvalidConfig(format!(
                "player {}x{} does not fit a {} px wide screen",
                self.coins.player_width, self.coins.player_height, self.screen.width
            )));
        }
        if self.coins.spawn_interval == 0 {
            return Err(BciError::InvalidConfig("spawn interval must be > 0".into()));
        }
        if !(self.coins.fall_speed > 0.0) {
            return Err(BciError::InvalidConfig(format!(
                "fall speed must be > 0, got {}",
                self.coins.fall_speed
            )));
        }
        let clearance = self.coins.coin_radius + self.coins.spawn_margin;
        if self.coins.coin_radius < 0.0
            || !(clearance.ceil() <= (self.screen.width - clearance).floor())
        {
            return Err(BciError::InvalidConfig(format!(
                "coin spawn range is empty for a {} px wide screen",
                self.screen.width
            )));
        }

        Ok(())
    }
}

fn check_smoothing(section: &str, smoothing: &SmoothingConfig) -> Result<()> {
    if smoothing.enabled && !(smoothing.alpha > 0.0 && smoothing.alpha <= 1.0) {
        return Err(BciError::InvalidConfig(format!(
            "{}.smoothing.alpha must be in (0, 1], got {}",
            section, smoothing.alpha
        )));
    }
    Ok(())
}
