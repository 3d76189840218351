//! Exponential moving average over the control signal.

use crate::config::SmoothingConfig;

/// EMA accumulator: `s' = (1 - α)·s + α·x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    alpha: f64,
    value: f64,
}

impl Ema {
    /// Starts from zero. `alpha` must lie in (0, 1]; the config layer checks it.
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: 0.0 }
    }

    #[inline]
    pub fn update(&mut self, raw: f64) -> f64 {
        self.value = (1.0 - self.alpha) * self.value + self.alpha * raw;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// Signal conditioning stage; either an EMA or the identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conditioner {
    Smoothed(Ema),
    Raw { last: f64 },
}

impl Conditioner {
    pub fn from_config(config: &SmoothingConfig) -> Self {
        if config.enabled {
            Conditioner::Smoothed(Ema::new(config.alpha))
        } else {
            Conditioner::Raw { last: 0.0 }
        }
    }

    /// Feed one raw value, return the signal that drives the actuator.
    pub fn apply(&mut self, raw: f64) -> f64 {
        match self {
            Conditioner::Smoothed(ema) => ema.update(raw),
            Conditioner::Raw { last } => {
                *last = raw;
                raw
            }
        }
    }

    /// Last conditioned value (unchanged on frames without a sample).
    pub fn value(&self) -> f64 {
        match self {
            Conditioner::Smoothed(ema) => ema.value(),
            Conditioner::Raw { last } => *last,
        }
    }
}
