//! One-dimensional actuator driven by the control signal.

/// Inclusive range an entity's center may occupy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Keep an entity of half-size `half_extent` fully inside `[0, screen_extent]`.
    pub fn for_entity(half_extent: f64, screen_extent: f64) -> Self {
        Self {
            min: half_extent,
            max: screen_extent - half_extent,
        }
    }

    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        if x < self.min {
            self.min
        } else if x > self.max {
            self.max
        } else {
            x
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actuator {
    position: f64,
    bounds: Bounds,
    speed_scale: f64,
}

impl Actuator {
    pub fn new(start: f64, bounds: Bounds, speed_scale: f64) -> Self {
        Self {
            position: bounds.clamp(start),
            bounds,
            speed_scale,
        }
    }

    /// Move by `signal * speed_scale`. Negative is left, positive is right.
    pub fn actuate(&mut self, signal: f64) {
        self.position += signal * self.speed_scale;
    }

    pub fn clamp(&mut self) {
        self.position = self.bounds.clamp(self.position);
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}
