use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Instant;

/// Name the classifier box publishes and the feedback views subscribe to.
pub const DEFAULT_STREAM_NAME: &str = "BCI_Control_Signal";

/// Value encoding of a stream's channels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFormat {
    #[default]
    Float32,
    Double64,
    Int32,
    Int16,
}

/// Identity and shape of an advertised stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamDescriptor {
    /// Stream name; consumers match on it exactly
    pub name: String,
    /// Content type, e.g. "EEG" or "Control"
    pub stream_type: String,
    pub channel_count: usize,
    /// Nominal rate in Hz, 0.0 for irregular (push-based) streams
    pub nominal_srate: f64,
    #[serde(default)]
    pub channel_format: ChannelFormat,
    pub source_id: String,
}

impl StreamDescriptor {
    pub fn new(
        name: impl Into<String>,
        stream_type: impl Into<String>,
        channel_count: usize,
        nominal_srate: f64,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            stream_type: stream_type.into(),
            channel_count,
            nominal_srate,
            channel_format: ChannelFormat::Float32,
            source_id: source_id.into(),
        }
    }

    /// Two descriptors refer to the same producer when name and source id agree.
    pub fn same_stream(&self, other: &StreamDescriptor) -> bool {
        self.name == other.name && self.source_id == other.source_id
    }

    pub fn is_irregular(&self) -> bool {
        self.nominal_srate == 0.0
    }
}

/// One multi-channel sample pulled from an inlet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub values: Vec<f32>,
    /// Seconds on the producer's clock
    pub timestamp: f64,
}

impl Sample {
    pub fn new(values: Vec<f32>, timestamp: f64) -> Self {
        Self { values, timestamp }
    }

    /// First channel, the control value. `None` for an empty sample.
    pub fn control_value(&self) -> Option<f64> {
        self.values.first().map(|v| *v as f64)
    }

    pub fn num_channels(&self) -> usize {
        self.values.len()
    }
}

static CLOCK_ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Monotonic seconds since the first call in this process.
pub fn local_clock() -> f64 {
    CLOCK_ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64()
}
