//! Two-class classifier output to one-dimensional control signal.
//!
//! The classifier emits a score per class (left hand, right hand); the
//! feedback views want a single signed value, so the box republishes
//! `right - left` as a one-channel stream.

use super::{MatrixChunk, ProcessingBox};
use crate::error::{BciError, Result};
use crate::stream::{Outlet, OutletFactory};
use crate::types::{StreamDescriptor, DEFAULT_STREAM_NAME};
use std::collections::VecDeque;

/// Result of reducing one data block
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    /// `right - left` from a well-formed block
    Difference { value: f64, left: f64, right: f64 },
    /// Block carried a single value; forwarded unchanged
    Passthrough(f64),
    /// Block carried nothing
    Empty,
}

/// Reduce a block to the control value. Values beyond the second are ignored.
pub fn control_value(values: &[f64]) -> ControlValue {
    match values {
        [left, right, ..] => ControlValue::Difference {
            value: right - left,
            left: *left,
            right: *right,
        },
        [single] => ControlValue::Passthrough(*single),
        [] => ControlValue::Empty,
    }
}

/// Descriptor of the published control stream
pub fn control_stream() -> StreamDescriptor {
    StreamDescriptor::new(DEFAULT_STREAM_NAME, "Control", 1, 0.0, "id_debug")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxStats {
    pub pushed: u64,
    pub malformed: u64,
    pub dropped: u64,
}

pub struct DifferenceBox<'a> {
    factory: &'a dyn OutletFactory,
    output: StreamDescriptor,
    outlet: Option<Box<dyn Outlet>>,
    header: Option<Vec<usize>>,
    stats: BoxStats,
}

impl<'a> DifferenceBox<'a> {
    pub fn new(factory: &'a dyn OutletFactory) -> Self {
        Self::with_output(factory, control_stream())
    }

    pub fn with_output(factory: &'a dyn OutletFactory, output: StreamDescriptor) -> Self {
        Self {
            factory,
            output,
            outlet: None,
            header: None,
            stats: BoxStats::default(),
        }
    }

    /// Dimension sizes from the last header seen.
    pub fn header(&self) -> Option<&[usize]> {
        self.header.as_deref()
    }

    pub fn stats(&self) -> BoxStats {
        self.stats
    }

    fn push(&mut self, value: f64) -> Result<()> {
        let outlet = self
            .outlet
            .as_mut()
            .ok_or_else(|| BciError::Plugin("process called before initialize".into()))?;
        outlet.push_sample(&[value as f32], None)?;
        self.stats.pushed += 1;
        Ok(())
    }
}

impl ProcessingBox for DifferenceBox<'_> {
    fn initialize(&mut self) -> Result<()> {
        log::info!("Initializing outlet '{}'", self.output.name);
        self.outlet = Some(self.factory.create_outlet(&self.output)?);
        Ok(())
    }

    fn process(&mut self, input: &mut VecDeque<MatrixChunk>) -> Result<()> {
        if self.outlet.is_none() {
            return Err(BciError::Plugin("process called before initialize".into()));
        }

        while let Some(chunk) = input.pop_front() {
            match chunk {
                MatrixChunk::Header { dimension_sizes } => {
                    log::debug!("Header received. Dims: {:?}", dimension_sizes);
                    self.header = Some(dimension_sizes);
                }
                MatrixChunk::Buffer(values) => match control_value(&values) {
                    ControlValue::Difference { value, left, right } => {
                        self.push(value)?;
                        log::debug!("Sent: {:.3} (from {:.1}, {:.1})", value, left, right);
                    }
                    ControlValue::Passthrough(value) => {
                        log::warn!(
                            "Chunk carried 1 value instead of 2; forwarding {:.3} as is",
                            value
                        );
                        self.stats.malformed += 1;
                        self.push(value)?;
                    }
                    ControlValue::Empty => {
                        log::warn!("Dropping empty chunk");
                        self.stats.dropped += 1;
                    }
                },
                MatrixChunk::End => log::debug!("End of input stream"),
            }
        }
        Ok(())
    }

    fn uninitialize(&mut self) -> Result<()> {
        self.outlet = None;
        log::info!(
            "Outlet '{}' closed after {} samples ({} malformed, {} dropped)",
            self.output.name,
            self.stats.pushed,
            self.stats.malformed,
            self.stats.dropped
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryBus;

    #[test]
    fn test_control_value() {
        assert_eq!(
            control_value(&[55.2, 55.7]),
            ControlValue::Difference {
                value: 55.7 - 55.2,
                left: 55.2,
                right: 55.7
            }
        );
        assert_eq!(
            control_value(&[1.0, 3.0, 100.0]),
            ControlValue::Difference {
                value: 2.0,
                left: 1.0,
                right: 3.0
            }
        );
        assert_eq!(control_value(&[0.4]), ControlValue::Passthrough(0.4));
        assert_eq!(control_value(&[]), ControlValue::Empty);
    }

    #[test]
    fn test_lifecycle_publishes_differences_in_order() {
        let bus = MemoryBus::new();
        let mut plugin = DifferenceBox::new(&bus);
        plugin.initialize().unwrap();

        let mut queue: VecDeque<MatrixChunk> = vec![
            MatrixChunk::Header {
                dimension_sizes: vec![2, 1],
            },
            MatrixChunk::Buffer(vec![1.0, 4.0]),
            MatrixChunk::Buffer(vec![0.5]),
            MatrixChunk::Buffer(vec![]),
            MatrixChunk::Buffer(vec![3.0, 1.0]),
            MatrixChunk::End,
        ]
        .into();
        plugin.process(&mut queue).unwrap();
        assert!(queue.is_empty());

        let values: Vec<f32> = bus
            .published(DEFAULT_STREAM_NAME)
            .iter()
            .map(|s| s.values[0])
            .collect();
        assert_eq!(values, vec![3.0, 0.5, -2.0]);
        assert_eq!(plugin.header(), Some(&[2usize, 1][..]));
        assert_eq!(
            plugin.stats(),
            BoxStats {
                pushed: 3,
                malformed: 1,
                dropped: 1
            }
        );

        plugin.uninitialize().unwrap();
        let mut more: VecDeque<MatrixChunk> = vec![MatrixChunk::Buffer(vec![1.0, 2.0])].into();
        assert!(matches!(
            plugin.process(&mut more),
            Err(BciError::Plugin(_))
        ));
    }

    #[test]
    fn test_output_descriptor() {
        let desc = control_stream();
        assert_eq!(desc.name, "BCI_Control_Signal");
        assert_eq!(desc.stream_type, "Control");
        assert_eq!(desc.channel_count, 1);
        assert!(desc.is_irregular());
    }
}
