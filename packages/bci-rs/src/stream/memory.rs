//! In-process stream bus.
//!
//! Outlets created from a [`MemoryBus`] append to a per-stream queue; inlets
//! opened on the same bus pop from it. Used to drive the control loop and the
//! plugin host deterministically, without sockets.

use super::{check_channels, Inlet, Outlet, OutletFactory, StreamResolver};
use crate::error::{BciError, Result};
use crate::types::{local_clock, Sample, StreamDescriptor};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

struct Channel {
    descriptor: StreamDescriptor,
    queue: VecDeque<Sample>,
    history: Vec<Sample>,
    connected: bool,
}

#[derive(Clone, Default)]
pub struct MemoryBus {
    channels: Arc<Mutex<Vec<Channel>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a stream visible to discovery without publishing anything yet.
    pub fn advertise(&self, descriptor: StreamDescriptor) {
        let mut channels = self.channels.lock();
        if !channels.iter().any(|c| c.descriptor.same_stream(&descriptor)) {
            channels.push(Channel {
                descriptor,
                queue: VecDeque::new(),
                history: Vec::new(),
                connected: true,
            });
        }
    }

    /// Queue a sample on the first advertised stream called `name`.
    pub fn push(&self, name: &str, sample: Sample) -> Result<()> {
        let mut channels = self.channels.lock();
        let channel = channels
            .iter_mut()
            .find(|c| c.descriptor.name == name)
            .ok_or_else(|| BciError::StreamNotFound {
                name: name.to_string(),
            })?;
        channel.history.push(sample.clone());
        channel.queue.push_back(sample);
        Ok(())
    }

    /// Every sample ever published on `name`, consumed or not.
    pub fn published(&self, name: &str) -> Vec<Sample> {
        self.channels
            .lock()
            .iter()
            .find(|c| c.descriptor.name == name)
            .map(|c| c.history.clone())
            .unwrap_or_default()
    }

    /// Samples waiting to be pulled on `name`.
    pub fn queued(&self, name: &str) -> usize {
        self.channels
            .lock()
            .iter()
            .find(|c| c.descriptor.name == name)
            .map(|c| c.queue.len())
            .unwrap_or(0)
    }

    /// Simulate the producer going away; inlets report the stream as lost.
    pub fn disconnect(&self, name: &str) {
        for channel in self.channels.lock().iter_mut() {
            if channel.descriptor.name == name {
                channel.connected = false;
            }
        }
    }
}

#[async_trait]
impl StreamResolver for MemoryBus {
    async fn discover(&self, _wait_time: Duration) -> Result<Vec<StreamDescriptor>> {
        Ok(self
            .channels
            .lock()
            .iter()
            .filter(|c| c.connected)
            .map(|c| c.descriptor.clone())
            .collect())
    }

    async fn open_inlet(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Inlet>> {
        Ok(Box::new(MemoryInlet {
            bus: self.clone(),
            descriptor: descriptor.clone(),
        }))
    }
}

impl OutletFactory for MemoryBus {
    fn create_outlet(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Outlet>> {
        self.advertise(descriptor.clone());
        Ok(Box::new(MemoryOutlet {
            bus: self.clone(),
            descriptor: descriptor.clone(),
        }))
    }
}

pub struct MemoryInlet {
    bus: MemoryBus,
    descriptor: StreamDescriptor,
}

impl MemoryInlet {
    fn try_pop(&self) -> Result<Option<Sample>> {
        let mut channels = self.bus.channels.lock();
        let channel = channels
            .iter_mut()
            .find(|c| c.descriptor.same_stream(&self.descriptor))
            .ok_or_else(|| BciError::StreamLost(self.descriptor.name.clone()))?;
        if !channel.connected {
            return Err(BciError::StreamLost(format!(
                "producer of '{}' disconnected",
                self.descriptor.name
            )));
        }
        Ok(channel.queue.pop_front())
    }
}

#[async_trait]
impl Inlet for MemoryInlet {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    async fn pull_sample(&mut self, timeout: Duration) -> Result<Option<Sample>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(sample) = self.try_pop()? {
                return Ok(Some(sample));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

pub struct MemoryOutlet {
    bus: MemoryBus,
    descriptor: StreamDescriptor,
}

impl Outlet for MemoryOutlet {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn push_sample(&mut self, values: &[f32], timestamp: Option<f64>) -> Result<()> {
        check_channels(&self.descriptor, values)?;
        let sample = Sample::new(values.to_vec(), timestamp.unwrap_or_else(local_clock));
        self.bus.push(&self.descriptor.name, sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control_stream() -> StreamDescriptor {
        StreamDescriptor::new("BCI_Control_Signal", "Control", 1, 0.0, "id_debug")
    }

    #[tokio::test]
    async fn test_zero_timeout_pull_on_empty_queue() {
        let bus = MemoryBus::new();
        bus.advertise(control_stream());
        let mut inlet = bus.open_inlet(&control_stream()).await.unwrap();
        assert!(inlet.pull_sample(Duration::ZERO).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_outlet_to_inlet_fifo() {
        let bus = MemoryBus::new();
        let mut outlet = bus.create_outlet(&control_stream()).unwrap();
        outlet.push_sample(&[1.0], Some(0.1)).unwrap();
        outlet.push_sample(&[2.0], Some(0.2)).unwrap();

        let mut inlet = bus.open_inlet(&control_stream()).await.unwrap();
        let first = inlet.pull_sample(Duration::ZERO).await.unwrap().unwrap();
        assert_eq!(first.values, vec![1.0]);
        assert_eq!(bus.queued("BCI_Control_Signal"), 1);
        assert_eq!(bus.published("BCI_Control_Signal").len(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_reports_stream_lost() {
        let bus = MemoryBus::new();
        bus.advertise(control_stream());
        let mut inlet = bus.open_inlet(&control_stream()).await.unwrap();
        bus.disconnect("BCI_Control_Signal");
        assert!(matches!(
            inlet.pull_sample(Duration::ZERO).await,
            Err(BciError::StreamLost(_))
        ));
        assert!(bus.discover(Duration::ZERO).await.unwrap().is_empty());
    }
}
