// Lab Streaming Layer (LSL) transport
//
// Thin adapter over liblsl through the `lsl` crate. Resolution is blocking in
// liblsl, so it runs on the blocking pool; the resolved `StreamInfo` handles
// are cached so that `open_inlet` binds to exactly the stream that discovery
// reported. Pulls with a zero timeout return immediately in liblsl.

use super::{check_channels, Inlet, Outlet, OutletFactory, StreamResolver};
use crate::error::{BciError, Result};
use crate::types::{ChannelFormat, Sample, StreamDescriptor};
use async_trait::async_trait;
use lsl::{ExPushable, Pullable, Pushable, StreamInfo, StreamInlet, StreamOutlet};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::task;

/// Inlet buffer in seconds of data (liblsl default)
const MAX_BUFFERED: i32 = 360;

pub struct LslResolver {
    resolved: Mutex<Vec<StreamInfo>>,
}

impl LslResolver {
    pub fn new() -> Self {
        Self {
            resolved: Mutex::new(Vec::new()),
        }
    }

    fn describe(info: &StreamInfo) -> StreamDescriptor {
        StreamDescriptor {
            name: info.stream_name(),
            stream_type: info.stream_type(),
            channel_count: info.channel_count().max(0) as usize,
            nominal_srate: info.nominal_srate(),
            channel_format: from_lsl_format(info.channel_format()),
            source_id: info.source_id(),
        }
    }
}

impl Default for LslResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamResolver for LslResolver {
    async fn discover(&self, wait_time: Duration) -> Result<Vec<StreamDescriptor>> {
        let wait_secs = wait_time.as_secs_f64();
        log::info!("Resolving LSL streams for {:.1}s", wait_secs);

        let streams = task::spawn_blocking(move || lsl::resolve_streams(wait_secs))
            .await
            .map_err(|e| BciError::Connection(format!("Task join error: {}", e)))?
            .map_err(|e| BciError::Connection(format!("LSL resolve failed: {:?}", e)))?;

        let descriptors = streams.iter().map(Self::describe).collect();
        *self.resolved.lock() = streams;
        Ok(descriptors)
    }

    async fn open_inlet(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Inlet>> {
        let info = self
            .resolved
            .lock()
            .iter()
            .find(|info| Self::describe(info).same_stream(descriptor))
            .cloned()
            .ok_or_else(|| BciError::StreamNotFound {
                name: descriptor.name.clone(),
            })?;

        let inlet = StreamInlet::new(&info, MAX_BUFFERED, 0, true)
            .map_err(|e| BciError::Connection(format!("Failed to create inlet: {:?}", e)))?;

        log::info!(
            "LSL inlet created: name='{}', type='{}', channels={}",
            descriptor.name,
            descriptor.stream_type,
            descriptor.channel_count
        );

        Ok(Box::new(LslInlet {
            inlet,
            descriptor: descriptor.clone(),
        }))
    }
}

pub struct LslInlet {
    inlet: StreamInlet,
    descriptor: StreamDescriptor,
}

#[async_trait]
impl Inlet for LslInlet {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    async fn pull_sample(&mut self, timeout: Duration) -> Result<Option<Sample>> {
        let (values, timestamp): (Vec<f32>, f64) = self
            .inlet
            .pull_sample(timeout.as_secs_f64())
            .map_err(|e| BciError::StreamLost(format!("LSL pull error: {:?}", e)))?;

        // liblsl signals "no sample" with a zero timestamp
        if timestamp == 0.0 {
            return Ok(None);
        }
        Ok(Some(Sample::new(values, timestamp)))
    }
}

pub struct LslOutletFactory;

impl OutletFactory for LslOutletFactory {
    fn create_outlet(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Outlet>> {
        let info = StreamInfo::new(
            &descriptor.name,
            &descriptor.stream_type,
            descriptor.channel_count as u32,
            descriptor.nominal_srate,
            lsl::ChannelFormat::Float32,
            &descriptor.source_id,
        )
        .map_err(|e| BciError::Connection(format!("Invalid LSL stream info: {:?}", e)))?;

        let outlet = StreamOutlet::new(&info, 0, MAX_BUFFERED)
            .map_err(|e| BciError::Connection(format!("Failed to create outlet: {:?}", e)))?;

        log::info!("LSL outlet '{}' online", descriptor.name);

        Ok(Box::new(LslOutlet {
            outlet,
            descriptor: descriptor.clone(),
        }))
    }
}

pub struct LslOutlet {
    outlet: StreamOutlet,
    descriptor: StreamDescriptor,
}

impl Outlet for LslOutlet {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn push_sample(&mut self, values: &[f32], timestamp: Option<f64>) -> Result<()> {
        check_channels(&self.descriptor, values)?;
        let data = values.to_vec();
        let pushed = match timestamp {
            Some(ts) => self.outlet.push_sample_ex(&data, ts, true),
            None => self.outlet.push_sample(&data),
        };
        pushed.map_err(|e| BciError::Connection(format!("LSL push error: {:?}", e)))
    }
}

fn from_lsl_format(format: lsl::ChannelFormat) -> ChannelFormat {
    match format {
        lsl::ChannelFormat::Double64 => ChannelFormat::Double64,
        lsl::ChannelFormat::Int32 => ChannelFormat::Int32,
        lsl::ChannelFormat::Int16 => ChannelFormat::Int16,
        _ => ChannelFormat::Float32,
    }
}
