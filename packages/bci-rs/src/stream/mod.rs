// Pluggable stream transports
//
// A transport provides three capabilities:
// - `StreamResolver`: list the streams advertised on the network and open an
//   inlet bound to one of them
// - `Inlet`: pull samples; a zero timeout must never wait
// - `Outlet` / `OutletFactory`: publish samples under a descriptor
//
// Current implementations:
// - UDP: JSON datagrams, streams advertise themselves by their samples
// - LSL: Lab Streaming Layer via liblsl (feature `lsl-support`)
// - Memory: in-process bus for tests and demos

#[cfg(feature = "lsl-support")]
pub mod lsl;
pub mod locator;
pub mod memory;
pub mod udp;

use crate::config::{Backend, StreamConfig};
use crate::error::{BciError, Result};
use crate::types::{Sample, StreamDescriptor};
use async_trait::async_trait;
use std::time::Duration;

pub use memory::MemoryBus;
pub use udp::{UdpOutlet, UdpResolver};

/// Discovers advertised streams and connects to them
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Every stream seen within `wait_time`, in the order first seen.
    async fn discover(&self, wait_time: Duration) -> Result<Vec<StreamDescriptor>>;

    /// Open an inlet bound to a previously discovered stream.
    async fn open_inlet(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Inlet>>;
}

/// Consumer endpoint of one stream
#[async_trait]
pub trait Inlet: Send {
    fn descriptor(&self) -> &StreamDescriptor;

    /// Pull the oldest queued sample, waiting at most `timeout`.
    ///
    /// `Ok(None)` means nothing arrived in time. With `Duration::ZERO` this
    /// returns immediately.
    async fn pull_sample(&mut self, timeout: Duration) -> Result<Option<Sample>>;
}

/// Producer endpoint of one stream
pub trait Outlet: Send {
    fn descriptor(&self) -> &StreamDescriptor;

    /// Publish one sample. Without an explicit timestamp the local clock is used.
    fn push_sample(&mut self, values: &[f32], timestamp: Option<f64>) -> Result<()>;
}

/// Creates outlets on a transport
pub trait OutletFactory {
    fn create_outlet(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Outlet>>;
}

/// Reject samples whose width does not match the stream.
pub(crate) fn check_channels(descriptor: &StreamDescriptor, values: &[f32]) -> Result<()> {
    if values.len() != descriptor.channel_count {
        return Err(BciError::ChannelMismatch {
            expected: descriptor.channel_count,
            got: values.len(),
        });
    }
    Ok(())
}

/// Build the resolver for the configured backend.
pub async fn resolver(config: &StreamConfig) -> Result<Box<dyn StreamResolver>> {
    match config.backend {
        Backend::Udp => Ok(Box::new(UdpResolver::bind(&config.bind_addr).await?)),
        #[cfg(feature = "lsl-support")]
        Backend::Lsl => Ok(Box::new(lsl::LslResolver::new())),
        #[cfg(not(feature = "lsl-support"))]
        Backend::Lsl => Err(lsl_unavailable()),
    }
}

/// Build the outlet factory for the configured backend.
pub fn outlet_factory(config: &StreamConfig) -> Result<Box<dyn OutletFactory>> {
    match config.backend {
        Backend::Udp => Ok(Box::new(udp::UdpOutletFactory::new(&config.target_addr))),
        #[cfg(feature = "lsl-support")]
        Backend::Lsl => Ok(Box::new(lsl::LslOutletFactory)),
        #[cfg(not(feature = "lsl-support"))]
        Backend::Lsl => Err(lsl_unavailable()),
    }
}

#[cfg(not(feature = "lsl-support"))]
fn lsl_unavailable() -> BciError {
    BciError::BackendUnavailable(
        "LSL support is not compiled in; rebuild with --features lsl-support".to_string(),
    )
}
