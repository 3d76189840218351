// UDP stream transport
//
// Each datagram carries one JSON-encoded sample together with the descriptor
// of the stream that produced it. A listener learns which streams exist from
// the datagrams it receives, so discovery is "listen for `wait_time` and
// collect distinct descriptors". The socket bound for discovery is kept and
// handed to the inlet, which filters datagrams down to its own stream.

use super::{check_channels, Inlet, Outlet, OutletFactory, StreamResolver};
use crate::error::{BciError, Result};
use crate::types::{local_clock, Sample, StreamDescriptor};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;

const MAX_DATAGRAM: usize = 65_507;

/// Wire format of one datagram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datagram {
    pub stream: StreamDescriptor,
    pub values: Vec<f32>,
    pub timestamp: f64,
}

impl Datagram {
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| BciError::Parse(format!("Cannot encode sample: {}", e)))
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| BciError::Parse(format!("Invalid JSON datagram: {}", e)))
    }
}

pub struct UdpResolver {
    bind_addr: String,
    socket: Mutex<Option<UdpSocket>>,
}

impl UdpResolver {
    /// Bind the listening socket right away so that producers can already
    /// reach it and bind errors surface at startup.
    pub async fn bind(bind_addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| BciError::Connection(format!("UDP bind to {} failed: {}", bind_addr, e)))?;
        log::info!("Listening for streams on {}", socket.local_addr()?);

        Ok(Self {
            bind_addr: bind_addr.to_string(),
            socket: Mutex::new(Some(socket)),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket
            .lock()
            .as_ref()
            .and_then(|s| s.local_addr().ok())
    }

    async fn take_socket(&self) -> Result<UdpSocket> {
        let existing = self.socket.lock().take();
        match existing {
            Some(socket) => Ok(socket),
            None => UdpSocket::bind(&self.bind_addr).await.map_err(|e| {
                BciError::Connection(format!("UDP bind to {} failed: {}", self.bind_addr, e))
            }),
        }
    }
}

#[async_trait]
impl StreamResolver for UdpResolver {
    async fn discover(&self, wait_time: Duration) -> Result<Vec<StreamDescriptor>> {
        let socket = self.take_socket().await?;
        let deadline = Instant::now() + wait_time;
        let mut buffer = vec![0u8; MAX_DATAGRAM];
        let mut found: Vec<StreamDescriptor> = Vec::new();

        log::debug!("Collecting stream advertisements for {:?}", wait_time);

        loop {
            let received = tokio::time::timeout_at(deadline, socket.recv(&mut buffer)).await;
            match received {
                Err(_) => break,
                Ok(Ok(len)) => match Datagram::decode(&buffer[..len]) {
                    Ok(datagram) => {
                        if !found.iter().any(|d| d.same_stream(&datagram.stream)) {
                            log::debug!("Discovered stream '{}'", datagram.stream.name);
                            found.push(datagram.stream);
                        }
                    }
                    Err(e) => log::warn!("Ignoring datagram: {}", e),
                },
                Ok(Err(e)) => {
                    *self.socket.lock() = Some(socket);
                    return Err(BciError::Connection(format!("UDP receive failed: {}", e)));
                }
            }
        }

        *self.socket.lock() = Some(socket);
        Ok(found)
    }

    async fn open_inlet(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Inlet>> {
        let socket = self.take_socket().await?;
        Ok(Box::new(UdpInlet {
            socket,
            descriptor: descriptor.clone(),
            buffer: vec![0u8; MAX_DATAGRAM],
        }))
    }
}

pub struct UdpInlet {
    socket: UdpSocket,
    descriptor: StreamDescriptor,
    buffer: Vec<u8>,
}

#[async_trait]
impl Inlet for UdpInlet {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    async fn pull_sample(&mut self, timeout: Duration) -> Result<Option<Sample>> {
        let deadline = Instant::now() + timeout;

        loop {
            let len = if timeout.is_zero() {
                match self.socket.try_recv(&mut self.buffer) {
                    Ok(len) => len,
                    Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
                    Err(e) => return Err(BciError::StreamLost(e.to_string())),
                }
            } else {
                match tokio::time::timeout_at(deadline, self.socket.recv(&mut self.buffer)).await {
                    Err(_) => return Ok(None),
                    Ok(Ok(len)) => len,
                    Ok(Err(e)) => return Err(BciError::StreamLost(e.to_string())),
                }
            };

            match Datagram::decode(&self.buffer[..len]) {
                Ok(datagram) if datagram.stream.same_stream(&self.descriptor) => {
                    return Ok(Some(Sample::new(datagram.values, datagram.timestamp)));
                }
                Ok(_) => continue,
                Err(e) => log::warn!("Ignoring datagram: {}", e),
            }
        }
    }
}

pub struct UdpOutletFactory {
    target_addr: String,
}

impl UdpOutletFactory {
    pub fn new(target_addr: &str) -> Self {
        Self {
            target_addr: target_addr.to_string(),
        }
    }
}

impl OutletFactory for UdpOutletFactory {
    fn create_outlet(&self, descriptor: &StreamDescriptor) -> Result<Box<dyn Outlet>> {
        Ok(Box::new(UdpOutlet::connect(descriptor.clone(), &self.target_addr)?))
    }
}

/// Sends every sample to one target address (unicast or broadcast).
pub struct UdpOutlet {
    socket: std::net::UdpSocket,
    target: SocketAddr,
    descriptor: StreamDescriptor,
}

impl UdpOutlet {
    pub fn connect(descriptor: StreamDescriptor, target_addr: &str) -> Result<Self> {
        let target: SocketAddr = target_addr.parse().map_err(|e| {
            BciError::InvalidConfig(format!("Invalid target address '{}': {}", target_addr, e))
        })?;
        let bind = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = std::net::UdpSocket::bind(bind)?;
        socket.set_broadcast(true)?;

        log::info!(
            "Publishing stream '{}' ({} ch, type {}) to {}",
            descriptor.name,
            descriptor.channel_count,
            descriptor.stream_type,
            target
        );

        Ok(Self {
            socket,
            target,
            descriptor,
        })
    }
}

impl Outlet for UdpOutlet {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn push_sample(&mut self, values: &[f32], timestamp: Option<f64>) -> Result<()> {
        check_channels(&self.descriptor, values)?;
        let datagram = Datagram {
            stream: self.descriptor.clone(),
            values: values.to_vec(),
            timestamp: timestamp.unwrap_or_else(local_clock),
        };
        self.socket.send_to(&datagram.encode()?, self.target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datagram_rejects_garbage() {
        assert!(matches!(
            Datagram::decode(b"not json"),
            Err(BciError::Parse(_))
        ));
    }

    #[test]
    fn test_outlet_rejects_bad_target() {
        let desc = StreamDescriptor::new("s", "Control", 1, 0.0, "id");
        assert!(matches!(
            UdpOutlet::connect(desc, "not-an-address"),
            Err(BciError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_outlet_checks_channel_count() {
        let desc = StreamDescriptor::new("s", "Control", 1, 0.0, "id");
        let mut outlet = UdpOutlet::connect(desc, "127.0.0.1:9").unwrap();
        assert!(matches!(
            outlet.push_sample(&[1.0, 2.0], None),
            Err(BciError::ChannelMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_discover_times_out_empty() {
        let resolver = UdpResolver::bind("127.0.0.1:0").await.unwrap();
        let found = resolver.discover(Duration::from_millis(50)).await.unwrap();
        assert!(found.is_empty());
    }
}
