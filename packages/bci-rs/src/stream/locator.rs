use super::{Inlet, StreamResolver};
use crate::error::{BciError, Result};
use crate::types::StreamDescriptor;
use std::time::Duration;

/// Which advertised stream to bind to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamPredicate {
    /// Exact, case-sensitive name
    Name(String),
    /// Exact content type, e.g. "EEG"
    Type(String),
}

impl StreamPredicate {
    pub fn matches(&self, descriptor: &StreamDescriptor) -> bool {
        match self {
            StreamPredicate::Name(name) => descriptor.name == *name,
            StreamPredicate::Type(stream_type) => descriptor.stream_type == *stream_type,
        }
    }

    fn target(&self) -> String {
        match self {
            StreamPredicate::Name(name) => name.clone(),
            StreamPredicate::Type(stream_type) => format!("type={}", stream_type),
        }
    }
}

/// First descriptor satisfying `predicate`; later duplicates are ignored.
pub fn select<'a>(
    descriptors: &'a [StreamDescriptor],
    predicate: &StreamPredicate,
) -> Option<&'a StreamDescriptor> {
    descriptors.iter().find(|d| predicate.matches(d))
}

/// Discover streams for up to `wait_time` and open an inlet on the one named
/// exactly `name`.
pub async fn locate(
    resolver: &dyn StreamResolver,
    name: &str,
    wait_time: Duration,
) -> Result<Box<dyn Inlet>> {
    locate_by(resolver, &StreamPredicate::Name(name.to_string()), wait_time).await
}

pub async fn locate_by(
    resolver: &dyn StreamResolver,
    predicate: &StreamPredicate,
    wait_time: Duration,
) -> Result<Box<dyn Inlet>> {
    log::info!(
        "Scanning for streams (target: {}, wait {:.1}s)",
        predicate.target(),
        wait_time.as_secs_f64()
    );

    let streams = resolver.discover(wait_time).await?;
    log::debug!("{} stream(s) advertised", streams.len());

    let descriptor = select(&streams, predicate).ok_or_else(|| BciError::StreamNotFound {
        name: predicate.target(),
    })?;

    let inlet = resolver.open_inlet(descriptor).await?;
    log::info!(
        "Connected to stream '{}' ({} ch, type {})",
        descriptor.name,
        descriptor.channel_count,
        descriptor.stream_type
    );
    Ok(inlet)
}

/// Operator-facing explanation printed before exiting on `StreamNotFound`.
pub fn not_found_hints(name: &str) -> String {
    format!(
        "Stream '{}' not found!\n\
         Please check:\n\
         1. Is the producer running and streaming (e.g. OpenViBE scenario playing)?\n\
         2. Is the stream name correct (names are case-sensitive)?",
        name
    )
}
