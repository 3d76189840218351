use crate::cli::RelayArgs;
use crate::commands;
use crate::exit_codes;
use bci_rs::plugin::{DifferenceBox, MatrixChunk, ProcessingBox};
use bci_rs::{stream, Inlet, Result, StreamPredicate};
use std::collections::VecDeque;
use std::time::Duration;

const PULL_TIMEOUT: Duration = Duration::from_millis(100);

pub async fn execute(args: RelayArgs) -> i32 {
    let config = match commands::load_config(&args.transport) {
        Ok(c) => c,
        Err(e) => return commands::report(&e),
    };
    let factory = match stream::outlet_factory(&config.stream) {
        Ok(f) => f,
        Err(e) => return commands::report(&e),
    };

    // classifier output arrives on its own port unless --bind says otherwise
    let mut input = config.stream.clone();
    if args.transport.bind.is_none() {
        input.bind_addr = config.stream.relay_bind_addr.clone();
    }
    if input.bind_addr == config.stream.target_addr {
        log::warn!(
            "Relay listens on {} and publishes to the same address",
            input.bind_addr
        );
    }

    let predicate = StreamPredicate::Name(args.input.clone());
    let mut inlet = match commands::open_inlet(&input, &predicate).await {
        Ok(i) => i,
        Err(e) => return commands::report(&e),
    };
    let channels = inlet.descriptor().channel_count;
    if channels != 2 {
        log::warn!(
            "Input '{}' has {} channels; the relay expects 2 (left, right)",
            args.input,
            channels
        );
    }

    let mut plugin = DifferenceBox::new(factory.as_ref());
    match relay(&mut plugin, inlet.as_mut(), args.count).await {
        Ok(()) => {
            let stats = plugin.stats();
            println!(
                "Relayed {} samples ({} malformed, {} dropped)",
                stats.pushed, stats.malformed, stats.dropped
            );
            exit_codes::SUCCESS
        }
        Err(e) => commands::report(&e),
    }
}

/// Run the box over the inlet, then uninitialize it whether or not hosting
/// failed.
async fn relay(
    plugin: &mut dyn ProcessingBox,
    inlet: &mut dyn Inlet,
    count: Option<u64>,
) -> Result<()> {
    let hosted = host(plugin, inlet, count).await;
    let closed = plugin.uninitialize();
    hosted.and(closed)
}

/// Feed every pulled sample through the box as one chunk, bracketed by a
/// header and an end marker.
async fn host(
    plugin: &mut dyn ProcessingBox,
    inlet: &mut dyn Inlet,
    count: Option<u64>,
) -> Result<()> {
    plugin.initialize()?;

    let mut queue = VecDeque::new();
    queue.push_back(MatrixChunk::Header {
        dimension_sizes: vec![inlet.descriptor().channel_count, 1],
    });
    plugin.process(&mut queue)?;

    let mut relayed = 0u64;
    loop {
        if count.is_some_and(|count| relayed >= count) {
            break;
        }
        let pulled = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                break;
            }
            pulled = inlet.pull_sample(PULL_TIMEOUT) => pulled?,
        };
        if let Some(sample) = pulled {
            queue.push_back(MatrixChunk::Buffer(
                sample.values.iter().map(|v| *v as f64).collect(),
            ));
            plugin.process(&mut queue)?;
            relayed += 1;
        }
    }

    queue.push_back(MatrixChunk::End);
    plugin.process(&mut queue)
}
