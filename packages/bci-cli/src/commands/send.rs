use crate::cli::SendArgs;
use crate::commands;
use crate::exit_codes;
use bci_rs::{stream, BciError, StreamDescriptor};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Test pattern: channel k carries k, channel 0 alternates 0/1 per sample.
pub fn synthetic_sample(index: u64, channels: usize) -> Vec<f32> {
    let mut values: Vec<f32> = (0..channels).map(|k| k as f32).collect();
    if let Some(first) = values.first_mut() {
        *first = (index % 2) as f32;
    }
    values
}

/// Values and timestamp of the `n`-th sample sent (zero-based). Indices start
/// at 1, so the first sample carries 1 on channel 0 and is stamped `1 / rate`.
pub fn nth_sample(n: u64, channels: usize, rate: f64) -> (Vec<f32>, f64) {
    let index = n + 1;
    (synthetic_sample(index, channels), index as f64 / rate)
}

pub async fn execute(args: SendArgs) -> i32 {
    if args.channels == 0 {
        return commands::report(&BciError::InvalidConfig(
            "channel count must be at least 1".into(),
        ));
    }
    if !(args.rate > 0.0) {
        return commands::report(&BciError::InvalidConfig(format!(
            "rate must be > 0, got {}",
            args.rate
        )));
    }

    let config = match commands::load_config(&args.transport) {
        Ok(c) => c,
        Err(e) => return commands::report(&e),
    };
    let factory = match stream::outlet_factory(&config.stream) {
        Ok(f) => f,
        Err(e) => return commands::report(&e),
    };

    let descriptor = StreamDescriptor::new(
        args.name.clone(),
        args.stream_type.clone(),
        args.channels,
        0.0,
        args.source_id.clone(),
    );
    let mut outlet = match factory.create_outlet(&descriptor) {
        Ok(o) => o,
        Err(e) => return commands::report(&e),
    };

    println!("Now sending data on '{}'...", descriptor.name);

    let period = Duration::from_secs_f64(1.0 / args.rate);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut sent = 0u64;
    loop {
        if args.count.is_some_and(|count| sent >= count) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                break;
            }
            _ = ticker.tick() => {
                let (values, timestamp) = nth_sample(sent, args.channels, args.rate);
                if let Err(e) = outlet.push_sample(&values, Some(timestamp)) {
                    return commands::report(&e);
                }
                log::debug!("Sent sample {} at {:.3}", sent, timestamp);
                sent += 1;
            }
        }
    }

    log::info!("Sent {} samples on '{}'", sent, descriptor.name);
    exit_codes::SUCCESS
}
