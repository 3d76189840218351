use crate::cli::ReceiveArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use bci_rs::{BciError, StreamPredicate};
use std::time::Duration;

pub async fn execute(args: ReceiveArgs) -> i32 {
    if !(args.timeout >= 0.0) {
        return commands::report(&BciError::InvalidConfig(format!(
            "timeout must be >= 0, got {}",
            args.timeout
        )));
    }

    let config = match commands::load_config(&args.transport) {
        Ok(c) => c,
        Err(e) => return commands::report(&e),
    };

    let predicate = match &args.name {
        Some(name) => StreamPredicate::Name(name.clone()),
        None => StreamPredicate::Type(args.stream_type.clone()),
    };

    println!("Looking for a stream...");
    let mut inlet = match commands::open_inlet(&config.stream, &predicate).await {
        Ok(i) => i,
        Err(e) => return commands::report(&e),
    };
    println!("Connected to '{}'", inlet.descriptor().name);

    let timeout = Duration::from_secs_f64(args.timeout);
    let mut received = 0u64;
    loop {
        if args.count.is_some_and(|count| received >= count) {
            break;
        }
        let pulled = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                break;
            }
            pulled = inlet.pull_sample(timeout) => pulled,
        };
        match pulled {
            Ok(Some(sample)) => {
                println!(
                    "Received data: {} at time {:.3}",
                    output::format_values(&sample.values),
                    sample.timestamp
                );
                received += 1;
            }
            Ok(None) => log::trace!("No sample within {:?}", timeout),
            Err(e) => return commands::report(&e),
        }
    }

    log::info!("Received {} samples", received);
    exit_codes::SUCCESS
}
