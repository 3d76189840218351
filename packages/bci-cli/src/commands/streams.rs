use crate::cli::StreamsArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use bci_rs::stream;

pub async fn execute(args: StreamsArgs) -> i32 {
    let config = match commands::load_config(&args.transport) {
        Ok(c) => c,
        Err(e) => return commands::report(&e),
    };

    let resolver = match stream::resolver(&config.stream).await {
        Ok(r) => r,
        Err(e) => return commands::report(&e),
    };
    let streams = match resolver.discover(config.stream.wait_time()).await {
        Ok(s) => s,
        Err(e) => return commands::report(&e),
    };

    if args.json {
        if let Err(e) = output::write_json(&streams) {
            eprintln!("Error: {}", e);
            return exit_codes::FAILURE;
        }
    } else if streams.is_empty() {
        println!(
            "No streams found within {:.1}s",
            config.stream.wait_secs
        );
    } else {
        print!("{}", output::stream_table(&streams));
    }

    exit_codes::SUCCESS
}
