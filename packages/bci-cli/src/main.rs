use clap::Parser;

mod cli;
mod commands;
mod exit_codes;
mod output;
mod surface;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let exit_code = match cli.command {
        cli::Command::Ball(args) => commands::ball::execute(args).await,
        cli::Command::Coins(args) => commands::coins::execute(args).await,
        cli::Command::Send(args) => commands::send::execute(args).await,
        cli::Command::Receive(args) => commands::receive::execute(args).await,
        cli::Command::Relay(args) => commands::relay::execute(args).await,
        cli::Command::Streams(args) => commands::streams::execute(args).await,
    };

    std::process::exit(exit_code);
}
