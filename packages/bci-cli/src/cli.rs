use bci_rs::{Backend, DrainPolicy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bci",
    version,
    about = "BCI control-signal feedback views and stream tools",
    long_about = "Move on-screen feedback with a motor-imagery control signal published as a named stream.\n\
                  Streams travel over UDP by default; build with --features lsl-support for Lab Streaming Layer."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ball feedback: the smoothed signal pushes a ball left or right
    Ball(BallArgs),
    /// Coin catcher game driven by the raw signal
    Coins(CoinsArgs),
    /// Publish a synthetic test stream
    Send(SendArgs),
    /// Print samples from a stream to the console
    Receive(ReceiveArgs),
    /// Turn a two-class classifier stream into the control stream
    Relay(RelayArgs),
    /// List the streams currently advertised
    Streams(StreamsArgs),
}

/// Where streams come from and go to
#[derive(Args, Clone, Default)]
pub struct TransportArgs {
    /// JSON configuration file (default: <config dir>/bci/config.json if present)
    #[arg(long, env = "BCI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stream transport: udp or lsl
    #[arg(long)]
    pub backend: Option<Backend>,

    /// Local UDP address to listen on
    #[arg(long)]
    pub bind: Option<String>,

    /// UDP address to publish to
    #[arg(long)]
    pub target: Option<String>,

    /// Discovery window in seconds
    #[arg(long)]
    pub wait: Option<f64>,
}

#[derive(Args, Clone, Default)]
pub struct SessionArgs {
    #[command(flatten)]
    pub transport: TransportArgs,

    /// Exact (case-sensitive) name of the control stream
    #[arg(long)]
    pub stream: Option<String>,

    /// Samples consumed per frame: one-per-frame or latest
    #[arg(long)]
    pub drain: Option<DrainPolicy>,

    /// Target frames per second
    #[arg(long)]
    pub frame_rate: Option<u32>,

    /// Smoothing coefficient in (0, 1]; implies --smoothing
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Enable exponential smoothing of the signal
    #[arg(long, conflicts_with = "no_smoothing")]
    pub smoothing: bool,

    /// Move by the raw signal
    #[arg(long)]
    pub no_smoothing: bool,

    /// Pixels per frame per unit of signal
    #[arg(long)]
    pub speed_scale: Option<f64>,

    /// Draw in a window (requires the `window` feature); headless otherwise
    #[arg(long, default_value_t = false)]
    pub window: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Print the session summary as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct BallArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args)]
pub struct CoinsArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Seed for coin positions (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub transport: TransportArgs,

    /// Stream name
    #[arg(long, default_value = bci_rs::DEFAULT_STREAM_NAME)]
    pub name: String,

    /// Stream content type
    #[arg(long = "type", default_value = "EEG")]
    pub stream_type: String,

    /// Number of channels
    #[arg(long, default_value_t = 8)]
    pub channels: usize,

    /// Source id advertised with the stream
    #[arg(long, default_value = "id_ov_123")]
    pub source_id: String,

    /// Samples per second
    #[arg(long, default_value_t = 10.0)]
    pub rate: f64,

    /// Stop after this many samples
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args)]
pub struct ReceiveArgs {
    #[command(flatten)]
    pub transport: TransportArgs,

    /// Bind to the stream with this exact name instead of matching by type
    #[arg(long)]
    pub name: Option<String>,

    /// Content type to match when no name is given
    #[arg(long = "type", default_value = "EEG")]
    pub stream_type: String,

    /// Seconds to wait for each sample
    #[arg(long, default_value_t = 1.0)]
    pub timeout: f64,

    /// Stop after this many samples
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args)]
pub struct RelayArgs {
    #[command(flatten)]
    pub transport: TransportArgs,

    /// Two-channel classifier stream to read
    #[arg(long, default_value = "BCI_Classifier_Output")]
    pub input: String,

    /// Stop after this many input samples
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args)]
pub struct StreamsArgs {
    #[command(flatten)]
    pub transport: TransportArgs,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
