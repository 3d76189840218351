pub mod ball;
pub mod coins;
pub mod receive;
pub mod relay;
pub mod send;
pub mod streams;

use crate::cli::{SessionArgs, TransportArgs};
use crate::exit_codes;
use crate::output;
use crate::surface;
use bci_rs::config::StreamConfig;
use bci_rs::control::{run_session, Game, SessionOptions, SessionSummary};
use bci_rs::stream::locator::not_found_hints;
use bci_rs::{locate_by, stream, BciError, ControlConfig, Inlet, Result, StreamPredicate};

/// Which feedback view flag overrides apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Ball,
    Coins,
}

/// Configuration file (or defaults) with transport flags applied.
pub fn load_config(args: &TransportArgs) -> Result<ControlConfig> {
    let mut config = ControlConfig::load(args.config.as_deref())?;
    if let Some(backend) = args.backend {
        config.stream.backend = backend;
    }
    if let Some(bind) = &args.bind {
        config.stream.bind_addr = bind.clone();
    }
    if let Some(target) = &args.target {
        config.stream.target_addr = target.clone();
    }
    if let Some(wait) = args.wait {
        config.stream.wait_secs = wait;
    }
    Ok(config)
}

/// Configuration for a feedback view, validated after all overrides.
pub fn session_config(args: &SessionArgs, view: View) -> Result<ControlConfig> {
    let mut config = load_config(&args.transport)?;
    if let Some(name) = &args.stream {
        config.stream.name = name.clone();
    }
    if let Some(drain) = args.drain {
        config.drain = drain;
    }
    if let Some(rate) = args.frame_rate {
        config.frame_rate = rate;
    }

    let (smoothing, speed_scale) = match view {
        View::Ball => (&mut config.ball.smoothing, &mut config.ball.speed_scale),
        View::Coins => (&mut config.coins.smoothing, &mut config.coins.speed_scale),
    };
    if let Some(alpha) = args.alpha {
        smoothing.alpha = alpha;
        smoothing.enabled = true;
    }
    if args.smoothing {
        smoothing.enabled = true;
    }
    if args.no_smoothing {
        smoothing.enabled = false;
    }
    if let Some(scale) = args.speed_scale {
        *speed_scale = scale;
    }

    config.validate()?;
    Ok(config)
}

/// Discover streams on the configured transport and bind to the first match.
pub async fn open_inlet(config: &StreamConfig, predicate: &StreamPredicate) -> Result<Box<dyn Inlet>> {
    let resolver = stream::resolver(config).await?;
    locate_by(resolver.as_ref(), predicate, config.wait_time()).await
}

/// Print an error the way operators expect and pick the exit code.
pub fn report(error: &BciError) -> i32 {
    match error {
        BciError::StreamNotFound { name } => {
            log::error!("{}", error);
            eprintln!("Error: {}", not_found_hints(name));
        }
        _ => {
            log::error!("{}", error);
            eprintln!("Error: {}", error);
        }
    }
    exit_codes::for_error(error)
}

/// Locate the control stream, open the surface and run `game` to completion.
pub async fn play<G: Game>(
    game: G,
    config: &ControlConfig,
    args: &SessionArgs,
    title: &str,
) -> Result<(G, SessionSummary)> {
    let predicate = StreamPredicate::Name(config.stream.name.clone());
    let mut inlet = open_inlet(&config.stream, &predicate).await?;
    let mut surface = surface::open(args.window, &config.screen, title)?;

    let options = SessionOptions {
        max_frames: args.max_frames,
        ..SessionOptions::from_config(config)
    };
    run_session(game, inlet.as_mut(), surface.as_mut(), &options).await
}

/// JSON summary on stdout when requested.
pub fn print_summary(summary: &SessionSummary, json: bool) -> i32 {
    if !json {
        return exit_codes::SUCCESS;
    }
    match output::write_json(summary) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bci_rs::{Backend, DrainPolicy};

    #[test]
    fn test_transport_overrides() {
        let args = TransportArgs {
            config: None,
            backend: Some(Backend::Udp),
            bind: Some("127.0.0.1:0".into()),
            target: Some("127.0.0.1:9".into()),
            wait: Some(0.25),
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.stream.bind_addr, "127.0.0.1:0");
        assert_eq!(config.stream.target_addr, "127.0.0.1:9");
        assert_eq!(config.stream.wait_secs, 0.25);
    }

    #[test]
    fn test_view_overrides_touch_one_section() {
        let args = SessionArgs {
            alpha: Some(0.5),
            speed_scale: Some(2.0),
            drain: Some(DrainPolicy::Latest),
            ..SessionArgs::default()
        };

        let config = session_config(&args, View::Coins).unwrap();
        assert!(config.coins.smoothing.enabled);
        assert_eq!(config.coins.smoothing.alpha, 0.5);
        assert_eq!(config.coins.speed_scale, 2.0);
        assert_eq!(config.ball.speed_scale, 4.0);
        assert_eq!(config.drain, DrainPolicy::Latest);
    }

    #[test]
    fn test_no_smoothing_wins_over_alpha() {
        let args = SessionArgs {
            alpha: Some(0.5),
            no_smoothing: true,
            ..SessionArgs::default()
        };
        let config = session_config(&args, View::Ball).unwrap();
        assert!(!config.ball.smoothing.enabled);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = SessionArgs {
            alpha: Some(2.0),
            ..SessionArgs::default()
        };
        assert!(matches!(
            session_config(&args, View::Ball),
            Err(BciError::InvalidConfig(_))
        ));
    }
}
