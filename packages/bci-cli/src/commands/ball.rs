use super::View;
use crate::cli::BallArgs;
use crate::commands;
use bci_rs::control::BallGame;

pub async fn execute(args: BallArgs) -> i32 {
    let config = match commands::session_config(&args.session, View::Ball) {
        Ok(c) => c,
        Err(e) => return commands::report(&e),
    };

    log::info!(
        "Ball view: smoothing {} (alpha {}), speed scale {}",
        if config.ball.smoothing.enabled { "on" } else { "off" },
        config.ball.smoothing.alpha,
        config.ball.speed_scale
    );

    let game = BallGame::new(config.ball, config.screen);
    match commands::play(game, &config, &args.session, "BCI Ball Control").await {
        Ok((game, summary)) => {
            if !args.session.json {
                println!(
                    "Session ended after {} frames ({} samples), ball at x={:.1}",
                    summary.frames,
                    summary.samples_consumed,
                    game.state().position()
                );
            }
            commands::print_summary(&summary, args.session.json)
        }
        Err(e) => commands::report(&e),
    }
}
