use super::View;
use crate::cli::CoinsArgs;
use crate::commands;
use bci_rs::control::CoinGame;

pub async fn execute(args: CoinsArgs) -> i32 {
    let config = match commands::session_config(&args.session, View::Coins) {
        Ok(c) => c,
        Err(e) => return commands::report(&e),
    };

    let game = match args.seed {
        Some(seed) => CoinGame::seeded(config.coins, config.screen, seed),
        None => CoinGame::new(config.coins, config.screen),
    };

    match commands::play(game, &config, &args.session, "BCI Coin Catcher").await {
        Ok((game, summary)) => {
            if !args.session.json {
                println!("Game Over! Final Score: {}", game.state().score);
            }
            commands::print_summary(&summary, args.session.json)
        }
        Err(e) => commands::report(&e),
    }
}
