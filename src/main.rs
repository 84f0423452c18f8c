use std::{env, fs::File, path::PathBuf};

use anyhow::{Context, Result};

use snake_arcade::config::Config;
use snake_arcade::game::SnakeGame;

fn main() -> Result<()> {
    let config_path = env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("loading configuration")?;
    init_logging(&config)?;

    let mut game = SnakeGame::new(config)?;
    game.initialize()?;

    // Restore the terminal even when the game loop failed
    let res = game.run();
    game.restore()?;
    res
}

fn init_logging(config: &Config) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if let Some(path) = &config.log_file {
        let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
