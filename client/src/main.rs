mod client_config;
mod connection;
mod game_loop;
mod input;
mod remote_snakes;
mod renderer;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use common::{config::{ConfigManager, Validate}, log, logger};
use crossterm::cursor::{Hide, Show};
use crossterm::event::EventStream;
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use client_config::{ClientConfig, DEFAULT_CONFIG_FILE};
use game_loop::{create_arena, GameLoop};
use renderer::TerminalRenderer;

#[derive(Parser)]
#[command(name = "snek_client")]
struct Args {
    /// YAML configuration file; missing means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Relay address; overrides `server_address`. Empty means offline.
    #[arg(long)]
    addr: Option<String>,

    /// Snakes leaving the field re-enter on the opposite side.
    #[arg(long)]
    wrap: bool,

    /// Local players on this terminal, 1 or 2.
    #[arg(long)]
    players: Option<usize>,

    /// Overrides `log_file`; the terminal belongs to the game.
    #[arg(long)]
    log_file: Option<String>,
}

fn load_config(args: &Args) -> Result<ClientConfig, String> {
    let mut config: ClientConfig = ConfigManager::from_yaml_file(&args.config).load()?;
    if let Some(addr) = &args.addr {
        config.server_address = Some(addr.clone());
    }
    if args.wrap {
        config.wrap = true;
    }
    if let Some(players) = args.players {
        config.local_players = players;
    }
    if let Some(log_file) = &args.log_file {
        config.log_file = log_file.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;
    logger::init_file_logger(Some("Client".to_string()), &PathBuf::from(&config.log_file))?;

    // Connect before taking over the terminal so a failure reads normally.
    let connection = match config.server_address() {
        Some(address) => Some(connection::connect(address, config.outbound_buffer).await?),
        None => None,
    };

    let (state, players) = create_arena(&config);
    log!(
        "Starting {} local player(s) on a {}x{} field, {:?}, {}",
        players.len(),
        config.field_width,
        config.field_height,
        config.boundary(),
        if connection.is_some() { "online" } else { "offline" }
    );

    let mut game = GameLoop::new(
        state,
        players,
        TerminalRenderer::new(io::stdout()),
        Duration::from_millis(config.tick_interval_ms),
    );
    let updates = match connection {
        Some(connection) => {
            game = game.with_outbound(connection.deltas);
            Some(connection.updates)
        }
        None => None,
    };

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let result = game.run(EventStream::new(), updates).await;

    // Restore the terminal even when the game failed.
    let restored = execute!(stdout, Show, LeaveAlternateScreen).and_then(|()| terminal::disable_raw_mode());

    let exit = result?;
    restored?;
    log!("Game over: {:?}", exit);
    Ok(())
}
