use anyhow::Result;
use bookmark_dash::{App, AppConfig, EventHandler, logging, ui};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bookmark-dash", version, about)]
struct Cli {
    /// Config file, defaults to the platform config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Skip the trending repositories panel
    #[arg(long)]
    no_repos: bool,

    /// Disable the ambient animation
    #[arg(long)]
    no_animation: bool,

    /// Where diagnostics are written
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&path)?;
    if cli.no_repos {
        config.repos.enabled = false;
    }
    if cli.no_animation {
        config.animation.enabled = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init_logging(&log_path)?;

    let config = load_config(&cli)?;
    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut event_handler = EventHandler::new();
    let mut app = App::new(config, event_handler.sender())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    event_handler.start_input();
    app.mount();

    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;

    app.teardown();
    // Closes the channel so the input thread exits
    drop(event_handler);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "dashboard exited with an error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let event = event_handler.next().await?;
        app.handle_event(event);
        // Apply whatever queued up while drawing before the next frame
        while let Some(event) = event_handler.try_next() {
            app.handle_event(event);
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
