use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{error::Error, io};

use clap::Parser;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use wxdash::app::{run_app, App};
use wxdash::cli::Args;
use wxdash::openmeteo::HttpGateway;
use wxdash::weather::UnitPreferences;

const TICK_RATE: Duration = Duration::from_millis(100);

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let units = if args.imperial {
        UnitPreferences::imperial()
    } else {
        UnitPreferences::default()
    };
    let gateway = Arc::new(HttpGateway::new(Duration::from_secs(args.timeout))?);
    let (app, first) = App::new(units, args.place.clone());

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, gateway, app, first, TICK_RATE);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}
