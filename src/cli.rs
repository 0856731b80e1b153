use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

const ABOUT: &str = "Open-Meteo weather dashboard TUI";

const LONG_ABOUT: &str = "
Terminal dashboard for current, daily and hourly weather from Open-Meteo.

Pass a place name to open the dashboard on that location; without one the
dashboard starts on Berlin, Germany. Inside the app, `/` searches with live
suggestions, `t`/`w`/`p` switch display units and `d` cycles the hourly day.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "Place to look up on startup (e.g. \"Paris\", \"New York\")")]
    pub place: Option<String>,

    #[arg(long, help = "Start with imperial display units (°F, mph, inches)")]
    pub imperial: bool,

    #[arg(
        long,
        default_value_t = 10,
        help = "Timeout in seconds for geocoding and forecast requests"
    )]
    pub timeout: u64,

    #[arg(long, help = "Append diagnostics to this file (stdout belongs to the UI)")]
    pub log_file: Option<PathBuf>,
}
