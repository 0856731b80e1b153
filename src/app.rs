//! Orchestration: user input -> geocoding -> forecast fetch -> session
//! update -> display-state transition.
//!
//! [`App`] is a pure state machine: key and worker events go in, [`Command`]s
//! come out. The event loop in [`run_app`] executes commands on worker
//! threads and feeds results back over a channel, so the UI never blocks on
//! the network. Every request carries a sequence number; a response that is
//! not the latest issued request of its kind is discarded, which makes the
//! last *request* win even when responses arrive out of order.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::openmeteo::forecast::{self, ForecastPayload};
use crate::openmeteo::geocoding::{self, Candidate};
use crate::openmeteo::{ApiError, Gateway};
use crate::session::{Session, UnitChoice};
use crate::timeline;
use crate::weather::{Location, UnitPreferences};

pub const SUGGESTION_LIMIT: usize = 5;
/// Idle time before an edited query triggers an autocomplete request.
pub const DEBOUNCE: Duration = Duration::from_millis(180);

/// Which of the four top-level panels is visible.
///
/// `NoResults` and `Error` suppress the weather content; the structural
/// chrome (search bar, headers) stays up in every state so the user can
/// immediately retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Loading,
    Content,
    NoResults,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
}

/// What to resolve and fetch: a free-text query, or a place that already
/// has coordinates (suggestion pick, retry).
#[derive(Debug, Clone, PartialEq)]
pub enum LoadTarget {
    Query(String),
    Place(Location),
}

/// Work the event loop must hand to a worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Suggest { seq: u64, query: String },
    Load { seq: u64, target: LoadTarget },
}

/// Why a search-and-fetch round failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no matching place")]
    ResolutionEmpty,

    #[error("geocoding failed: {0}")]
    Resolution(#[source] ApiError),

    #[error("forecast fetch failed: {0}")]
    Fetch(#[source] ApiError),
}

/// A worker thread's result, tagged with the request's sequence number.
#[derive(Debug)]
pub enum WorkerEvent {
    Suggestions {
        seq: u64,
        outcome: Result<Vec<Candidate>, ApiError>,
    },
    Loaded {
        seq: u64,
        outcome: Result<(Location, ForecastPayload), LoadError>,
    },
}

/// Resolves a load target to a location and fetches its forecast. Runs on a
/// worker thread; also driven directly by the integration tests.
pub fn resolve_and_fetch<G: Gateway + ?Sized>(
    gateway: &G,
    target: &LoadTarget,
) -> Result<(Location, ForecastPayload), LoadError> {
    let location = match target {
        LoadTarget::Place(location) => location.clone(),
        LoadTarget::Query(query) => geocoding::resolve_first(gateway, query)
            .map_err(LoadError::Resolution)?
            .ok_or(LoadError::ResolutionEmpty)?
            .to_location(),
    };
    let payload = forecast::fetch(gateway, location.latitude, location.longitude)
        .map_err(LoadError::Fetch)?;
    Ok((location, payload))
}

pub struct App {
    pub session: Session,
    pub display: DisplayState,
    pub mode: Mode,
    pub query: String,
    pub suggestions: Vec<Candidate>,
    pub suggestion_cursor: Option<usize>,
    pub selected_day: usize,
    pub should_quit: bool,
    load_seq: u64,
    suggest_seq: u64,
    debounce: Option<Instant>,
    dirty: bool,
}

impl App {
    /// Builds the initial state and the startup command: load the given
    /// place query, or the default location when none was supplied. Either
    /// way the session opens in `Loading`.
    pub fn new(units: UnitPreferences, initial_query: Option<String>) -> (Self, Command) {
        let session = Session::new(Location::berlin(), units);
        let mut app = Self {
            query: session.location().display_name.clone(),
            session,
            display: DisplayState::Loading,
            mode: Mode::Browse,
            suggestions: Vec::new(),
            suggestion_cursor: None,
            selected_day: 0,
            should_quit: false,
            load_seq: 0,
            suggest_seq: 0,
            debounce: None,
            dirty: true,
        };
        let target = match initial_query {
            Some(query) => {
                app.query = query.clone();
                LoadTarget::Query(query)
            }
            None => LoadTarget::Place(app.session.location().clone()),
        };
        let command = app.begin_load(target);
        (app, command)
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn begin_load(&mut self, target: LoadTarget) -> Command {
        self.display = DisplayState::Loading;
        self.load_seq += 1;
        // Invalidate any in-flight autocomplete; its dropdown is gone.
        self.suggest_seq += 1;
        self.debounce = None;
        self.suggestions.clear();
        self.suggestion_cursor = None;
        self.dirty = true;
        Command::Load {
            seq: self.load_seq,
            target,
        }
    }

    /// Handles one key press. Returns a command when the input requires a
    /// remote operation.
    pub fn on_key(&mut self, code: KeyCode, now: Instant) -> Option<Command> {
        match self.mode {
            Mode::Browse => self.on_browse_key(code),
            Mode::Search => self.on_search_key(code, now),
        }
    }

    fn on_browse_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.mode = Mode::Search;
                self.query.clear();
                self.dirty = true;
                None
            }
            KeyCode::Char('t') => self.choose_unit(UnitChoice::Temperature(
                self.session.units.temperature.toggle(),
            )),
            KeyCode::Char('w') => {
                self.choose_unit(UnitChoice::Wind(self.session.units.wind.toggle()))
            }
            KeyCode::Char('p') => self.choose_unit(UnitChoice::Precipitation(
                self.session.units.precipitation.toggle(),
            )),
            KeyCode::Char('d') => {
                let count = self.day_count();
                if count > 0 {
                    self.selected_day = (self.selected_day + 1) % count;
                    self.dirty = true;
                }
                None
            }
            KeyCode::Char('r') => {
                let place = self.session.location().clone();
                Some(self.begin_load(LoadTarget::Place(place)))
            }
            _ => None,
        }
    }

    fn on_search_key(&mut self, code: KeyCode, now: Instant) -> Option<Command> {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.query = self.session.location().display_name.clone();
                self.suggestions.clear();
                self.suggestion_cursor = None;
                self.debounce = None;
                self.dirty = true;
                None
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.query_edited(now);
                None
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.query_edited(now);
                None
            }
            KeyCode::Down => {
                self.move_cursor(1);
                None
            }
            KeyCode::Up => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Enter => self.submit_search(),
            _ => None,
        }
    }

    fn choose_unit(&mut self, choice: UnitChoice) -> Option<Command> {
        // Re-render comes straight from the cached payload; never a fetch.
        self.session.set_unit(choice);
        self.dirty = true;
        None
    }

    fn query_edited(&mut self, now: Instant) {
        if self.query.trim().chars().count() >= 2 {
            self.debounce = Some(now);
        } else {
            self.debounce = None;
            self.suggest_seq += 1;
            self.suggestions.clear();
            self.suggestion_cursor = None;
        }
        self.dirty = true;
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.suggestions.is_empty() {
            return;
        }
        let len = self.suggestions.len() as isize;
        self.suggestion_cursor = Some(match self.suggestion_cursor {
            Some(current) => (current as isize + delta).rem_euclid(len) as usize,
            // First Down highlights the top entry, first Up the bottom one.
            None if delta > 0 => 0,
            None => (len - 1) as usize,
        });
        self.dirty = true;
    }

    fn submit_search(&mut self) -> Option<Command> {
        self.mode = Mode::Browse;
        if let Some(i) = self.suggestion_cursor {
            if let Some(candidate) = self.suggestions.get(i).cloned() {
                self.query = candidate.display_label();
                return Some(self.begin_load(LoadTarget::Place(candidate.to_location())));
            }
        }
        let query = self.query.trim().to_string();
        if query.is_empty() {
            self.dirty = true;
            return None;
        }
        Some(self.begin_load(LoadTarget::Query(query)))
    }

    /// Fires the debounced autocomplete request once the query has been
    /// idle long enough.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<Command> {
        let armed = self.debounce?;
        if now.duration_since(armed) < DEBOUNCE {
            return None;
        }
        self.debounce = None;
        self.suggest_seq += 1;
        Some(Command::Suggest {
            seq: self.suggest_seq,
            query: self.query.trim().to_string(),
        })
    }

    /// Applies a worker result. Stale responses (an older sequence number
    /// than the latest request) are dropped unseen.
    pub fn on_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Suggestions { seq, outcome } => {
                if seq != self.suggest_seq {
                    debug!(seq, latest = self.suggest_seq, "stale suggestion response");
                    return;
                }
                match outcome {
                    Ok(candidates) => {
                        // Nothing highlighted until the user arrows into the
                        // list; a plain Enter still submits the raw query.
                        self.suggestion_cursor = None;
                        self.suggestions = candidates;
                    }
                    Err(e) => {
                        // Autocomplete failures only dismiss the dropdown;
                        // they never drive the state machine.
                        warn!(error = %e, "autocomplete failed");
                        self.suggestions.clear();
                        self.suggestion_cursor = None;
                    }
                }
                self.dirty = true;
            }
            WorkerEvent::Loaded { seq, outcome } => {
                if seq != self.load_seq {
                    debug!(seq, latest = self.load_seq, "stale load response");
                    return;
                }
                match outcome {
                    Ok((location, payload)) => {
                        info!(place = %location.display_name, "forecast loaded");
                        self.query = location.display_name.clone();
                        self.session.set_location_and_payload(location, payload);
                        self.selected_day = 0;
                        self.display = DisplayState::Content;
                    }
                    Err(LoadError::ResolutionEmpty) => {
                        info!("no geocoding candidates");
                        self.query.clear();
                        self.display = DisplayState::NoResults;
                    }
                    Err(e) => {
                        warn!(error = %e, "load failed");
                        self.display = DisplayState::Error;
                    }
                }
                self.dirty = true;
            }
        }
    }

    fn day_count(&self) -> usize {
        self.session
            .payload()
            .and_then(|p| p.hourly.as_ref())
            .map(|h| timeline::group_by_calendar_day(&h.time).len())
            .unwrap_or(0)
    }
}

fn dispatch(gateway: Arc<dyn Gateway>, tx: Sender<WorkerEvent>, command: Command) {
    thread::spawn(move || {
        let event = match command {
            Command::Suggest { seq, query } => WorkerEvent::Suggestions {
                seq,
                outcome: geocoding::suggest(gateway.as_ref(), &query, SUGGESTION_LIMIT),
            },
            Command::Load { seq, target } => WorkerEvent::Loaded {
                seq,
                outcome: resolve_and_fetch(gateway.as_ref(), &target),
            },
        };
        // Receiver gone means the app is shutting down.
        let _ = tx.send(event);
    });
}

/// The terminal event loop: draw when state changed, translate key events,
/// execute commands on worker threads, drain their results.
pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    gateway: Arc<dyn Gateway>,
    mut app: App,
    first: Command,
    tick_rate: Duration,
) -> io::Result<()> {
    let (tx, rx): (Sender<WorkerEvent>, Receiver<WorkerEvent>) = mpsc::channel();
    dispatch(Arc::clone(&gateway), tx.clone(), first);

    let mut spinner: u32 = 0;
    loop {
        if app.take_dirty() || app.display == DisplayState::Loading {
            terminal.draw(|f| crate::ui::draw(f, &app, spinner))?;
        }

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(command) = app.on_key(key.code, Instant::now()) {
                        dispatch(Arc::clone(&gateway), tx.clone(), command);
                    }
                }
                Event::Resize(_, _) => app.mark_dirty(),
                _ => {}
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.on_worker_event(event);
        }

        if let Some(command) = app.poll_debounce(Instant::now()) {
            dispatch(Arc::clone(&gateway), tx.clone(), command);
        }

        if app.display == DisplayState::Loading {
            spinner = spinner.wrapping_add(1);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openmeteo::forecast::CurrentWeather;

    fn content_payload() -> ForecastPayload {
        ForecastPayload {
            current_weather: Some(CurrentWeather {
                temperature: Some(18.2),
                windspeed: Some(3.0),
                weathercode: Some(0),
            }),
            ..Default::default()
        }
    }

    fn paris() -> Location {
        Location {
            display_name: "Paris, France".into(),
            latitude: 48.8566,
            longitude: 2.3522,
        }
    }

    fn submitted(app: &mut App, query: &str) -> Command {
        app.on_key(KeyCode::Char('/'), Instant::now());
        for c in query.chars() {
            app.on_key(KeyCode::Char(c), Instant::now());
        }
        app.on_key(KeyCode::Enter, Instant::now())
            .expect("submit issues a load")
    }

    #[test]
    fn starts_loading_the_default_place() {
        let (app, command) = App::new(UnitPreferences::default(), None);
        assert_eq!(app.display, DisplayState::Loading);
        assert_eq!(app.query, "Berlin, Germany");
        match command {
            Command::Load {
                target: LoadTarget::Place(place),
                ..
            } => assert_eq!(place, Location::berlin()),
            other => panic!("unexpected startup command: {other:?}"),
        }
    }

    #[test]
    fn successful_load_reaches_content() {
        let (mut app, command) = App::new(UnitPreferences::default(), None);
        let seq = match command {
            Command::Load { seq, .. } => seq,
            other => panic!("unexpected command: {other:?}"),
        };
        app.on_worker_event(WorkerEvent::Loaded {
            seq,
            outcome: Ok((paris(), content_payload())),
        });
        assert_eq!(app.display, DisplayState::Content);
        assert_eq!(app.query, "Paris, France");
        assert_eq!(app.selected_day, 0);
        assert_eq!(app.session.location(), &paris());
    }

    #[test]
    fn empty_resolution_reaches_no_results_and_clears_query() {
        let (mut app, _) = App::new(UnitPreferences::default(), None);
        let command = submitted(&mut app, "Xyzzyqq");
        assert_eq!(app.display, DisplayState::Loading);
        let seq = match command {
            Command::Load { seq, .. } => seq,
            other => panic!("unexpected command: {other:?}"),
        };
        app.on_worker_event(WorkerEvent::Loaded {
            seq,
            outcome: Err(LoadError::ResolutionEmpty),
        });
        assert_eq!(app.display, DisplayState::NoResults);
        assert!(app.query.is_empty());
    }

    #[test]
    fn failures_reach_error_and_retry_is_reentrant() {
        let (mut app, command) = App::new(UnitPreferences::default(), None);
        let seq = match command {
            Command::Load { seq, .. } => seq,
            other => panic!("unexpected command: {other:?}"),
        };
        app.on_worker_event(WorkerEvent::Loaded {
            seq,
            outcome: Err(LoadError::Fetch(ApiError::Transport("503".into()))),
        });
        assert_eq!(app.display, DisplayState::Error);

        // Retry targets the same coordinates and repeats the transitions.
        let retry = app.on_key(KeyCode::Char('r'), Instant::now());
        assert_eq!(app.display, DisplayState::Loading);
        let seq = match retry {
            Some(Command::Load {
                seq,
                target: LoadTarget::Place(place),
            }) => {
                assert_eq!(place, Location::berlin());
                seq
            }
            other => panic!("unexpected retry command: {other:?}"),
        };
        app.on_worker_event(WorkerEvent::Loaded {
            seq,
            outcome: Err(LoadError::Fetch(ApiError::Transport("503".into()))),
        });
        assert_eq!(app.display, DisplayState::Error);
    }

    #[test]
    fn stale_load_responses_are_dropped() {
        let (mut app, _) = App::new(UnitPreferences::default(), None);
        let first = match submitted(&mut app, "Paris") {
            Command::Load { seq, .. } => seq,
            other => panic!("unexpected command: {other:?}"),
        };
        // A newer search goes out before the first response lands.
        let second = match submitted(&mut app, "Lyon") {
            Command::Load { seq, .. } => seq,
            other => panic!("unexpected command: {other:?}"),
        };
        assert!(second > first);

        app.on_worker_event(WorkerEvent::Loaded {
            seq: first,
            outcome: Ok((paris(), content_payload())),
        });
        // The stale response must not win.
        assert_eq!(app.display, DisplayState::Loading);
        assert!(app.session.payload().is_none());

        let lyon = Location {
            display_name: "Lyon, France".into(),
            latitude: 45.76,
            longitude: 4.83,
        };
        app.on_worker_event(WorkerEvent::Loaded {
            seq: second,
            outcome: Ok((lyon.clone(), content_payload())),
        });
        assert_eq!(app.display, DisplayState::Content);
        assert_eq!(app.session.location(), &lyon);
    }

    #[test]
    fn debounce_waits_for_idle_queries() {
        let (mut app, _) = App::new(UnitPreferences::default(), None);
        let t0 = Instant::now();
        app.on_key(KeyCode::Char('/'), t0);
        app.on_key(KeyCode::Char('p'), t0);
        // One character: no request armed.
        assert!(app.poll_debounce(t0 + Duration::from_secs(1)).is_none());

        app.on_key(KeyCode::Char('a'), t0);
        assert!(app.poll_debounce(t0 + Duration::from_millis(100)).is_none());
        let command = app.poll_debounce(t0 + Duration::from_millis(200));
        match command {
            Some(Command::Suggest { query, .. }) => assert_eq!(query, "pa"),
            other => panic!("unexpected command: {other:?}"),
        }
        // Fired once; nothing re-arms until the next edit.
        assert!(app.poll_debounce(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn stale_suggestions_are_dropped() {
        let (mut app, _) = App::new(UnitPreferences::default(), None);
        let t0 = Instant::now();
        app.on_key(KeyCode::Char('/'), t0);
        app.on_key(KeyCode::Char('p'), t0);
        app.on_key(KeyCode::Char('a'), t0);
        let first = match app.poll_debounce(t0 + DEBOUNCE) {
            Some(Command::Suggest { seq, .. }) => seq,
            other => panic!("unexpected command: {other:?}"),
        };
        app.on_key(KeyCode::Char('r'), t0 + DEBOUNCE);
        let second = match app.poll_debounce(t0 + DEBOUNCE + DEBOUNCE) {
            Some(Command::Suggest { seq, .. }) => seq,
            other => panic!("unexpected command: {other:?}"),
        };

        let stale = Candidate {
            name: "Palermo".into(),
            admin_region: None,
            country: Some("Italy".into()),
            latitude: 38.1,
            longitude: 13.3,
        };
        app.on_worker_event(WorkerEvent::Suggestions {
            seq: first,
            outcome: Ok(vec![stale]),
        });
        assert!(app.suggestions.is_empty());

        let fresh = Candidate {
            name: "Paris".into(),
            admin_region: None,
            country: Some("France".into()),
            latitude: 48.8566,
            longitude: 2.3522,
        };
        app.on_worker_event(WorkerEvent::Suggestions {
            seq: second,
            outcome: Ok(vec![fresh]),
        });
        assert_eq!(app.suggestions.len(), 1);
        assert_eq!(app.suggestions[0].name, "Paris");
    }

    #[test]
    fn picking_a_suggestion_loads_by_coordinates() {
        let (mut app, _) = App::new(UnitPreferences::default(), None);
        let t0 = Instant::now();
        app.on_key(KeyCode::Char('/'), t0);
        app.on_key(KeyCode::Char('p'), t0);
        app.on_key(KeyCode::Char('a'), t0);
        let seq = match app.poll_debounce(t0 + DEBOUNCE) {
            Some(Command::Suggest { seq, .. }) => seq,
            other => panic!("unexpected command: {other:?}"),
        };
        app.on_worker_event(WorkerEvent::Suggestions {
            seq,
            outcome: Ok(vec![Candidate {
                name: "Paris".into(),
                admin_region: None,
                country: Some("France".into()),
                latitude: 48.8566,
                longitude: 2.3522,
            }]),
        });

        app.on_key(KeyCode::Down, t0);
        let command = app.on_key(KeyCode::Enter, t0);
        match command {
            Some(Command::Load {
                target: LoadTarget::Place(place),
                ..
            }) => {
                assert_eq!(place.display_name, "Paris, France");
                assert_eq!(place.latitude, 48.8566);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(app.display, DisplayState::Loading);
        assert!(app.suggestions.is_empty());
        assert_eq!(app.query, "Paris, France");
    }

    #[test]
    fn unit_toggles_never_issue_commands() {
        let (mut app, command) = App::new(UnitPreferences::default(), None);
        let seq = match command {
            Command::Load { seq, .. } => seq,
            other => panic!("unexpected command: {other:?}"),
        };
        app.on_worker_event(WorkerEvent::Loaded {
            seq,
            outcome: Ok((paris(), content_payload())),
        });

        assert!(app.on_key(KeyCode::Char('t'), Instant::now()).is_none());
        assert!(app.on_key(KeyCode::Char('w'), Instant::now()).is_none());
        assert!(app.on_key(KeyCode::Char('p'), Instant::now()).is_none());
        assert_eq!(app.display, DisplayState::Content);
        assert_eq!(
            app.session.units.temperature,
            crate::weather::TemperatureUnit::Fahrenheit
        );
    }

    #[test]
    fn quit_key() {
        let (mut app, _) = App::new(UnitPreferences::default(), None);
        app.on_key(KeyCode::Char('q'), Instant::now());
        assert!(app.should_quit);
    }
}
