pub mod ui;

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
};
use wpmtrack::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    export, keymap, logging,
    report::{self, Statistics, StatsFilter, TimeFrame, WpmRange},
    runtime::{CrosstermEventSource, FixedTicker, Runner, TrackEvent},
    store::SqliteStore,
    Sample, SampleStore, Tracker, TrackerEvent,
};

use crate::ui::screen::current_screen;

/// typing speed tracker with a live wpm estimate and historical statistics
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Tracks your typing speed while you type in the terminal: a rolling words-per-minute estimate, a sample saved every period while you are active, and statistics over everything recorded so far."
)]
pub struct Cli {
    /// sample database to write to and read from
    #[clap(long)]
    db: Option<PathBuf>,

    /// config file (json)
    #[clap(long)]
    config: Option<PathBuf>,

    /// user id stamped on recorded samples
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// length of the sliding rate window in seconds
    #[clap(short = 'w', long)]
    window_secs: Option<u64>,

    /// seconds between recorded samples
    #[clap(short = 'p', long)]
    period_secs: Option<u64>,

    /// scheduler tick in milliseconds
    #[clap(long)]
    tick_ms: Option<u64>,

    /// log file (defaults to the state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// print statistics over recorded samples and exit
    Stats {
        /// only samples from this period
        #[clap(short = 't', long, value_enum, default_value_t = TimeFrame::All)]
        time_frame: TimeFrame,

        /// histogram bins and range average; with --csv, only samples in range
        #[clap(short = 'r', long, value_enum)]
        range: Option<WpmRange>,

        /// dump the selected samples as csv instead
        #[clap(long)]
        csv: bool,
    },
}

impl Cli {
    /// Config file values, overridden by any flags given
    fn resolve_config(&self) -> Result<Config, wpmtrack::Error> {
        let store = match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };
        let mut config = store.load();
        if let Some(user) = &self.user {
            config.user_id = user.clone();
        }
        if let Some(w) = self.window_secs {
            config.window_secs = w;
        }
        if let Some(p) = self.period_secs {
            config.sample_period_secs = p;
        }
        if let Some(t) = self.tick_ms {
            config.tick_ms = t;
        }
        config.validate()?;
        Ok(config)
    }

    fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("wpmtrack.db"))
    }

    fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(AppDirs::log_path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Live,
    History,
}

#[derive(Debug, Default)]
pub struct HistoryState {
    pub filter: StatsFilter,
    pub samples: Vec<Sample>,
    pub stats: Statistics,
}

pub struct App {
    pub tracker: Tracker<SqliteStore>,
    pub screen: AppScreen,
    pub history: HistoryState,
}

impl App {
    pub fn new(tracker: Tracker<SqliteStore>) -> Self {
        Self {
            tracker,
            screen: AppScreen::Live,
            history: HistoryState::default(),
        }
    }

    pub fn refresh_history(&mut self) {
        let now = Local::now();
        let all = self.tracker.history();
        self.history.samples = self.history.filter.in_time_frame(&all, now);
        self.history.stats = report::statistics(&all, &self.history.filter, now);
    }

    pub fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            AppScreen::Live => AppScreen::History,
            AppScreen::History => AppScreen::Live,
        };
        if self.screen == AppScreen::History {
            self.refresh_history();
        }
    }

    pub fn cycle_time_frame(&mut self) {
        self.history.filter.time_frame = self.history.filter.time_frame.next();
        self.refresh_history();
    }

    /// any → 1-200 → 1-100 → 50-100 → 100-200 → any
    pub fn cycle_range(&mut self) {
        self.history.filter.range = match self.history.filter.range {
            None => Some(WpmRange::default()),
            Some(r) if r.next() == WpmRange::default() => None,
            Some(r) => Some(r.next()),
        };
        self.refresh_history();
    }

    pub fn on_events(&mut self, events: &[TrackerEvent]) {
        let recorded = events
            .iter()
            .any(|e| matches!(e, TrackerEvent::SampleRecorded(_)));
        if recorded && self.screen == AppScreen::History {
            self.refresh_history();
        }
    }

    /// Returns false when the app should quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if ctrl => return false,
            KeyCode::Char('p') if ctrl => {
                let events = self.tracker.toggle_pause(Local::now());
                self.on_events(&events);
            }
            KeyCode::Tab => self.toggle_screen(),
            _ if ctrl || key.modifiers.contains(KeyModifiers::ALT) => {}
            code => match self.screen {
                AppScreen::Live => {
                    if let Some(usage) = keymap::usage_from_key_code(code) {
                        let events = self.tracker.ingest(usage, Local::now());
                        self.on_events(&events);
                    }
                }
                AppScreen::History => match code {
                    KeyCode::Char('f') => self.cycle_time_frame(),
                    KeyCode::Char('r') => self.cycle_range(),
                    _ => {}
                },
            },
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if let Some(Command::Stats {
        time_frame,
        range,
        csv,
    }) = &cli.command
    {
        logging::init_stderr();
        let store = SqliteStore::open(cli.db_path())?;
        let filter = StatsFilter::new(*time_frame, *range);
        return print_stats(&store, &filter, *csv);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init(cli.log_path().as_deref())?;
    let store = SqliteStore::open(cli.db_path())?;
    info!(
        "starting: window {}s, period {}s, tick {}ms, user {}",
        config.window_secs, config.sample_period_secs, config.tick_ms, config.user_id
    );
    let mut app = App::new(Tracker::new(&config, store));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_interval()),
    );

    terminal.draw(|f| draw(app, f))?;

    loop {
        match runner.step() {
            TrackEvent::Tick => {
                let events = app.tracker.tick(Local::now());
                app.on_events(&events);
            }
            TrackEvent::Resize => {}
            TrackEvent::InputLost(msg) => {
                let events = app.tracker.report_input_unavailable(msg, Local::now());
                app.on_events(&events);
            }
            TrackEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
        }
        terminal.draw(|f| draw(app, f))?;
    }

    Ok(())
}

fn draw(app: &App, f: &mut Frame) {
    current_screen(&app.screen).render(app, f);
}

fn print_stats(
    store: &SqliteStore,
    filter: &StatsFilter,
    csv: bool,
) -> Result<(), Box<dyn Error>> {
    let now = Local::now();
    let all = store.fetch_all()?;
    let stdout = io::stdout();

    if csv {
        export::write_csv(&filter.apply(&all, now), stdout.lock())?;
        return Ok(());
    }

    let stats = report::statistics(&all, filter, now);
    let mut out = stdout.lock();
    write_stats(&mut out, filter, &stats)?;
    Ok(())
}

fn write_stats<W: Write>(out: &mut W, filter: &StatsFilter, stats: &Statistics) -> io::Result<()> {
    let range = filter
        .range
        .map_or_else(|| "any".to_string(), |r| r.to_string());
    writeln!(out, "time frame  {}", filter.time_frame)?;
    writeln!(out, "range       {range}")?;
    writeln!(out, "samples     {}", stats.count)?;
    writeln!(out, "max wpm     {}", stats.max)?;
    writeln!(out, "min wpm     {}", stats.min)?;
    writeln!(out, "avg wpm     {:.2}", stats.mean)?;
    writeln!(out, "median wpm  {:.2}", stats.median)?;
    writeln!(out, "std dev     {:.2}", stats.std_dev)?;
    writeln!(out, "range avg   {:.2}", stats.range_mean)?;

    let widest = stats.histogram.iter().map(|b| b.count).max().unwrap_or(0);
    if widest > 0 {
        writeln!(out)?;
        for b in &stats.histogram {
            let bar = "#".repeat((b.count * 40).div_ceil(widest));
            writeln!(out, "{:>8}  {:>5}  {bar}", b.bin.label(), b.count)?;
        }
    }
    Ok(())
}
