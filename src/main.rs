mod ui;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    fs::File,
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use tarix_wpm::{
    app_dirs::AppDirs,
    comparator::Keystroke,
    corpus::Corpus,
    events::{Severity, SharedSink, UiEvent},
    logging::setup_logging,
    persistence::Persistence,
    runtime::{CrosstermEventSource, FixedTicker, Runner, SystemClock, WpmEvent},
    settings::{Difficulty, Language, Settings},
    stats::{export_history_csv, StatsRecord},
    store::{FileStore, KeyValueStore, SqliteStore},
    WpmTester, TICK_RATE_MS,
};

/// How long a notification stays on screen
const TOAST_TTL: Duration = Duration::from_millis(3000);

/// typing speed practice: timed passages in Uzbek, English and Russian
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Typing speed practice for the Tarix platform. Type the passage before the clock runs out; results, records and history are kept between runs."
)]
pub struct Cli {
    /// test duration in seconds (saved as the new default)
    #[clap(short = 's', long)]
    duration: Option<u64>,

    /// passage language (saved as the new default)
    #[clap(short = 'l', long, value_enum)]
    language: Option<Language>,

    /// passage difficulty (saved as the new default)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// disable backspace while typing
    #[clap(long, conflicts_with = "allow_backspace")]
    no_backspace: bool,

    /// re-enable backspace
    #[clap(long)]
    allow_backspace: bool,

    /// turn sound cues off
    #[clap(long, conflicts_with = "sound")]
    mute: bool,

    /// turn sound cues back on
    #[clap(long)]
    sound: bool,

    /// where settings and results are stored
    #[clap(long, value_enum, default_value_t = StorageKind::File)]
    storage: StorageKind,

    /// directory for stored records and logs
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// print the saved statistics and exit
    #[clap(long)]
    stats: bool,

    /// write the result history as CSV to PATH ("-" for stdout) and exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,

    /// verbose logging
    #[clap(long)]
    debug: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StorageKind {
    File,
    Sqlite,
}

impl Cli {
    fn has_overrides(&self) -> bool {
        self.duration.is_some()
            || self.language.is_some()
            || self.difficulty.is_some()
            || self.no_backspace
            || self.allow_backspace
            || self.mute
            || self.sound
    }

    /// Settings with the command-line overrides applied on top
    fn apply_overrides(&self, base: &Settings) -> Settings {
        let mut settings = base.clone();
        if let Some(d) = self.duration {
            settings.test_duration_secs = d;
        }
        if let Some(l) = self.language {
            settings.language = l;
        }
        if let Some(d) = self.difficulty {
            settings.difficulty = d;
        }
        if self.no_backspace {
            settings.allow_backspace = false;
        }
        if self.allow_backspace {
            settings.allow_backspace = true;
        }
        if self.mute {
            settings.sound_enabled = false;
        }
        if self.sound {
            settings.sound_enabled = true;
        }
        settings
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Typing,
    Settings,
    Modal { title: String, lines: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

/// Rows of the settings panel, top to bottom
pub const SETTINGS_ROWS: usize = 5;

#[derive(Debug)]
pub struct App {
    pub tester: WpmTester,
    pub sink: SharedSink,
    pub state: AppState,
    pub toast: Option<Toast>,
    pub theme: Theme,
    /// Working copy edited in the settings panel
    pub draft: Settings,
    pub settings_row: usize,
    last_tick: Instant,
}

impl App {
    pub fn new(tester: WpmTester, sink: SharedSink) -> Self {
        let draft = tester.settings().clone();
        Self {
            tester,
            sink,
            state: AppState::Typing,
            toast: None,
            theme: Theme::Dark,
            draft,
            settings_row: 0,
            last_tick: Instant::now(),
        }
    }

    /// Runs the session timer when a tick is due
    pub fn maybe_tick(&mut self) {
        if self.last_tick.elapsed() >= Duration::from_millis(TICK_RATE_MS) {
            self.last_tick = Instant::now();
            self.tester.tick();
        }
        if self
            .toast
            .as_ref()
            .is_some_and(|t| Instant::now() >= t.expires_at)
        {
            self.toast = None;
        }
    }

    /// Moves queued widget events into app state; true when the bell should ring
    pub fn pump_events(&mut self) -> bool {
        let mut ring = false;
        for event in self.sink.drain() {
            match event {
                UiEvent::Notify { message, severity } => {
                    self.toast = Some(Toast {
                        message,
                        severity,
                        expires_at: Instant::now() + TOAST_TTL,
                    });
                }
                UiEvent::Modal { title, lines } => {
                    self.state = AppState::Modal { title, lines };
                }
                UiEvent::Sound(sound) => {
                    let tone = sound.tone();
                    tracing::debug!(%sound, hz = tone.frequency_hz, secs = tone.duration_secs, "cue");
                    ring |= sound.rings_bell();
                }
            }
        }
        ring
    }

    /// Handles one key press; true means quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return true;
        }

        match self.state {
            AppState::Typing => self.on_typing_key(key, ctrl),
            AppState::Settings => {
                self.on_settings_key(key, ctrl);
                false
            }
            AppState::Modal { .. } => {
                self.state = AppState::Typing;
                false
            }
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent, ctrl: bool) -> bool {
        if ctrl {
            match key.code {
                KeyCode::Char('r') => self.tester.restart(),
                KeyCode::Char('p') => {
                    self.tester.toggle_pause();
                }
                KeyCode::Char('s') => self.apply_draft(),
                KeyCode::Char('l') => self.tester.show_leaderboard(),
                KeyCode::Char('t') => self.toggle_theme(),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Esc => {
                if !self.tester.toggle_pause() {
                    return true;
                }
            }
            KeyCode::Tab => {
                // reported through the sink when no passage exists
                let _ = self.tester.new_text();
            }
            KeyCode::F(2) => {
                self.draft = self.tester.settings().clone();
                self.settings_row = 0;
                self.state = AppState::Settings;
            }
            KeyCode::Backspace => {
                self.tester.press(Keystroke::Backspace);
            }
            KeyCode::Char(c) => {
                self.tester.press(Keystroke::Char(c));
            }
            _ => {}
        }
        false
    }

    fn on_settings_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Char('s') if ctrl => {
                self.apply_draft();
                self.state = AppState::Typing;
            }
            KeyCode::Enter => {
                self.apply_draft();
                self.state = AppState::Typing;
            }
            KeyCode::Esc | KeyCode::F(2) => {
                self.draft = self.tester.settings().clone();
                self.state = AppState::Typing;
            }
            KeyCode::Up => self.settings_row = self.settings_row.saturating_sub(1),
            KeyCode::Down => self.settings_row = (self.settings_row + 1).min(SETTINGS_ROWS - 1),
            KeyCode::Left => self.change_draft(false),
            KeyCode::Right | KeyCode::Char(' ') => self.change_draft(true),
            _ => {}
        }
    }

    fn change_draft(&mut self, forward: bool) {
        match self.settings_row {
            0 => self.draft.cycle_duration(forward),
            1 => self.draft.cycle_difficulty(forward),
            2 => self.draft.cycle_language(forward),
            3 => self.draft.allow_backspace = !self.draft.allow_backspace,
            _ => self.draft.sound_enabled = !self.draft.sound_enabled,
        }
    }

    fn apply_draft(&mut self) {
        // failures surface as a notice
        let _ = self.tester.apply_settings(self.draft.clone());
        self.draft = self.tester.settings().clone();
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        let message = match self.theme {
            Theme::Light => "Yorugʻ tema yoqildi",
            Theme::Dark => "Qorongʻu tema yoqildi",
        };
        self.toast = Some(Toast {
            message: message.to_string(),
            severity: Severity::Info,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(AppDirs::data_dir)
        .unwrap_or_else(|| PathBuf::from(".tarix-wpm"));
    let _log_guard = setup_logging(&AppDirs::log_dir(&data_dir), cli.debug)
        .context("Failed to initialize logging")?;

    let store = open_store(cli.storage, &data_dir)?;
    let persistence = Persistence::new(store);

    if cli.stats {
        print_stats(&persistence.load_stats(), &mut io::stdout())?;
        return Ok(());
    }
    if let Some(path) = &cli.export_history {
        export_history(&persistence.load_stats(), path)?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let corpus = Corpus::builtin().context("Failed to load the built-in passages")?;
    let sink = SharedSink::new();
    let mut tester = WpmTester::new(
        corpus,
        persistence,
        Box::new(SystemClock),
        Box::new(sink.clone()),
    );
    if cli.has_overrides() {
        let settings = cli.apply_overrides(tester.settings());
        if let Err(e) = tester.apply_settings(settings) {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tester, sink);
    app.pump_events();
    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend + Write>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let quit = match runner.step() {
            WpmEvent::Tick | WpmEvent::Resize => false,
            WpmEvent::Key(key) => app.on_key(key),
        };
        if quit {
            break;
        }

        app.maybe_tick();
        if app.pump_events() {
            execute!(terminal.backend_mut(), Print("\x07"))?;
        }
    }

    Ok(())
}

fn open_store(kind: StorageKind, data_dir: &Path) -> Result<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match kind {
        StorageKind::File => Box::new(FileStore::with_dir(data_dir)),
        StorageKind::Sqlite => {
            let path = AppDirs::sqlite_path(data_dir);
            Box::new(
                SqliteStore::open(&path)
                    .with_context(|| format!("Failed to open {}", path.display()))?,
            )
        }
    };
    tracing::info!(storage = %kind, dir = %data_dir.display(), "storage opened");
    Ok(store)
}

fn print_stats<W: Write>(stats: &StatsRecord, out: &mut W) -> Result<()> {
    writeln!(out, "Rekord: {} WPM", stats.aggregate.best_wpm)?;
    writeln!(out, "Testlar: {}", stats.aggregate.total_tests)?;
    writeln!(out, "Oʻrtacha WPM: {}", stats.average_wpm())?;
    writeln!(out, "Oʻrtacha aniqlik: {}%", stats.average_accuracy())?;
    writeln!(out, "Jami soʻzlar: {}", stats.aggregate.total_words_typed)?;
    if let Some(updated) = stats.last_updated {
        writeln!(out, "Yangilangan: {}", updated.to_rfc3339())?;
    }
    let recent = stats.recent_wpm();
    if !recent.is_empty() {
        let line = recent
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "Oxirgi natijalar: {line}")?;
    }
    Ok(())
}

fn export_history(stats: &StatsRecord, path: &Path) -> Result<()> {
    if path == Path::new("-") {
        export_history_csv(&stats.history, io::stdout().lock())?;
    } else {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        export_history_csv(&stats.history, file)?;
    }
    tracing::info!(rows = stats.history.len(), "history exported");
    Ok(())
}
