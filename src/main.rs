pub mod clock;
pub mod config;
pub mod library;
pub mod pattern;
pub mod runtime;
pub mod scheduler;
pub mod timer;
pub mod ui;
pub mod util;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    library::{FilePatternStore, PatternLibrary},
    pattern::{BreathingPattern, PatternError},
    runtime::{AppEvent, CrosstermEventSource, Runner},
    scheduler::BreathScheduler,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// guided breathing exercises in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal breathing companion with phase-timed inhale/hold/exhale cycles, selectable patterns, and per-session cycle and time tracking."
)]
pub struct Cli {
    /// built-in pattern to practice
    #[clap(short = 'p', long, value_enum)]
    pattern: Option<BuiltinPattern>,

    /// inhale duration in seconds (1-3600) for a one-off custom pattern
    #[clap(long, requires = "hold", requires = "exhale", value_parser = clap::value_parser!(u64).range(1..=3600))]
    inhale: Option<u64>,

    /// hold duration in seconds (1-3600) for a one-off custom pattern
    #[clap(long, requires = "inhale", requires = "exhale", value_parser = clap::value_parser!(u64).range(1..=3600))]
    hold: Option<u64>,

    /// exhale duration in seconds (1-3600) for a one-off custom pattern
    #[clap(long, requires = "inhale", requires = "hold", value_parser = clap::value_parser!(u64).range(1..=3600))]
    exhale: Option<u64>,

    /// begin the session immediately instead of waiting for the space key
    #[clap(long)]
    start: bool,

    /// list available patterns and exit
    #[clap(long)]
    list_patterns: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum BuiltinPattern {
    Relaxing,
    Sleep,
    Balanced,
    Box,
}

impl BuiltinPattern {
    fn catalog_name(&self) -> &'static str {
        match self {
            BuiltinPattern::Relaxing => "4-4-6 (Relaxing)",
            BuiltinPattern::Sleep => "4-7-8 (Sleep)",
            BuiltinPattern::Balanced => "6-2-6 (Balanced)",
            BuiltinPattern::Box => "4-4-4 (Box)",
        }
    }
}

impl Cli {
    /// Build the one-off pattern from the --inhale/--hold/--exhale trio,
    /// if given. The parser bounds each flag to 1..=3600 seconds, so the
    /// millisecond conversion cannot overflow; the pattern is still
    /// validated like any other.
    fn custom_pattern(&self) -> Result<Option<BreathingPattern>, PatternError> {
        match (self.inhale, self.hold, self.exhale) {
            (Some(inhale), Some(hold), Some(exhale)) => Ok(Some(BreathingPattern::new(
                format!("{}-{}-{} (Custom)", inhale, hold, exhale),
                inhale * 1000,
                hold * 1000,
                exhale * 1000,
                "Custom pattern from the command line",
            )?)),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Session,
    PatternSelect,
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub scheduler: BreathScheduler,
    pub library: PatternLibrary,
    pub state: AppState,
    prior_pattern: Option<String>,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self, PatternError> {
        let library = PatternLibrary::from_store(&FilePatternStore::new());
        let saved = FileConfigStore::new().load();
        Self::with_library(cli, library, Some(saved.pattern))
    }

    /// Build with an explicit library; `saved_pattern` is the remembered
    /// choice from the config store. CLI flags take precedence over it.
    pub fn with_library(
        cli: Cli,
        mut library: PatternLibrary,
        saved_pattern: Option<String>,
    ) -> Result<Self, PatternError> {
        if let Some(name) = saved_pattern {
            library.select_by_name(&name);
        }
        if let Some(builtin) = cli.pattern {
            library.select_by_name(builtin.catalog_name());
        }
        if let Some(custom) = cli.custom_pattern()? {
            library.insert_and_select(custom);
        }

        let mut scheduler = BreathScheduler::new(library.selected().clone());
        if cli.start {
            scheduler.start();
        }

        Ok(Self {
            cli: Some(cli),
            scheduler,
            library,
            state: AppState::Session,
            prior_pattern: None,
        })
    }

    pub fn toggle_session(&mut self) {
        if self.scheduler.is_active() {
            self.scheduler.stop();
        } else {
            self.scheduler.start();
        }
    }

    pub fn open_pattern_select(&mut self) {
        let active = self.scheduler.active_pattern().name.clone();
        self.library.select_by_name(&active);
        self.prior_pattern = Some(active);
        self.state = AppState::PatternSelect;
    }

    pub fn apply_selected_pattern(&mut self) {
        self.scheduler.configure(self.library.selected().clone());
        self.prior_pattern = None;
        self.state = AppState::Session;
    }

    pub fn cancel_pattern_select(&mut self) {
        if let Some(name) = self.prior_pattern.take() {
            self.library.select_by_name(&name);
        }
        self.state = AppState::Session;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_patterns {
        let library = PatternLibrary::from_store(&FilePatternStore::new());
        for pattern in library.iter() {
            println!("{}", pattern.name);
            println!("  {}", pattern.summary());
            if !pattern.description.is_empty() {
                println!("  {}", pattern.description);
            }
        }
        return Ok(());
    }

    // resolve and validate the pattern before touching the terminal so
    // configuration errors print as plain messages
    let mut app = App::new(cli)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res?;

    // best effort, but not silent: a read-only config dir should be visible
    if let Err(err) = FileConfigStore::new().save(&Config {
        pattern: app.scheduler.active_pattern().name.clone(),
    }) {
        eprintln!("warning: could not save config: {err}");
    }

    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let runner = Runner::new(events, Duration::from_millis(TICK_RATE_MS));

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            AppEvent::Tick => {
                app.scheduler.on_tick();
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }

                match app.state {
                    AppState::Session => match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => break,
                        KeyCode::Char(' ') => app.toggle_session(),
                        KeyCode::Char('r') => {
                            app.scheduler.restart();
                        }
                        KeyCode::Char('p') => app.open_pattern_select(),
                        _ => {}
                    },
                    AppState::PatternSelect => match key.code {
                        KeyCode::Up | KeyCode::Char('k') => app.library.select_prev(),
                        KeyCode::Down | KeyCode::Char('j') => app.library.select_next(),
                        KeyCode::Enter => app.apply_selected_pattern(),
                        KeyCode::Esc | KeyCode::Char('b') => app.cancel_pattern_select(),
                        _ => {}
                    },
                }
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Phase;
    use clap::Parser;

    fn bare_cli() -> Cli {
        Cli::parse_from(["respire"])
    }

    fn test_app(cli: Cli) -> App {
        App::with_library(cli, PatternLibrary::with_builtins(), None).unwrap()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = bare_cli();
        assert!(cli.pattern.is_none());
        assert_eq!(cli.inhale, None);
        assert_eq!(cli.hold, None);
        assert_eq!(cli.exhale, None);
        assert!(!cli.start);
        assert!(!cli.list_patterns);
    }

    #[test]
    fn test_cli_builtin_pattern_flag() {
        let cli = Cli::parse_from(["respire", "-p", "sleep"]);
        assert!(matches!(cli.pattern, Some(BuiltinPattern::Sleep)));

        let cli = Cli::parse_from(["respire", "--pattern", "box"]);
        assert!(matches!(cli.pattern, Some(BuiltinPattern::Box)));
    }

    #[test]
    fn test_cli_custom_pattern_flags() {
        let cli = Cli::parse_from(["respire", "--inhale", "5", "--hold", "2", "--exhale", "7"]);
        let pattern = cli.custom_pattern().unwrap().unwrap();
        assert_eq!(pattern.name, "5-2-7 (Custom)");
        assert_eq!(pattern.inhale_ms, 5000);
        assert_eq!(pattern.hold_ms, 2000);
        assert_eq!(pattern.exhale_ms, 7000);
    }

    #[test]
    fn test_cli_custom_pattern_requires_all_three() {
        let res = Cli::try_parse_from(["respire", "--inhale", "5"]);
        assert!(res.is_err());

        let res = Cli::try_parse_from(["respire", "--inhale", "5", "--hold", "2"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_custom_pattern_zero_duration_rejected() {
        let res = Cli::try_parse_from(["respire", "--inhale", "0", "--hold", "4", "--exhale", "6"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_custom_pattern_bounds_out_absurd_durations() {
        // the parser caps durations well below where seconds-to-millis
        // conversion could wrap
        let res = Cli::try_parse_from([
            "respire",
            "--inhale",
            "18446744073709551615",
            "--hold",
            "4",
            "--exhale",
            "6",
        ]);
        assert!(res.is_err());

        let res = Cli::try_parse_from(["respire", "--inhale", "3601", "--hold", "4", "--exhale", "6"]);
        assert!(res.is_err());

        let cli = Cli::parse_from(["respire", "--inhale", "3600", "--hold", "1", "--exhale", "1"]);
        let pattern = cli.custom_pattern().unwrap().unwrap();
        assert_eq!(pattern.inhale_ms, 3_600_000);
    }

    #[test]
    fn test_builtin_pattern_catalog_names() {
        assert_eq!(BuiltinPattern::Relaxing.catalog_name(), "4-4-6 (Relaxing)");
        assert_eq!(BuiltinPattern::Sleep.catalog_name(), "4-7-8 (Sleep)");
        assert_eq!(BuiltinPattern::Balanced.catalog_name(), "6-2-6 (Balanced)");
        assert_eq!(BuiltinPattern::Box.catalog_name(), "4-4-4 (Box)");
    }

    #[test]
    fn test_builtin_pattern_display() {
        assert_eq!(BuiltinPattern::Relaxing.to_string(), "Relaxing");
        assert_eq!(BuiltinPattern::Box.to_string(), "Box");
    }

    #[test]
    fn test_app_defaults_to_first_builtin() {
        let app = test_app(bare_cli());
        assert_eq!(app.scheduler.active_pattern().name, "4-4-6 (Relaxing)");
        assert!(!app.scheduler.is_active());
        assert_eq!(app.state, AppState::Session);
    }

    #[test]
    fn test_app_uses_saved_pattern() {
        let cli = bare_cli();
        let app = App::with_library(
            cli,
            PatternLibrary::with_builtins(),
            Some("6-2-6 (Balanced)".to_string()),
        )
        .unwrap();
        assert_eq!(app.scheduler.active_pattern().name, "6-2-6 (Balanced)");
    }

    #[test]
    fn test_app_cli_flag_overrides_saved_pattern() {
        let cli = Cli::parse_from(["respire", "-p", "sleep"]);
        let app = App::with_library(
            cli,
            PatternLibrary::with_builtins(),
            Some("6-2-6 (Balanced)".to_string()),
        )
        .unwrap();
        assert_eq!(app.scheduler.active_pattern().name, "4-7-8 (Sleep)");
    }

    #[test]
    fn test_app_custom_flags_override_builtin_flag() {
        let cli = Cli::parse_from([
            "respire", "-p", "sleep", "--inhale", "3", "--hold", "3", "--exhale", "3",
        ]);
        let app = test_app(cli);
        assert_eq!(app.scheduler.active_pattern().name, "3-3-3 (Custom)");
        assert_eq!(app.library.len(), 5);
    }

    #[test]
    fn test_app_start_flag_begins_session() {
        let cli = Cli::parse_from(["respire", "--start"]);
        let app = test_app(cli);
        assert!(app.scheduler.is_active());
        assert_eq!(app.scheduler.cycle_count(), 1);
    }

    #[test]
    fn test_toggle_session() {
        let mut app = test_app(bare_cli());
        app.toggle_session();
        assert!(app.scheduler.is_active());
        app.toggle_session();
        assert!(!app.scheduler.is_active());
        assert_eq!(app.scheduler.current_phase(), Phase::Inhale);
    }

    #[test]
    fn test_pattern_select_apply() {
        let mut app = test_app(bare_cli());
        app.open_pattern_select();
        assert_eq!(app.state, AppState::PatternSelect);

        app.library.select_next();
        app.apply_selected_pattern();
        assert_eq!(app.state, AppState::Session);
        assert_eq!(app.scheduler.active_pattern().name, "4-7-8 (Sleep)");
    }

    #[test]
    fn test_pattern_select_cancel_restores_choice() {
        let mut app = test_app(bare_cli());
        app.open_pattern_select();
        app.library.select_next();
        app.library.select_next();
        app.cancel_pattern_select();

        assert_eq!(app.state, AppState::Session);
        assert_eq!(app.library.selected().name, "4-4-6 (Relaxing)");
        assert_eq!(app.scheduler.active_pattern().name, "4-4-6 (Relaxing)");
    }

    #[test]
    fn test_pattern_change_while_active_triggers_restart() {
        let cli = Cli::parse_from(["respire", "--start"]);
        let mut app = test_app(cli);
        assert!(app.scheduler.is_active());

        app.open_pattern_select();
        app.library.select_next();
        app.apply_selected_pattern();

        // configure mid-session stops and arms the settle timer
        assert!(!app.scheduler.is_active());
        assert!(app.scheduler.is_restarting());
        assert_eq!(app.scheduler.active_pattern().name, "4-7-8 (Sleep)");
    }

    #[test]
    fn test_ui_renders_session_screen() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut app = test_app(bare_cli());
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("4-4-6"));
        assert!(content.contains("Ready to breathe mindfully?"));
    }

    #[test]
    fn test_ui_renders_active_session() {
        use ratatui::{backend::TestBackend, Terminal};

        let cli = Cli::parse_from(["respire", "--start"]);
        let mut app = test_app(cli);
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Breathe in slowly"));
        assert!(content.contains("Cycles"));
    }

    #[test]
    fn test_ui_renders_pattern_select_screen() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut app = test_app(bare_cli());
        app.open_pattern_select();

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("4-7-8 (Sleep)"));
        assert!(content.contains("4-4-4 (Box)"));
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 100);

        const _: () = assert!(TICK_RATE_MS > 0);
        const _: () = assert!(TICK_RATE_MS <= 1000); // Should be sub-second
    }
}
