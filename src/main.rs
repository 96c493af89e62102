use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
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
    sync::Arc,
};
use zengarden::{
    analysis::GeminiAnalyzer,
    app::{Action, App, SAMPLE_TEXT},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, Theme},
    logging,
    runtime::{self, EventSource, Runner, ZenEvent},
};

/// calm typing tui with live speed, accuracy and streaks
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A calm typing TUI: type the passage, watch your speed, accuracy and word streak, and optionally receive a short reflection on what you wrote."
)]
pub struct Cli {
    /// custom passage to type
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// disable key feedback tones
    #[clap(long)]
    no_sound: bool,

    /// hide everything but the passage
    #[clap(long)]
    focus: bool,

    /// ask for a reflection on your text when a session finishes (needs GEMINI_API_KEY)
    #[clap(long)]
    reflect: bool,

    /// color theme
    #[clap(short = 't', long, value_enum)]
    theme: Option<Theme>,

    /// number of ambient particles
    #[clap(long)]
    particles: Option<usize>,
}

impl Cli {
    /// Layer command line flags over the stored configuration
    fn apply_to(&self, config: &mut Config) {
        if self.no_sound {
            config.sound_enabled = false;
        }
        if self.focus {
            config.focus_mode = true;
        }
        if self.reflect {
            config.reflection_enabled = true;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(particles) = self.particles {
            config.particle_count = particles;
        }
    }

    fn passage(&self) -> String {
        self.prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| SAMPLE_TEXT.to_string())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // logging is best effort; the app runs fine without it
    let _log_guard = AppDirs::log_dir().and_then(|dir| logging::init(&dir).ok());

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply_to(&mut config);

    let analyzer = Arc::new(GeminiAnalyzer::from_env(config.reflection_model.clone()));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(cli.passage(), config, analyzer, size.width, size.height);
    tracing::info!("zengarden started");

    let runner = Runner::new(runtime::terminal_events(), runtime::FRAME);
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = store.save(&app.config) {
        tracing::warn!("failed to save config to {}: {}", store.path().display(), e);
    }
    tracing::info!("zengarden exiting");

    result
}

fn start_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            ZenEvent::Tick => app.on_tick(),
            ZenEvent::Resize(width, height) => app.on_resize(width, height),
            ZenEvent::Key(key) => {
                if app.handle_key(key) == Action::Quit {
                    break;
                }
            }
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use std::time::Duration;
    use zengarden::runtime::ChannelEventSource;

    fn test_app(prompt: &str) -> App {
        let config = Config {
            sound_enabled: false,
            particle_count: 3,
            ..Config::default()
        };
        App::new(
            prompt,
            config,
            Arc::new(GeminiAnalyzer::new(None, "test-model")),
            80,
            24,
        )
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["zengarden"]);

        assert_eq!(cli.prompt, None);
        assert!(!cli.no_sound);
        assert!(!cli.focus);
        assert!(!cli.reflect);
        assert_eq!(cli.theme, None);
        assert_eq!(cli.particles, None);
    }

    #[test]
    fn test_cli_custom_prompt() {
        let cli = Cli::parse_from(["zengarden", "-p", "hello world"]);
        assert_eq!(cli.prompt, Some("hello world".to_string()));

        let cli = Cli::parse_from(["zengarden", "--prompt", "custom text"]);
        assert_eq!(cli.prompt, Some("custom text".to_string()));
    }

    #[test]
    fn test_cli_theme() {
        let cli = Cli::parse_from(["zengarden", "--theme", "light"]);
        assert_eq!(cli.theme, Some(Theme::Light));

        let cli = Cli::parse_from(["zengarden", "-t", "dark"]);
        assert_eq!(cli.theme, Some(Theme::Dark));
    }

    #[test]
    fn test_passage_defaults_to_sample() {
        let cli = Cli::parse_from(["zengarden"]);
        assert_eq!(cli.passage(), SAMPLE_TEXT);

        let cli = Cli::parse_from(["zengarden", "-p", "   "]);
        assert_eq!(cli.passage(), SAMPLE_TEXT);

        let cli = Cli::parse_from(["zengarden", "-p", "moss"]);
        assert_eq!(cli.passage(), "moss");
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "zengarden",
            "--no-sound",
            "--focus",
            "--reflect",
            "--theme",
            "light",
            "--particles",
            "10",
        ]);
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert!(!config.sound_enabled);
        assert!(config.focus_mode);
        assert!(config.reflection_enabled);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.particle_count, 10);
    }

    #[test]
    fn test_cli_without_flags_keeps_config() {
        let cli = Cli::parse_from(["zengarden"]);
        let mut config = Config {
            sound_enabled: false,
            theme: Theme::Light,
            ..Config::default()
        };
        let before = config.clone();
        cli.apply_to(&mut config);
        assert_eq!(config, before);
    }

    #[test]
    fn test_ui_function_renders() {
        let app = test_app("test");
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("test"));
    }

    #[test]
    fn test_start_tui_quits_on_ctrl_c() {
        let mut app = test_app("hi");
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        let (tx, rx) = mpsc::channel();
        tx.send(ZenEvent::Key(KeyEvent::new(
            KeyCode::Char('h'),
            KeyModifiers::NONE,
        )))
        .unwrap();
        tx.send(ZenEvent::Resize(100, 30)).unwrap();
        tx.send(ZenEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
        .unwrap();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

        start_tui(&mut terminal, &mut app, &runner).unwrap();

        assert_eq!(app.session.cursor(), 1);
        assert_eq!(app.particles.width, 100.0);
    }
}
