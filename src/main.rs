//! Keyboard Latency - layout visualizer and per-key latency tester

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{error, info, warn};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{stdout, Stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use keyboard_latency::{
    capture::CaptureSession,
    config::{Config, ConfigError},
    keyboard::LayoutId,
    logging,
    ui::{draw, App},
};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Redraw at least this often so status messages expire on screen
const IDLE_REDRAW: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "keyboard-latency")]
#[command(version, about = "Keyboard layout visualizer and per-key latency tester", long_about = None)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Layout shown at startup
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Do not install the OS keyboard hook
    #[arg(long)]
    no_hook: bool,

    /// Keep the hook but let every key reach the system
    #[arg(long)]
    no_suppress: bool,

    /// Update loop period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Log filter (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Qwerty,
    Azerty,
}

impl From<LayoutArg> for LayoutId {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Qwerty => LayoutId::Qwerty,
            LayoutArg::Azerty => LayoutId::Azerty,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = load_config(&cli);

    if cli.write_config {
        let path = match &cli.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => config.save()?,
        };
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let log_path = match logging::init(&config.logging) {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            None
        }
    };
    info!("keyboard-latency {} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        warn!("Config not loaded, using defaults: {}", e);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Could not install signal handler: {}", e);
    }

    let mut terminal = setup_terminal()?;
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true))
        && execute!(
            terminal.backend_mut(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
    info!("Terminal key release reporting: {}", if enhanced { "on" } else { "off" });

    let mut app = App::new(config.clone());
    app.set_terminal_releases(enhanced);
    let mut session = CaptureSession::start(&config.capture, app.policy().clone());

    let result = run(&mut terminal, &mut app, &mut session, &interrupted);

    if let Err(e) = restore_terminal(&mut terminal, enhanced) {
        error!("Failed to restore terminal: {}", e);
    }
    session.shutdown(config.capture.shutdown_timeout());
    result?;

    println!("\nKeyboard latency session complete.");
    for line in app.session_summary() {
        println!("{}", line);
    }
    if let Some(path) = log_path {
        println!("Log: {}", path.display());
    }
    info!("Exited cleanly");
    Ok(())
}

/// Config file plus command line overrides. A config file that cannot be
/// read is returned as an error alongside the defaults.
fn load_config(cli: &Cli) -> (Config, Option<ConfigError>) {
    let loaded = match &cli.config {
        Some(path) if path.exists() => Config::load_from(path),
        Some(_) => Ok(Config::default()),
        None => Config::load(),
    };
    let (mut config, error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    if let Some(layout) = cli.layout {
        config.ui.layout = layout.into();
    }
    if cli.no_hook {
        config.capture.hook = false;
    }
    if cli.no_suppress {
        config.capture.suppress = false;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.ui.tick_ms = tick_ms;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    (config, error)
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui, enhanced: bool) -> Result<()> {
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Update loop: wake every `ui.tick_ms`, apply queued key events, redraw,
/// and handle terminal input until the next wake-up.
fn run(
    terminal: &mut Tui,
    app: &mut App,
    session: &mut CaptureSession,
    interrupted: &AtomicBool,
) -> Result<()> {
    let tick = app.config.tick_interval();
    let mut next_tick = Instant::now();
    let mut last_draw: Option<Instant> = None;

    while !app.should_quit() {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted, quitting");
            app.quit();
            break;
        }

        app.pump(session);

        if app.needs_redraw() || last_draw.map_or(true, |t| t.elapsed() >= IDLE_REDRAW) {
            terminal.draw(|frame| draw(frame, app))?;
            app.mark_drawn();
            last_draw = Some(Instant::now());
        }

        // Skip missed ticks instead of bursting to catch up
        next_tick = (next_tick + tick).max(Instant::now());

        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    app.handle_mouse(mouse, Rect::new(0, 0, size.width, size.height));
                }
                Event::Resize(..) => app.request_redraw(),
                _ => {}
            }
            if app.should_quit() || Instant::now() >= next_tick {
                break;
            }
        }
    }
    Ok(())
}
