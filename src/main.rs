// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod config;
mod data;
mod error;
mod events;
mod source;
mod ui;

use app::{App, View};
use config::DashboardConfig;
use data::{DashboardData, DateRange};
use source::{ApiSource, DataSource, FileSource, HistoryQuery};

#[derive(Parser, Debug)]
#[command(name = "secador-monitor")]
#[command(about = "Terminal dashboard for monitoring grain dryers")]
struct Args {
    /// Path to a dashboard snapshot JSON file
    #[arg(short, long, default_value = "dashboard.json", conflicts_with = "api")]
    file: PathBuf,

    /// Poll the telemetry API instead of a file
    #[arg(short, long)]
    api: bool,

    /// Configuration file (TOML); SECADOR_* environment variables override it
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Refresh interval in seconds (overrides the configuration)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Export the dryer's history to this CSV file and exit
    #[arg(short, long, requires = "dryer")]
    export: Option<PathBuf>,

    /// Dryer to export (used with --export)
    #[arg(short, long, requires = "export")]
    dryer: Option<String>,

    /// First day to export, YYYY-MM-DD (used with --export)
    #[arg(long, requires = "export")]
    from: Option<NaiveDate>,

    /// Last day to export, YYYY-MM-DD (used with --export)
    #[arg(long, requires = "export")]
    to: Option<NaiveDate>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = DashboardConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    if let Some(refresh) = args.refresh {
        config.refresh_secs = refresh;
    }

    init_tracing(&config)?;
    info!(api = args.api, file = %args.file.display(), "starting secador-monitor");

    // Handle export mode (non-interactive)
    if let (Some(export_path), Some(dryer)) = (&args.export, &args.dryer) {
        let range = DateRange::new(args.from, args.to);
        return export_to_file(&args, &config, dryer, range, export_path);
    }

    if args.api {
        return run_with_api(&config);
    }

    run_with_file(&args.file, config.refresh_interval())
}

/// Send logs to the configured file; the terminal belongs to the UI.
fn init_tracing(config: &DashboardConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    Ok(())
}

/// Run with a file-based data source
fn run_with_file(path: &Path, refresh: Duration) -> Result<()> {
    let source = Box::new(FileSource::new(path));
    run_tui(source, refresh)
}

/// Run with the telemetry API polled on a background task
fn run_with_api(config: &DashboardConfig) -> Result<()> {
    // Build a tokio runtime for the poller
    let rt = tokio::runtime::Runtime::new()?;

    let (source, handle) = rt.block_on(async {
        let mut client = config.api_client();
        if config.needs_login() {
            println!("Logging in to {}...", client.endpoint());
            client.login().await?;
        }
        Ok::<_, anyhow::Error>(ApiSource::spawn(client, config.refresh_interval()))
    })?;

    // Snapshots arrive over a channel, so poll it often
    let result = run_tui(Box::new(source), Duration::from_millis(100));

    // Signal shutdown
    handle.abort();

    result
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Create app and load initial data
    let mut app = App::new(source);
    app.reload_data();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!(error = %e, "terminal loop failed");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 20;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5u16.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(16),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Dryers => ui::panel::render(frame, app, chunks[2]),
                View::Schematic => ui::schematic::render(frame, app, chunks[2]),
                View::History => ui::chart::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table border (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                _ => {}
            }
        }

        // Auto-refresh data periodically
        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Export one dryer's history to a CSV file without starting the UI
fn export_to_file(
    args: &Args,
    config: &DashboardConfig,
    dryer: &str,
    range: DateRange,
    export_path: &Path,
) -> Result<()> {
    let data = if args.api {
        let rt = tokio::runtime::Runtime::new()?;
        let snapshot = rt.block_on(async {
            let mut client = config.api_client();
            if config.needs_login() {
                client.login().await?;
            }
            let query = HistoryQuery {
                dryer: Some(dryer.to_string()),
                range,
            };
            client.refresh(&query).await
        })?;
        DashboardData::from_snapshot(snapshot)
    } else {
        DashboardData::load(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?
    };

    let reading = data
        .dryer(dryer)
        .ok_or_else(|| anyhow!("Unknown dryer: {}", dryer))?;
    let records = data.history_for(reading.dryer_id);

    let rows = data::export::export_report(export_path, &records, Some(&range))?;

    info!(dryer, rows, path = %export_path.display(), "exported report");
    println!("Exported {} rows to: {}", rows, export_path.display());
    Ok(())
}
