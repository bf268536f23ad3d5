//! MAIA - Musical Adversarial Inpainting Attacks
//!
//! Terminal A/B player: an original music sample and its adversarial counterpart,
//! played side by side or in lock-step.

use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use maia_audio::{AudioEngine, DeckEvent, DeckHandle, SyncSettings, Synchronizer, TrackRole};
use maia_input::{Command, InputHandler, Mode};
use maia_library::{Catalog, Config, MetricsTable};
use maia_tui::{
    App, AsrChartWidget, AttackInfoWidget, HelpWidget, QualityScatterWidget,
    RegionTimelineWidget, SampleListState, SampleListWidget, StatusBarWidget, Theme, TrackWidget,
};

/// Frame rate for UI updates
const FPS: u64 = 30;

const PLAYER_UNAVAILABLE: &str = "Audio player unavailable";

/// The audio engine and the synchronizer driving its two decks
struct Player {
    engine: AudioEngine,
    sync: Synchronizer<DeckHandle>,
}

impl Player {
    fn shutdown(&mut self) {
        self.sync.shutdown();
        self.engine.shutdown();
    }
}

fn main() -> anyhow::Result<()> {
    let log_path = init_logging();
    tracing::info!("MAIA starting (log: {:?})", log_path);

    let mut config = Config::load();
    let cli_data_dir = std::env::args_os().nth(1).map(PathBuf::from);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut config, cli_data_dir);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("MAIA exited with error: {:#}", e);
    }
    result
}

/// Log to `<data_local_dir>/maia/maia.log`; the terminal belongs to the UI
///
/// `RUST_LOG` overrides the default `info` filter. Logging is skipped if the file
/// can't be opened.
fn init_logging() -> Option<PathBuf> {
    let dir = dirs::data_local_dir()?.join("maia");
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join("maia.log");
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Some(path)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &mut Config,
    cli_data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut app = App::new();
    let mut input_handler = InputHandler::new();
    let data_dir = config.resolve_data_dir(cli_data_dir.clone());

    let catalog = match Catalog::load(&data_dir) {
        Ok(catalog) => {
            tracing::info!(
                "Loaded {} samples from {}",
                catalog.len(),
                data_dir.display()
            );
            app.state.set_message(format!(
                "MAIA - {} samples | Press ? for help, / for samples",
                catalog.len()
            ));
            if remember_data_dir(config, cli_data_dir) {
                if let Err(e) = config.save() {
                    tracing::warn!("Failed to save config: {}", e);
                }
            }
            catalog
        }
        Err(e) => {
            tracing::error!("Failed to load data from {}: {}", data_dir.display(), e);
            app.state.set_error("Failed to load data");
            Catalog::from_parts(&data_dir, Vec::new(), MetricsTable::new())
        }
    };
    app.state.samples = SampleListState::new(catalog.len());

    let mut player = match AudioEngine::start() {
        Ok(engine) => {
            let sync = Synchronizer::new(
                engine.deck(TrackRole::Original),
                engine.deck(TrackRole::Adversarial),
                SyncSettings::from_config(config),
                config.initial_volume,
            );
            Some(Player { engine, sync })
        }
        Err(e) => {
            tracing::error!("Audio engine failed to start: {}", e);
            app.state.player_available = false;
            app.state.set_error(format!("{}: {}", PLAYER_UNAVAILABLE, e));
            None
        }
    };

    if !catalog.is_empty() {
        select_sample(&mut app, player.as_mut(), &catalog, 0);
    }

    let frame_duration = Duration::from_millis(1000 / FPS);
    let mut last_frame = Instant::now();

    loop {
        if app.should_quit {
            break;
        }

        let now = Instant::now();
        if let Some(player) = player.as_mut() {
            // Process transport events
            while let Ok(DeckEvent { role, event }) = player.engine.events().try_recv() {
                player.sync.handle_event(role, &event, &mut app.state);
            }

            player.sync.tick(now);

            for role in TrackRole::ALL {
                let track = player.sync.track(role);
                let panel = app.state.panel_mut(role);
                panel.view = track.view().clone();
                panel.deck = track.transport().snapshot();
            }
            app.state.syncing = player.sync.is_syncing();
        }

        app.state.expire_message(now);

        // Render
        terminal.draw(|frame| {
            render_ui(frame, &mut app, &catalog);
        })?;

        // Handle input
        let timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Handle quit shortcut
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    app.quit();
                    continue;
                }

                if let Some(cmd) = input_handler.handle_key(key) {
                    handle_command(&mut app, player.as_mut(), &catalog, cmd);
                }

                app.state.set_mode(input_handler.mode());
                app.state.command_buffer = input_handler.command_buffer().to_string();
            }
        }

        // Maintain frame rate
        let elapsed = last_frame.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
        last_frame = Instant::now();
    }

    if let Some(mut player) = player {
        player.shutdown();
    }
    tracing::info!("MAIA shut down");

    Ok(())
}

fn handle_command(app: &mut App, player: Option<&mut Player>, catalog: &Catalog, cmd: Command) {
    match cmd {
        // UI
        Command::ToggleHelp => app.state.toggle_help(),
        Command::HelpScrollUp => app.state.help_scroll_up(),
        Command::HelpScrollDown => app.state.help_scroll_down(),
        Command::ToggleCharts => app.state.toggle_charts(),
        Command::SetTheme(name) => app.state.set_theme(&name),
        Command::Invalid(err) => app.state.set_error(err.to_string()),

        // Sample browser
        Command::BrowserSelectNext => app.state.samples.select_next(),
        Command::BrowserSelectPrev => app.state.samples.select_prev(),
        Command::BrowserSelectFirst => app.state.samples.select_first(),
        Command::BrowserSelectLast => app.state.samples.select_last(),
        Command::BrowserLoadSelected => {
            let index = app.state.samples.selected_index;
            select_sample(app, player, catalog, index);
        }

        // Samples
        Command::SelectSample(index) => select_sample(app, player, catalog, index),
        Command::NextSample => match app.state.samples.next_index() {
            Some(index) => select_sample(app, player, catalog, index),
            None => app.state.set_warning("Already at the last sample"),
        },
        Command::PrevSample => match app.state.samples.prev_index() {
            Some(index) => select_sample(app, player, catalog, index),
            None => app.state.set_warning("Already at the first sample"),
        },

        Command::Quit => app.quit(),
        Command::Cancel => app.state.clear_message(),
        Command::EnterCommandMode | Command::EnterNormalMode | Command::EnterBrowserMode => {}

        cmd => match player {
            Some(player) => handle_player_command(app, player, catalog, cmd),
            None => app.state.set_error(PLAYER_UNAVAILABLE),
        },
    }
}

fn handle_player_command(app: &mut App, player: &mut Player, catalog: &Catalog, cmd: Command) {
    let sync = &mut player.sync;
    match cmd {
        Command::TogglePlay(role) => sync.track_mut(role).toggle_play_pause(),
        Command::ToggleSync => sync.toggle_sync(Instant::now()),

        Command::SetVolume(role, percent) => {
            let track = sync.track_mut(role);
            track.set_volume(percent);
            app.state.set_message(format!(
                "{} volume: {:.0}%",
                role,
                track.view().volume_percent
            ));
        }
        Command::AdjustVolume(role, delta) => sync.track_mut(role).adjust_volume(delta),

        Command::JumpToTime(seconds) => sync.jump_to_time(seconds),
        Command::Nudge(delta) => {
            let target = nudge_target(sync.track(TrackRole::Original).current_time(), delta);
            sync.jump_to_time(target);
        }
        Command::JumpToRegion(number) => {
            match region_start(catalog, sync.current_sample(), number) {
                Some(start) => sync.jump_to_time(start),
                None => app.state.set_warning(format!("No inpainting region {}", number)),
            }
        }

        other => tracing::debug!("Unhandled command: {:?}", other),
    }
}

/// Load sample `index` into both tracks and mark it current in the selector
fn select_sample(app: &mut App, player: Option<&mut Player>, catalog: &Catalog, index: usize) {
    let Some(player) = player else {
        // Attack info still follows the selection without audio
        app.state.samples.set_current(index);
        app.state.set_error(PLAYER_UNAVAILABLE);
        return;
    };

    match player.sync.load_sample(catalog, index) {
        Ok(()) => {
            app.state.samples.set_current(index);
            if let Some(sample) = catalog.get(index) {
                app.state
                    .set_message(format!("Loading {}", sample.selector_label(index)));
            }
        }
        Err(e) => app.state.set_error(e.to_string()),
    }
}

/// Start time of region `number` (1-based) of the current sample
fn region_start(catalog: &Catalog, current: Option<usize>, number: usize) -> Option<f64> {
    let sample = catalog.get(current?)?;
    let region = sample.inpainting_regions.get(number.checked_sub(1)?)?;
    Some(region.start)
}

/// Record a data directory given on the command line; true if the config changed
fn remember_data_dir(config: &mut Config, cli: Option<PathBuf>) -> bool {
    match cli {
        Some(dir) if config.data_dir.as_ref() != Some(&dir) => {
            config.data_dir = Some(dir);
            true
        }
        _ => false,
    }
}

/// Seek target for a relative nudge from `position`, never before the start
fn nudge_target(position: f64, delta: f64) -> f64 {
    (position + delta).max(0.0)
}

fn render_ui(frame: &mut ratatui::Frame, app: &mut App, catalog: &Catalog) {
    let area = frame.area();
    let theme = &app.state.theme;

    // Clear with background
    let block = ratatui::widgets::Block::default().style(theme.normal());
    frame.render_widget(block, area);

    // Main layout - conditionally include the sample browser
    let chunks = if app.state.show_browser {
        Layout::vertical([
            Constraint::Length(1),  // Title
            Constraint::Length(5),  // Original
            Constraint::Length(5),  // Adversarial
            Constraint::Length(4),  // Regions
            Constraint::Length(10), // Sample browser
            Constraint::Min(6),     // Attack info + charts
            Constraint::Length(1),  // Status bar
        ])
        .split(area)
    } else {
        Layout::vertical([
            Constraint::Length(1), // Title
            Constraint::Length(5), // Original
            Constraint::Length(5), // Adversarial
            Constraint::Length(4), // Regions
            Constraint::Min(6),    // Attack info + charts
            Constraint::Length(1), // Status bar
        ])
        .split(area)
    };

    let (browser_idx, info_idx, status_idx) = if app.state.show_browser {
        (Some(4), 5, 6)
    } else {
        (None, 4, 5)
    };

    render_title(frame, chunks[0], theme);

    let sample = app.state.samples.current.and_then(|i| catalog.get(i));
    let regions = sample.map_or(&[][..], |s| s.inpainting_regions.as_slice());

    // Tracks
    let original = TrackWidget::new(&app.state.original, TrackRole::Original, theme).regions(regions);
    frame.render_widget(original, chunks[1]);
    let adversarial =
        TrackWidget::new(&app.state.adversarial, TrackRole::Adversarial, theme).regions(regions);
    frame.render_widget(adversarial, chunks[2]);

    // Region timeline follows the original's playhead
    let timeline = RegionTimelineWidget::new(regions, theme).playhead(
        app.state.original.deck.position,
        app.state.original.deck.duration,
    );
    frame.render_widget(timeline, chunks[3]);

    // Sample browser (if shown)
    if let Some(idx) = browser_idx {
        let browser = SampleListWidget::new(catalog, &mut app.state.samples, theme)
            .focused(app.state.mode == Mode::Browser);
        frame.render_widget(browser, chunks[idx]);
    }

    // Attack info, with benchmark charts alongside
    let info_area = chunks[info_idx];
    if app.state.show_charts {
        let info_chunks = Layout::horizontal([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(info_area);
        frame.render_widget(AttackInfoWidget::new(sample, theme), info_chunks[0]);
        frame.render_widget(AsrChartWidget::new(catalog.metrics(), theme), info_chunks[1]);
        frame.render_widget(QualityScatterWidget::new(catalog.metrics(), theme), info_chunks[2]);
    } else {
        frame.render_widget(AttackInfoWidget::new(sample, theme), info_area);
    }

    // Status bar
    let status = StatusBarWidget::new(app.state.mode, &app.state.command_buffer, theme)
        .message(app.state.message.as_deref(), app.state.message_type)
        .syncing(app.state.syncing)
        .player_available(app.state.player_available);
    frame.render_widget(status, chunks[status_idx]);

    // Help overlay (scrollable)
    if app.state.show_help {
        let help_area = centered_rect(72, 35, area);
        let help = HelpWidget::new(theme).scroll(app.state.help_scroll);
        frame.render_widget(help, help_area);
    }
}

fn render_title(frame: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let title_text = " MAIA - Musical Adversarial Inpainting Attacks ";
    let padding = (area.width as usize).saturating_sub(title_text.len()) / 2;
    let rest = (area.width as usize)
        .saturating_sub(padding)
        .saturating_sub(title_text.len());
    let padded = format!(
        "{:═<pad$}{}{:═<rest$}",
        "",
        title_text,
        "",
        pad = padding,
        rest = rest
    );

    let line = Line::from(Span::styled(padded, theme.title()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
