mod app;
mod tools;
mod ui;

use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pitchboard::file_io::{self, Drill};
use pitchboard::{svg_export, DiagramCanvas, PitchLayout, Settings, Tool};
use ratatui::prelude::*;
use tracing::{info, warn};

use app::{App, DrillField, Mode, TOOL_KEYS};

/// Soccer drill diagrams in the terminal
#[derive(Parser, Debug)]
#[command(name = "pitchboard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Pitch background for a new drill
    #[arg(long, value_enum)]
    pitch: Option<PitchLayout>,

    /// Canvas width in pixels; height follows the pitch aspect ratio
    #[arg(long)]
    width: Option<f64>,

    /// Write the drill as SVG to this path and exit
    #[arg(long, value_name = "OUT")]
    export_svg: Option<PathBuf>,

    /// Drill file to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

/// Log to a file; the terminal belongs to the UI
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pitchboard=info"));

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pitchboard");
    fs::create_dir_all(&log_dir).with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("pitchboard.log"))
        .context("opening log file")?;

    let fmt_layer = fmt::layer()
        .with_writer(log_file)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logging is optional; a read-only home should not stop the editor
    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {:#}", e);
    }

    let settings = Settings::load();

    let (drill, load_error) = match &args.file {
        Some(path) if path.exists() => match file_io::load_drill(path) {
            Ok(drill) => (drill, None),
            Err(e) => (new_drill(&args, &settings), Some(e)),
        },
        _ => (new_drill(&args, &settings), None),
    };

    // Headless export
    if let Some(out) = &args.export_svg {
        if let Some(e) = load_error {
            return Err(e);
        }
        let config = settings.canvas_config(drill.diagram.clone()).with_pitch(drill.pitch);
        let mut canvas = DiagramCanvas::new(config);
        if let Some(width) = args.width {
            canvas.resize(width);
        }
        return svg_export::save_svg(&canvas.view(), out);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app with terminal size
    let size = terminal.size()?;
    let mut app = App::new(size.width, size.height.saturating_sub(2), settings, drill); // Reserve 2 rows for status/help
    if let Some(width) = args.width {
        app.canvas.resize(width);
    }
    match load_error {
        Some(e) => app.set_status(format!("Error loading file: {}", e)),
        None => {
            // A path that does not exist yet becomes the save target
            if args.file.as_ref().is_some_and(|p| p.exists()) {
                app.set_status("Loaded!");
            }
            app.file_path = args.file;
        }
    }
    info!(pitch = app.canvas.pitch().name(), "started");

    // Main event loop
    let result = run_app(&mut terminal, &mut app);

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
    }

    Ok(())
}

/// Empty drill on the pitch chosen by flag or settings
fn new_drill(args: &Args, settings: &Settings) -> Drill {
    Drill {
        pitch: args.pitch.unwrap_or(settings.pitch),
        ..Drill::default()
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // Clear status message on any keypress
                    app.clear_status();
                    match &app.mode {
                        Mode::Normal => handle_normal_mode(app, key),
                        Mode::TextInput { .. } => handle_input_mode(app, key, App::commit_text),
                        Mode::LabelInput { .. } => handle_input_mode(app, key, App::commit_label),
                        Mode::FieldInput { .. } => handle_input_mode(app, key, App::commit_field),
                        Mode::FileSave { .. } | Mode::FileOpen { .. } | Mode::SvgExport { .. } => {
                            handle_path_mode(app, key)
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    if app.mode == Mode::Normal {
                        tools::handle_mouse_event(app, mouse);
                    }
                }
                Event::Resize(width, height) => {
                    app.resize(width, height.saturating_sub(2));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.running = false,
            KeyCode::Char('s') => app.start_save(),
            KeyCode::Char('o') => app.start_open(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            if app.is_dirty() {
                warn!("quitting with unsaved changes");
            }
            app.running = false;
        }
        KeyCode::Esc => {
            app.canvas.cancel();
            app.canvas.select_id(None);
        }
        KeyCode::Char('s') => app.set_tool(Tool::Select),
        KeyCode::Char('v') => app.cycle_line_style(),
        KeyCode::Char('C') => app.cycle_color(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_stroke_width(1.0),
        KeyCode::Char('-') => app.adjust_stroke_width(-1.0),
        KeyCode::Char(']') => app.adjust_player_size(2.0),
        KeyCode::Char('[') => app.adjust_player_size(-2.0),
        KeyCode::Char('P') => app.cycle_pitch(),
        KeyCode::Char('K') => app.cycle_category(),
        KeyCode::Char('n') => app.start_field_input(DrillField::Name),
        KeyCode::Char('D') => app.start_field_input(DrillField::Description),
        KeyCode::Char('N') => app.new_diagram(),
        KeyCode::Char('u') => app.undo(),
        KeyCode::Char('U') => app.redo(),
        KeyCode::Char('y') => app.duplicate_selected(),
        KeyCode::Delete | KeyCode::Backspace => app.delete_selected(),
        KeyCode::Enter => {
            if !app.start_label_input() {
                app.set_status("Select a player or text to relabel");
            }
        }
        KeyCode::Char('E') => app.start_svg_export(),
        KeyCode::Char(c) => {
            if let Some((_, ty)) = TOOL_KEYS.iter().find(|(k, _)| *k == c) {
                app.set_tool(Tool::Shape(*ty));
            }
        }
        _ => {}
    }
}

/// Text, label and drill field editing
fn handle_input_mode(app: &mut App, key: KeyEvent, commit: fn(&mut App)) {
    match key.code {
        KeyCode::Enter => commit(app),
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Backspace => app.backspace_input(),
        KeyCode::Char(c) => app.add_input_char(c),
        _ => {}
    }
}

fn handle_path_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            let mode = std::mem::replace(&mut app.mode, Mode::Normal);
            match mode {
                Mode::FileSave { path } if !path.is_empty() => app.save_to(PathBuf::from(path)),
                Mode::FileOpen { path } if !path.is_empty() => app.open(PathBuf::from(path)),
                Mode::SvgExport { path } if !path.is_empty() => app.export_svg(PathBuf::from(path)),
                _ => {}
            }
        }
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Backspace => app.backspace_input(),
        KeyCode::Char(c) => app.add_input_char(c),
        _ => {}
    }
}
