// SPDX-License-Identifier: MIT
//
// simpad — a small terminal text editor.
//
// This is the binary that wires the two crates together:
//
//   sp-term   → raw mode, key decoding, ANSI output, the draw/read loop
//   sp-editor → document, cursor, viewport, search, frame composition
//
// Each keypress flows through:
//
//   stdin → KeyDecoder → Editor::on_key → Command → Context mutation
//   frame → Context::scroll → render::draw_frame → one write to stdout
//
// Fatal errors (terminal setup, opening the requested file) clear the
// screen, print one diagnostic line and exit with status 1.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use sp_editor::editor::Editor;
use sp_editor::error::{Error, Result};
use sp_editor::options::{DEFAULT_QUIT_TIMES, DEFAULT_TAB_STOP, Options};
use sp_editor::store::FsStore;
use sp_term::ansi;
use sp_term::event_loop::EventLoop;
use sp_term::terminal::Terminal;

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "simpad", version, about = "A small terminal text editor")]
struct Args {
    /// File to open. Without one, start with an empty, unnamed document.
    file: Option<PathBuf>,

    /// Append log records to this file. Nothing is logged without it.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Most verbose level written to the log file.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Columns per tab stop.
    #[arg(long, default_value_t = DEFAULT_TAB_STOP)]
    tab_stop: usize,

    /// Extra Ctrl-Q presses needed to quit with unsaved changes.
    #[arg(long, default_value_t = DEFAULT_QUIT_TIMES)]
    quit_times: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

impl Args {
    fn options(&self) -> Options {
        Options::default()
            .with_tab_stop(self.tab_stop)
            .with_quit_times(self.quit_times)
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Route `log` records to `path`. The screen belongs to the editor, so the
/// terminal never receives log output.
fn setup_logging(path: &Path, level: LevelFilter) -> std::result::Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level)
        .chain(fern::log_file(path)?)
        .apply()?;
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn run(args: &Args) -> Result<()> {
    let options = args.options();
    let mut editor = match &args.file {
        Some(path) => Editor::open(path, options, Box::new(FsStore))?,
        None => Editor::new(options, Box::new(FsStore)),
    };

    let mut terminal = Terminal::new();
    terminal.enter()?;

    let mut event_loop = EventLoop::new(terminal);
    event_loop.run(&mut editor)?;

    let mut terminal = event_loop.into_driver();
    terminal.leave()?;
    Ok(())
}

/// Report a fatal error on a clean screen and exit.
fn die(err: &Error) -> ! {
    let mut stdout = io::stdout().lock();
    ansi::clear_screen(&mut stdout).ok();
    ansi::cursor_home(&mut stdout).ok();
    stdout.flush().ok();

    log::error!("{err}");
    eprintln!("simpad: {err}");
    process::exit(1);
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        if let Err(e) = setup_logging(path, args.log_level.into()) {
            eprintln!("simpad: cannot open log file {}: {e}", path.display());
            process::exit(1);
        }
    }
    log::info!("simpad {} starting", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => log::info!("simpad exiting"),
        Err(e) if e.is_fatal() => die(&e),
        Err(e) => log::warn!("exiting after recoverable error: {e}"),
    }
}
