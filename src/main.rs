use std::backtrace::Backtrace;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use shrike::binding::{Modifiers, PointerButton, keys};
use shrike::{Shell, ShellError};
use shrike::config::Config;
use shrike::cursor::{CursorShape, GrabCursorHandler};
use shrike::geometry::Rect;
use shrike::input::{ButtonState, KeyState};
use shrike::seat::SeatId;
use shrike::surface::SurfaceKind;

const TICK: Duration = Duration::from_millis(50);

fn main() -> anyhow::Result<()> {
    init_backtrace_defaults();
    init_logging()?;
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::force_capture();
        tracing::error!("panic: {panic_info}\n{backtrace}");
        eprintln!("panic: {panic_info}\n{backtrace}");
    }));

    let mut event_loop: EventLoop<Session> =
        EventLoop::try_new().map_err(|err| ShellError::EventLoop(err.to_string()))?;

    let mut session = Session::new(event_loop.get_signal());

    event_loop
        .handle()
        .insert_source(Timer::from_duration(TICK), |_, _, session| {
            if session.step() {
                TimeoutAction::ToDuration(TICK)
            } else {
                session.signal.stop();
                TimeoutAction::Drop
            }
        })
        .map_err(|err| {
            ShellError::EventLoop(format!("failed to schedule session script: {err}"))
        })?;

    event_loop
        .run(None, &mut session, |_| {})
        .context("event loop failed")?;

    tracing::info!("session script finished");
    Ok(())
}

/// A headless shell session driven by a scripted event sequence.
///
/// This stands in for the protocol/backend layer: it feeds the shell the
/// same seat and output events a real compositor frontend would.
struct Session {
    shell: Shell,
    seat: SeatId,
    script: VecDeque<Step>,
    signal: LoopSignal,
}

enum Step {
    Motion(f64, f64),
    Button(PointerButton, ButtonState),
    Key(Modifiers, u32),
    Note(&'static str),
}

impl Session {
    fn new(signal: LoopSignal) -> Self {
        let config = Config::from_env();
        let workspace_count = config.workspace_count;
        let mut shell = Shell::new(config);

        shell.set_grab_cursor_handler(Box::new(LogCursor));
        // The demo feeds fabricated pids; report instead of killing.
        shell.set_process_terminator(Box::new(|pid| {
            tracing::info!(pid, "would terminate process");
        }));

        shell.output_added(Rect::new(0, 0, 1920, 1080));
        shell.output_added(Rect::new(1920, 0, 1280, 1024));
        for _ in 0..workspace_count {
            shell.create_workspace();
        }
        let seat = shell.comp.create_seat();

        let editor_client = shell.client_connected(7001);
        let editor = shell.create_surface(editor_client, SurfaceKind::Toplevel, 1200, 800);
        if let Some(surface) = shell.comp.surface_mut(editor) {
            surface.x = 200;
            surface.y = 100;
        }
        shell.configure(editor);

        let terminal_client = shell.client_connected(7002);
        let terminal = shell.create_surface(terminal_client, SurfaceKind::Toplevel, 800, 600);
        if let Some(surface) = shell.comp.surface_mut(terminal) {
            surface.x = 600;
            surface.y = 300;
        }
        shell.configure(terminal);

        let script = VecDeque::from([
            Step::Note("click-to-focus on the editor"),
            Step::Motion(300.0, 200.0),
            Step::Button(PointerButton::Left, ButtonState::Pressed),
            Step::Button(PointerButton::Left, ButtonState::Released),
            Step::Note("toggle raise on the surface under the pointer"),
            Step::Motion(700.0, 400.0),
            Step::Button(PointerButton::Task, ButtonState::Pressed),
            Step::Button(PointerButton::Task, ButtonState::Released),
            Step::Note("open the desktop grid and pick a workspace"),
            Step::Key(Modifiers::SUPER, keys::G),
            Step::Motion(200.0, 500.0),
            Step::Button(PointerButton::Left, ButtonState::Pressed),
            Step::Button(PointerButton::Left, ButtonState::Released),
            Step::Note("cycle workspaces"),
            Step::Key(Modifiers::CTRL, keys::RIGHT),
            Step::Key(Modifiers::CTRL, keys::LEFT),
            Step::Note("start the kill grab, then abort it with Escape"),
            Step::Key(Modifiers::SUPER | Modifiers::CTRL, keys::ESC),
            Step::Key(Modifiers::empty(), keys::ESC),
        ]);

        Self {
            shell,
            seat,
            script,
            signal,
        }
    }

    /// Plays one scripted step; returns whether any remain.
    fn step(&mut self) -> bool {
        let Some(step) = self.script.pop_front() else {
            return false;
        };
        match step {
            Step::Note(note) => tracing::info!("--- {note}"),
            Step::Motion(x, y) => self.shell.pointer_motion(self.seat, 0, x, y),
            Step::Button(button, state) => {
                self.shell.pointer_button(self.seat, 0, button, state)
            }
            Step::Key(modifiers, key) => {
                self.shell.set_keyboard_modifiers(self.seat, modifiers);
                self.shell.key(self.seat, 0, key, KeyState::Pressed);
                self.shell.key(self.seat, 0, key, KeyState::Released);
                self.shell
                    .set_keyboard_modifiers(self.seat, Modifiers::empty());
            }
        }
        !self.script.is_empty()
    }
}

struct LogCursor;

impl GrabCursorHandler for LogCursor {
    fn set_grab_cursor(&mut self, seat: SeatId, cursor: CursorShape) {
        tracing::info!(seat = seat.0, ?cursor, "grab cursor set");
    }

    fn unset_grab_cursor(&mut self, seat: SeatId) {
        tracing::info!(seat = seat.0, "grab cursor unset");
    }
}

fn init_backtrace_defaults() {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // Safety: called at startup before creating any threads.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    if std::env::var_os("RUST_LIB_BACKTRACE").is_none() {
        // Safety: called at startup before creating any threads.
        unsafe { std::env::set_var("RUST_LIB_BACKTRACE", "0") };
    }
}

const DEFAULT_LOG_FILTER: &str = "shrike=debug";

fn init_logging() -> anyhow::Result<()> {
    let log_dir: PathBuf = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("log");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "shrike.log");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender),
        )
        .init();

    let log_file = log_dir.join("shrike.log");
    tracing::info!(path = %log_file.display(), "logging initialized");

    Ok(())
}
