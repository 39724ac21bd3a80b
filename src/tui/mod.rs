//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Routing
//!
//! ```text
//! Ctrl+C                    → Action::Quit (always)
//! boundary tripped          → only Ctrl+R (reload) does anything
//! F5 / Esc                  → Action::RecheckHealth / Action::DismissError
//! Alt+arrows, Alt+Home      → TrussViewState
//! PageUp/PageDown, wheel    → MessageListState
//! everything else           → InputBox; Up/Down it does not use → MessageListState
//! ```
//!
//! ## Redraw Strategy
//!
//! - **Animating** (send in flight, history loading): draws every ~80ms so the
//!   spinners move.
//! - **Idle**: sleeps up to 500ms, only redraws on events, resize, or
//!   background results.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.

pub mod component;
pub mod components;
pub mod event;
pub mod tasks;
pub mod ui;

use log::{debug, info};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::api::HttpTrussApi;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::identity::IdentityProvider;
use crate::core::state::App;
use crate::core::store::StorePhase;
use crate::tui::component::EventHandler;
use crate::tui::components::error_boundary::{self, ErrorBoundary};
use crate::tui::components::{InputBox, InputEvent, MessageListState, TrussViewState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_POLL: Duration = Duration::from_millis(80);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub truss_view: TrussViewState,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            truss_view: TrussViewState::new(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Alt+arrows and Ctrl+J arrive unambiguously;
        // terminals without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!(
            "Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)"
        );
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Everything that a reload throws away and rebuilds.
struct Session {
    app: App,
    tui: TuiState,
    tx: mpsc::Sender<Action>,
    rx: mpsc::Receiver<Action>,
}

impl Session {
    /// Fresh state plus the startup requests (history, health). Results from
    /// an earlier session land on its dropped channel and are discarded.
    fn start(config: &ResolvedConfig, identity: &dyn IdentityProvider) -> Self {
        let api = Arc::new(HttpTrussApi::new(config.base_url.clone(), config.variant));
        let app = App::new(api, identity, config.variant);
        info!(
            "Session {} against {} ({})",
            app.session_id,
            config.base_url,
            config.variant.label()
        );

        let (tx, rx) = mpsc::channel();
        tasks::spawn_history(app.api.clone(), app.session_id.clone(), tx.clone());
        tasks::spawn_health(app.api.clone(), tx.clone());

        Self {
            app,
            tui: TuiState::new(),
            tx,
            rx,
        }
    }

    /// Carry out one effect. Returns true when the loop should exit.
    fn apply(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::None => {}
            Effect::SpawnSend(message) => {
                tasks::spawn_send(
                    self.app.api.clone(),
                    self.app.session_id.clone(),
                    message,
                    self.tx.clone(),
                );
            }
            Effect::SpawnHealthCheck => {
                tasks::spawn_health(self.app.api.clone(), self.tx.clone());
            }
            Effect::ClearInput => self.tui.input_box.clear(),
            Effect::Quit => return true,
        }
        false
    }

    fn dispatch(&mut self, action: Action) -> bool {
        let effect = update(&mut self.app, action);
        let quit = self.apply(effect);
        // Input stays locked from submit until the send settles
        self.tui.input_box.sending = self.app.is_loading;
        quit
    }

    /// Route one terminal event while the UI is healthy.
    fn handle_event(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Quit => self.dispatch(Action::Quit),
            TuiEvent::RecheckHealth => self.dispatch(Action::RecheckHealth),
            TuiEvent::Escape => self.dispatch(Action::DismissError),
            TuiEvent::Reload | TuiEvent::Resize => false,
            TuiEvent::RotateLeft
            | TuiEvent::RotateRight
            | TuiEvent::TiltUp
            | TuiEvent::TiltDown
            | TuiEvent::ResetView => {
                self.tui.truss_view.handle_event(&event);
                false
            }
            TuiEvent::ScrollUp
            | TuiEvent::ScrollDown
            | TuiEvent::ScrollPageUp
            | TuiEvent::ScrollPageDown => {
                self.tui.message_list.handle_event(&event);
                false
            }
            _ => match self.tui.input_box.handle_event(&event) {
                Some(InputEvent::Submit(text)) => self.dispatch(Action::Submit(text)),
                Some(InputEvent::ContentChanged) => false,
                None => {
                    // Up/Down past the first/last input line scroll the transcript
                    self.tui.message_list.handle_event(&event);
                    false
                }
            },
        }
    }

    /// Apply background results. Returns (anything received, should exit).
    fn drain_background(&mut self) -> (bool, bool) {
        let mut received = false;
        while let Ok(action) = self.rx.try_recv() {
            received = true;
            debug!("Event loop received: {:?}", action);
            if self.dispatch(action) {
                return (true, true);
            }
        }
        (received, false)
    }

    fn animating(&self) -> bool {
        self.app.is_loading || self.app.store.phase() == StorePhase::Loading
    }
}

pub fn run(config: ResolvedConfig, identity: Box<dyn IdentityProvider>) -> std::io::Result<()> {
    let mut session = Session::start(&config, identity.as_ref());
    let mut boundary = ErrorBoundary::new();

    let mut terminal = ratatui::init();
    error_boundary::install_panic_hook();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'event_loop: loop {
        let animating = session.animating() && !boundary.has_error();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            let Session { app, tui, .. } = &mut session;
            let app = &*app;
            terminal.draw(|f| boundary.render(f, |f| ui::draw_ui(f, app, tui, spinner_frame)))?;
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_POLL } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if event == TuiEvent::Quit {
                break 'event_loop;
            }

            if boundary.has_error() {
                if event == TuiEvent::Reload {
                    info!("Reloading after render failure");
                    boundary.reset();
                    session = Session::start(&config, identity.as_ref());
                }
                continue;
            }

            if session.handle_event(event) {
                break 'event_loop;
            }
        }

        let (received, quit) = session.drain_background();
        if quit {
            break;
        }
        needs_redraw |= received;
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}
