//! # ErrorBoundary Component
//!
//! Catches panics raised while drawing its subtree and replaces the subtree
//! with a fallback view until the user reloads.
//!
//! ```text
//! draw_ui ──▶ ErrorBoundary::render(frame, |f| { ...subtree... })
//!                 │ no panic → frame as drawn
//!                 │ panic    → last_error = payload, fallback drawn
//!                 ▼
//!           later frames: fallback only (subtree not called)
//!           Ctrl+R: reset() + fresh App/TuiState
//! ```
//!
//! Panels that recover on their own (the 3D view) use [`catch_panic`]
//! directly and never trip the outer boundary.
//!
//! The panic hook installed by [`install_panic_hook`] keeps caught panics out
//! of the terminal (they go to the log). Panics anywhere else reach the
//! previous hook, which is ratatui's terminal-restoring one.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use log::error;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};

pub const RELOAD_HINT: &str = "Press Ctrl+R to reload, Ctrl+C to quit";

thread_local! {
    static IN_BOUNDARY: Cell<bool> = const { Cell::new(false) };
}

/// Chain a hook in front of the current one. Call after `ratatui::init()`.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if IN_BOUNDARY.with(Cell::get) {
            error!("Render panic caught by error boundary: {}", info);
        } else {
            previous(info);
        }
    }));
}

/// Restores the thread-local flag even if the child unwinds. Scopes nest.
struct BoundaryScope {
    outer: bool,
}

impl BoundaryScope {
    fn enter() -> Self {
        Self {
            outer: IN_BOUNDARY.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for BoundaryScope {
    fn drop(&mut self) {
        IN_BOUNDARY.with(|flag| flag.set(self.outer));
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}

/// Run `child`, turning a panic into its message.
pub fn catch_panic<R, F>(child: F) -> Result<R, String>
where
    F: FnOnce() -> R,
{
    let _scope = BoundaryScope::enter();
    panic::catch_unwind(AssertUnwindSafe(child)).map_err(|payload| panic_message(payload.as_ref()))
}

#[derive(Debug, Default)]
pub struct ErrorBoundary {
    last_error: Option<String>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn reset(&mut self) {
        self.last_error = None;
    }

    /// Draw `child` into `frame`, or the fallback if it has panicked before.
    pub fn render<F>(&mut self, frame: &mut Frame, child: F)
    where
        F: FnOnce(&mut Frame),
    {
        if self.last_error.is_none() {
            match catch_panic(|| child(&mut *frame)) {
                Ok(()) => return,
                Err(message) => {
                    error!("UI subtree failed, showing fallback: {}", message);
                    self.last_error = Some(message);
                }
            }
        }

        let area = frame.area();
        self.render_fallback(frame, area);
    }

    fn render_fallback(&self, frame: &mut Frame, area: Rect) {
        let message = self.last_error.as_deref().unwrap_or_default();
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .title(" Something went wrong ");

        let lines = vec![
            Line::styled(
                "The interface hit an unexpected error.",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::default(),
            Line::styled(message.to_string(), Style::default().fg(Color::Red)),
            Line::default(),
            Line::styled(RELOAD_HINT, Style::default().fg(Color::Yellow)),
        ];

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}
