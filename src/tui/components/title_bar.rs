//! # TitleBar Component
//!
//! One-line status bar at the top of the screen.
//!
//! The text is built from props in priority order so the important parts
//! survive on narrow terminals:
//!
//! 1. `"Truss Chat (backend: http://localhost:5000, parse) | Sending… | ↓ more"`
//! 2. `"Truss Chat (backend: http://localhost:5000, parse) | Sending…"`
//! 3. `"Truss Chat (backend: http://localhost:5000, parse)"`

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::tui::component::Component;

pub struct TitleBar {
    pub base_url: String,
    pub variant: &'static str,
    pub status_message: String,
    /// Transcript has content below the viewport.
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(
        base_url: String,
        variant: &'static str,
        status_message: String,
        has_unseen_content: bool,
    ) -> Self {
        Self {
            base_url,
            variant,
            status_message,
            has_unseen_content,
        }
    }

    fn text(&self) -> String {
        let mut text = format!("Truss Chat (backend: {}, {})", self.base_url, self.variant);
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        }
        if self.has_unseen_content {
            text.push_str(" | ↓ more");
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = Style::default().add_modifier(Modifier::BOLD).fg(Color::White);
        frame.render_widget(Span::styled(self.text(), style), area);
    }
}
