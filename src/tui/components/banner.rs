//! # Banner Component
//!
//! Notices stacked above the transcript, one terminal line each:
//!
//! - advisory: the model service is not ready (persists until a good check)
//! - connectivity: the health probe could not reach the backend at all
//! - error: the last send failed (Esc dismisses)
//!
//! Lines are cut to the panel width so the banner height is exactly the
//! number of notices.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthChar;

use crate::api::HealthStatus;
use crate::tui::component::Component;

pub const ADVISORY_TEXT: &str =
    "Inference service is not ready. Start Ollama (`ollama serve`) and press F5 to re-check.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Advisory,
    Connectivity,
    Error,
}

impl NoticeKind {
    fn style(self) -> Style {
        match self {
            NoticeKind::Advisory => Style::default().fg(Color::Black).bg(Color::Yellow),
            NoticeKind::Connectivity => Style::default().fg(Color::White).bg(Color::Magenta),
            NoticeKind::Error => Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }
}

pub struct Banner<'a> {
    pub base_url: &'a str,
    pub health: Option<&'a HealthStatus>,
    pub error: Option<&'a str>,
}

impl<'a> Banner<'a> {
    pub fn new(base_url: &'a str, health: Option<&'a HealthStatus>, error: Option<&'a str>) -> Self {
        Self {
            base_url,
            health,
            error,
        }
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        let mut notices = Vec::new();
        if let Some(health) = self.health {
            if !health.is_ready() {
                notices.push((NoticeKind::Advisory, ADVISORY_TEXT.to_string()));
            }
            if !health.backend_reachable {
                let cause = health.error.as_deref().unwrap_or("no response");
                notices.push((
                    NoticeKind::Connectivity,
                    format!("Cannot reach backend at {}: {}", self.base_url, cause),
                ));
            }
        }
        if let Some(error) = self.error {
            notices.push((NoticeKind::Error, format!("Error: {error}  (Esc to dismiss)")));
        }
        notices
    }

    /// Rows the banner needs (0 when there is nothing to say).
    pub fn height(&self) -> u16 {
        self.notices().len() as u16
    }
}

/// Cut `text` to at most `width` terminal columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text = text.replace('\n', " ");
    let full: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if full <= width {
        return text;
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

impl Component for Banner<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;
        let lines: Vec<Line> = self
            .notices()
            .into_iter()
            .map(|(kind, text)| {
                let text = format!("{:<width$}", truncate_to_width(&text, width));
                Line::styled(text, kind.style())
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn not_ready() -> HealthStatus {
        HealthStatus {
            ok: false,
            ollama: false,
            error: Some("model service down".into()),
            backend_reachable: true,
        }
    }

    #[test]
    fn test_no_notices_when_healthy() {
        let healthy = HealthStatus {
            ok: true,
            ollama: true,
            error: None,
            backend_reachable: true,
        };
        assert_eq!(Banner::new("http://b", Some(&healthy), None).height(), 0);
        assert_eq!(Banner::new("http://b", None, None).height(), 0);
    }

    #[test]
    fn test_not_ready_shows_only_advisory() {
        let health = not_ready();
        let notices = Banner::new("http://b", Some(&health), None).notices();
        assert_eq!(notices, vec![(NoticeKind::Advisory, ADVISORY_TEXT.to_string())]);
    }

    #[test]
    fn test_unreachable_adds_connectivity_line() {
        let health = HealthStatus::degraded("connection refused");
        let notices = Banner::new("http://localhost:5000", Some(&health), Some("boom")).notices();
        let kinds: Vec<NoticeKind> = notices.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![NoticeKind::Advisory, NoticeKind::Connectivity, NoticeKind::Error]
        );
        assert_eq!(
            notices[1].1,
            "Cannot reach backend at http://localhost:5000: connection refused"
        );
        assert!(notices[2].1.contains("boom"));
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("a\nb", 10), "a b");
        // Wide characters count two columns
        assert_eq!(truncate_to_width("荷重荷重", 5), "荷重…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_render_error_line() {
        let backend = TestBackend::new(40, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut banner = Banner::new("http://b", None, Some("API error: 500"));
        terminal.draw(|f| banner.render(f, f.area())).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.starts_with("Error: API error: 500"));
    }
}
