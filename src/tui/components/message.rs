use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::api::ConversationEntry;
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Borders (1 left + 1 right) plus padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Top + bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    /// Transient line from the client itself (e.g. "waiting for reply").
    Status,
}

impl Speaker {
    fn label(self) -> &'static str {
        match self {
            Speaker::User => "you",
            Speaker::Assistant => "assistant",
            Speaker::Status => "truss-chat",
        }
    }

    fn style(self) -> Style {
        match self {
            Speaker::User => Style::default().fg(Color::Green),
            Speaker::Assistant => Style::default().fg(Color::Blue),
            Speaker::Status => Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        }
    }
}

/// One bubble in the transcript. Created fresh each frame.
///
/// The caption sits on the bottom border, so it never changes the height
/// computed by [`calculate_height`](Self::calculate_height).
#[derive(Debug, Clone, PartialEq)]
pub struct Message<'a> {
    pub speaker: Speaker,
    pub text: &'a str,
    pub caption: Option<String>,
}

impl<'a> Message<'a> {
    pub fn new(speaker: Speaker, text: &'a str, caption: Option<String>) -> Self {
        Self {
            speaker,
            text,
            caption,
        }
    }

    /// The user bubble and the assistant bubble for one entry.
    pub fn pair(entry: &'a ConversationEntry) -> [Message<'a>; 2] {
        let sent_at = entry
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string());
        let geometry = entry.truss_data.as_ref().map(|g| {
            format!(
                "geometry: {} nodes, {} elements",
                g.nodes.len(),
                g.elements.len()
            )
        });
        [
            Message::new(Speaker::User, &entry.message, sent_at),
            Message::new(Speaker::Assistant, &entry.response, geometry),
        ]
    }

    /// Rendered height at `width`, predicted with the same wrapping rules
    /// `Paragraph` uses so the scroll view can be sized before drawing.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }

        let content = self.text.trim();
        if content.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);
        let lines = textwrap::wrap(content, options);
        (lines.len() as u16).max(1) + VERTICAL_OVERHEAD
    }
}

impl Widget for Message<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = self.speaker.style();
        let border_style = style.add_modifier(Modifier::DIM);

        let mut block = Block::bordered()
            .title(self.speaker.label())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        if let Some(caption) = self.caption {
            block = block.title_bottom(Line::from(caption).right_aligned());
        }

        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.text.trim())
            .style(style)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

impl Component for Message<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.clone(), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Element, Point3, TrussGeometry};
    use chrono::NaiveDate;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn user(text: &str) -> Message<'_> {
        Message::new(Speaker::User, text, None)
    }

    #[test]
    fn calculate_height_empty_content_returns_border_height() {
        assert_eq!(user("").calculate_height(80), VERTICAL_OVERHEAD);
        assert_eq!(user("  \n\t ").calculate_height(80), VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_too_narrow_returns_minimum() {
        assert_eq!(user("Hello world").calculate_height(HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn calculate_height_wraps_words() {
        // content width 5: "Hello" | "world"
        assert_eq!(user("Hello world").calculate_height(9), 2 + VERTICAL_OVERHEAD);
        // content width 4: "abcd" | "efgh" | "ij"
        assert_eq!(user("abcdefghij").calculate_height(8), 3 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn caption_does_not_change_height() {
        let plain = user("18 m span");
        let captioned = Message::new(Speaker::User, "18 m span", Some("12:00".into()));
        assert_eq!(plain.calculate_height(40), captioned.calculate_height(40));
    }

    #[test]
    fn pair_builds_user_and_assistant_bubbles() {
        let entry = ConversationEntry {
            message: "triangle please".into(),
            response: "done".into(),
            truss_data: Some(TrussGeometry {
                nodes: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
                elements: vec![Element::new(0, 1)],
                ..Default::default()
            }),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 0)),
        };
        let [question, answer] = Message::pair(&entry);
        assert_eq!(question.speaker, Speaker::User);
        assert_eq!(question.caption.as_deref(), Some("2024-05-01 09:30"));
        assert_eq!(answer.speaker, Speaker::Assistant);
        assert_eq!(answer.caption.as_deref(), Some("geometry: 2 nodes, 1 elements"));
    }

    #[test]
    fn render_shows_label_text_and_caption() {
        let backend = TestBackend::new(40, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut message = Message::new(Speaker::Assistant, "hello", Some("note".into()));
        terminal
            .draw(|f| Component::render(&mut message, f, f.area()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("assistant"));
        assert!(text.contains("hello"));
        assert!(text.contains("note"));
    }

    #[test]
    fn speaker_styles() {
        assert_eq!(Speaker::User.style().fg, Some(Color::Green));
        assert_eq!(Speaker::Assistant.style().fg, Some(Color::Blue));
        assert!(Speaker::Status.style().add_modifier.contains(Modifier::ITALIC));
    }
}
