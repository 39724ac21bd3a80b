//! # InputBox Component
//!
//! Multi-line message editor at the bottom of the chat panel.
//!
//! ## Responsibilities
//!
//! - Capture text input and paste
//! - Editing and cursor movement (char, word, line)
//! - Emit `Submit` on Enter without clearing; the buffer is only cleared
//!   once the reply arrives (`Effect::ClearInput`), so a failed send keeps
//!   the text for another try
//! - Show a spinner title while a send is in flight, and refuse edits
//!   until it settles so the eventual clear only drops the sent text
//!
//! ## State Management
//!
//! The buffer is internal state. `sending` and `spinner_frame` are props
//! synced from the application state each frame.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use text_wrap::{
    MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, inner_width, line_starts, next_char_boundary,
    prev_char_boundary, word_boundary, wrap_line_count,
};

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed with non-blank text.
    Submit(String),
    /// Buffer or cursor changed.
    ContentChanged,
}

pub struct InputBox {
    buffer: String,
    cursor: CursorState,
    /// A send is in flight (Prop)
    pub sending: bool,
    /// Animation frame counter (Prop)
    pub spinner_frame: usize,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: CursorState::new(),
            sending: false,
            spinner_frame: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor.reset();
    }

    /// Height for the current content, between 1 and `MAX_VISIBLE_LINES`
    /// text lines plus borders.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let lines = wrap_line_count(&self.buffer, inner_width(area_width));
        lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn title(&self) -> String {
        if self.sending {
            let spinner = SPINNER[self.spinner_frame % SPINNER.len()];
            format!(" {spinner} Sending… ")
        } else {
            " Describe a truss (Enter send, Ctrl+J newline) ".to_string()
        }
    }

    fn visible_text(&self, area_width: u16) -> String {
        let width = inner_width(area_width);
        if self.cursor.scroll_offset == 0 || width == 0 {
            return self.buffer.clone();
        }
        let starts = line_starts(&self.buffer, width);
        let first = self.cursor.scroll_offset as usize;
        let last = (first + MAX_VISIBLE_LINES as usize).min(starts.len());
        let begin = starts.get(first).copied().unwrap_or(self.buffer.len());
        let end = starts.get(last).copied().unwrap_or(self.buffer.len());
        self.buffer[begin..end].trim_end_matches('\n').to_string()
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        let total = wrap_line_count(&self.buffer, inner_width(area.width));
        if total <= MAX_VISIBLE_LINES {
            return;
        }
        let mut state = ScrollbarState::default()
            .content_length(total.saturating_sub(MAX_VISIBLE_LINES) as usize)
            .position(self.cursor.scroll_offset as usize);
        let track = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            track,
            &mut state,
        );
    }

    fn line_bounds(&self) -> (usize, usize) {
        let start = self.buffer[..self.cursor.pos]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = self.buffer[self.cursor.pos..]
            .find('\n')
            .map(|i| self.cursor.pos + i)
            .unwrap_or(self.buffer.len());
        (start, end)
    }

    fn is_edit(event: &TuiEvent) -> bool {
        matches!(
            event,
            TuiEvent::InputChar(_)
                | TuiEvent::Paste(_)
                | TuiEvent::Backspace
                | TuiEvent::Delete
                | TuiEvent::Submit
        )
    }

    fn move_to(&mut self, pos: usize) -> Option<InputEvent> {
        (pos != self.cursor.pos).then(|| {
            self.cursor.pos = pos;
            InputEvent::ContentChanged
        })
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.last_area_width = area.width;
        self.cursor.update_scroll_offset(&self.buffer, area.width);

        let border = if self.sending { Color::DarkGray } else { Color::Cyan };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(self.title());

        let input = Paragraph::new(self.visible_text(area.width))
            .block(block)
            .style(Style::default().fg(Color::Green));

        frame.render_widget(input, area);
        self.render_scrollbar(frame, area);
        frame.set_cursor_position(self.cursor.screen_pos(&self.buffer, area));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.sending && Self::is_edit(event) {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor.pos, *c);
                self.cursor.pos += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.buffer.insert_str(self.cursor.pos, &text);
                self.cursor.pos += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor.pos == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(prev..self.cursor.pos);
                self.cursor.pos = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                if self.cursor.pos >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(self.cursor.pos..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft if self.cursor.pos > 0 => {
                self.move_to(prev_char_boundary(&self.buffer, self.cursor.pos))
            }
            TuiEvent::CursorRight if self.cursor.pos < self.buffer.len() => {
                self.move_to(next_char_boundary(&self.buffer, self.cursor.pos))
            }
            TuiEvent::WordLeft => self.move_to(word_boundary(&self.buffer, self.cursor.pos, false)),
            TuiEvent::WordRight => self.move_to(word_boundary(&self.buffer, self.cursor.pos, true)),
            TuiEvent::CursorHome => {
                let (start, _) = self.line_bounds();
                self.move_to(start)
            }
            TuiEvent::CursorEnd => {
                let (_, end) = self.line_bounds();
                self.move_to(end)
            }
            // At the first/last line these fall through to the transcript
            TuiEvent::CursorUp => self
                .cursor
                .move_vertically(&self.buffer, -1)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => self
                .cursor
                .move_vertically(&self.buffer, 1)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::Submit => (!self.buffer.trim().is_empty())
                .then(|| InputEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        input
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = typed("ab");
        assert_eq!(input.text(), "ab");

        let res = input.handle_event(&TuiEvent::Backspace);
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.text(), "a");
    }

    #[test]
    fn test_submit_keeps_buffer() {
        let mut input = typed("18 m span");
        let res = input.handle_event(&TuiEvent::Submit);
        assert_eq!(res, Some(InputEvent::Submit("18 m span".to_string())));
        assert_eq!(input.text(), "18 m span");

        input.clear();
        assert!(input.text().is_empty());
    }

    #[test]
    fn test_edits_ignored_while_sending() {
        let mut input = typed("warren");
        input.sending = true;
        assert_eq!(input.handle_event(&TuiEvent::InputChar('x')), None);
        assert_eq!(input.handle_event(&TuiEvent::Paste("more".into())), None);
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.text(), "warren");

        // Cursor movement still works
        assert_eq!(
            input.handle_event(&TuiEvent::CursorLeft),
            Some(InputEvent::ContentChanged)
        );

        input.sending = false;
        input.handle_event(&TuiEvent::InputChar('s'));
        assert_eq!(input.text(), "warrens");
    }

    #[test]
    fn test_blank_submit_emits_nothing() {
        let mut input = typed("  \n ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_insert_in_middle_after_cursor_moves() {
        let mut input = typed("ac");
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.text(), "abc");
    }

    #[test]
    fn test_word_jumps() {
        let mut input = typed("span 18 m");
        input.handle_event(&TuiEvent::WordLeft);
        input.handle_event(&TuiEvent::WordLeft);
        input.handle_event(&TuiEvent::InputChar('~'));
        assert_eq!(input.text(), "span ~18 m");

        input.handle_event(&TuiEvent::WordRight);
        input.handle_event(&TuiEvent::InputChar('.'));
        assert_eq!(input.text(), "span ~18. m");
    }

    #[test]
    fn test_home_end_stay_on_line() {
        let mut input = typed("first\nsecond");
        input.handle_event(&TuiEvent::CursorHome);
        input.handle_event(&TuiEvent::InputChar('>'));
        assert_eq!(input.text(), "first\n>second");

        input.handle_event(&TuiEvent::CursorEnd);
        assert_eq!(input.handle_event(&TuiEvent::CursorEnd), None);
    }

    #[test]
    fn test_vertical_move_at_edge_is_not_consumed() {
        let mut input = typed("single");
        assert_eq!(input.handle_event(&TuiEvent::CursorUp), None);
        assert_eq!(input.handle_event(&TuiEvent::CursorDown), None);

        let mut input = typed("a\nb");
        assert_eq!(
            input.handle_event(&TuiEvent::CursorUp),
            Some(InputEvent::ContentChanged)
        );
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\r\nb".to_string()));
        assert_eq!(input.text(), "a\nb");
    }

    #[test]
    fn test_height_grows_then_caps() {
        let input = typed("x");
        assert_eq!(input.calculate_height(40), 1 + VERTICAL_OVERHEAD);

        let input = typed("1\n2\n3\n4\n5\n6\n7");
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_render_idle_and_sending_titles() {
        let backend = TestBackend::new(60, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut input = InputBox::new();

        terminal.draw(|f| input.render(f, f.area())).unwrap();
        assert!(screen_text(&terminal).contains("Describe a truss"));

        input.sending = true;
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        assert!(screen_text(&terminal).contains("Sending…"));
    }
}
