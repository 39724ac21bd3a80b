//! Cursor position and internal scroll for the input box.
//!
//! The text lives in `InputBox`; every method takes it as `buffer: &str`.

use ratatui::layout::Rect;

use super::text_wrap::{BORDER_OFFSET, MAX_VISIBLE_LINES, inner_width, line_starts};

pub(super) struct CursorState {
    /// Byte offset into the buffer, always on a char boundary.
    pub pos: usize,
    /// First visible wrapped line.
    pub scroll_offset: u16,
    /// Width of the last rendered area, used by vertical movement.
    pub last_area_width: u16,
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_area_width: Self::DEFAULT_WIDTH,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll_offset = 0;
    }

    /// Wrapped line holding the cursor, and the line start offsets.
    fn locate(&self, buffer: &str, area_width: u16) -> (usize, Vec<usize>) {
        let starts = line_starts(buffer, inner_width(area_width));
        let line = starts
            .iter()
            .rposition(|&start| start <= self.pos)
            .unwrap_or(0);
        (line, starts)
    }

    /// Move one wrapped line up (`-1`) or down (`1`), keeping the column where
    /// the target line is long enough. Returns false at the first/last line.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16) -> bool {
        let (line, starts) = self.locate(buffer, self.last_area_width);
        let target = match direction {
            d if d < 0 && line > 0 => line - 1,
            d if d > 0 && line + 1 < starts.len() => line + 1,
            _ => return false,
        };

        let column = buffer[starts[line]..self.pos].chars().count();
        let target_end = starts
            .get(target + 1)
            .copied()
            .unwrap_or(buffer.len());
        let target_text = buffer[starts[target]..target_end].trim_end_matches(['\n', ' ']);

        self.pos = starts[target]
            + target_text
                .char_indices()
                .nth(column)
                .map(|(i, _)| i)
                .unwrap_or(target_text.len());
        true
    }

    /// Keep the cursor line inside the visible window.
    pub fn update_scroll_offset(&mut self, buffer: &str, area_width: u16) {
        let (line, starts) = self.locate(buffer, area_width);
        if starts.len() as u16 <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
            return;
        }
        let line = line as u16;
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = line + 1 - MAX_VISIBLE_LINES;
        }
    }

    /// Screen cell for the terminal cursor.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        }
        let (line, starts) = self.locate(buffer, area.width);
        let column = (buffer[starts[line]..self.pos].chars().count() as u16).min(width);
        let row = (line as u16).saturating_sub(self.scroll_offset);
        (
            area.x + BORDER_OFFSET + column,
            area.y + BORDER_OFFSET + row,
        )
    }
}
