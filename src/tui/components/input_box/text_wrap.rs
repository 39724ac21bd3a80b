//! Wrapping and boundary helpers for the input box. Stateless.

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Content lines shown before the box scrolls internally
pub(super) const MAX_VISIBLE_LINES: u16 = 4;
/// Border width between the area edge and the first text cell
pub(super) const BORDER_OFFSET: u16 = 1;

pub(super) fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Text width inside the box, 0 if the area is too narrow.
pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Byte offset where each wrapped line begins.
///
/// A wrapped line that ends at a hard newline owns that newline. At a soft
/// break the spaces textwrap dropped belong to the line before. A trailing
/// newline yields a final empty line.
pub(super) fn line_starts(text: &str, width: u16) -> Vec<usize> {
    if width == 0 || text.is_empty() {
        return vec![0];
    }
    let bytes = text.as_bytes();
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in textwrap::wrap(text, wrap_options(width)) {
        starts.push(offset);
        offset += line.len();
        while bytes.get(offset) == Some(&b' ') {
            offset += 1;
        }
        if bytes.get(offset) == Some(&b'\n') {
            offset += 1;
        }
    }
    if text.ends_with('\n') && starts.last() != Some(&text.len()) {
        starts.push(text.len());
    }
    if starts.is_empty() {
        starts.push(0);
    }
    starts
}

/// Number of wrapped lines, at least 1.
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    line_starts(text, width).len() as u16
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Readline-style word jump: skip separators, then one run of word characters.
///
/// `.` counts as a word character so decimals like `18.5` jump as one unit.
pub(super) fn word_boundary(text: &str, pos: usize, forward: bool) -> usize {
    if forward {
        let rest = &text[pos..];
        let skip_gap = rest
            .char_indices()
            .find(|&(_, c)| is_word_char(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let word = &rest[skip_gap..];
        let word_len = word
            .char_indices()
            .find(|&(_, c)| !is_word_char(c))
            .map(|(i, _)| i)
            .unwrap_or(word.len());
        pos + skip_gap + word_len
    } else {
        let head = &text[..pos];
        let gap_end = head
            .char_indices()
            .rev()
            .find(|&(_, c)| is_word_char(c))
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        head[..gap_end]
            .char_indices()
            .rev()
            .find(|&(_, c)| !is_word_char(c))
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0)
    }
}
