//! # MessageList Component
//!
//! Scrollable transcript of the conversation, oldest at the top.
//!
//! `MessageList` is created each frame around `&mut MessageListState`
//! (persistent scroll and layout state) and the store (props). Heights are
//! cached per store revision and width; the store only changes through the
//! reducer, so a revision match means nothing moved.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::store::{ConversationStore, StorePhase};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{Message, Speaker};
use crate::tui::event::TuiEvent;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub const EMPTY_HINT: &str =
    "No messages yet. Try: \"Design a Pratt truss with a 20 m span and 3 m height\"";
pub const LOADING_HINT: &str = "Loading history…";

pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// Follow new content at the bottom.
    pub stick_to_bottom: bool,
    /// Viewport height from the last frame (for clamping between frames).
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::default(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Keep the offset inside the content.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Content exists below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }
}

/// Message heights for one (revision, width, loading) combination.
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    key: Option<(u64, u16, bool)>,
}

impl LayoutCache {
    pub fn is_valid_for(&self, revision: u64, width: u16, pending: bool) -> bool {
        self.key == Some((revision, width, pending))
    }

    pub fn rebuild(&mut self, messages: &[Message<'_>], width: u16, revision: u64, pending: bool) {
        self.heights = messages.iter().map(|m| m.calculate_height(width)).collect();
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
        self.key = Some((revision, width, pending));
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Indices of messages overlapping the viewport, with half a screen of
    /// slack on both sides.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let slack = viewport_height / 2;
        let top = scroll_offset.saturating_sub(slack);
        let bottom = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(slack);

        let start = self.prefix_heights.partition_point(|&end| end <= top);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < bottom)
            .saturating_add(1)
            .min(self.prefix_heights.len());
        start..end
    }
}

pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub store: &'a ConversationStore,
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        store: &'a ConversationStore,
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            store,
            is_loading,
            spinner_frame,
        }
    }

    fn render_placeholder(frame: &mut Frame, area: Rect, text: &str) {
        let top = area.y + area.height / 2;
        let line_area = Rect::new(area.x, top, area.width, area.height.saturating_sub(top - area.y));
        let placeholder = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
        frame.render_widget(placeholder, line_area);
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.store.is_empty() && !self.is_loading {
            let hint = match self.store.phase() {
                StorePhase::Loading => LOADING_HINT,
                StorePhase::Ready => EMPTY_HINT,
            };
            Self::render_placeholder(frame, area, hint);
            return;
        }

        let waiting = format!(
            "{} Waiting for the backend…",
            SPINNER[self.spinner_frame % SPINNER.len()]
        );
        let mut messages: Vec<Message<'_>> = self
            .store
            .chronological()
            .flat_map(Message::pair)
            .collect();
        if self.is_loading {
            messages.push(Message::new(Speaker::Status, &waiting, None));
        }

        // -1 for the scrollbar column
        let content_width = area.width.saturating_sub(1);
        let revision = self.store.revision();
        if !self
            .state
            .layout
            .is_valid_for(revision, content_width, self.is_loading)
        {
            self.state
                .layout
                .rebuild(&messages, content_width, revision, self.is_loading);
        }

        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let layout = &self.state.layout;
        let total_height = layout.total_height();
        let scroll_offset = if self.state.stick_to_bottom {
            total_height.saturating_sub(area.height)
        } else {
            self.state.scroll_state.offset().y
        };
        let visible = layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = if visible.start > 0 {
            layout.prefix_heights[visible.start - 1]
        } else {
            0
        };
        for i in visible {
            let height = layout.heights[i];
            scroll_view.render_widget(messages[i].clone(), Rect::new(0, y, content_width, height));
            y += height;
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Events land on the state because `MessageList` itself is rebuilt each frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown | TuiEvent::CursorDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => return None,
        }
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ConversationEntry;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn entry(message: &str, response: &str) -> ConversationEntry {
        ConversationEntry {
            message: message.to_string(),
            response: response.to_string(),
            truss_data: None,
            created_at: None,
        }
    }

    fn draw(store: &ConversationStore, state: &mut MessageListState, loading: bool) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| MessageList::new(state, store, loading, 0).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_loading_placeholder() {
        let store = ConversationStore::new();
        let text = draw(&store, &mut MessageListState::new(), false);
        assert!(text.contains(LOADING_HINT));
    }

    #[test]
    fn test_empty_hint_once_ready() {
        let mut store = ConversationStore::new();
        store.mark_ready();
        let text = draw(&store, &mut MessageListState::new(), false);
        assert!(text.contains("No messages yet."));
    }

    #[test]
    fn test_transcript_is_chronological() {
        let mut store = ConversationStore::new();
        store.apply_history(vec![entry("second question", "b"), entry("first question", "a")]);
        let text = draw(&store, &mut MessageListState::new(), false);

        let first = text.find("first question").unwrap();
        let second = text.find("second question").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_waiting_bubble_while_loading() {
        let mut store = ConversationStore::new();
        store.mark_ready();
        let text = draw(&store, &mut MessageListState::new(), true);
        assert!(text.contains("Waiting for the backend"));
    }

    #[test]
    fn test_layout_cache_keyed_by_revision() {
        let mut store = ConversationStore::new();
        store.append(entry("q", "a"));
        let mut state = MessageListState::new();
        draw(&store, &mut state, false);
        assert_eq!(state.layout.heights.len(), 2);
        assert!(state.layout.is_valid_for(store.revision(), 59, false));

        store.append(entry("q2", "a2"));
        assert!(!state.layout.is_valid_for(store.revision(), 59, false));
        draw(&store, &mut state, false);
        assert_eq!(state.layout.heights.len(), 4);
    }

    #[test]
    fn test_visible_range() {
        let mut cache = LayoutCache::default();
        let texts: Vec<String> = (0..10).map(|i| format!("m{i}")).collect();
        let messages: Vec<Message<'_>> = texts
            .iter()
            .map(|t| Message::new(Speaker::User, t, None))
            .collect();
        cache.rebuild(&messages, 40, 1, false);
        // Each message is 3 rows tall
        assert_eq!(cache.total_height(), 30);
        assert_eq!(cache.visible_range(0, 6), 0..3);
        assert_eq!(cache.visible_range(15, 6), 4..8);
    }

    #[test]
    fn test_scroll_up_unpins() {
        let mut state = MessageListState::new();
        assert_eq!(state.handle_event(&TuiEvent::ScrollUp), Some(()));
        assert!(!state.stick_to_bottom);
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
    }
}
