//! # ChatPanel Component
//!
//! Left (or upper) half of the screen:
//!
//! ```text
//! ┌ banner      (0..3 rows: advisory, connectivity, error)
//! ├ transcript  (MessageList, fills the rest)
//! └ input box   (3..6 rows, grows with content)
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::banner::Banner;
use crate::tui::components::input_box::InputBox;
use crate::tui::components::message_list::{MessageList, MessageListState};

pub struct ChatPanel<'a> {
    pub app: &'a App,
    pub message_list: &'a mut MessageListState,
    pub input_box: &'a mut InputBox,
    pub spinner_frame: usize,
}

impl<'a> ChatPanel<'a> {
    pub fn new(
        app: &'a App,
        message_list: &'a mut MessageListState,
        input_box: &'a mut InputBox,
        spinner_frame: usize,
    ) -> Self {
        Self {
            app,
            message_list,
            input_box,
            spinner_frame,
        }
    }
}

impl Component for ChatPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut banner = Banner::new(
            self.app.api.base_url(),
            self.app.health.as_ref(),
            self.app.error.as_deref(),
        );

        self.input_box.sending = self.app.is_loading;
        self.input_box.spinner_frame = self.spinner_frame;
        let input_height = self.input_box.calculate_height(area.width);

        let [banner_area, list_area, input_area] = Layout::vertical([
            Constraint::Length(banner.height()),
            Constraint::Min(1),
            Constraint::Length(input_height),
        ])
        .areas(area);

        if banner_area.height > 0 {
            banner.render(frame, banner_area);
        }
        MessageList::new(
            self.message_list,
            &self.app.store,
            self.app.is_loading,
            self.spinner_frame,
        )
        .render(frame, list_area);
        self.input_box.render(frame, input_area);
    }
}
