use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// A piece of the screen that draws itself into a `Rect`.
///
/// Props arrive as struct fields; `&mut self` lets a component refresh its
/// caches (layout heights, scroll offsets, the cached scene) while drawing.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that turns low-level `TuiEvent`s into its own events.
///
/// Returning `None` means the event was not consumed and the caller may
/// route it elsewhere.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
