//! Top-level screen composition.
//!
//! ```text
//! wide (>= 100 cols)                 narrow
//! ┌──────── title bar ────────┐     ┌─ title bar ─┐
//! │ chat panel │ 3D view      │     │ chat panel  │
//! │            │              │     ├─────────────┤
//! │            │              │     │ 3D view     │
//! └────────────┴──────────────┘     └─────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{ChatPanel, TitleBar, TrussView};

/// Narrower terminals stack the panels vertically.
pub const SIDE_BY_SIDE_MIN_WIDTH: u16 = 100;

/// Chat area and visualization area for a body of this size.
pub fn split_body(body: Rect) -> [Rect; 2] {
    use Constraint::Percentage;
    if body.width >= SIDE_BY_SIDE_MIN_WIDTH {
        Layout::horizontal([Percentage(50), Percentage(50)]).areas(body)
    } else {
        Layout::vertical([Percentage(55), Percentage(45)]).areas(body)
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let [title_area, body] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());
    let [chat_area, view_area] = split_body(body);

    ChatPanel::new(
        app,
        &mut tui.message_list,
        &mut tui.input_box,
        spinner_frame,
    )
    .render(frame, chat_area);

    tui.truss_view.sync(&app.store);
    TrussView::new(&mut tui.truss_view).render(frame, view_area);

    // Drawn last so the unseen-content flag reflects this frame's layout
    TitleBar::new(
        app.api.base_url().to_string(),
        app.variant.label(),
        app.status_message.clone(),
        tui.message_list.has_unseen_content(),
    )
    .render(frame, title_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatReply, Element, Point3, TrussGeometry};
    use crate::core::action::{Action, update};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(width: u16, height: u16, app: &App, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_split_body_side_by_side_when_wide() {
        let [chat, view] = split_body(Rect::new(0, 1, 120, 30));
        assert_eq!(chat.y, view.y);
        assert!(view.x > chat.x);

        let [chat, view] = split_body(Rect::new(0, 1, 80, 30));
        assert_eq!(chat.x, view.x);
        assert!(view.y > chat.y);
    }

    #[test]
    fn test_draw_ui_shows_both_panels() {
        let app = test_app();
        let mut tui = TuiState::new();
        let text = screen(120, 30, &app, &mut tui);
        assert!(text.contains("Truss Chat (backend: http://stub, parse)"));
        assert!(text.contains("Describe a truss"));
        assert!(text.contains("No truss yet."));
    }

    #[test]
    fn test_reply_with_geometry_reaches_view() {
        let mut app = test_app();
        update(&mut app, Action::Submit("triangle".into()));
        update(
            &mut app,
            Action::ReplyReceived {
                message: "triangle".into(),
                reply: ChatReply {
                    response: "A simple triangle.".into(),
                    truss_data: Some(TrussGeometry {
                        nodes: vec![
                            Point3::new(0.0, 0.0, 0.0),
                            Point3::new(4.0, 0.0, 0.0),
                            Point3::new(2.0, 2.0, 0.0),
                        ],
                        elements: vec![Element::new(0, 1), Element::new(1, 2), Element::new(2, 0)],
                        span: 4.0,
                        height: 2.0,
                        ..Default::default()
                    }),
                },
            },
        );
        update(&mut app, Action::SendSettled);

        let mut tui = TuiState::new();
        let text = screen(120, 30, &app, &mut tui);
        assert!(text.contains("A simple triangle."));
        assert!(text.contains("Truss (span: 4 m, height: 2 m)"));
        assert!(tui.truss_view.scene().is_some());
    }

    #[test]
    fn test_view_panic_leaves_chat_panel_drawn() {
        use crate::tui::components::ErrorBoundary;
        use crate::tui::components::truss_view::render_isolated;

        let app = test_app();
        let mut tui = TuiState::new();
        let mut boundary = ErrorBoundary::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|f| {
                boundary.render(f, |f| {
                    let [chat_area, view_area] = split_body(f.area());
                    ChatPanel::new(&app, &mut tui.message_list, &mut tui.input_box, 0)
                        .render(f, chat_area);
                    render_isolated(&mut tui.truss_view, f, view_area, |_, _, _| {
                        panic!("canvas blew up")
                    });
                })
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(!boundary.has_error());
        assert!(text.contains("Describe a truss"));
        assert!(!text.contains("Something went wrong"));
    }

    #[test]
    fn test_narrow_terminal_stacks_panels() {
        let app = test_app();
        let mut tui = TuiState::new();
        let text = screen(60, 40, &app, &mut tui);
        let input = text.find("Enter send").unwrap();
        let view = text.find("3D view").unwrap();
        assert!(input < view);
    }
}
