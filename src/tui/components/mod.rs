//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Rebuilt every frame from the data they are handed:
//! - `TitleBar`: top status line (backend, variant, status)
//! - `Banner`: advisory / connectivity / error notices
//! - `Message`: one transcript bubble
//! - `ChatPanel`: banner + transcript + input box
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; the state type implements
//! `EventHandler` and a thin wrapper implements `Component`:
//! - `InputBox`: multi-line editor, emits `InputEvent`
//! - `MessageList` / `MessageListState`: scrollable transcript with layout caching
//! - `TrussView` / `TrussViewState`: 3D projection of the newest geometry
//! - `ErrorBoundary`: catches render panics in its subtree
//!
//! ### Props-Based Data Flow
//!
//! Components receive external data as constructor arguments, never by
//! reaching into global state:
//!
//! ```rust,ignore
//! Banner::new(app.api.base_url(), app.health.as_ref(), app.error.as_deref())
//!     .render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── title_bar.rs
//! ├── banner.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── chat_panel.rs
//! ├── truss_view.rs
//! ├── error_boundary.rs
//! └── input_box/
//! ```

pub mod banner;
pub mod chat_panel;
pub mod error_boundary;
pub mod input_box;
pub mod message;
pub mod message_list;
pub mod title_bar;
pub mod truss_view;

pub use banner::Banner;
pub use chat_panel::ChatPanel;
pub use error_boundary::ErrorBoundary;
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use title_bar::TitleBar;
pub use truss_view::{TrussView, TrussViewState};
