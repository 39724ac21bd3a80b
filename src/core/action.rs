//! # Actions
//!
//! Everything that can happen in truss-chat becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ReplyReceived { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O the adapter should
//! perform. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  State' + Effect
//! ```

use log::{info, warn};

use crate::api::{ChatReply, ConversationEntry, HealthStatus};
use crate::core::state::App;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User submitted the input box contents.
    Submit(String),
    /// The backend answered the message that was sent.
    ReplyReceived { message: String, reply: ChatReply },
    /// The send failed; carries the text for the error banner.
    SendFailed(String),
    /// The send task finished (in any way). Always follows the outcome.
    SendSettled,
    HistoryLoaded(Vec<ConversationEntry>),
    HistoryFailed(String),
    HealthChecked(HealthStatus),
    RecheckHealth,
    DismissError,
    Quit,
}

/// I/O requested by `update()`, carried out by the TUI adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Start a background send of this (trimmed) message.
    SpawnSend(String),
    SpawnHealthCheck,
    /// Empty the input box.
    ClearInput,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            let text = text.trim();
            if text.is_empty() || app.is_loading {
                return Effect::None;
            }
            app.error = None;
            app.is_loading = true;
            app.status_message = String::from("Sending…");
            Effect::SpawnSend(text.to_string())
        }
        Action::ReplyReceived { message, reply } => {
            let has_geometry = reply.truss_data.is_some();
            app.store
                .append(ConversationEntry::from_reply(message, reply));
            app.status_message = if has_geometry {
                String::from("Reply received with geometry")
            } else {
                String::from("Reply received")
            };
            Effect::ClearInput
        }
        Action::SendFailed(message) => {
            app.status_message = String::from("Send failed");
            app.error = Some(message);
            Effect::None
        }
        Action::SendSettled => {
            app.is_loading = false;
            Effect::None
        }
        Action::HistoryLoaded(entries) => {
            info!("Applying {} history entries", entries.len());
            app.store.apply_history(entries);
            Effect::None
        }
        Action::HistoryFailed(message) => {
            warn!("History load failed: {}", message);
            app.store.mark_ready();
            Effect::None
        }
        Action::HealthChecked(status) => {
            if !status.is_ready() {
                warn!(
                    "Inference service not ready (reachable={}, error={:?})",
                    status.backend_reachable, status.error
                );
            }
            app.status_message = String::from(if !status.backend_reachable {
                "Backend unreachable"
            } else if status.is_ready() {
                "Backend ready"
            } else {
                "Inference service not ready"
            });
            app.health = Some(status);
            Effect::None
        }
        Action::RecheckHealth => {
            app.status_message = String::from("Checking backend health…");
            Effect::SpawnHealthCheck
        }
        Action::DismissError => {
            app.error = None;
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}
