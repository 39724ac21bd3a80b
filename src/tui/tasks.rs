//! # Background Tasks
//!
//! Network calls run on tokio tasks and report back to the event loop as
//! `Action`s over a `std::sync::mpsc` channel. The event loop drains the
//! channel between frames, so every state change still goes through
//! `update()`.
//!
//! ```text
//! Effect::SpawnSend ──▶ spawn_send ──▶ api.send_message
//!                         │               │ Ok  → ReplyReceived
//!                         │               │ Err → SendFailed
//!                         └─ BusyGuard (dropped last) → SendSettled
//! ```

use std::sync::{Arc, mpsc};

use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::api::{SendRequest, TrussApi};
use crate::core::action::Action;

fn report(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to report task result: receiver dropped");
    }
}

/// Owned by a send task for its whole life. Dropping it (normal return,
/// panic or abort) reports `SendSettled`, which clears the loading flag.
pub struct BusyGuard {
    tx: mpsc::Sender<Action>,
}

impl BusyGuard {
    pub fn new(tx: mpsc::Sender<Action>) -> Self {
        Self { tx }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        debug!("Send settled");
        report(&self.tx, Action::SendSettled);
    }
}

/// Send one message in the background.
pub fn spawn_send(
    api: Arc<dyn TrussApi>,
    session_id: String,
    message: String,
    tx: mpsc::Sender<Action>,
) -> JoinHandle<()> {
    info!("Spawning send ({} chars)", message.len());
    let guard = BusyGuard::new(tx.clone());

    tokio::spawn(async move {
        let _guard = guard;
        let request = SendRequest {
            session_id: &session_id,
            message: &message,
        };
        match api.send_message(request).await {
            Ok(reply) => {
                info!(
                    "Reply received ({} chars, geometry: {})",
                    reply.response.len(),
                    reply.truss_data.is_some()
                );
                report(&tx, Action::ReplyReceived { message, reply });
            }
            Err(e) => {
                warn!("Send failed: {}", e);
                report(&tx, Action::SendFailed(e.to_string()));
            }
        }
    })
}

/// Fetch stored history once.
pub fn spawn_history(
    api: Arc<dyn TrussApi>,
    session_id: String,
    tx: mpsc::Sender<Action>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match api.get_history(&session_id).await {
            Ok(entries) => {
                info!("History loaded: {} entries", entries.len());
                report(&tx, Action::HistoryLoaded(entries));
            }
            Err(e) => report(&tx, Action::HistoryFailed(e.to_string())),
        }
    })
}

pub fn spawn_health(api: Arc<dyn TrussApi>, tx: mpsc::Sender<Action>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let status = api.check_health().await;
        debug!("Health: {:?}", status);
        report(&tx, Action::HealthChecked(status));
    })
}
