//! # Application State
//!
//! Core business state for truss-chat. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── api: Arc<dyn TrussApi>        // backend client
//! ├── variant: ApiVariant           // parse or chat endpoints
//! ├── session_id: String            // scopes server-side history
//! ├── store: ConversationStore      // newest-first entries
//! ├── is_loading: bool              // a send is in flight
//! ├── error: Option<String>         // dismissible error banner
//! ├── health: Option<HealthStatus>  // last health check
//! └── status_message: String        // title bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::ApiVariant;
use crate::api::{HealthStatus, TrussApi};
use crate::core::identity::IdentityProvider;
use crate::core::store::ConversationStore;

pub struct App {
    pub api: Arc<dyn TrussApi>,
    pub variant: ApiVariant,
    pub session_id: String,
    pub store: ConversationStore,
    pub is_loading: bool,
    pub error: Option<String>,
    /// `None` until the first health check resolves.
    pub health: Option<HealthStatus>,
    pub status_message: String,
}

impl App {
    /// Establishes the session id synchronously; history and health are
    /// requested by the caller afterwards.
    pub fn new(
        api: Arc<dyn TrussApi>,
        identity: &dyn IdentityProvider,
        variant: ApiVariant,
    ) -> Self {
        Self {
            api,
            variant,
            session_id: identity.session_id(),
            store: ConversationStore::new(),
            is_loading: false,
            error: None,
            health: None,
            status_message: String::from("Describe a truss to get started"),
        }
    }

    /// True once a health check reported the model service down.
    pub fn inference_unavailable(&self) -> bool {
        self.health.as_ref().is_some_and(|h| !h.is_ready())
    }

    /// True once a health check failed to reach the backend at all.
    pub fn backend_unreachable(&self) -> bool {
        self.health.as_ref().is_some_and(|h| !h.backend_reachable)
    }
}
