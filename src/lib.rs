//! truss-chat library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Which backend shape the client talks to.
///
/// `Parse` posts `{message}` to `/api/parse` and reads `/api/history/`.
/// `Chat` posts `{user_id, message}` to `/api/chat` and reads `/api/history/{user_id}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVariant {
    #[default]
    Parse,
    Chat,
}

impl ApiVariant {
    pub fn label(self) -> &'static str {
        match self {
            ApiVariant::Parse => "parse",
            ApiVariant::Chat => "chat",
        }
    }
}
