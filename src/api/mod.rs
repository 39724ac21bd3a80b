pub mod backend;
pub mod client;
pub mod types;

pub use backend::{ApiError, SendRequest, TrussApi};
pub use client::HttpTrussApi;
pub use types::{
    ChatReply, ConversationEntry, Element, HealthStatus, Load, Point3, Support, TrussGeometry,
};
