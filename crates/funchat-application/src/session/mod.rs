//! Session-scoped projection of the persistent store.

mod state;
mod views;

pub use state::{SessionState, SharedSessionState};
pub use views::{ConversationSummary, NO_MESSAGES_PREVIEW, format_clock_time};
