//! Conversation domain module.

mod model;

pub use model::Conversation;
