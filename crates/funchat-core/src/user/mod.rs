//! User domain module.
//!
//! - `model`: the `User` entity and avatar helpers
//! - `roster`: the automated responders seeded into every new store

mod model;
mod roster;

pub use model::{BOT_ID_PREFIX, User, avatar_url};
pub use roster::default_bots;
