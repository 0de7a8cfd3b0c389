//! Message domain module.
//!
//! - `model`: the `Message` entity and its delivery status
//! - `clock`: timestamp source used when creating messages

mod clock;
mod model;

pub use clock::MessageClock;
pub use model::{Message, MessageStatus};
