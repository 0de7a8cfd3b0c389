//! Automated responder implementations.
//!
//! [`GeminiResponder`] produces bot replies through the Gemini REST API and
//! absorbs every failure into a fallback text, as required by
//! [`funchat_core::Responder`].

pub mod config;
pub mod gemini_responder;

pub use config::{GeminiConfig, SecretConfig};
pub use gemini_responder::{GeminiResponder, ResponderError};
