//! OpenAI provider implementation
//!
//! The chat types and converters here are shared with the Azure and Custom
//! adapters, which speak the same wire format.

mod client;
pub mod converter;
pub mod types;

pub use client::OpenAIAdapter;
pub use types::{OpenAIRequest, OpenAIResponse};
