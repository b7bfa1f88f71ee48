//! Provider adapters
//!
//! One adapter per vendor, each turning a prompt plus [`SendOptions`] into
//! completion text over the shared [`HttpClient`](crate::http::HttpClient).
//! [`AdapterFactory`] picks the adapter for a [`ProviderKind`].

pub mod adapter;
pub mod anthropic;
pub mod azure;
pub mod custom;
pub mod error;
pub mod factory;
pub mod google;
pub mod huggingface;
pub mod kind;
pub mod openai;

pub use adapter::{ProviderAdapter, SendOptions};
pub use error::{ProviderError, ProviderErrorKind, ProviderResult};
pub use factory::AdapterFactory;
pub use kind::ProviderKind;

// Re-export concrete adapters
pub use anthropic::AnthropicAdapter;
pub use azure::AzureOpenAIAdapter;
pub use custom::CustomAdapter;
pub use google::GoogleAdapter;
pub use huggingface::HuggingFaceAdapter;
pub use openai::OpenAIAdapter;
