//! LessonForge Core Library
//!
//! Multi-provider LLM generation for study content: one vendor-neutral
//! facade over OpenAI, Google, Anthropic, Hugging Face, Azure OpenAI and
//! OpenAI-compatible endpoints, a repair pipeline that turns malformed or
//! truncated model output into JSON, cost estimation and deterministic
//! tier rollout, and typed flashcard, quiz and exam generation on top.
//!
//! ```no_run
//! use lessonforge_core::{GenerationConfig, GenerationOptions, GenerationService};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = GenerationService::new(GenerationConfig::from_env()?)?;
//! let cards = service
//!     .generate_json_value("Create 3 flashcards about osmosis as JSON", &GenerationOptions::new())
//!     .await?;
//! println!("{}", cards);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content;
pub mod cost;
pub mod generation;
pub mod http;
pub mod providers;
pub mod repair;
pub mod rollout;

pub use config::{ConfigError, GenerationConfig, ProviderSettings};
pub use content::{ContentError, ContentGenerator, TopicInfo};
pub use cost::{estimate, estimate_for, ContentType, CostEstimate, CostTier};
pub use generation::{GenerationError, GenerationFallback, GenerationOptions, GenerationService, JsonGeneration};
pub use providers::{ProviderAdapter, ProviderError, ProviderKind, SendOptions};
pub use repair::{JsonRepairPipeline, RepairOutcome, RepairStage};
pub use rollout::{select_provider, select_tier, RolloutPolicy};

/// Returns the version of the LessonForge Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
