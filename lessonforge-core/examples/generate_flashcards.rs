//! Generate flashcards, a quiz and a cost estimate for one topic
//!
//! Reads provider keys from the environment (`OPENAI_API_KEY`,
//! `GOOGLE_API_KEY`, ...) and uses `LLM_DEFAULT_PROVIDER` when set.
//!
//! Run with: RUST_LOG=info cargo run --example generate_flashcards

use anyhow::Result;
use lessonforge_core::content::{ContentGenerator, QualityValidator, TopicInfo};
use lessonforge_core::cost::{estimate_for, ContentType};
use lessonforge_core::generation::{GenerationService, JsonGeneration};
use lessonforge_core::rollout::{select_tier, RolloutPolicy};
use lessonforge_core::{GenerationConfig, GenerationOptions};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GenerationConfig::from_env()?;
    println!("Default provider: {}", config.defaults.provider);

    let policy = RolloutPolicy::percentage("demo", lessonforge_core::CostTier::Minimal, lessonforge_core::CostTier::UltraMinimal, 20);
    let tier = select_tier("demo-school", &policy);
    let estimate = estimate_for(ContentType::Flashcards, 10, tier);
    println!(
        "Tier {} ({} / {}): ~{} tokens, ${:.5}",
        tier,
        tier.provider(),
        tier.model(),
        estimate.tokens_estimated,
        estimate.estimated_cost_usd
    );

    let service = Arc::new(GenerationService::new(config)?);
    let generator = ContentGenerator::new(service).with_options(GenerationOptions::new().with_temperature(0.5));

    let mut topic = TopicInfo::new("bio-photosynthesis", "Photosynthesis", "Biology", 3);
    topic.syllabus_code = "0610".to_string();
    topic.learning_objectives = vec![
        "State the word equation for photosynthesis".to_string(),
        "Investigate the factors limiting the rate".to_string(),
    ];

    match generator.generate_flashcards(&topic, 5).await? {
        JsonGeneration::Parsed { value, stage } => {
            println!("\nFlashcards (repair stage: {}):", stage);
            for card in &value.flashcards {
                println!("  {} -> {}", card.front_content, card.back_content);
            }
        }
        JsonGeneration::Fallback(fallback) => {
            println!("\nFlashcards failed: {}", serde_json::to_string_pretty(&fallback)?);
        }
    }

    let batch = generator.generate_quiz_questions(&topic, 3).await?;
    let validator = QualityValidator::new();
    println!("\nQuiz: {}/{} questions", batch.questions.len(), batch.requested);
    for question in &batch.questions {
        let report = validator.validate_quiz_question(question);
        println!(
            "  [{:.2}{}] {}",
            report.quality_score,
            if report.is_valid { "" } else { " !" },
            question.question_text
        );
    }

    Ok(())
}
