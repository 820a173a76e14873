// ABOUTME: LLM-backed stages for the course advisor: filter, selector, and ranking.
// ABOUTME: Defines the model runtime seam, the chunked pipeline, and evaluation metrics.

pub mod client;
pub mod eval;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod ranking;
pub mod runtime;
pub mod stage;
pub mod testing;

pub use client::create_model_runtime;
pub use eval::ConfusionMatrix;
pub use pipeline::{PipelineConfig, RecommendationPipeline};
pub use prompts::PromptSet;
pub use ranking::{RankingStage, rank_top_k};
pub use runtime::{ModelRuntime, StageError};
pub use stage::{MetadataSelectorStage, NameFilterStage, Stage};
