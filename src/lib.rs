//! Habit Coach — LLM-generated 7-day habit plans enriched with scripture and quotations.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod llm;
pub mod plan;
pub mod server;
