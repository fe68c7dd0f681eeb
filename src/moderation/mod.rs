// Post moderation pipeline: safety analysis, raced engagement feedback and a
// suggested rewrite, each backed by an LLM provider.

pub mod error;
pub mod extractor;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod race;
pub mod schema;
