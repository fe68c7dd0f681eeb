// Postcheck: LLM-backed moderation and engagement feedback for forum posts.
//
// This is the library root. Each module corresponds to a major subsystem
// of the moderation service.

pub mod config;
pub mod llm;
pub mod moderation;
pub mod output;
pub mod web;
