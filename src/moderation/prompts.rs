// Prompt templates for the three LLM calls of a moderation run.

use super::models::{ModerationRequest, SafetyAnalysis};

/// Returned by the feedback race when no provider answers before the deadline.
pub const TIMEOUT_FALLBACK: &str = "Response took too long. Sorry about that. Please try again.";

/// Substituted when the winning provider answered with empty text.
pub const EMPTY_FEEDBACK_FALLBACK: &str = "Response unavailable. Sorry. Error te-0";

/// The post itself, formatted the same way for every prompt.
pub fn post_data(request: &ModerationRequest) -> String {
    format!(
        "Post Category: {}\nPost content:\n{}\nPost Title:{}",
        request.category, request.content, request.title
    )
}

pub fn safety_prompt(request: &ModerationRequest) -> String {
    format!(
        "You are a bot that detects suitability of the post content for public posting.\n{}",
        post_data(request)
    )
}

pub fn feedback_prompt(request: &ModerationRequest, analysis: &SafetyAnalysis) -> String {
    format!(
        "Based on the post category, content, title and analysis results provided, provide \
         recommendations to improve post engagement limited to a single paragraph in point form. \
         Add this link and let the user know that they can browse posts there and copy a few \
         popular posts: {link}.\nData: {data}\nAnalysis result: {analysis}\n If analysis result \
         indicates issues, provide recommendations to address them first.",
        link = request.category.reference_link(),
        data = post_data(request),
    )
}

pub fn suggestion_prompt(request: &ModerationRequest, feedback: &str) -> String {
    format!(
        "User Input: {}\nPrepare the new post based on the suggestions from this:\n{}",
        post_data(request),
        feedback
    )
}
