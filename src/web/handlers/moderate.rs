// POST /validate_post — moderate one forum post.
//
// Body: { "content": ..., "title": ..., "category": ... }. Missing fields
// are reported as 400 in the order content, title, category.
//
// 200 body keeps the field names the front end already reads:
//   response          — engagement feedback text
//   feedback_source   — primary | secondary | fallback
//   result            — safety analysis flags
//   suggestion        — { new_post_title, new_post_content }, empty on failure

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::moderation::models::{
    FeedbackSource, ModerationResult, PostSubmission, PostSuggestion, SafetyAnalysis,
};
use crate::web::{api_error, AppState};

/// Wire shape of a successful moderation.
#[derive(Debug, Serialize)]
pub struct ModerationResponse<'a> {
    pub response: &'a str,
    pub feedback_source: FeedbackSource,
    pub result: &'a SafetyAnalysis,
    pub suggestion: &'a PostSuggestion,
}

impl<'a> From<&'a ModerationResult> for ModerationResponse<'a> {
    fn from(result: &'a ModerationResult) -> Self {
        Self {
            response: &result.feedback.text,
            feedback_source: result.feedback.source,
            result: &result.analysis,
            suggestion: &result.suggestion,
        }
    }
}

/// POST /validate_post — run the moderation pipeline.
pub async fn validate_post(
    State(state): State<AppState>,
    body: Result<Json<PostSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed request body");
            return api_error(StatusCode::BAD_REQUEST, "Invalid JSON body");
        }
    };

    match state.orchestrator.moderate(&submission).await {
        Ok(result) => (StatusCode::OK, Json(ModerationResponse::from(&result))).into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            api_error(status, &e.public_message())
        }
    }
}
