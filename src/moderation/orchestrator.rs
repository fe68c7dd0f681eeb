// Moderation orchestrator — one linear run per submitted post.
//
//   Validate -> Analyze -> GenerateFeedback -> ExtractSuggestion -> Respond
//
// Validation and analysis failures end the request. Feedback generation
// always produces text (the race has its own fallback). A failed suggestion
// degrades to the empty sentinel and the request still succeeds.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use tracing::{error, info, warn};

use super::error::ModerationError;
use super::extractor::StructuredExtractor;
use super::models::{
    ModerationRequest, ModerationResult, PostSubmission, PostSuggestion, SafetyAnalysis,
};
use super::prompts;
use super::race::{RaceSettings, RacingFeedbackGenerator};
use crate::config::Config;
use crate::llm::openai::OpenAiCompatibleClient;
use crate::llm::traits::{ChatMessage, ChatProvider};

/// Runs the full moderation pipeline. Cheap to share behind an `Arc`; holds
/// only read-only provider handles and settings.
pub struct ModerationOrchestrator {
    extractor: StructuredExtractor,
    feedback: RacingFeedbackGenerator,
    settings: RaceSettings,
}

impl ModerationOrchestrator {
    /// Wire the pipeline from explicit providers.
    ///
    /// `structured` serves both extraction stages, each call bounded by
    /// `settings.extract_timeout`. `primary` and `secondary` race for
    /// feedback, with `secondary` delayed by `settings.secondary_delay`.
    pub fn new(
        structured: Arc<dyn ChatProvider>,
        primary: Arc<dyn ChatProvider>,
        secondary: Arc<dyn ChatProvider>,
        settings: RaceSettings,
    ) -> Self {
        Self {
            extractor: StructuredExtractor::new(structured, settings.extract_timeout),
            feedback: RacingFeedbackGenerator::new(primary, secondary, settings.secondary_delay),
            settings,
        }
    }

    /// Build the production wiring: OpenAI is the primary feedback backend,
    /// NVIDIA is the delayed secondary and also handles structured output.
    pub fn from_config(config: &Config) -> Result<Self> {
        let openai: Arc<dyn ChatProvider> = Arc::new(OpenAiCompatibleClient::new(
            "openai",
            config.openai.clone(),
        )?);
        let nvidia: Arc<dyn ChatProvider> = Arc::new(OpenAiCompatibleClient::new(
            "nvidia",
            config.nvidia.clone(),
        )?);

        Ok(Self::new(nvidia.clone(), openai, nvidia, config.race))
    }

    /// Validate a raw submission and moderate it.
    ///
    /// A panic anywhere in the pipeline is caught and reported as
    /// `ModerationError::Internal` with no partial data.
    pub async fn moderate(
        &self,
        submission: &PostSubmission,
    ) -> Result<ModerationResult, ModerationError> {
        let request = ModerationRequest::validate(submission)?;

        match AssertUnwindSafe(self.run(&request)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!(category = %request.category, "Moderation pipeline panicked");
                Err(ModerationError::Internal)
            }
        }
    }

    /// Moderate an already validated request.
    pub async fn run(
        &self,
        request: &ModerationRequest,
    ) -> Result<ModerationResult, ModerationError> {
        let analysis: SafetyAnalysis = self
            .extractor
            .extract(&prompts::safety_prompt(request))
            .await
            .map_err(|e| {
                error!(error = %e, "Safety analysis failed");
                ModerationError::Extraction(e)
            })?;

        info!(
            category = %request.category,
            issues = analysis.issues().len(),
            "Safety analysis complete"
        );

        let messages = [ChatMessage::user(prompts::feedback_prompt(
            request, &analysis,
        ))];
        let mut feedback = self.feedback.race(&messages, self.settings.deadline).await;
        if feedback.text.trim().is_empty() {
            warn!(source = %feedback.source, "Feedback provider returned empty text");
            feedback.text = prompts::EMPTY_FEEDBACK_FALLBACK.to_string();
        }

        let suggestion = match self
            .extractor
            .extract::<PostSuggestion>(&prompts::suggestion_prompt(request, &feedback.text))
            .await
        {
            Ok(suggestion) => suggestion,
            Err(e) => {
                warn!(error = %e, "Suggestion extraction failed, returning empty suggestion");
                PostSuggestion::empty()
            }
        };

        Ok(ModerationResult {
            feedback,
            analysis,
            suggestion,
        })
    }
}
