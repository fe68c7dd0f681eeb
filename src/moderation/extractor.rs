// Structured extraction — ask one provider for a schema instance.
//
// The provider call and the schema check are separate: the provider returns
// raw JSON, and `schema::coerce` decides whether it is a valid instance.
// Each call is bounded by a timeout. No retries happen here; the caller
// chooses the fallback policy.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::ExtractionError;
use super::schema::{coerce, StructuredOutput};
use crate::llm::traits::ChatProvider;

/// Extracts typed, schema-validated objects from a designated provider.
#[derive(Clone)]
pub struct StructuredExtractor {
    provider: Arc<dyn ChatProvider>,
    timeout: Duration,
}

impl StructuredExtractor {
    pub fn new(provider: Arc<dyn ChatProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Send `prompt` constrained to `T`'s schema and return the parsed instance.
    ///
    /// A provider that has not answered within the timeout is abandoned and
    /// reported as `ExtractionError::Timeout`.
    pub async fn extract<T: StructuredOutput>(&self, prompt: &str) -> Result<T, ExtractionError> {
        let schema = T::schema();

        let call = self.provider.complete_structured(prompt, &schema);
        let raw = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| ExtractionError::Provider(format!("{e:#}")))?,
            Err(_) => {
                warn!(
                    provider = self.provider.name(),
                    schema = schema.name,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Structured call timed out"
                );
                return Err(ExtractionError::Timeout(self.timeout));
            }
        };

        debug!(
            provider = self.provider.name(),
            schema = schema.name,
            "Structured output received"
        );

        coerce(raw)
    }
}
