//! The Content Producer: theme in, structured draft plus cost out.

use crate::backend::{LlmBackend, LlmRequest};
use crate::error::ProducerError;
use crate::style;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cost per million input tokens, in USD.
const INPUT_COST_PER_MTOK_USD: f64 = 3.0;

/// Cost per million output tokens, in USD.
const OUTPUT_COST_PER_MTOK_USD: f64 = 15.0;

/// USD to INR conversion used for cost reporting.
const USD_TO_INR: f64 = 85.0;

/// A content theme: the label shown to the approver and the context handed
/// to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Short human-readable label (e.g. "sleep").
    pub label: String,
    /// Additional context for the generation prompt.
    #[serde(default)]
    pub context: String,
}

impl Theme {
    /// Creates a new theme.
    #[must_use]
    pub fn new(label: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            context: context.into(),
        }
    }
}

/// A structured post draft as returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    /// The attention-grabbing first line.
    #[serde(default)]
    pub hook: String,
    /// The full caption text, including the hook as its first line.
    pub caption: String,
    /// Space-separated hashtags.
    #[serde(default)]
    pub hashtags: String,
    /// Suggested image description for accessibility.
    #[serde(default)]
    pub alt_text: String,
    /// Description for a complementary image.
    #[serde(default)]
    pub image_prompt: String,
    /// The closing question or invitation.
    #[serde(default)]
    pub cta: String,
}

/// Token and cost accounting for one generation, set once and never
/// overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
    /// Computed cost in USD.
    pub cost_usd: f64,
    /// Computed cost in INR.
    pub cost_inr: f64,
    /// Model that generated the draft.
    pub model: String,
}

impl GenerationUsage {
    /// Computes usage from raw token counts.
    #[must_use]
    pub fn from_tokens(input_tokens: u32, output_tokens: u32, model: impl Into<String>) -> Self {
        let cost_usd = f64::from(input_tokens) * INPUT_COST_PER_MTOK_USD / 1_000_000.0
            + f64::from(output_tokens) * OUTPUT_COST_PER_MTOK_USD / 1_000_000.0;
        let cost_inr = cost_usd * USD_TO_INR;
        Self {
            input_tokens,
            output_tokens,
            cost_usd: round_to(cost_usd, 6),
            cost_inr: round_to(cost_inr, 4),
            model: model.into(),
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// The result of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPost {
    /// The structured draft.
    pub draft: PostDraft,
    /// Token usage and cost.
    pub usage: GenerationUsage,
}

/// Trait for content producers.
#[async_trait]
pub trait ContentProducer: Send + Sync {
    /// Generates a draft for the given theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or the model output
    /// cannot be parsed as a draft.
    async fn produce(&self, theme: &Theme) -> Result<GeneratedPost, ProducerError>;
}

/// A content producer driving an LLM backend with the brand-voice prompts.
pub struct PostGenerator {
    backend: Arc<dyn LlmBackend>,
}

impl PostGenerator {
    /// Creates a new generator over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ContentProducer for PostGenerator {
    async fn produce(&self, theme: &Theme) -> Result<GeneratedPost, ProducerError> {
        let request = LlmRequest::new(style::content_prompt(theme))
            .with_system(style::STYLE_SYSTEM_PROMPT)
            .with_max_tokens(1500);

        let response = self.backend.generate(&request).await?;

        let raw = strip_code_fences(response.content.trim());
        let draft: PostDraft =
            serde_json::from_str(raw).map_err(|e| ProducerError::MalformedDraft {
                reason: e.to_string(),
            })?;

        let usage = GenerationUsage::from_tokens(
            response.usage.input_tokens,
            response.usage.output_tokens,
            response.model,
        );

        tracing::info!(
            theme = %theme.label,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            cost_usd = usage.cost_usd,
            "draft generated"
        );

        Ok(GeneratedPost { draft, usage })
    }
}

/// Strips a surrounding markdown code fence, which models emit despite
/// instructions not to.
fn strip_code_fences(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    // Drop the fence line itself (may carry a language tag).
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LlmResponse, TokenUsage};
    use crate::error::LlmError;

    struct FixedBackend {
        content: String,
    }

    #[async_trait]
    impl LlmBackend for FixedBackend {
        async fn generate(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                content: self.content.clone(),
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 50,
                },
                model: "test-model".to_string(),
            })
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    const DRAFT_JSON: &str = r##"{
        "hook": "It's 2am again.",
        "caption": "It's 2am again. Full caption here.",
        "hashtags": "#rest #quiet",
        "alt_text": "A dark bedroom window",
        "image_prompt": "moonlight on a windowsill",
        "cta": "What keeps you up?"
    }"##;

    #[test]
    fn cost_arithmetic() {
        let usage = GenerationUsage::from_tokens(100, 50, "m");
        assert!((usage.cost_usd - 0.00105).abs() < 1e-9);
        assert!((usage.cost_inr - 0.0893).abs() < 1e-9);
    }

    #[test]
    fn strip_fences_plain() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn strip_fences_with_language_tag() {
        let fenced = "```json\n{\"a\":1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\":1}");
    }

    #[test]
    fn draft_tolerates_missing_optional_fields() {
        let draft: PostDraft =
            serde_json::from_str(r#"{"caption": "just a caption"}"#).expect("deserialize");
        assert_eq!(draft.caption, "just a caption");
        assert!(draft.hook.is_empty());
        assert!(draft.hashtags.is_empty());
    }

    #[tokio::test]
    async fn produce_parses_draft_and_costs() {
        let generator = PostGenerator::new(Arc::new(FixedBackend {
            content: DRAFT_JSON.to_string(),
        }));
        let theme = Theme::new("sleep", "late nights");

        let generated = generator.produce(&theme).await.expect("produce");
        assert_eq!(generated.draft.hook, "It's 2am again.");
        assert_eq!(generated.usage.input_tokens, 100);
        assert_eq!(generated.usage.model, "test-model");
    }

    #[tokio::test]
    async fn produce_handles_fenced_output() {
        let generator = PostGenerator::new(Arc::new(FixedBackend {
            content: format!("```json\n{DRAFT_JSON}\n```"),
        }));
        let theme = Theme::new("stress", "");

        let generated = generator.produce(&theme).await.expect("produce");
        assert_eq!(generated.draft.cta, "What keeps you up?");
    }

    #[tokio::test]
    async fn produce_rejects_non_json_output() {
        let generator = PostGenerator::new(Arc::new(FixedBackend {
            content: "Sure! Here is your post: ...".to_string(),
        }));
        let theme = Theme::new("focus", "");

        let err = generator.produce(&theme).await.unwrap_err();
        assert!(matches!(err, ProducerError::MalformedDraft { .. }));
    }
}
