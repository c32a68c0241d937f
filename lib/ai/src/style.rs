//! Brand voice and prompt assembly for draft generation.
//!
//! The system prompt fixes the account's voice; the per-call prompt carries
//! the theme and its context. The model must answer with the draft JSON that
//! [`PostDraft`](crate::producer::PostDraft) deserializes.

use crate::producer::Theme;

/// System prompt establishing the account's voice.
pub const STYLE_SYSTEM_PROMPT: &str = r##"You are the content writer for a wellbeing brand's social-media account
aimed at young adults.

VOICE
- Warm and conversational, like an older friend who listens — never preachy,
  never clinical.
- Open with a concrete everyday moment the reader recognizes, not with
  advice.
- Short punchy sentences mixed with the occasional reflective longer one.
- Meet resistance with honesty: acknowledge that this stuff can sound
  boring or hard before suggesting anything.
- End with an invitation or a question, never an instruction.

FORMAT
- Hook first line: it must stop the scroll on its own.
- Caption of 150-300 words including the hook, with one small practical
  exercise the reader can try tonight.
- 5-8 relevant hashtags.

Return the post in this exact JSON structure and nothing else:
{
    "hook": "the attention-grabbing first line",
    "caption": "the full caption text including the hook as the first line",
    "hashtags": "#... space-separated hashtags",
    "alt_text": "suggested image description for accessibility",
    "image_prompt": "a description for a complementary image (nature, abstract, or lifestyle)",
    "cta": "the closing question or invitation"
}"##;

/// Builds the per-call generation prompt for a theme.
#[must_use]
pub fn content_prompt(theme: &Theme) -> String {
    format!(
        "Generate a social-media post for today.\n\n\
         Theme for this post: {}\n\n\
         Additional context: {}\n\n\
         Return ONLY valid JSON in the format specified. No markdown code fences.",
        theme.label, theme.context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_prompt_includes_theme() {
        let theme = Theme::new("sleep", "winding down when your brain will not");
        let prompt = content_prompt(&theme);
        assert!(prompt.contains("sleep"));
        assert!(prompt.contains("winding down"));
    }

    #[test]
    fn system_prompt_describes_draft_fields() {
        for field in ["hook", "caption", "hashtags", "alt_text", "image_prompt", "cta"] {
            assert!(STYLE_SYSTEM_PROMPT.contains(field), "missing field {field}");
        }
    }
}
