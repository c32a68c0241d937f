//! Approval email rendering.

/// Escapes text for safe interpolation into the email HTML.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Everything the approval email needs: the draft fields plus the action
/// links carrying the record identifier and signed token.
#[derive(Debug, Clone)]
pub struct ApprovalEmail {
    /// Theme label for the subject line and header.
    pub theme: String,
    /// Draft hook.
    pub hook: String,
    /// Full caption.
    pub caption: String,
    /// Hashtags line.
    pub hashtags: String,
    /// Suggested image description.
    pub image_prompt: String,
    /// Closing call to action.
    pub cta: String,
    /// Approve link.
    pub approve_url: String,
    /// Reject link.
    pub reject_url: String,
    /// Browser preview link.
    pub preview_url: String,
}

impl ApprovalEmail {
    /// Subject line for this approval request.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("New post for review — {}", self.theme)
    }

    /// Renders the HTML body.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <style>
    body {{ font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; background: #f4f4f2; margin: 0; padding: 24px; }}
    .card {{ background: white; border-radius: 12px; max-width: 520px; margin: 0 auto; padding: 24px; box-shadow: 0 2px 12px rgba(0,0,0,0.08); }}
    .theme {{ color: #666; font-size: 13px; margin-bottom: 8px; }}
    .hook {{ font-size: 18px; font-weight: 600; margin-bottom: 16px; }}
    .caption {{ font-size: 14px; line-height: 1.7; white-space: pre-line; color: #262626; }}
    .hashtags {{ color: #3171b5; font-size: 13px; margin-top: 12px; }}
    .meta {{ font-size: 12px; color: #888; margin-top: 16px; border-top: 1px solid #eee; padding-top: 12px; }}
    .actions {{ text-align: center; margin-top: 24px; }}
    .btn {{ display: inline-block; padding: 12px 28px; border-radius: 8px; font-size: 14px; font-weight: 600; text-decoration: none; margin: 4px; color: white; }}
    .approve {{ background: #2e7d32; }}
    .reject {{ background: #c62828; }}
    .preview {{ font-size: 13px; text-align: center; margin-top: 12px; }}
  </style>
</head>
<body>
  <div class="card">
    <p class="theme">Theme: {theme}</p>
    <p class="hook">{hook}</p>
    <p class="caption">{caption}</p>
    <p class="hashtags">{hashtags}</p>
    <div class="meta">
      <p>Image idea: {image_prompt}</p>
      <p>CTA: {cta}</p>
    </div>
    <div class="actions">
      <a class="btn approve" href="{approve_url}">Approve &amp; publish</a>
      <a class="btn reject" href="{reject_url}">Reject</a>
    </div>
    <p class="preview"><a href="{preview_url}">Preview in browser</a></p>
  </div>
</body>
</html>"#,
            theme = escape(&self.theme),
            hook = escape(&self.hook),
            caption = escape(&self.caption),
            hashtags = escape(&self.hashtags),
            image_prompt = escape(&self.image_prompt),
            cta = escape(&self.cta),
            approve_url = escape(&self.approve_url),
            reject_url = escape(&self.reject_url),
            preview_url = escape(&self.preview_url),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApprovalEmail {
        ApprovalEmail {
            theme: "sleep".to_string(),
            hook: "It's 2am again.".to_string(),
            caption: "It's 2am again.\nFull caption.".to_string(),
            hashtags: "#rest".to_string(),
            image_prompt: "moonlight".to_string(),
            cta: "What keeps you up?".to_string(),
            approve_url: "https://example.com/approve/post_1?token=abc".to_string(),
            reject_url: "https://example.com/reject/post_1?token=abc".to_string(),
            preview_url: "https://example.com/preview/post_1?token=abc".to_string(),
        }
    }

    #[test]
    fn subject_names_the_theme() {
        assert_eq!(sample().subject(), "New post for review — sleep");
    }

    #[test]
    fn body_carries_both_action_links() {
        let html = sample().render();
        assert!(html.contains("https://example.com/approve/post_1?token=abc"));
        assert!(html.contains("https://example.com/reject/post_1?token=abc"));
    }

    #[test]
    fn body_escapes_draft_text() {
        let mut email = sample();
        email.caption = "<script>alert(1)</script>".to_string();
        let html = email.render();
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
