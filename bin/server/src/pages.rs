//! Server-rendered HTML pages: confirmation/result pages, the draft
//! preview, and the dashboard.

use postloop_workflow::{PostRecord, PostState};

/// Escapes text for safe interpolation into HTML.
#[must_use]
pub fn escape(raw: &str) -> String {
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

/// Badge label and color for a state.
#[must_use]
pub fn status_badge(state: PostState) -> (&'static str, &'static str) {
    match state {
        PostState::PendingGeneration => ("Generating", "#999999"),
        PostState::AwaitingApproval => ("Pending review", "#f57c00"),
        PostState::Approved => ("Approved", "#2e7d32"),
        PostState::Published => ("Published", "#1565c0"),
        PostState::PublishFailed => ("Publish failed", "#c62828"),
        PostState::Rejected => ("Rejected", "#c62828"),
        PostState::GenerationFailed => ("Generation failed", "#c62828"),
    }
}

/// A simple card page for callback results and errors.
///
/// `message` is HTML; callers escape any user-provided text before
/// embedding it.
#[must_use]
pub fn result_page(title: &str, message: &str, color: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title} — postloop</title>
  <style>
    body {{ font-family: -apple-system, sans-serif; background: #f4f4f2; display: flex; justify-content: center; align-items: center; min-height: 100vh; margin: 0; }}
    .card {{ background: white; border-radius: 16px; padding: 48px; max-width: 480px; text-align: center; box-shadow: 0 4px 24px rgba(0,0,0,0.08); }}
    h1 {{ color: {color}; font-size: 24px; margin: 0 0 16px; }}
    p {{ color: #555; line-height: 1.6; font-size: 15px; }}
    a {{ color: #3171b5; margin-top: 16px; display: inline-block; }}
  </style>
</head>
<body>
  <div class="card">
    <h1>{title}</h1>
    <p>{message}</p>
    <a href="/dashboard">Back to dashboard</a>
  </div>
</body>
</html>"#
    )
}

/// The authorization-failure page. Deliberately detail-free.
#[must_use]
pub fn auth_failure_page() -> String {
    result_page(
        "Not authorized",
        "This link is not valid for that post.",
        "#c62828",
    )
}

/// The unknown-identifier page.
#[must_use]
pub fn not_found_page() -> String {
    result_page("Post not found", "No post exists with that identifier.", "#999999")
}

/// Social-card style preview of a draft, with action buttons while the
/// record still awaits a decision.
#[must_use]
pub fn preview_page(record: &PostRecord, approve_url: &str, reject_url: &str) -> String {
    let (badge, color) = status_badge(record.state);
    let draft = record.draft.clone().unwrap_or_default();

    let actions = if record.state == PostState::AwaitingApproval {
        format!(
            r#"<div class="actions">
      <a href="{}" class="btn approve">Approve &amp; publish</a>
      <a href="{}" class="btn reject">Reject</a>
    </div>"#,
            escape(approve_url),
            escape(reject_url),
        )
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Preview — postloop</title>
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{ font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; background: #f4f4f2; padding: 20px; }}
    .container {{ max-width: 500px; margin: 0 auto; }}
    .header {{ text-align: center; padding: 24px 0; }}
    .status {{ display: inline-block; padding: 4px 12px; border-radius: 12px; font-size: 12px; font-weight: 600; color: white; background: {color}; }}
    .theme {{ font-size: 13px; color: #888; margin-top: 8px; }}
    .card {{ background: white; border-radius: 12px; overflow: hidden; box-shadow: 0 2px 12px rgba(0,0,0,0.08); }}
    .card-image {{ background: linear-gradient(135deg, #2b3a4a, #51708e); padding: 48px 24px; text-align: center; }}
    .card-image p {{ color: #e9e4dc; font-size: 20px; font-style: italic; line-height: 1.5; }}
    .card-image .suggestion {{ color: #aebfd0; font-size: 11px; margin-top: 16px; }}
    .card-body {{ padding: 16px; }}
    .caption {{ font-size: 14px; line-height: 1.7; color: #262626; white-space: pre-line; }}
    .hashtags {{ color: #3171b5; font-size: 13px; margin-top: 12px; }}
    .meta {{ padding: 16px; background: #fafafa; border-top: 1px solid #efefef; font-size: 12px; color: #888; }}
    .actions {{ text-align: center; padding: 24px 0; }}
    .btn {{ display: inline-block; padding: 12px 32px; border-radius: 8px; font-size: 14px; font-weight: 600; text-decoration: none; margin: 4px; color: white; }}
    .approve {{ background: #2e7d32; }}
    .reject {{ background: #c62828; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <span class="status">{badge}</span>
      <p class="theme">Theme: {theme}</p>
    </div>
    <div class="card">
      <div class="card-image">
        <p>"{hook}"</p>
        <p class="suggestion">{image_prompt}</p>
      </div>
      <div class="card-body">
        <p class="caption">{caption}</p>
        <p class="hashtags">{hashtags}</p>
      </div>
      <div class="meta">
        <p>CTA: {cta}</p>
        <p>Alt text: {alt_text}</p>
        <p>Created: {created_at}</p>
      </div>
    </div>
    {actions}
  </div>
</body>
</html>"#,
        theme = escape(&record.theme),
        hook = escape(&draft.hook),
        image_prompt = escape(&draft.image_prompt),
        caption = escape(&draft.caption),
        hashtags = escape(&draft.hashtags),
        cta = escape(&draft.cta),
        alt_text = escape(&draft.alt_text),
        created_at = record.created_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

/// The dashboard: all records, newest first, with state, theme,
/// timestamps, and cost.
#[must_use]
pub fn dashboard_page(records: &[(PostRecord, String)]) -> String {
    let rows: String = records
        .iter()
        .map(|(record, preview_url)| {
            let (badge, color) = status_badge(record.state);
            let cost = record
                .usage
                .as_ref()
                .map_or_else(String::new, |u| format!("${:.4}", u.cost_usd));
            let decided = record
                .decided_at
                .map_or_else(String::new, |t| t.format("%Y-%m-%d %H:%M").to_string());
            format!(
                r#"
      <tr>
        <td class="mono">{id}</td>
        <td><span class="badge" style="background: {color}">{badge}</span></td>
        <td>{theme}</td>
        <td>{created}</td>
        <td>{decided}</td>
        <td>{cost}</td>
        <td><a href="{preview}">Preview</a></td>
      </tr>"#,
                id = escape(&record.id.to_string()),
                theme = escape(&record.theme),
                created = record.created_at.format("%Y-%m-%d %H:%M"),
                preview = escape(preview_url),
            )
        })
        .collect();

    let body = if rows.is_empty() {
        r#"<tr><td colspan="7" class="empty">No posts yet.</td></tr>"#.to_string()
    } else {
        rows
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Dashboard — postloop</title>
  <style>
    body {{ font-family: -apple-system, sans-serif; padding: 32px; background: #f4f4f2; }}
    h1 {{ color: #2b3a4a; margin-bottom: 24px; }}
    table {{ width: 100%; border-collapse: collapse; background: white; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.06); }}
    th {{ background: #2b3a4a; color: white; padding: 12px; text-align: left; font-size: 13px; }}
    td {{ padding: 10px 12px; border-bottom: 1px solid #eee; font-size: 13px; }}
    tr:hover {{ background: #f7f6f3; }}
    a {{ color: #3171b5; }}
    .mono {{ font-family: monospace; font-size: 12px; }}
    .badge {{ padding: 3px 10px; border-radius: 10px; font-size: 11px; font-weight: 600; color: white; }}
    .empty {{ text-align: center; padding: 24px; color: #999; }}
  </style>
</head>
<body>
  <h1>postloop — Dashboard</h1>
  <table>
    <thead>
      <tr><th>Id</th><th>State</th><th>Theme</th><th>Created</th><th>Decided</th><th>Cost</th><th></th></tr>
    </thead>
    <tbody>{body}
    </tbody>
  </table>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>"x"&'y'</script>"#),
            "&lt;script&gt;&quot;x&quot;&amp;&#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn result_page_carries_title_and_message() {
        let html = result_page("Post published", "All done.", "#2e7d32");
        assert!(html.contains("Post published"));
        assert!(html.contains("All done."));
    }

    #[test]
    fn preview_shows_actions_only_while_pending() {
        let mut record = PostRecord::new("sleep");
        record.complete_generation(postloop_ai::GeneratedPost {
            draft: postloop_ai::PostDraft {
                caption: "caption".to_string(),
                ..Default::default()
            },
            usage: postloop_ai::GenerationUsage::from_tokens(1, 1, "m"),
        });

        let pending = preview_page(&record, "/approve/x?token=t", "/reject/x?token=t");
        assert!(pending.contains("Approve"));

        record.reject();
        let settled = preview_page(&record, "/approve/x?token=t", "/reject/x?token=t");
        assert!(!settled.contains("Approve &amp; publish"));
    }

    #[test]
    fn dashboard_lists_records() {
        let record = PostRecord::new("sleep");
        let html = dashboard_page(&[(record.clone(), format!("/preview/{}", record.id))]);
        assert!(html.contains("sleep"));
        assert!(html.contains(&record.id.to_string()));

        let empty = dashboard_page(&[]);
        assert!(empty.contains("No posts yet."));
    }
}
