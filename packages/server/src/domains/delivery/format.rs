//! Telegram MarkdownV2 rendering of a job posting.

use crate::common::utils::truncate_chars;
use crate::domains::jobs::JobPosting;

pub const APPLY_BUTTON_TEXT: &str = "🚀 APPLY HERE!";
pub const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Characters MarkdownV2 treats as markup.
const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

/// Backslash-escape every reserved character so `text` renders literally.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `#tag` hashtags: whitespace becomes `_`, other non-word characters are
/// dropped, and tags that end up empty are skipped.
pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| {
            tag.split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("\\#{}", escape_markdown_v2(&tag)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Message body. Every dynamic value is escaped; the static markup is not.
pub fn format_job_message(posting: &JobPosting) -> String {
    let mut lines = vec![
        format!("💼 *{}*", escape_markdown_v2(&posting.title)),
        String::new(),
        format!("🏢 *Company:* {}", escape_markdown_v2(&posting.company)),
        format!("📍 *Location:* {}", escape_markdown_v2(&posting.location)),
        format!("💰 *Salary:* {}", escape_markdown_v2(&posting.salary)),
        format!("⏰ *Type:* {}", escape_markdown_v2(posting.job_type().as_str())),
    ];

    let tags = format_tags(&posting.tags);
    if !tags.is_empty() {
        lines.push(format!("🏷️ *Tags:* {}", tags));
    }

    let description = posting.description.trim();
    if !description.is_empty() {
        let (preview, truncated) = truncate_chars(description, DESCRIPTION_PREVIEW_CHARS);
        let mut preview = escape_markdown_v2(preview.trim_end());
        if truncated {
            preview.push_str("\\.\\.\\.");
        }
        lines.push(String::new());
        lines.push(preview);
    }

    lines.push(String::new());
    lines.push(format!("🔗 *Source:* {}", escape_markdown_v2(&posting.source)));

    lines.join("\n")
}
