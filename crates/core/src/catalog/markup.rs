//! Text helpers for presenting catalog records.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Convert an HTML-ish description to plain text.
///
/// Line breaks and paragraph boundaries become newlines, every other tag is
/// dropped, and non-breaking space entities become spaces.
pub fn strip_markup(text: &str) -> String {
    let text = text
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("</p><p>", "\n\n");
    let text = TAG.replace_all(&text, "");
    text.replace("&nbsp;", " ").trim().to_string()
}

/// Upgrade a plain-http image URL to https.
pub fn secure_image_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}
