//! Text normalization profiles
//!
//! Two profiles are provided:
//! - [`NormalizeProfile::Strict`] drops URLs, `@mentions` and `#` markers. Used before
//!   lexicon scoring and for storage/display.
//! - [`NormalizeProfile::PreserveTags`] drops punctuation and symbols but keeps `@`/`#`,
//!   then truncates to [`MAX_REMOTE_CHARS`]. Used before remote submission.
//!
//! Both profiles are idempotent: normalizing normalized text returns it unchanged.

use regex::Regex;
use std::sync::LazyLock;

/// Character limit for text submitted to the remote model
pub const MAX_REMOTE_CHARS: usize = 280;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL pattern compiles"));

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("mention pattern compiles"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

static NOT_WORD_OR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s@#]").expect("tag-preserving pattern compiles"));

/// Normalization profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeProfile {
    /// Remove URLs, mentions and hashtag markers; collapse whitespace
    Strict,
    /// Remove punctuation but keep `@` and `#`; collapse whitespace; truncate
    PreserveTags,
}

/// Normalize `text` under `profile`.
///
/// Empty or whitespace-only input yields an empty string under both profiles.
pub fn normalize(text: &str, profile: NormalizeProfile) -> String {
    match profile {
        NormalizeProfile::Strict => strict(text),
        NormalizeProfile::PreserveTags => preserve_tags(text),
    }
}

fn strict(text: &str) -> String {
    let mut current = strict_pass(text);
    // Removing a `#` can join fragments into a new URL or mention ("@#tag").
    loop {
        let next = strict_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strict_pass(text: &str) -> String {
    let without_urls = URL.replace_all(text, "");
    let without_mentions = MENTION.replace_all(&without_urls, "");
    let without_hashes = without_mentions.replace('#', "");
    collapse_whitespace(&without_hashes)
}

fn preserve_tags(text: &str) -> String {
    let cleaned = NOT_WORD_OR_TAG.replace_all(text, " ");
    let collapsed = collapse_whitespace(&cleaned);

    if collapsed.chars().count() <= MAX_REMOTE_CHARS {
        return collapsed;
    }

    let truncated: String = collapsed.chars().take(MAX_REMOTE_CHARS).collect();
    truncated.trim_end().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
