//! Statement text handling: splitting a template and classifying statements.
//!
//! Two views of every statement are kept apart. The `raw` text is what the
//! backend receives, comments included. The `classification` text has C-style
//! block comments removed and is only used to decide whether the statement
//! returns rows.
//!
//! Splitting is purely textual on `;`. A terminator inside a string literal or a
//! comment splits the statement too.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

pub const STATEMENT_TERMINATOR: char = ';';

lazy_static! {
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").expect("valid regex");
}

/// One statement of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    raw: String,
    classification: String,
}

impl Statement {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let classification = strip_block_comments(&raw).trim().to_string();
        Self {
            raw,
            classification,
        }
    }

    /// Text sent to the backend.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Comment-free text used only for classification.
    #[must_use]
    pub fn classification(&self) -> &str {
        &self.classification
    }

    #[must_use]
    pub fn is_data_returning(&self) -> bool {
        starts_with_keyword(&self.classification)
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

/// Remove every `/* ... */` block, including ones spanning lines.
#[must_use]
pub fn strip_block_comments(sql: &str) -> Cow<'_, str> {
    BLOCK_COMMENT.replace_all(sql, "")
}

/// Whether a statement yields a row set, judged on its comment-stripped text.
#[must_use]
pub fn is_data_returning(sql: &str) -> bool {
    starts_with_keyword(strip_block_comments(sql).trim())
}

fn starts_with_keyword(text: &str) -> bool {
    ["select", "with"].iter().any(|kw| {
        text.get(..kw.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(kw))
    })
}

/// Split template text into trimmed statements.
///
/// A missing terminator is appended first, so single-statement templates need
/// none. Only the final empty fragment left by a trailing terminator is
/// dropped; empty fragments in the middle are kept.
#[must_use]
pub fn split_statements(text: &str) -> Vec<String> {
    let mut owned = text.to_string();
    if !owned.contains(STATEMENT_TERMINATOR) {
        owned.push(STATEMENT_TERMINATOR);
    }
    let mut parts: Vec<String> = owned
        .split(STATEMENT_TERMINATOR)
        .map(|s| s.trim().to_string())
        .collect();
    if parts.len() > 1 && parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    parts
}

/// Trim whitespace and terminators from both edges without splitting.
#[must_use]
pub fn trim_single(text: &str) -> &str {
    text.trim_matches(|c: char| c == STATEMENT_TERMINATOR || c.is_whitespace())
}
