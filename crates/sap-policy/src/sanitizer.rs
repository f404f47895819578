// sanitizer.rs - Markup stripping for agent-supplied free text.
//
// The engine never rewrites an intent. It runs the justification through
// `sanitize()` and compares: any difference means markup was present, and
// the intent is denied as a security violation.

use regex::Regex;

use crate::error::PolicyError;

/// Script/style blocks (with their content), HTML comments, and any opening
/// or closing tag. A bare `<` followed by a non-letter ("cost < 5") is text.
const MARKUP_PATTERN: &str =
    r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>|<!--.*?-->|</?[a-z][^<>]*>";

/// Strips HTML markup from text. Pure: no state beyond the compiled pattern.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    markup: Regex,
}

impl Sanitizer {
    pub fn new() -> Result<Self, PolicyError> {
        Ok(Self {
            markup: Regex::new(MARKUP_PATTERN)?,
        })
    }

    /// Return `text` with all markup removed.
    pub fn sanitize(&self, text: &str) -> String {
        self.markup.replace_all(text, "").into_owned()
    }

    /// True when sanitizing would leave `text` unchanged.
    pub fn is_clean(&self, text: &str) -> bool {
        self.sanitize(text) == text
    }
}
