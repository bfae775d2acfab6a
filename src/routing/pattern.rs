//! Route pattern module
//!
//! Compiles path patterns into start-anchored regular expressions and
//! extracts positional captures.

use regex::Regex;

/// A compiled path pattern
///
/// Patterns are matched against the request path with its leading `/`
/// removed. A pattern is always anchored at the start of the path; it is
/// only anchored at the end when the pattern itself ends with `$`.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
}

/// Result of matching a pattern against a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Positional captures, in group order
    pub captures: Vec<String>,
    /// Byte offset in the path where the match ended
    pub end: usize,
}

impl RoutePattern {
    /// Compile a pattern; a missing leading `^` is implied
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        // The group keeps top-level alternations anchored too
        let anchored = format!("^(?:{pattern})");

        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&anchored)?,
        })
    }

    /// Pattern source as declared
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match the pattern against a path
    ///
    /// Unmatched optional groups are reported as empty strings so the
    /// argument count of an endpoint never depends on the request.
    pub fn match_path(&self, path: &str) -> Option<PatternMatch> {
        let caps = self.regex.captures(path)?;
        let end = caps.get(0).map_or(0, |m| m.end());

        let captures = caps
            .iter()
            .skip(1)
            .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
            .collect();

        Some(PatternMatch { captures, end })
    }
}
