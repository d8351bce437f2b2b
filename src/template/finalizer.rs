//! Placeholder substitution
//!
//! Replaces placeholder tokens with their mapped source expressions, longest
//! token first. A token only matches when it is not immediately followed by
//! another NCName character, so `$request.entry` never rewrites the front of
//! `$request.entryList` or `$request.entry.id`.

use crate::config::TemplateSyntax;
use crate::diagnostics::{log_notice, Notice};
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::cmp::Reverse;
use tracing::{info, trace, warn};

/// Finalizer output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalizedTemplate {
    /// Template text with mapped placeholders replaced
    pub text: String,
    /// Number of substitutions made
    pub replacements: usize,
    /// One `UnmappedPlaceholder` per surviving token
    pub notices: Vec<Notice>,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Replace every whole occurrence of `token` in `text`
fn replace_token(text: &str, token: &str, replacement: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut count = 0;
    let mut last = 0;

    for (start, _) in text.match_indices(token) {
        let end = start + token.len();
        if text[end..].chars().next().is_some_and(is_name_char) {
            continue;
        }
        out.push_str(&text[last..start]);
        out.push_str(replacement);
        last = end;
        count += 1;
    }
    out.push_str(&text[last..]);
    (out, count)
}

/// Substitute `mapping` (token -> expression) into `template`, longest token
/// first. Returns the new text and the number of substitutions.
pub fn apply(template: &str, mapping: &IndexMap<String, String>) -> (String, usize) {
    let mut tokens: Vec<(&String, &String)> = mapping.iter().collect();
    // Stable: equal lengths keep mapping order
    tokens.sort_by_key(|(token, _)| Reverse(token.len()));

    let mut text = template.to_string();
    let mut total = 0;
    for (token, expression) in tokens {
        if token.is_empty() {
            continue;
        }
        let (next, count) = replace_token(&text, token, expression);
        if count > 0 {
            trace!(token = %token, expression = %expression, count, "substituted");
        }
        text = next;
        total += count;
    }
    (text, total)
}

/// Applies a mapping and reports what is left unmapped
#[derive(Debug, Clone)]
pub struct TemplateFinalizer {
    scanner: Regex,
}

impl TemplateFinalizer {
    /// Create a finalizer for templates written with `syntax`
    pub fn new(syntax: &TemplateSyntax) -> Result<Self> {
        let pattern = format!(r"{}([\p{{L}}\p{{N}}_.-]+)", regex::escape(&syntax.placeholder_prefix));
        let scanner = Regex::new(&pattern)
            .map_err(|e| Error::Config(format!("invalid placeholder prefix: {}", e)))?;
        Ok(Self { scanner })
    }

    /// Substitute `mapping` into `template`
    pub fn finalize(&self, template: &str, mapping: &IndexMap<String, String>) -> FinalizedTemplate {
        let (text, replacements) = if mapping.is_empty() {
            warn!("mapping is empty, template left unchanged");
            (template.to_string(), 0)
        } else {
            apply(template, mapping)
        };

        let notices: Vec<Notice> = self
            .unmapped(&text)
            .into_iter()
            .map(|placeholder| Notice::UnmappedPlaceholder { placeholder })
            .collect();
        for notice in &notices {
            log_notice(notice);
        }

        info!(
            replacements,
            unmapped = notices.len(),
            "finalized template"
        );
        FinalizedTemplate {
            text,
            replacements,
            notices,
        }
    }

    /// Placeholder names still present in `text`, in order of first appearance
    pub fn unmapped(&self, text: &str) -> Vec<String> {
        let names: IndexSet<&str> = self
            .scanner
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }
}
