//! Placeholder masking and restoration.
//!
//! Every protected span is replaced by `<<{tag}_{index}>>`, where `index` is the
//! span's position in extraction order. Restoration looks tokens up by that index,
//! never by where they happen to land in the translated text.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Result, ParleyError};
use crate::protect::ProtectedSpan;

pub const DEFAULT_TAG: &str = "PH";

/// A synthetic marker standing in for exactly one protected span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken {
    pub index: usize,
    pub text: String,
}

impl PlaceholderToken {
    pub fn new(tag: &str, index: usize) -> Self {
        Self {
            index,
            text: format!("<<{}_{}>>", tag, index),
        }
    }
}

/// A message with its protected spans swapped out for placeholder tokens
#[derive(Debug, Clone)]
pub struct MaskedText {
    pub text: String,
    pub spans: Vec<ProtectedSpan>,
    pub tag: String,
}

/// Placeholder bookkeeping after restoration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmaskReport {
    /// Span indices whose token never came back
    pub missing: Vec<usize>,
    /// Span indices whose token came back more than once
    pub duplicated: Vec<usize>,
    /// Tokens with an index that has no span
    pub unknown: Vec<String>,
}

impl UnmaskReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty() && self.unknown.is_empty()
    }

    pub fn into_error(self) -> Option<ParleyError> {
        if self.is_clean() {
            return None;
        }
        Some(ParleyError::UnmaskMismatch {
            missing: self.missing,
            duplicated: self.duplicated,
            unknown: self.unknown,
        })
    }
}

/// Pick a tag whose token prefix does not already occur in `message`
fn choose_tag(message: &str) -> String {
    let mut tag = DEFAULT_TAG.to_string();
    while message.contains(&format!("<<{}_", tag)) {
        tag.push('X');
    }
    tag
}

/// Regex matching any token produced with `tag`
pub fn token_regex(tag: &str) -> Result<Regex> {
    Regex::new(&format!(r"<<{}_(\d+)>>", regex::escape(tag)))
        .map_err(|e| ParleyError::Config(format!("Invalid placeholder pattern: {}", e)))
}

/// Replace each span in `message` with its placeholder token.
///
/// `spans` must be the ordered, non-overlapping output of span extraction on the
/// same `message`.
pub fn mask(message: &str, spans: Vec<ProtectedSpan>) -> MaskedText {
    let tag = choose_tag(message);
    let mut text = String::with_capacity(message.len());
    let mut pos = 0usize;

    for (index, span) in spans.iter().enumerate() {
        let start = span.position_hint;
        let end = start + span.original_text.len();
        if start < pos || message.get(start..end) != Some(span.original_text.as_str()) {
            debug!(
                "Span {} does not match message at offset {}, leaving it in place",
                index, start
            );
            continue;
        }
        text.push_str(&message[pos..start]);
        text.push_str(&PlaceholderToken::new(&tag, index).text);
        pos = end;
    }
    text.push_str(&message[pos..]);

    MaskedText { text, spans, tag }
}

impl MaskedText {
    /// Tokens in index order
    pub fn tokens(&self) -> Vec<PlaceholderToken> {
        (0..self.spans.len())
            .map(|i| PlaceholderToken::new(&self.tag, i))
            .collect()
    }

    /// Restore original spans in `translated`, matching tokens by exact string
    pub fn unmask(&self, translated: &str) -> Result<(String, UnmaskReport)> {
        let re = token_regex(&self.tag)?;
        let mut seen: BTreeMap<usize, usize> = BTreeMap::new();
        let mut unknown = Vec::new();

        let restored = re.replace_all(translated, |caps: &Captures<'_>| {
            let whole = caps[0].to_string();
            let index = caps[1].parse::<usize>().ok();
            match index.and_then(|i| self.spans.get(i).map(|s| (i, s))) {
                Some((i, span)) => {
                    *seen.entry(i).or_insert(0) += 1;
                    span.original_text.clone()
                }
                None => {
                    unknown.push(whole.clone());
                    whole
                }
            }
        });
        let restored = restored.into_owned();

        let missing = (0..self.spans.len())
            .filter(|i| !seen.contains_key(i))
            .collect();
        let duplicated = seen
            .iter()
            .filter(|&(_, &count)| count > 1)
            .map(|(&i, _)| i)
            .collect();

        Ok((
            restored,
            UnmaskReport {
                missing,
                duplicated,
                unknown,
            },
        ))
    }
}
