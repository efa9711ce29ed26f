//! Detection of spans that must pass through translation untouched.
//!
//! Links and markup tags come from a single regex scan; the text between them is
//! then walked grapheme by grapheme so each emoji becomes its own span.

pub mod emoji;

use regex::Regex;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

pub use emoji::{EmojiClassifier, UnicodeEmojiClassifier};
use crate::config::ProtectConfig;
use crate::error::{Result, ParleyError};

const LINK_PATTERN: &str = r"[A-Za-z][A-Za-z0-9+.\-]*://[^\s<>]+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Link,
    Emoji,
    MarkupTag,
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpanKind::Link => "link",
            SpanKind::Emoji => "emoji",
            SpanKind::MarkupTag => "tag",
        };
        f.pad(name)
    }
}

/// A substring that is replaced by a placeholder before translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    pub kind: SpanKind,
    pub original_text: String,
    /// Byte offset of the span in the source message
    pub position_hint: usize,
}

pub struct SpanExtractor {
    pattern: Option<Regex>,
    emoji: Option<Box<dyn EmojiClassifier>>,
}

impl SpanExtractor {
    pub fn new(config: &ProtectConfig) -> Result<Self> {
        let emoji: Option<Box<dyn EmojiClassifier>> = if config.emojis {
            Some(Box::new(UnicodeEmojiClassifier))
        } else {
            None
        };
        Self::with_classifier(config, emoji)
    }

    /// Build an extractor with a caller-supplied emoji classifier
    pub fn with_classifier(
        config: &ProtectConfig,
        emoji: Option<Box<dyn EmojiClassifier>>,
    ) -> Result<Self> {
        let mut alternatives = Vec::new();

        if config.links {
            alternatives.push(format!("(?P<link>{})", LINK_PATTERN));
        }

        if config.markup_tags && !config.tag_vocabulary.is_empty() {
            let names = config
                .tag_vocabulary
                .iter()
                .map(|t| regex::escape(t.trim()))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("|");
            if !names.is_empty() {
                alternatives.push(format!(r"(?P<tag>(?i:</?(?:{})(?:\s[^<>]*)?/?>))", names));
            }
        }

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let joined = alternatives.join("|");
            Some(Regex::new(&joined).map_err(|e| {
                ParleyError::Config(format!("Invalid protection pattern: {}", e))
            })?)
        };

        Ok(Self { pattern, emoji })
    }

    /// Scan `text` once and return its protected spans in left-to-right order
    pub fn extract(&self, text: &str) -> Vec<ProtectedSpan> {
        let mut spans = Vec::new();
        let mut pos = 0usize;

        if let Some(pattern) = &self.pattern {
            for caps in pattern.captures_iter(text) {
                let (m, kind) = match (caps.name("link"), caps.name("tag")) {
                    (Some(m), _) => (m, SpanKind::Link),
                    (None, Some(m)) => (m, SpanKind::MarkupTag),
                    (None, None) => continue,
                };
                self.extract_emojis(&text[pos..m.start()], pos, &mut spans);
                spans.push(ProtectedSpan {
                    kind,
                    original_text: m.as_str().to_string(),
                    position_hint: m.start(),
                });
                pos = m.end();
            }
        }

        self.extract_emojis(&text[pos..], pos, &mut spans);
        spans
    }

    fn extract_emojis(&self, plain: &str, base: usize, spans: &mut Vec<ProtectedSpan>) {
        let Some(classifier) = &self.emoji else {
            return;
        };
        if plain.is_ascii() {
            return;
        }

        for (offset, grapheme) in plain.grapheme_indices(true) {
            if classifier.is_emoji(grapheme) {
                spans.push(ProtectedSpan {
                    kind: SpanKind::Emoji,
                    original_text: grapheme.to_string(),
                    position_hint: base + offset,
                });
            }
        }
    }
}
