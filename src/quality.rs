use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ParleyError};

const MAX_NGRAM: usize = 4;
const ZERO_MATCH_EPSILON: f64 = 0.1;

/// Scores comparing a translation against a reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationScore {
    pub bleu: f64,
    pub embedding_similarity: Option<f64>,
}

/// Word vectors keyed by token
#[derive(Debug, Clone, Default)]
pub struct WordEmbeddings {
    vectors: HashMap<String, Vec<f32>>,
}

impl WordEmbeddings {
    pub fn new(vectors: HashMap<String, Vec<f32>>) -> Self {
        Self { vectors }
    }

    /// Load the word2vec / fastText `.vec` text format
    pub fn from_text_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut vectors = HashMap::new();

        for (line_no, line) in content.lines().enumerate() {
            let mut parts = line.split_whitespace();
            let Some(token) = parts.next() else {
                continue;
            };
            let values = parts
                .map(str::parse::<f32>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    ParleyError::Quality(format!("Invalid vector on line {}: {}", line_no + 1, e))
                })?;

            // optional "count dim" header
            if line_no == 0 && values.len() == 1 && token.parse::<usize>().is_ok() {
                continue;
            }
            if values.is_empty() {
                continue;
            }
            vectors.insert(token.to_string(), values);
        }

        debug!("Loaded {} word vectors", vectors.len());
        Ok(Self { vectors })
    }

    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn ngram_counts<'a>(tokens: &[&'a str], n: usize) -> HashMap<Vec<&'a str>, usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for window in tokens.windows(n) {
            *counts.entry(window.to_vec()).or_insert(0) += 1;
        }
    }
    counts
}

/// Sentence-level BLEU with uniform n-gram weights and a brevity penalty.
///
/// Whitespace tokenisation. Hypotheses shorter than four tokens are scored over
/// the orders they can contain. Orders with no matching n-gram contribute
/// `0.1 / total` instead of zero so short sentences still get a usable score.
pub fn sentence_bleu(reference: &str, hypothesis: &str) -> f64 {
    let reference: Vec<&str> = reference.split_whitespace().collect();
    let hypothesis: Vec<&str> = hypothesis.split_whitespace().collect();

    if hypothesis.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let orders = MAX_NGRAM.min(hypothesis.len());
    let mut log_precision_sum = 0.0;
    for n in 1..=orders {
        let hyp_counts = ngram_counts(&hypothesis, n);
        let total: usize = hyp_counts.values().sum();

        let ref_counts = ngram_counts(&reference, n);
        let matched: usize = hyp_counts
            .iter()
            .map(|(gram, &count)| count.min(ref_counts.get(gram).copied().unwrap_or(0)))
            .sum();

        let precision = if matched == 0 {
            ZERO_MATCH_EPSILON / total as f64
        } else {
            matched as f64 / total as f64
        };
        log_precision_sum += precision.ln();
    }

    let hyp_len = hypothesis.len() as f64;
    let ref_len = reference.len() as f64;
    let brevity_penalty = if hyp_len > ref_len {
        1.0
    } else {
        (1.0 - ref_len / hyp_len).exp()
    };

    brevity_penalty * (log_precision_sum / orders as f64).exp()
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Mean cosine similarity of token vectors paired by position.
///
/// Pairs where either token has no vector, or a zero vector, score 0.
pub fn embedding_similarity(reference: &str, hypothesis: &str, embeddings: &WordEmbeddings) -> f64 {
    let scores: Vec<f64> = reference
        .split_whitespace()
        .zip(hypothesis.split_whitespace())
        .map(|(r, h)| match (embeddings.get(r), embeddings.get(h)) {
            (Some(a), Some(b)) => cosine(a, b),
            _ => 0.0,
        })
        .collect();

    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Score `hypothesis` against `reference`
pub fn evaluate(reference: &str, hypothesis: &str, embeddings: Option<&WordEmbeddings>) -> TranslationScore {
    TranslationScore {
        bleu: sentence_bleu(reference, hypothesis),
        embedding_similarity: embeddings.map(|e| embedding_similarity(reference, hypothesis, e)),
    }
}

pub struct QualityValidator {
    min_bleu: f64,
}

impl QualityValidator {
    pub fn new(min_bleu: f64) -> Self {
        Self { min_bleu }
    }

    pub fn validate(&self, score: &TranslationScore) -> Result<()> {
        if score.bleu < self.min_bleu {
            return Err(ParleyError::Quality(format!(
                "BLEU score too low: {:.4} < {:.4}",
                score.bleu, self.min_bleu
            )));
        }
        Ok(())
    }
}
