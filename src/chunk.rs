use crate::error::Result;
use crate::placeholder::token_regex;

/// A piece of masked text sent to the translator in a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Text to translate
    pub text: String,
    /// Whitespace removed at the split point; appended back after translation
    pub trailing: String,
}

impl Chunk {
    fn new(text: &str, trailing: &str) -> Self {
        Self {
            text: text.to_string(),
            trailing: trailing.to_string(),
        }
    }

    /// Nothing worth sending to a translator
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split masked text into chunks of at most `max_chars` characters.
///
/// Splits prefer the last whitespace run inside the window. A placeholder token is
/// never cut; a token longer than `max_chars` becomes a chunk of its own.
/// Concatenating `text + trailing` over the result gives back `masked` exactly.
pub fn split_masked(masked: &str, tag: &str, max_chars: Option<usize>) -> Result<Vec<Chunk>> {
    let max_chars = match max_chars {
        Some(n) if n > 0 && masked.chars().count() > n => n,
        _ => return Ok(vec![Chunk::new(masked, "")]),
    };

    let tokens: Vec<(usize, usize)> = token_regex(tag)?
        .find_iter(masked)
        .map(|m| (m.start(), m.end()))
        .collect();
    let inside_token = |pos: usize| tokens.iter().any(|&(s, e)| s < pos && pos < e);

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < masked.len() {
        let rest = &masked[start..];
        let Some((window_len, _)) = rest.char_indices().nth(max_chars) else {
            chunks.push(Chunk::new(rest, ""));
            break;
        };
        let window_end = start + window_len;
        // whitespace right after the window may still end this chunk
        let search_end = rest[window_len..]
            .chars()
            .next()
            .map(|c| window_end + c.len_utf8())
            .unwrap_or(window_end);

        if let Some((body_end, run_end)) = whitespace_split(masked, start, search_end, &inside_token) {
            chunks.push(Chunk::new(&masked[start..body_end], &masked[body_end..run_end]));
            start = run_end;
            continue;
        }

        let straddled = tokens
            .iter()
            .copied()
            .find(|&(s, e)| s < window_end && window_end < e);
        let cut = match straddled {
            Some((s, _)) if s > start => s,
            Some((_, e)) => e,
            None => window_end,
        };
        chunks.push(Chunk::new(&masked[start..cut], ""));
        start = cut;
    }

    Ok(chunks)
}

/// Find the last whitespace run in `text[start..search_end]` that leaves a non-empty body.
/// Returns the body end and the end of the whole whitespace run.
fn whitespace_split(
    text: &str,
    start: usize,
    search_end: usize,
    inside_token: &dyn Fn(usize) -> bool,
) -> Option<(usize, usize)> {
    let window = &text[start..search_end];
    let (offset, _) = window
        .char_indices()
        .rev()
        .find(|&(i, c)| c.is_whitespace() && !inside_token(start + i))?;

    let ws_pos = start + offset;
    let body_end = text[start..ws_pos]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| c.is_whitespace())
        .last()
        .map(|(i, _)| start + i)
        .unwrap_or(ws_pos);
    if body_end == start {
        return None;
    }

    let run_end = text[ws_pos..]
        .char_indices()
        .find(|&(_, c)| !c.is_whitespace())
        .map(|(i, _)| ws_pos + i)
        .unwrap_or(text.len());

    Some((body_end, run_end))
}
