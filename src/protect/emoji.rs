/// Decides whether a grapheme cluster is an emoji that must survive translation
pub trait EmojiClassifier: Send + Sync {
    fn is_emoji(&self, grapheme: &str) -> bool;
}

const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Classifier backed by the Unicode emoji data shipped with the `emojis` crate.
///
/// Text that merely falls outside ASCII (accented Latin, Cyrillic, CJK) is not an
/// emoji; only graphemes listed in the emoji data are. Unqualified forms such as a
/// bare U+2764 are matched by retrying with the emoji-presentation selector.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeEmojiClassifier;

impl EmojiClassifier for UnicodeEmojiClassifier {
    fn is_emoji(&self, grapheme: &str) -> bool {
        if grapheme.is_empty() || grapheme.is_ascii() {
            return false;
        }

        if emojis::get(grapheme).is_some() {
            return true;
        }

        if grapheme.contains(VARIATION_SELECTOR_16) {
            let stripped: String = grapheme
                .chars()
                .filter(|&c| c != VARIATION_SELECTOR_16)
                .collect();
            return !stripped.is_empty() && emojis::get(&stripped).is_some();
        }

        let mut chars = grapheme.chars();
        let mut qualified = String::with_capacity(grapheme.len() + VARIATION_SELECTOR_16.len_utf8());
        if let Some(first) = chars.next() {
            qualified.push(first);
            qualified.push(VARIATION_SELECTOR_16);
            qualified.extend(chars);
        }
        emojis::get(&qualified).is_some()
    }
}
