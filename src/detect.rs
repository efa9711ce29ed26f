use tracing::debug;

/// External language-detection capability
#[cfg_attr(test, mockall::automock)]
pub trait LanguageDetector: Send + Sync {
    /// Best-guess language code for `text`, or `None` when there is no guess at all
    fn detect(&self, text: &str) -> Option<String>;
}

/// Detector backed by whatlang's trigram models.
///
/// Unreliable guesses are still returned; the caller passes them on unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let info = whatlang::detect(text)?;
        let code = lang_to_code(info.lang());
        if !info.is_reliable() {
            debug!(
                "Low-confidence language guess {} ({:.2}) for {:?}",
                code,
                info.confidence(),
                text
            );
        }
        Some(code)
    }
}

/// ISO 639-1 where one exists, otherwise whatlang's ISO 639-3 code
fn lang_to_code(lang: whatlang::Lang) -> String {
    use whatlang::Lang::*;
    let code = match lang {
        Eng => "en",
        Cmn => "zh",
        Jpn => "ja",
        Kor => "ko",
        Fra => "fr",
        Deu => "de",
        Spa => "es",
        Rus => "ru",
        Por => "pt",
        Ita => "it",
        Ara => "ar",
        Hin => "hi",
        Tur => "tr",
        Vie => "vi",
        Tha => "th",
        Nld => "nl",
        Pol => "pl",
        Ukr => "uk",
        Swe => "sv",
        Dan => "da",
        Fin => "fi",
        Heb => "he",
        Hun => "hu",
        Ces => "cs",
        Bul => "bg",
        Ell => "el",
        Ind => "id",
        Ron => "ro",
        other => other.code(),
    };
    code.to_string()
}

/// Convert language code to full language name for prompts and display
pub fn language_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "en" => "English".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" | "zh-cn" | "zh-tw" => "Chinese".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "ru" => "Russian".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "pl" => "Polish".to_string(),
        "nl" => "Dutch".to_string(),
        "tr" => "Turkish".to_string(),
        "ar" => "Arabic".to_string(),
        "hi" => "Hindi".to_string(),
        "th" => "Thai".to_string(),
        "vi" => "Vietnamese".to_string(),
        "sv" => "Swedish".to_string(),
        "da" => "Danish".to_string(),
        "no" | "nb" => "Norwegian".to_string(),
        "fi" => "Finnish".to_string(),
        "he" => "Hebrew".to_string(),
        "hu" => "Hungarian".to_string(),
        "cs" => "Czech".to_string(),
        "bg" => "Bulgarian".to_string(),
        "el" => "Greek".to_string(),
        "id" => "Indonesian".to_string(),
        "ro" => "Romanian".to_string(),
        "uk" => "Ukrainian".to_string(),
        _ => code.to_string(), // Fallback to the code itself if not found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_common_languages() {
        let detector = WhatlangDetector;
        assert_eq!(
            detector.detect("The quick brown fox jumps over the lazy dog and runs into the forest").as_deref(),
            Some("en")
        );
        assert_eq!(
            detector.detect("Bonjour tout le monde, comment allez-vous aujourd'hui? Il fait très beau").as_deref(),
            Some("fr")
        );
        assert_eq!(
            detector.detect("Привет, как у тебя дела сегодня? Я надеюсь, что всё хорошо").as_deref(),
            Some("ru")
        );
    }

    #[test]
    fn test_no_guess_for_symbols() {
        assert_eq!(WhatlangDetector.detect("1234 !!! ???"), None);
    }

    #[test]
    fn test_language_name_fallback() {
        assert_eq!(language_name("FR"), "French");
        assert_eq!(language_name("xx"), "xx");
    }
}
