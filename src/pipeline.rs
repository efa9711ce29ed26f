use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::chunk::{split_masked, Chunk};
use crate::config::{Config, OutputConfig};
use crate::detect::{LanguageDetector, WhatlangDetector};
use crate::error::Result;
use crate::placeholder::{mask, token_regex, MaskedText};
use crate::protect::SpanExtractor;
use crate::translate::{Translator, TranslatorFactory};

/// Outcome of translating one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub text: String,
    pub source_language: Option<String>,
    pub target_language: String,
    pub succeeded: bool,
}

/// Masks protected spans, hands the rest to a translator and restores the spans.
///
/// Translator failures never reach the caller: the original message comes back
/// instead, optionally followed by the configured failure notice.
pub struct PlaceholderTranslationPipeline {
    translator: Box<dyn Translator>,
    detector: Option<Box<dyn LanguageDetector>>,
    extractor: SpanExtractor,
    max_chunk_chars: Option<usize>,
    parallel_chunks: bool,
    output: OutputConfig,
}

impl PlaceholderTranslationPipeline {
    pub fn new(translator: Box<dyn Translator>, config: &Config) -> Result<Self> {
        let detector: Option<Box<dyn LanguageDetector>> = if config.translate.detect_source {
            Some(Box::new(WhatlangDetector))
        } else {
            None
        };

        Ok(Self {
            translator,
            detector,
            extractor: SpanExtractor::new(&config.protect)?,
            max_chunk_chars: config.translate.max_chunk_chars,
            parallel_chunks: config.translate.parallel_chunks,
            output: config.output.clone(),
        })
    }

    /// Build a pipeline with the configured translation provider
    pub fn from_config(config: &Config) -> Result<Self> {
        let translator = TranslatorFactory::create_translator(&config.translate)?;
        Self::new(translator, config)
    }

    pub fn with_detector(mut self, detector: Option<Box<dyn LanguageDetector>>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_extractor(mut self, extractor: SpanExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Extract and mask the protected spans of `message`
    pub fn mask(&self, message: &str) -> MaskedText {
        mask(message, self.extractor.extract(message))
    }

    /// Translate `message` and return only the text to display
    pub async fn translate_message(
        &self,
        message: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> String {
        self.translate(message, target_language, source_language)
            .await
            .text
    }

    /// Translate `message`, reporting the languages used and whether translation succeeded
    pub async fn translate(
        &self,
        message: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> TranslationResult {
        if message.trim().is_empty() {
            return TranslationResult {
                text: message.to_string(),
                source_language: source_language.map(str::to_string),
                target_language: target_language.to_string(),
                succeeded: true,
            };
        }

        let masked = self.mask(message);
        let source = match source_language {
            Some(code) => Some(code.to_string()),
            None => self.detect_source(&masked),
        };

        info!("┌─ Translating message ({} → {}) via {} ────────",
              source.as_deref().unwrap_or("auto"), target_language, self.translator.name());
        debug!("│ Source: {}", message);
        debug!("│ Masked: {} ({} protected spans)", masked.text, masked.spans.len());

        match self.translate_and_restore(&masked, target_language, source.as_deref()).await {
            Ok(translated) => {
                debug!("│ Target: {}", translated);
                info!("└─────────────────────────────────────");
                let text = if self.output.language_pair_line {
                    format!(
                        "[{} → {}]\n{}",
                        source.as_deref().unwrap_or("auto"),
                        target_language,
                        translated
                    )
                } else {
                    translated
                };
                TranslationResult {
                    text,
                    source_language: source,
                    target_language: target_language.to_string(),
                    succeeded: true,
                }
            }
            Err(e) => {
                warn!("│ Failed: {}", e);
                warn!("└─────────────────────────────────────");
                // Keep original text on failure
                let text = match &self.output.failure_notice {
                    Some(notice) => format!("{}\n\n{}", message, notice),
                    None => message.to_string(),
                };
                TranslationResult {
                    text,
                    source_language: source,
                    target_language: target_language.to_string(),
                    succeeded: false,
                }
            }
        }
    }

    fn detect_source(&self, masked: &MaskedText) -> Option<String> {
        let detector = self.detector.as_ref()?;
        // placeholders would skew the guess
        let plain = match token_regex(&masked.tag) {
            Ok(re) => re.replace_all(&masked.text, " ").into_owned(),
            Err(_) => masked.text.clone(),
        };
        detector.detect(&plain)
    }

    fn chunk_limit(&self) -> Option<usize> {
        match (self.max_chunk_chars, self.translator.max_input_chars()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    async fn translate_and_restore(
        &self,
        masked: &MaskedText,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<String> {
        let chunks = split_masked(&masked.text, &masked.tag, self.chunk_limit())?;
        if chunks.len() > 1 {
            debug!("│ Split into {} chunks", chunks.len());
        }

        let translated = if self.parallel_chunks {
            let calls = chunks
                .iter()
                .map(|chunk| self.translate_chunk(chunk, target_language, source_language));
            join_all(calls).await.into_iter().collect::<Result<Vec<_>>>()?
        } else {
            let mut out = Vec::with_capacity(chunks.len());
            for chunk in &chunks {
                out.push(self.translate_chunk(chunk, target_language, source_language).await?);
            }
            out
        };

        let joined: String = chunks
            .iter()
            .zip(translated)
            .map(|(chunk, text)| text + &chunk.trailing)
            .collect();

        let (restored, report) = masked.unmask(&joined)?;
        if let Some(mismatch) = report.into_error() {
            warn!("│ {}", mismatch);
        }
        Ok(restored)
    }

    async fn translate_chunk(
        &self,
        chunk: &Chunk,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<String> {
        if chunk.is_blank() {
            return Ok(chunk.text.clone());
        }
        self.translator
            .translate(&chunk.text, target_language, source_language)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::config::ProtectConfig;
    use crate::detect::MockLanguageDetector;
    use crate::error::ParleyError;
    use crate::protect::EmojiClassifier;
    use crate::translate::identity::IdentityTranslator;

    /// Records every call and answers with a fixed transformation
    struct RecordingTranslator {
        calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
        transform: fn(&str) -> String,
        limit: Option<usize>,
    }

    impl RecordingTranslator {
        fn new(transform: fn(&str) -> String) -> (Self, Arc<Mutex<Vec<(String, Option<String>)>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let translator = Self {
                calls: Arc::clone(&calls),
                transform,
                limit: None,
            };
            (translator, calls)
        }
    }

    #[async_trait]
    impl Translator for RecordingTranslator {
        async fn translate(
            &self,
            text: &str,
            _target_language: &str,
            source_language: Option<&str>,
        ) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), source_language.map(str::to_string)));
            Ok((self.transform)(text))
        }

        fn max_input_chars(&self) -> Option<usize> {
            self.limit
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _: &str, _: &str, _: Option<&str>) -> Result<String> {
            Err(ParleyError::TranslationUnavailable("quota exceeded".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Counts calls and fails on the chunks picked by `fails`
    struct FlakyTranslator {
        calls: Arc<Mutex<Vec<String>>>,
        fails: fn(&str) -> bool,
        limit: Option<usize>,
    }

    impl FlakyTranslator {
        fn new(fails: fn(&str) -> bool, limit: Option<usize>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let translator = Self {
                calls: Arc::clone(&calls),
                fails,
                limit,
            };
            (translator, calls)
        }
    }

    #[async_trait]
    impl Translator for FlakyTranslator {
        async fn translate(&self, text: &str, _: &str, _: Option<&str>) -> Result<String> {
            self.calls.lock().unwrap().push(text.to_string());
            if (self.fails)(text) {
                return Err(ParleyError::TranslationUnavailable("timeout".to_string()));
            }
            Ok(text.to_uppercase())
        }

        fn max_input_chars(&self) -> Option<usize> {
            self.limit
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    /// Treats the black star as an emoji
    struct StarClassifier;

    impl EmojiClassifier for StarClassifier {
        fn is_emoji(&self, grapheme: &str) -> bool {
            grapheme == "★"
        }
    }

    /// Answers later for earlier chunks so completion order is reversed
    struct SlowFirstTranslator;

    #[async_trait]
    impl Translator for SlowFirstTranslator {
        async fn translate(&self, text: &str, _: &str, _: Option<&str>) -> Result<String> {
            let delay = match text.chars().next() {
                Some('a') => 60,
                Some('b') => 30,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(text.to_uppercase())
        }

        fn max_input_chars(&self) -> Option<usize> {
            Some(5)
        }

        fn name(&self) -> &str {
            "slow-first"
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.translate.detect_source = false;
        config
    }

    fn pipeline(translator: Box<dyn Translator>, config: &Config) -> PlaceholderTranslationPipeline {
        PlaceholderTranslationPipeline::new(translator, config).unwrap()
    }

    #[tokio::test]
    async fn test_identity_round_trip_example() {
        let pipeline = pipeline(Box::new(IdentityTranslator), &config());
        let out = pipeline
            .translate_message("Check https://a.io 😀", "fr", None)
            .await;
        assert_eq!(out, "Check https://a.io 😀");
    }

    #[tokio::test]
    async fn test_no_spans_sends_message_verbatim() {
        let (translator, calls) = RecordingTranslator::new(|t| format!("«{}»", t));
        let pipeline = pipeline(Box::new(translator), &config());

        let out = pipeline.translate_message("Hello, café friends", "fr", None).await;
        assert_eq!(out, "«Hello, café friends»");
        assert_eq!(calls.lock().unwrap()[0].0, "Hello, café friends");
    }

    #[tokio::test]
    async fn test_translator_sees_placeholders_only() {
        let (translator, calls) = RecordingTranslator::new(|t| t.replace("Look", "Regarde"));
        let pipeline = pipeline(Box::new(translator), &config());

        let out = pipeline
            .translate_message("<p>Look https://a.io/x 🎉</p>", "fr", Some("en"))
            .await;
        assert_eq!(out, "<p>Regarde https://a.io/x 🎉</p>");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "<<PH_0>>Look <<PH_1>> <<PH_2>><<PH_3>>");
        assert_eq!(calls[0].1.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_failure_returns_original_message() {
        let pipeline = pipeline(Box::new(FailingTranslator), &config());
        let result = pipeline.translate("Hola https://a.io", "en", None).await;
        assert_eq!(result.text, "Hola https://a.io");
        assert!(!result.succeeded);
    }

    #[tokio::test]
    async fn test_failed_call_is_not_retried() {
        let (translator, calls) = FlakyTranslator::new(|_| true, None);
        let pipeline = pipeline(Box::new(translator), &config());

        let result = pipeline.translate("Hola https://a.io", "en", None).await;
        assert!(!result.succeeded);
        assert_eq!(*calls.lock().unwrap(), vec!["Hola <<PH_0>>".to_string()]);
    }

    #[tokio::test]
    async fn test_later_chunk_failure_falls_back_to_original() {
        let (translator, calls) = FlakyTranslator::new(|t| t == "bbb", Some(4));
        let pipeline = pipeline(Box::new(translator), &config());

        let result = pipeline.translate("aaa bbb ccc", "en", None).await;
        assert_eq!(result.text, "aaa bbb ccc");
        assert!(!result.succeeded);
        // sequential mode stops at the first failure
        assert_eq!(*calls.lock().unwrap(), vec!["aaa".to_string(), "bbb".to_string()]);
    }

    #[tokio::test]
    async fn test_parallel_chunk_failure_falls_back_without_retry() {
        let mut config = config();
        config.translate.parallel_chunks = true;
        let (translator, calls) = FlakyTranslator::new(|t| t == "bbb", Some(4));
        let pipeline = pipeline(Box::new(translator), &config);

        let result = pipeline.translate("aaa bbb ccc", "en", None).await;
        assert_eq!(result.text, "aaa bbb ccc");
        assert!(!result.succeeded);

        let mut calls = calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, vec!["aaa", "bbb", "ccc"]);
    }

    #[tokio::test]
    async fn test_failure_notice_is_separated() {
        let mut config = config();
        config.output.failure_notice = Some("(translation failed)".to_string());
        let pipeline = pipeline(Box::new(FailingTranslator), &config);

        let out = pipeline.translate_message("Hola", "en", None).await;
        assert_eq!(out, "Hola\n\n(translation failed)");
    }

    #[tokio::test]
    async fn test_language_pair_line() {
        let mut config = config();
        config.output.language_pair_line = true;
        let pipeline = pipeline(Box::new(IdentityTranslator), &config);

        let result = pipeline.translate("Hi 👍", "de", Some("en")).await;
        assert_eq!(result.text, "[en → de]\nHi 👍");

        let result = pipeline.translate("Hi", "de", None).await;
        assert_eq!(result.text, "[auto → de]\nHi");
    }

    #[tokio::test]
    async fn test_blank_message_skips_translator() {
        let (translator, calls) = RecordingTranslator::new(|t| t.to_string());
        let pipeline = pipeline(Box::new(translator), &config());

        let result = pipeline.translate("  \n ", "fr", None).await;
        assert_eq!(result.text, "  \n ");
        assert!(result.succeeded);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detected_source_is_passed_through() {
        let mut detector = MockLanguageDetector::new();
        detector
            .expect_detect()
            .withf(|text| !text.contains("<<PH_"))
            .times(1)
            .returning(|_| Some("xx".to_string()));

        let (translator, calls) = RecordingTranslator::new(|t| t.to_string());
        let pipeline = pipeline(Box::new(translator), &config())
            .with_detector(Some(Box::new(detector)));

        let result = pipeline.translate("ciao https://a.io", "en", None).await;
        assert_eq!(result.source_language.as_deref(), Some("xx"));
        assert_eq!(calls.lock().unwrap()[0].1.as_deref(), Some("xx"));
    }

    #[tokio::test]
    async fn test_explicit_source_skips_detector() {
        let mut detector = MockLanguageDetector::new();
        detector.expect_detect().times(0);

        let pipeline = pipeline(Box::new(IdentityTranslator), &config())
            .with_detector(Some(Box::new(detector)));

        let result = pipeline.translate("ciao", "en", Some("it")).await;
        assert_eq!(result.source_language.as_deref(), Some("it"));
    }

    #[tokio::test]
    async fn test_chunks_respect_translator_limit() {
        let (mut translator, calls) = RecordingTranslator::new(|t| t.to_uppercase());
        translator.limit = Some(12);
        let pipeline = pipeline(Box::new(translator), &config());

        let out = pipeline
            .translate_message("one two three https://a.io four five", "fr", None)
            .await;
        assert_eq!(out, "ONE TWO THREE https://a.io FOUR FIVE");

        let calls = calls.lock().unwrap();
        assert!(calls.len() > 1);
        for (text, _) in calls.iter() {
            assert!(text.chars().count() <= 12, "{:?} too long", text);
        }
    }

    #[tokio::test]
    async fn test_configured_limit_is_combined_with_provider_limit() {
        let (mut translator, calls) = RecordingTranslator::new(|t| t.to_string());
        translator.limit = Some(100);
        let mut config = config();
        config.translate.max_chunk_chars = Some(7);
        let pipeline = pipeline(Box::new(translator), &config);

        let out = pipeline.translate_message("abc def ghi", "fr", None).await;
        assert_eq!(out, "abc def ghi");
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_parallel_chunks_keep_order() {
        let mut config = config();
        config.translate.parallel_chunks = true;
        let pipeline = pipeline(Box::new(SlowFirstTranslator), &config);

        let out = pipeline.translate_message("aaaa bbbb cccc", "fr", None).await;
        assert_eq!(out, "AAAA BBBB CCCC");
    }

    #[tokio::test]
    async fn test_dropped_placeholder_is_not_invented() {
        let pipeline = pipeline(
            Box::new(RecordingTranslator::new(|t| t.replace(" <<PH_1>>", "")).0),
            &config(),
        );
        let result = pipeline.translate("see https://a.io 😀", "fr", None).await;
        assert!(result.succeeded);
        assert_eq!(result.text, "see https://a.io");
    }

    #[tokio::test]
    async fn test_custom_emoji_classifier() {
        let extractor =
            SpanExtractor::with_classifier(&ProtectConfig::default(), Some(Box::new(StarClassifier)))
                .unwrap();
        let (translator, calls) = RecordingTranslator::new(|t| t.to_uppercase());
        let pipeline = pipeline(Box::new(translator), &config()).with_extractor(extractor);

        let out = pipeline.translate_message("top ★ pick", "fr", None).await;
        assert_eq!(out, "TOP ★ PICK");
        assert_eq!(calls.lock().unwrap()[0].0, "top <<PH_0>> pick");
    }

    #[tokio::test]
    async fn test_protection_can_be_disabled() {
        let mut config = config();
        config.protect = ProtectConfig {
            links: false,
            emojis: false,
            markup_tags: false,
            ..ProtectConfig::default()
        };
        let (translator, calls) = RecordingTranslator::new(|t| t.to_string());
        let pipeline = pipeline(Box::new(translator), &config);

        pipeline.translate_message("<b>x</b> https://a.io 😀", "fr", None).await;
        assert_eq!(calls.lock().unwrap()[0].0, "<b>x</b> https://a.io 😀");
    }
}
