//! Parley - Chat message translation with protected spans
//!
//! Command-line entry point for translating messages, inspecting masking and
//! evaluating translations.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley::cli::{Args, Commands};
use parley::config::{Config, Provider, TranslateConfig};
use parley::detect::{LanguageDetector, WhatlangDetector};
use parley::error::ParleyError;
use parley::pipeline::PlaceholderTranslationPipeline;
use parley::quality::{evaluate, QualityValidator, WordEmbeddings};
use parley::translate::check_ollama_availability;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Translate { text, input, target_lang, source_lang, provider } => {
            if let Some(provider) = provider {
                let provider: Provider = provider.parse()?;
                if provider != config.translate.provider {
                    config.translate.provider = provider;
                    config.translate.endpoint = TranslateConfig::default_endpoint(provider).to_string();
                }
            }

            if config.translate.provider == Provider::Ollama {
                check_ollama_availability(&config.translate.endpoint, &config.translate.model).await?;
            }

            let pipeline = PlaceholderTranslationPipeline::from_config(&config)?;

            match (text, input) {
                (Some(text), _) => {
                    let output = pipeline
                        .translate_message(&text, &target_lang, source_lang.as_deref())
                        .await;
                    println!("{}", output);
                }
                (None, Some(input)) => {
                    let content = tokio::fs::read_to_string(&input).await?;
                    let lines: Vec<&str> = content.lines().collect();

                    let progress = ProgressBar::new(lines.len() as u64);
                    progress.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                            .progress_chars("#>-"),
                    );

                    let mut failed = 0usize;
                    let mut translated = Vec::with_capacity(lines.len());
                    for line in &lines {
                        let result = pipeline
                            .translate(line, &target_lang, source_lang.as_deref())
                            .await;
                        if !result.succeeded {
                            failed += 1;
                        }
                        translated.push(result.text);
                        progress.inc(1);
                    }
                    progress.finish_with_message("done");

                    for line in translated {
                        println!("{}", line);
                    }
                    info!("Translated {} messages ({} failed)", lines.len(), failed);
                }
                (None, None) => {
                    return Err(ParleyError::Config("Either --text or --input is required".to_string()).into());
                }
            }
        }

        Commands::Mask { text } => {
            let pipeline = PlaceholderTranslationPipeline::new(
                Box::new(parley::translate::identity::IdentityTranslator),
                &config,
            )?;
            let masked = pipeline.mask(&text);

            println!("{}", masked.text);
            println!();
            println!("{:<6} {:<12} {:<8} {}", "Index", "Token", "Kind", "Original");
            println!("{}", "-".repeat(50));
            for (token, span) in masked.tokens().iter().zip(&masked.spans) {
                println!("{:<6} {:<12} {:<8} {}", token.index, token.text, span.kind, span.original_text);
            }
        }

        Commands::Detect { text } => {
            match WhatlangDetector.detect(&text) {
                Some(code) => println!("{}", code),
                None => println!("unknown"),
            }
        }

        Commands::Evaluate { reference, hypothesis, embeddings, min_bleu } => {
            let embeddings = match embeddings {
                Some(path) => Some(WordEmbeddings::from_text_file(path)?),
                None => None,
            };
            let score = evaluate(&reference, &hypothesis, embeddings.as_ref());

            println!("BLEU score: {:.4}", score.bleu);
            if let Some(similarity) = score.embedding_similarity {
                println!("Average embedding similarity: {:.4}", similarity);
            }

            if let Some(min_bleu) = min_bleu {
                QualityValidator::new(min_bleu).validate(&score)?;
            }
        }

        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".parley").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation
    let file_appender = rolling::daily(&log_dir, "parley.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // stdout carries translations, so logs go to stderr
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
