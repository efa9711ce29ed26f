use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a message, or every line of a file
    Translate {
        /// Message text
        #[arg(short, long, conflicts_with = "input", required_unless_present = "input")]
        text: Option<String>,

        /// File with one message per line
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Target language code
        #[arg(short = 'l', long, default_value = "en")]
        target_lang: String,

        /// Source language code (detected when omitted)
        #[arg(short, long)]
        source_lang: Option<String>,

        /// Translation provider (google, ollama, identity)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Show the masked text and protected spans of a message
    Mask {
        /// Message text
        #[arg(short, long)]
        text: String,
    },

    /// Detect the language of a text
    Detect {
        /// Text to inspect
        #[arg(short, long)]
        text: String,
    },

    /// Score a translation against a reference
    Evaluate {
        /// Reference translation
        #[arg(short, long)]
        reference: String,

        /// Translation to score
        #[arg(long)]
        hypothesis: String,

        /// Word vectors in word2vec text format
        #[arg(short, long)]
        embeddings: Option<PathBuf>,

        /// Fail when BLEU is below this value
        #[arg(long)]
        min_bleu: Option<f64>,
    },

    /// Write the default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}
