use clap::Parser;
use std::path::PathBuf;

/// Convert DOCX documents into a knowledge-base import bundle
#[derive(Parser, Debug)]
#[command(name = "docx2kb", version, about)]
pub struct Cli {
    /// Input .docx files to convert
    #[arg(required_unless_present = "clean")]
    pub inputs: Vec<PathBuf>,

    /// Working root the bundle is assembled under
    #[arg(short, long, default_value = "kb-out")]
    pub output: PathBuf,

    /// Preserve empty paragraphs as spacing instead of dropping them
    #[arg(long, default_value_t = false)]
    pub keep_empty_paragraphs: bool,

    /// Place an image following a list item as a sibling block instead of
    /// nesting it inside the item
    #[arg(long, default_value_t = false)]
    pub sibling_images: bool,

    /// Skip assembling KnowledgeArticlesImport.zip
    #[arg(long, default_value_t = false)]
    pub no_zip: bool,

    /// Wipe the working root first (with no inputs: wipe and exit)
    #[arg(long, default_value_t = false)]
    pub clean: bool,
}
