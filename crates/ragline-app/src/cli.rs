use std::path::PathBuf;

use clap::Parser;

/// ragline: Gemini chat, Mistral embeddings and a small retrieval demo.
#[derive(Parser, Debug, Default)]
#[command(name = "ragline", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override, as a tracing directive (e.g. debug, ragline=trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Gemini model id (gemini-pro, gemini-pro-vision, embedding-001, aqa).
    #[arg(long)]
    pub model: Option<String>,

    /// Document to index for the retrieval step.
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// Question asked against the indexed document.
    #[arg(long)]
    pub query: Option<String>,

    /// Number of retrieved nodes handed to the model.
    #[arg(long)]
    pub top_k: Option<u32>,

    /// Skip the streaming step and disable streaming on the session.
    #[arg(long)]
    pub no_stream: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
