mod cli;
mod rag;
mod settings;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use futures_util::StreamExt;
use ragline_ai::{Embedding, Llm, LlmError, MistralEmbedding, SessionCache};
use ragline_common::{CallbackEvent, EventBus, RaglineError};
use ragline_config::{config_to_json, RaglineConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::rag::{Document, QueryEngine, VectorIndex};

const DEFAULT_LOG_DIRECTIVE: &str = "ragline=info";
const CHEESE_QUESTION: &str = "What is the best French cheese?";
const PAINTER_QUESTION: &str = "Who is the most renowned French painter?";

/// `.env` locations tried in order: the workspace root, then the working
/// directory.
fn dotenv_candidates() -> [PathBuf; 2] {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    [
        manifest_dir.join("..").join("..").join(".env"),
        PathBuf::from(".env"),
    ]
}

/// Load the first readable `.env` among `candidates`. Variables already set
/// in the environment win.
fn load_dotenv(candidates: &[PathBuf]) -> Option<&Path> {
    for path in candidates.iter().filter(|path| path.is_file()) {
        match dotenvy::from_path(path) {
            Ok(()) => return Some(path.as_path()),
            Err(e) => eprintln!("ignoring {}: {e}", path.display()),
        }
    }
    None
}

fn init_logging(directive: &str) {
    let directive = directive.parse::<Directive>().unwrap_or_else(|_| {
        eprintln!("invalid log directive {directive:?}, using {DEFAULT_LOG_DIRECTIVE}");
        DEFAULT_LOG_DIRECTIVE
            .parse::<Directive>()
            .unwrap_or_else(|_| LevelFilter::INFO.into())
    });
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();
}

/// Log every pipeline callback at debug level.
fn spawn_callback_logger(bus: &EventBus) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(CallbackEvent::LlmStream {
                    index, is_done: true, ..
                }) => debug!(fragments = index, "stream finished"),
                Ok(CallbackEvent::Retrieve { query, nodes, .. }) => {
                    debug!(query = %query, nodes, "retrieval finished")
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "callback logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn run(config: RaglineConfig) -> Result<(), RaglineError> {
    let bus = Arc::new(EventBus::new(256));
    spawn_callback_logger(&bus);

    let cache = SessionCache::new().with_callbacks(Arc::clone(&bus));
    let llm: Arc<dyn Llm> = cache.get_or_create(settings::gemini_options(&config.gemini)?)?;
    let meta = llm.metadata();
    info!(
        model = %meta.model,
        context_window = meta.context_window,
        streaming = llm.has_streaming(),
        "Gemini session ready"
    );

    let embed_model: Arc<dyn Embedding> = Arc::new(
        MistralEmbedding::new(settings::mistral_config(&config.mistral)?)
            .map_err(LlmError::into_embedding_error)?,
    );

    // Embedding
    let embedding = embed_model
        .text_embedding(CHEESE_QUESTION)
        .await
        .map_err(LlmError::into_embedding_error)?;
    info!(dimensions = embedding.len(), "embedded question");

    // Chat
    let prompt_tokens = llm.tokens(&[ragline_ai::Message::user(CHEESE_QUESTION)])?;
    debug!(prompt_tokens, "sending chat");
    let response = llm.complete(CHEESE_QUESTION, None).await?;
    if let Some(usage) = response.usage {
        debug!(total_tokens = usage.total_tokens(), "chat usage");
    }
    println!("{}", response.message.content);

    // Streaming
    if llm.has_streaming() {
        let mut stream = llm.stream_complete(PAINTER_QUESTION, None).await?;
        let mut stdout = std::io::stdout();
        while let Some(fragment) = stream.next().await {
            write!(stdout, "{}", fragment?)?;
            stdout.flush()?;
        }
        writeln!(stdout)?;
    } else {
        info!("streaming disabled, skipping streaming step");
    }

    // Retrieval
    let path = &config.rag.document;
    let document = Document::load(path).await.map_err(|e| {
        RaglineError::Other(format!("failed to read document {}: {e}", path.display()))
    })?;
    let index = VectorIndex::from_documents(
        &[document],
        Arc::clone(&embed_model),
        config.rag.max_node_chars as usize,
    )
    .await
    .map_err(LlmError::into_embedding_error)?;
    let engine = QueryEngine::new(index, llm, config.rag.similarity_top_k as usize)
        .with_callbacks(Arc::clone(&bus));

    let answer = engine.query(&config.rag.query).await?;
    info!(sources = answer.sources.len(), "query answered");
    println!("{}", answer.answer);

    Ok(())
}

fn main() -> ExitCode {
    // Load .env before the runtime starts any threads
    let dotenv = load_dotenv(&dotenv_candidates()).map(Path::to_path_buf);

    let args = cli::parse();

    let loaded = ragline_config::load_config_from(args.config.as_deref());
    let file_directive = loaded
        .as_ref()
        .map(|config| config.logging.level.directive())
        .unwrap_or(DEFAULT_LOG_DIRECTIVE);
    init_logging(args.log_level.as_deref().unwrap_or(file_directive));

    info!("ragline v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    if let Some(path) = &args.config {
        info!("Using config override: {}", path.display());
    }
    let config = match loaded.and_then(|config| settings::apply_overrides(config, &args)) {
        Ok(config) => config,
        Err(e) => {
            error!("Config load failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!("Effective config: {}", config_to_json(&config));

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config)) {
        Ok(()) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
