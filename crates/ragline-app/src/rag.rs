//! In-memory retrieval: split documents into nodes, embed them, and answer
//! questions from the closest nodes.

use std::path::Path;
use std::sync::Arc;

use ragline_ai::{cosine_similarity, Embedding, Llm, LlmError, Message};
use ragline_common::{new_id, CallbackEvent, Event, EventBus, EventKind};
use tracing::{debug, info};

/// Inputs per embedding request.
const EMBED_BATCH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
        }
    }

    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(text))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub document_id: String,
    pub text: String,
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNode {
    pub node: Node,
    pub score: f32,
}

/// Split `text` into nodes of at most `max_chars` characters.
///
/// Paragraphs (blank-line separated) are packed together while they fit;
/// a paragraph longer than `max_chars` is broken at word boundaries, and a
/// single word longer than that is cut.
pub fn split_into_nodes(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let text = text.replace("\r\n", "\n");
    let mut nodes = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    let paragraphs = text.split("\n\n").map(str::trim).filter(|p| !p.is_empty());
    for piece in paragraphs.flat_map(|p| split_long(p, max_chars)) {
        let piece_len = piece.chars().count();
        if current_len > 0 && current_len + 2 + piece_len > max_chars {
            nodes.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push_str("\n\n");
            current_len += 2;
        }
        current.push_str(&piece);
        current_len += piece_len;
    }

    if !current.is_empty() {
        nodes.push(current);
    }
    nodes
}

fn split_long(paragraph: &str, max_chars: usize) -> Vec<String> {
    if paragraph.chars().count() <= max_chars {
        return vec![paragraph.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in paragraph.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Embedded nodes searched by cosine similarity.
pub struct VectorIndex {
    nodes: Vec<Node>,
    embed_model: Arc<dyn Embedding>,
}

impl VectorIndex {
    pub async fn from_documents(
        documents: &[Document],
        embed_model: Arc<dyn Embedding>,
        max_node_chars: usize,
    ) -> Result<Self, LlmError> {
        let mut pending: Vec<(String, String)> = Vec::new();
        for doc in documents {
            for text in split_into_nodes(&doc.text, max_node_chars) {
                pending.push((doc.id.clone(), text));
            }
        }

        let mut nodes = Vec::with_capacity(pending.len());
        for batch in pending.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|(_, text)| text.clone()).collect();
            let embeddings = embed_model.text_embeddings(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(LlmError::MalformedResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }
            for ((document_id, text), embedding) in batch.iter().cloned().zip(embeddings) {
                nodes.push(Node {
                    document_id,
                    text,
                    embedding,
                });
            }
        }

        info!(
            documents = documents.len(),
            nodes = nodes.len(),
            "built vector index"
        );
        Ok(Self { nodes, embed_model })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The `top_k` nodes closest to `query`, best first.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<ScoredNode>, LlmError> {
        if self.nodes.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed_model.query_embedding(query).await?;
        let mut scored: Vec<ScoredNode> = self
            .nodes
            .iter()
            .map(|node| ScoredNode {
                score: cosine_similarity(&query_embedding, &node.embedding),
                node: node.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<ScoredNode>,
}

/// Answers questions from an index by handing the retrieved nodes to an LLM.
pub struct QueryEngine {
    index: VectorIndex,
    llm: Arc<dyn Llm>,
    top_k: usize,
    callbacks: Option<Arc<EventBus>>,
}

impl QueryEngine {
    pub fn new(index: VectorIndex, llm: Arc<dyn Llm>, top_k: usize) -> Self {
        Self {
            index,
            llm,
            top_k,
            callbacks: None,
        }
    }

    pub fn with_callbacks(mut self, bus: Arc<EventBus>) -> Self {
        self.callbacks = Some(bus);
        self
    }

    pub async fn query(&self, query: &str) -> Result<QueryResponse, LlmError> {
        let root = Event::new(EventKind::Wrapper).with_tag("query");

        let sources = self.index.retrieve(query, self.top_k).await?;
        debug!(query, nodes = sources.len(), "retrieved nodes");
        if let Some(bus) = &self.callbacks {
            bus.publish(CallbackEvent::Retrieve {
                event: root.child(EventKind::Retrieve),
                query: query.to_string(),
                nodes: sources.len(),
            });
        }

        let messages = build_messages(query, &sources);
        let response = self.llm.chat(&messages, Some(&root)).await?;

        Ok(QueryResponse {
            answer: response.message.content,
            sources,
        })
    }
}

fn build_messages(query: &str, sources: &[ScoredNode]) -> Vec<Message> {
    let context = sources
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[{}]: {}", i + 1, s.node.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    vec![
        Message::system(format!(
            "Context information is below.\n\
             ---------------------\n\
             {context}\n\
             ---------------------\n\
             Given the context information and not prior knowledge, answer the question."
        )),
        Message::user(query),
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ragline_ai::{ChatResponse, LlmMetadata, Role, TextStream};

    use super::*;

    const VOCAB: [&str; 4] = ["college", "painting", "cheese", "programming"];

    /// Counts vocabulary words, one dimension per word.
    struct KeywordEmbedding;

    #[async_trait]
    impl Embedding for KeywordEmbedding {
        async fn text_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    VOCAB.iter().map(|w| lower.matches(w).count() as f32).collect()
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingLlm {
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl Llm for RecordingLlm {
        fn has_streaming(&self) -> bool {
            false
        }

        fn metadata(&self) -> LlmMetadata {
            LlmMetadata {
                model: "recording".into(),
                temperature: 0.0,
                top_p: 1.0,
                max_tokens: None,
                context_window: 1024,
            }
        }

        fn tokens(&self, _messages: &[Message]) -> Result<usize, LlmError> {
            Ok(0)
        }

        async fn chat(
            &self,
            messages: &[Message],
            _parent: Option<&Event>,
        ) -> Result<ChatResponse, LlmError> {
            *self.seen.lock().unwrap() = messages.to_vec();
            Ok(ChatResponse {
                message: Message::assistant("They studied programming."),
                usage: None,
            })
        }

        async fn stream_chat(
            &self,
            _messages: &[Message],
            _parent: Option<&Event>,
        ) -> Result<TextStream, LlmError> {
            Err(LlmError::Unsupported("streaming".into()))
        }
    }

    const ESSAY: &str = "Before college I wrote short stories.\n\n\
        In college I studied programming and more programming.\n\n\
        Later I took up painting.";

    #[test]
    fn paragraphs_pack_until_the_limit() {
        let nodes = split_into_nodes("aaa\n\nbbb\n\n\n\nccc", 8);
        assert_eq!(nodes, vec!["aaa\n\nbbb", "ccc"]);
    }

    #[test]
    fn long_paragraphs_break_at_words() {
        let nodes = split_into_nodes("one two three four", 9);
        assert_eq!(nodes, vec!["one two", "three", "four"]);
        assert!(nodes.iter().all(|n| n.chars().count() <= 9));
    }

    #[test]
    fn oversized_words_are_cut() {
        let nodes = split_into_nodes("abcdefghij", 4);
        assert_eq!(nodes, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn blank_text_has_no_nodes() {
        assert!(split_into_nodes(" \n\n \r\n", 100).is_empty());
    }

    #[tokio::test]
    async fn retrieve_ranks_by_similarity() {
        let docs = [Document::new(ESSAY)];
        let index = VectorIndex::from_documents(&docs, Arc::new(KeywordEmbedding), 60)
            .await
            .unwrap();
        assert_eq!(index.len(), 3);

        let hits = index.retrieve("What about painting?", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node.text, "Later I took up painting.");
        assert_eq!(hits[0].node.document_id, docs[0].id);
    }

    #[tokio::test]
    async fn query_puts_context_in_a_system_message() {
        let index = VectorIndex::from_documents(&[Document::new(ESSAY)], Arc::new(KeywordEmbedding), 60)
            .await
            .unwrap();
        let llm = Arc::new(RecordingLlm::default());
        let bus = Arc::new(EventBus::new(8));
        let mut rx = bus.subscribe();
        let engine = QueryEngine::new(index, llm.clone(), 2).with_callbacks(Arc::clone(&bus));

        let response = engine
            .query("What did the author do in college?")
            .await
            .unwrap();
        assert_eq!(response.answer, "They studied programming.");
        assert_eq!(response.sources.len(), 2);
        assert!(response.sources[0].score >= response.sources[1].score);
        assert!(response.sources.iter().any(|s| s.node.text.contains("programming")));

        let seen = llm.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, Role::System);
        assert!(seen[0].content.contains("In college I studied programming"));
        assert_eq!(seen[1], Message::user("What did the author do in college?"));

        match rx.recv().await.unwrap() {
            CallbackEvent::Retrieve { event, nodes, .. } => {
                assert_eq!(nodes, 2);
                assert_eq!(event.kind, EventKind::Retrieve);
            }
            other => panic!("unexpected callback: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_index_still_asks_the_model() {
        let index = VectorIndex::from_documents(&[], Arc::new(KeywordEmbedding), 100)
            .await
            .unwrap();
        assert!(index.is_empty());

        let llm = Arc::new(RecordingLlm::default());
        let response = QueryEngine::new(index, llm, 2).query("anything").await.unwrap();
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn load_reads_file_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.txt");
        std::fs::write(&path, ESSAY).unwrap();
        let doc = Document::load(&path).await.unwrap();
        assert_eq!(doc.text, ESSAY);
    }
}
