/// Text to fixed-length vector. Batch output must preserve input order.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model and dimension (e.g. `bert:all-MiniLM-L6-v2:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Literal similarity between a query and one document, nominally in [0, 1].
pub trait LexicalScorer: Send + Sync {
    fn score(&self, query: &str, document: &str) -> f32;
}

/// A language model that turns a prompt into plain answer text.
pub trait AnswerProvider: Send + Sync {
    fn name(&self) -> &str;
    fn answer(&self, prompt: &str) -> anyhow::Result<String>;
}
