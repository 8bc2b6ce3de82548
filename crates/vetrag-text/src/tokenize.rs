use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, WhitespaceTokenizer};

/// Lowercasing token pipeline built on tantivy analyzers.
///
/// `whitespace()` keeps punctuation attached to tokens and backs the lexical
/// scorers; `words()` splits on any non-alphanumeric character and backs
/// phrase matching in the classifier.
#[derive(Clone)]
pub struct Analyzer {
	inner: TextAnalyzer,
}

impl Analyzer {
	pub fn whitespace() -> Self {
		let inner = TextAnalyzer::builder(WhitespaceTokenizer::default()).filter(LowerCaser).build();
		Self { inner }
	}

	pub fn words() -> Self {
		let inner = TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).build();
		Self { inner }
	}

	pub fn tokens(&self, text: &str) -> Vec<String> {
		// token_stream needs &mut; analyzers are cheap to clone
		let mut analyzer = self.inner.clone();
		let mut stream = analyzer.token_stream(text);
		let mut out = Vec::new();
		while stream.advance() {
			out.push(stream.token().text.clone());
		}
		out
	}
}

impl Default for Analyzer {
	fn default() -> Self { Self::whitespace() }
}
