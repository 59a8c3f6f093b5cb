//! Query classification
//!
//! Three independent classifiers share one technique: phrases from the
//! prototype registry are embedded once at construction, and a query is
//! scored by its best cosine similarity against each phrase set. Each
//! classifier then walks an explicit, ordered rule list to pick a result.
//!
//! - `ScopeClassifier`: testament / book-group / single-book filter
//! - `IntentClassifier`: keyword, semantic or hybrid retrieval
//! - `ResponseFormatClassifier`: how the answer should be presented
//!
//! Classification never fails after construction. An embedding error
//! degrades to the safest default (no scope, semantic search, plain list).

mod intent;
mod prototype_set;
mod response;
mod scope;

pub use intent::{IntentClassifier, IntentType, SearchIntent};
pub use prototype_set::PrototypeSet;
pub use response::{ResponseFormat, ResponseFormatClassifier};
pub use scope::{ScopeClassifier, ScopeConstraint, ScopeKind};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::embedding::{EmbeddingError, EmbeddingProvider};
    use crate::prototypes::PrototypeRegistry;
    use std::collections::HashMap;

    const TEST_PROTOTYPES: &str = r#"
[scope]
none_threshold = 0.5
testament_threshold = 0.5
group_threshold = 0.5
book_threshold = 0.5
none = ["verses about love"]
book_templates_ko = ["{name}에서"]
book_templates_en = ["in {name}"]

[[scope.testament]]
testament = "NT"
label = "신약"
triggers = ["신약에서", "신약", "in the new testament"]
phrases = ["신약에서"]

[[scope.group]]
name = "gospels"
label = "사복음서"
books = ["마", "막", "눅", "요"]
triggers = ["복음서에서", "복음서"]
phrases = ["복음서에서"]

[intent]
keyword_threshold = 0.50
semantic_threshold = 0.45
hybrid_threshold = 0.40
hybrid_margin = 0.05
short_token_threshold = 6
keyword = ["모세가 나오는 구절"]
semantic = ["위로가 되는 말씀"]

[[intent.literal_pattern]]
name = "quoted"
pattern = '"([^"]+)"'

[[intent.literal_pattern]]
name = "appears_ko"
pattern = '(\S+?)(?:이|가)\s*(?:나오는|언급된)'

[response]
diagram_threshold = 0.50
statistics_threshold = 0.50
context_threshold = 0.48
explanation_threshold = 0.45
diagram_keyword_threshold = 0.40
diagram_keyword_boost = 0.25
diagram_keywords = ["그림", "diagram"]
diagram = ["그림으로 설명해줘"]
explanation = ["설명해줘"]
statistics = ["몇 번 나와"]
context = ["앞뒤 구절"]
list = ["찾아줘"]

[[book]]
short = "마"
name = "마태복음"
english = "Matthew"
testament = "NT"

[[book]]
short = "막"
name = "마가복음"
english = "Mark"
testament = "NT"

[[book]]
short = "눅"
name = "누가복음"
english = "Luke"
testament = "NT"

[[book]]
short = "요"
name = "요한복음"
english = "John"
testament = "NT"

[[book]]
short = "롬"
name = "로마서"
english = "Romans"
testament = "NT"

[[book]]
short = "요일"
name = "요한일서"
english = "1 John"
testament = "NT"
"#;

    /// Small registry whose phrases the tests map to chosen vectors
    pub fn test_registry() -> PrototypeRegistry {
        PrototypeRegistry::from_toml_str(TEST_PROTOTYPES).expect("test registry is valid")
    }

    /// Embedder returning hand-picked vectors for known texts
    ///
    /// Unknown texts map to the last axis, orthogonal to every vector built
    /// with `axis` on a lower index.
    pub struct StubEmbedder {
        dimension: usize,
        vectors: HashMap<String, Vec<f32>>,
        failing: Vec<String>,
    }

    impl StubEmbedder {
        pub fn new(dimension: usize) -> Self {
            Self {
                dimension,
                vectors: HashMap::new(),
                failing: Vec::new(),
            }
        }

        pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
            assert_eq!(vector.len(), self.dimension);
            self.vectors.insert(text.to_string(), vector);
            self
        }

        pub fn failing_on(mut self, text: &str) -> Self {
            self.failing.push(text.to_string());
            self
        }

        /// Unit vector on `i`, tilted toward `j` by `tilt`
        pub fn axis(&self, i: usize, j: usize, tilt: f32) -> Vec<f32> {
            let mut v = vec![0.0; self.dimension];
            v[i] = 1.0 - tilt;
            v[j] += tilt;
            v
        }
    }

    impl EmbeddingProvider for StubEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if self.failing.iter().any(|f| f == text) {
                return Err(EmbeddingError::GenerationError(format!(
                    "stub failure for '{}'",
                    text
                )));
            }
            Ok(self.vectors.get(text).cloned().unwrap_or_else(|| {
                let mut v = vec![0.0; self.dimension];
                v[self.dimension - 1] = 1.0;
                v
            }))
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }
}
