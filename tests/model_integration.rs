//! Search with the real embedding model and the built-in prototypes

mod common;

use common::fixture_config;
use tempfile::TempDir;
use versewise::app::App;
use versewise::classify::ScopeKind;
use versewise::corpus::Testament;
use versewise::retrieval::render_search_result;

#[test]
#[ignore] // Requires model download
fn test_builtin_prototypes_with_fastembed() {
    let temp = TempDir::new().unwrap();
    let mut config = fixture_config(&temp);
    config.embedding.model = "all-MiniLM-L6-v2-q".to_string();
    config.embedding.dimension = 384;
    config.index.kind = "hnsw".to_string();
    config.classifier.prototypes_file = None;

    let app = App::new(config).expect("Failed to build app with model");
    println!("{}", app.engine().stats().scope_classifier);

    let result = app.engine().search_default("God's love in the new testament");
    println!("{}", render_search_result(&result));

    assert!(result.success);
    if result.detected_scope_type() == ScopeKind::Testament {
        assert!(result
            .results
            .iter()
            .all(|m| m.testament == Some(Testament::New)));
    }

    let exact = app.engine().search_default("태초");
    assert_eq!(exact.results[0].reference, "창세기 1:1");
}
