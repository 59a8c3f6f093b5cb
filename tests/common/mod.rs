//! Shared fixtures: a two-translation corpus and a small prototype registry
//! written to a temporary directory, wired to the hashing embedder.

#![allow(dead_code)]

use std::path::Path;
use tempfile::TempDir;
use versewise::config::Config;
use versewise::corpus::TranslationSource;

pub const KRV_JSON: &str = r#"{
    "version": "KRV",
    "books": [
        {"bookShort": "창", "bookName": "창세기", "testament": 1, "bookNumber": 1, "chapters": [
            {"chapter": 1, "verses": [
                {"verse": 1, "title": "천지 창조", "text": "태초에 하나님이 천지를 창조하시니라"},
                {"verse": 2, "text": "땅이 혼돈하고 공허하며 흑암이 깊음 위에 있고"},
                {"verse": 3, "text": "하나님이 이르시되 빛이 있으라 하시니 빛이 있었고"}
            ]}
        ]},
        {"bookShort": "요", "bookName": "요한복음", "testament": 2, "bookNumber": 43, "chapters": [
            {"chapter": 3, "verses": [
                {"verse": 16, "text": "하나님이 세상을 이처럼 사랑하사 독생자를 주셨으니"},
                {"verse": 17, "text": "하나님이 그 아들을 세상에 보내신 것은 세상을 심판하려 하심이 아니요"}
            ]}
        ]},
        {"bookShort": "롬", "bookName": "로마서", "testament": 2, "bookNumber": 45, "chapters": [
            {"chapter": 5, "verses": [
                {"verse": 8, "text": "우리가 아직 죄인 되었을 때에 그리스도께서 우리를 위하여 죽으심으로 하나님께서 우리에 대한 자기의 사랑을 확증하셨느니라"}
            ]}
        ]}
    ]
}"#;

pub const ASV_JSON: &str = r#"{
    "version": "ASV",
    "books": [
        {"bookShort": "Gen", "bookName": "Genesis", "testament": 1, "bookNumber": 1, "chapters": [
            {"chapter": 1, "verses": [
                {"verse": 1, "text": "In the beginning God created the heavens and the earth."}
            ]}
        ]},
        {"bookShort": "John", "bookName": "John", "testament": 2, "bookNumber": 43, "chapters": [
            {"chapter": 3, "verses": [
                {"verse": 16, "text": "For God so loved the world, that he gave his only begotten Son"}
            ]}
        ]}
    ]
}"#;

/// Verses across both fixture translations
pub const VERSE_COUNT: usize = 8;

/// Thresholds are high so only exact prototype phrasings classify
pub const PROTOTYPES_TOML: &str = r#"
[scope]
none_threshold = 0.9
testament_threshold = 0.9
group_threshold = 0.9
book_threshold = 0.9
none = ["사랑에 대한 말씀"]
book_templates_ko = ["{name}에서 하나님"]
book_templates_en = ["in {name}"]

[[scope.testament]]
testament = "OT"
label = "구약"
triggers = ["구약에서"]
phrases = ["구약에서 하나님"]

[[scope.testament]]
testament = "NT"
label = "신약"
triggers = ["신약에서"]
phrases = ["신약에서 하나님"]

[[scope.group]]
name = "gospels"
label = "사복음서"
books = ["마", "막", "눅", "요"]
triggers = ["복음서에서"]
phrases = ["복음서에서 하나님"]

[intent]
keyword_threshold = 0.9
semantic_threshold = 0.9
hybrid_threshold = 0.9
hybrid_margin = 0.01
short_token_threshold = 6
keyword = ["구절 찾기 키워드"]
semantic = ["의미 검색 문장"]

[[intent.literal_pattern]]
name = "quoted"
pattern = '"([^"]+)"'

[response]
diagram_threshold = 0.9
statistics_threshold = 0.9
context_threshold = 0.9
explanation_threshold = 0.9
diagram_keyword_threshold = 0.4
diagram_keyword_boost = 0.25
diagram_keywords = ["그림"]
diagram = ["그림으로 보여줘"]
explanation = ["자세히 설명해줘"]
statistics = ["몇 번 나와"]
context = ["앞뒤 구절 보여줘"]
list = ["목록으로 보여줘"]

[[book]]
short = "창"
name = "창세기"
english = "Genesis"
testament = "OT"

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
"#;

/// Write the fixture files and return a config pointing at them
pub fn fixture_config(dir: &TempDir) -> Config {
    let krv = write(dir.path(), "krv.json", KRV_JSON);
    let asv = write(dir.path(), "asv.json", ASV_JSON);
    let prototypes = write(dir.path(), "prototypes.toml", PROTOTYPES_TOML);

    let mut config = Config::default();
    config.embedding.model = "hash".to_string();
    config.embedding.dimension = 256;
    config.embedding.batch_size = 3;
    config.index.kind = "flat".to_string();
    config.corpus.translations = vec![
        TranslationSource {
            tag: "KRV".to_string(),
            path: krv,
        },
        TranslationSource {
            tag: "ASV".to_string(),
            path: asv,
        },
    ];
    config.classifier.prototypes_file = Some(prototypes);
    config
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
