//! Configuration management for Versewise
//!
//! TOML file with `VERSEWISE_SECTION__KEY` environment overrides and named
//! profiles. Classifier prototypes live in their own file (see
//! `crate::prototypes`); only its path is configured here.

use crate::corpus::TranslationSource;
use crate::error::{Result, VersewiseError};
use crate::prototypes::PrototypeRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

pub const SCHEMA_VERSION: &str = "1.0.0";

const ENV_PREFIX: &str = "VERSEWISE_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub search: SearchConfig,
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// fastembed model name, or "hash" for the model-free provider
    pub model: String,
    pub batch_size: usize,
    /// Only used by the hash provider
    pub dimension: usize,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// "hnsw" or "flat"
    pub kind: String,
    pub hnsw_m: usize,
    pub hnsw_ef_construction: usize,
    pub hnsw_ef_search: usize,
}

/// Retrieval settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Vector candidates fetched before reranking
    pub candidate_count: usize,
    /// Results returned when the caller does not say
    pub result_count: usize,
    /// Minimum reranked score when the caller does not say
    pub min_score: f32,
    /// Similarity floor for stage-one candidates
    pub candidate_floor: f32,
    /// Translation assumed for stored segments without a tag
    pub default_translation: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_count: 50,
            result_count: 10,
            min_score: 0.3,
            candidate_floor: 0.1,
            default_translation: "KRV".to_string(),
        }
    }
}

/// Corpus files, one per translation; the first is primary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub translations: Vec<TranslationSource>,
}

impl CorpusConfig {
    /// Translation sources with `~` expanded
    pub fn resolved_translations(&self) -> Vec<TranslationSource> {
        self.translations
            .iter()
            .map(|t| TranslationSource {
                tag: t.tag.clone(),
                path: expand_home(&t.path),
            })
            .collect()
    }
}

/// Conversation memory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub max_messages: usize,
    pub idle_timeout: String,
    pub sweep_interval: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_messages: 20,
            idle_timeout: "30m".to_string(),
            sweep_interval: "10m".to_string(),
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Prototype file; the built-in prototypes are used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototypes_file: Option<PathBuf>,
}

impl ClassifierConfig {
    pub fn load_registry(&self) -> Result<PrototypeRegistry> {
        match &self.prototypes_file {
            Some(path) => PrototypeRegistry::from_file(&expand_home(path)),
            None => PrototypeRegistry::builtin(),
        }
    }
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_translation: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VersewiseError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| VersewiseError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| VersewiseError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", parent),
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| VersewiseError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| VersewiseError::Config(format!("Unknown profile: {}", profile)))?;

        if let Some(model) = overrides.embedding_model {
            self.embedding.model = model;
        }
        if let Some(kind) = overrides.index_kind {
            self.index.kind = kind;
        }
        if let Some(min_score) = overrides.min_score {
            self.search.min_score = min_score;
        }
        if let Some(result_count) = overrides.result_count {
            self.search.result_count = result_count;
        }
        if let Some(candidate_count) = overrides.candidate_count {
            self.search.candidate_count = candidate_count;
        }
        if let Some(translation) = overrides.default_translation {
            self.search.default_translation = translation;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: VERSEWISE_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// Apply `VERSEWISE_SECTION__KEY` style pairs; other keys are ignored
    pub fn apply_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "EMBEDDING__MODEL" => self.embedding.model = value.to_string(),
            "EMBEDDING__BATCH_SIZE" => self.embedding.batch_size = parse_value(path, value)?,
            "EMBEDDING__DIMENSION" => self.embedding.dimension = parse_value(path, value)?,
            "INDEX__KIND" => self.index.kind = value.to_string(),
            "INDEX__HNSW_EF_SEARCH" => self.index.hnsw_ef_search = parse_value(path, value)?,
            "SEARCH__CANDIDATE_COUNT" => self.search.candidate_count = parse_value(path, value)?,
            "SEARCH__RESULT_COUNT" => self.search.result_count = parse_value(path, value)?,
            "SEARCH__MIN_SCORE" => self.search.min_score = parse_value(path, value)?,
            "SEARCH__CANDIDATE_FLOOR" => self.search.candidate_floor = parse_value(path, value)?,
            "SEARCH__DEFAULT_TRANSLATION" => {
                self.search.default_translation = value.to_string();
            }
            "SESSION__MAX_MESSAGES" => self.session.max_messages = parse_value(path, value)?,
            "SESSION__IDLE_TIMEOUT" => self.session.idle_timeout = value.to_string(),
            "SESSION__SWEEP_INTERVAL" => self.session.sweep_interval = value.to_string(),
            "CLASSIFIER__PROTOTYPES_FILE" => {
                self.classifier.prototypes_file = Some(PathBuf::from(value));
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            VersewiseError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("versewise").join("config.toml"))
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| VersewiseError::Config("Cannot determine home directory".to_string()))?;

        Ok(home_dir.join(".versewise"))
    }
}

impl Default for Config {
    fn default() -> Self {
        let corpus_dir = PathBuf::from("~/.versewise/corpus");

        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            embedding: EmbeddingConfig {
                model: "all-MiniLM-L6-v2-q".to_string(),
                batch_size: 32,
                dimension: 384,
            },
            index: IndexConfig {
                kind: "hnsw".to_string(),
                hnsw_m: 16,
                hnsw_ef_construction: 200,
                hnsw_ef_search: 64,
            },
            search: SearchConfig::default(),
            corpus: CorpusConfig {
                translations: vec![
                    TranslationSource {
                        tag: "KRV".to_string(),
                        path: corpus_dir.join("krv.json"),
                    },
                    TranslationSource {
                        tag: "ASV".to_string(),
                        path: corpus_dir.join("asv.json"),
                    },
                ],
            },
            session: SessionConfig::default(),
            classifier: ClassifierConfig::default(),
            profiles: HashMap::new(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| VersewiseError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}'", value),
        })
}

/// Parse durations like "500ms", "30s", "10m", "1h"; a bare number means seconds
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let value: u64 = number
        .parse()
        .map_err(|_| format!("Invalid duration: '{}'", s))?;

    match unit.trim() {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        other => Err(format!("Unknown duration unit '{}' in '{}'", other, s)),
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_round_trips_through_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = Config::default();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.search, config.search);
        assert_eq!(loaded.corpus.translations, config.corpus.translations);
        assert_eq!(loaded.session.max_messages, 20);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/versewise.toml")).unwrap_err();
        assert!(matches!(err, VersewiseError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_optional_sections_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[_meta]
schema_version = "1.0.0"

[embedding]
model = "hash"
batch_size = 8
dimension = 64

[index]
kind = "flat"
hnsw_m = 16
hnsw_ef_construction = 200
hnsw_ef_search = 64

[search]
candidate_count = 20
result_count = 5
min_score = 0.4
candidate_floor = 0.1
default_translation = "KRV"

[[corpus.translations]]
tag = "KRV"
path = "krv.json"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.session.idle_timeout, "30m");
        assert!(config.classifier.prototypes_file.is_none());
        assert!(config.profiles.is_empty());
        assert_eq!(config.search.result_count, 5);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(vec![
            ("VERSEWISE_SEARCH__MIN_SCORE".to_string(), "0.55".to_string()),
            ("VERSEWISE_EMBEDDING__MODEL".to_string(), "hash".to_string()),
            ("VERSEWISE_SEARCH__RESULT_COUNT".to_string(), "many".to_string()),
            ("OTHER_SEARCH__MIN_SCORE".to_string(), "0.9".to_string()),
        ]);

        assert_eq!(config.search.min_score, 0.55);
        assert_eq!(config.embedding.model, "hash");
        // Unparseable override is skipped
        assert_eq!(config.search.result_count, 10);
    }

    #[test]
    fn test_apply_profile() {
        let mut config = Config::default();
        config.profiles.insert(
            "offline".to_string(),
            ProfileOverrides {
                embedding_model: Some("hash".to_string()),
                index_kind: Some("flat".to_string()),
                min_score: Some(0.2),
                ..ProfileOverrides::default()
            },
        );

        config.apply_profile("offline").unwrap();
        assert_eq!(config.embedding.model, "hash");
        assert_eq!(config.index.kind, "flat");
        assert_eq!(config.search.min_score, 0.2);

        assert!(config.apply_profile("missing").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30m"), Ok(Duration::from_secs(1800)));
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(7200)));
        assert_eq!(parse_duration("45"), Ok(Duration::from_secs(45)));
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("5 days").is_err());
    }

    #[test]
    fn test_builtin_registry_when_unset() {
        let registry = ClassifierConfig::default().load_registry().unwrap();
        assert_eq!(registry.books.len(), 66);
    }
}
