use crate::config::{parse_duration, Config, SCHEMA_VERSION};
use crate::error::{Result, ValidationError, VersewiseError};
use std::collections::HashSet;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting every problem at once
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_index(config, &mut errors);
        Self::validate_search(config, &mut errors);
        Self::validate_corpus(config, &mut errors);
        Self::validate_session(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(VersewiseError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.model.trim().is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.embedding.dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.dimension",
                "Dimension must be greater than 0",
            ));
        }
    }

    fn validate_index(config: &Config, errors: &mut Vec<ValidationError>) {
        let kind = &config.index.kind;
        if kind != "hnsw" && kind != "flat" {
            errors.push(ValidationError::new(
                "index.kind",
                format!("Index kind must be 'hnsw' or 'flat', got '{}'", kind),
            ));
        }

        if config.index.hnsw_m == 0 {
            errors.push(ValidationError::new(
                "index.hnsw_m",
                "HNSW M must be greater than 0",
            ));
        }

        if config.index.hnsw_ef_construction == 0 {
            errors.push(ValidationError::new(
                "index.hnsw_ef_construction",
                "HNSW ef_construction must be greater than 0",
            ));
        }

        if config.index.hnsw_ef_search == 0 {
            errors.push(ValidationError::new(
                "index.hnsw_ef_search",
                "HNSW ef_search must be greater than 0",
            ));
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        let search = &config.search;

        if search.candidate_count == 0 {
            errors.push(ValidationError::new(
                "search.candidate_count",
                "Candidate count must be greater than 0",
            ));
        }

        if search.result_count == 0 {
            errors.push(ValidationError::new(
                "search.result_count",
                "Result count must be greater than 0",
            ));
        }

        if search.result_count > search.candidate_count {
            errors.push(ValidationError::new(
                "search.result_count",
                format!(
                    "Result count ({}) cannot exceed candidate count ({})",
                    search.result_count, search.candidate_count
                ),
            ));
        }

        if !(0.0..=1.0).contains(&search.min_score) {
            errors.push(ValidationError::new(
                "search.min_score",
                format!("Minimum score must be between 0.0 and 1.0, got {}", search.min_score),
            ));
        }

        if !(-1.0..=1.0).contains(&search.candidate_floor) {
            errors.push(ValidationError::new(
                "search.candidate_floor",
                format!(
                    "Candidate floor must be between -1.0 and 1.0, got {}",
                    search.candidate_floor
                ),
            ));
        }

        if search.default_translation.trim().is_empty() {
            errors.push(ValidationError::new(
                "search.default_translation",
                "Default translation cannot be empty",
            ));
        }
    }

    fn validate_corpus(config: &Config, errors: &mut Vec<ValidationError>) {
        // File existence is checked when the corpus loads; paths may hold `~`
        let translations = &config.corpus.translations;
        if translations.is_empty() {
            errors.push(ValidationError::new(
                "corpus.translations",
                "At least one translation is required",
            ));
        }

        let mut seen = HashSet::new();
        for (i, source) in translations.iter().enumerate() {
            let tag = source.tag.trim();
            if tag.is_empty() {
                errors.push(ValidationError::new(
                    format!("corpus.translations[{}].tag", i),
                    "Translation tag cannot be empty",
                ));
            } else if !seen.insert(tag.to_uppercase()) {
                errors.push(ValidationError::new(
                    format!("corpus.translations[{}].tag", i),
                    format!("Duplicate translation tag: {}", tag),
                ));
            }

            if source.path.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    format!("corpus.translations[{}].path", i),
                    "Translation path cannot be empty",
                ));
            }
        }
    }

    fn validate_session(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.session.max_messages == 0 {
            errors.push(ValidationError::new(
                "session.max_messages",
                "Message window must be greater than 0",
            ));
        }

        for (path, value) in [
            ("session.idle_timeout", &config.session.idle_timeout),
            ("session.sweep_interval", &config.session.sweep_interval),
        ] {
            match parse_duration(value) {
                Ok(d) if d.is_zero() => {
                    errors.push(ValidationError::new(path, "Duration must be greater than 0"));
                }
                Ok(_) => {}
                Err(message) => errors.push(ValidationError::new(path, message)),
            }
        }
    }
}
