//! Application wiring: corpus, embeddings, vector index, engine and sessions
//! assembled from one `Config`.

use crate::config::{parse_duration, Config, IndexConfig};
use crate::corpus::{BibleCorpus, CorpusIndex};
use crate::embedding::{
    build_provider, CorpusIndexer, EmbeddingProvider, FlatVectorIndex, HnswVectorIndex,
    IndexingReport, VectorIndex,
};
use crate::error::{Result, VersewiseError};
use crate::retrieval::{render_search_result, RetrievalEngine, SearchOptions, SearchResult};
use crate::session::{SessionStore, SharedMemory};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Fully assembled search application
pub struct App {
    config: Config,
    corpus: Arc<BibleCorpus>,
    engine: RetrievalEngine,
    sessions: SessionStore,
    indexing: IndexingReport,
}

impl App {
    /// Load the corpus and embedding model named by `config` and index the corpus
    pub fn new(config: Config) -> Result<Self> {
        let corpus = BibleCorpus::load(&config.corpus.resolved_translations())?;
        let provider = build_provider(&config.embedding.model, config.embedding.dimension)?;
        Self::from_parts(config, corpus, provider)
    }

    /// Assemble from an already loaded corpus and provider
    pub fn from_parts(
        config: Config,
        corpus: BibleCorpus,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let start = std::time::Instant::now();
        let registry = config.classifier.load_registry()?;

        let mut index = build_vector_index(&config.index, provider.dimension(), corpus.len())?;
        let indexer = CorpusIndexer::new(provider.clone(), config.embedding.batch_size);
        let indexing = indexer.index(corpus.verses(), &mut *index);

        let corpus = Arc::new(corpus);
        let corpus_index: Arc<dyn CorpusIndex> = corpus.clone();
        let engine = RetrievalEngine::new(
            provider,
            corpus_index,
            Arc::from(index),
            &registry,
            config.search.clone(),
        )?;

        let sessions = SessionStore::from_config(&config.session)?;

        info!(
            "Versewise ready in {}ms: {} verses, {} translations, {} indexed ({} failed)",
            start.elapsed().as_millis(),
            corpus.len(),
            corpus.translations().len(),
            indexing.processed,
            indexing.failed
        );

        Ok(Self {
            config,
            corpus,
            engine,
            sessions,
            indexing,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn corpus(&self) -> &BibleCorpus {
        &self.corpus
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn indexing_report(&self) -> &IndexingReport {
        &self.indexing
    }

    /// Search within a conversation, recording the exchange in its memory
    pub fn ask(&self, session_id: &str, query: &str, options: &SearchOptions) -> SearchResult {
        let memory: SharedMemory = self.sessions.get_or_create(session_id);
        let result = self.engine.search(query, options);

        match memory.lock() {
            Ok(mut memory) => {
                memory.add_user(query);
                memory.add_assistant(render_search_result(&result));
            }
            Err(_) => warn!(
                "Session '{}' memory is poisoned; exchange not recorded",
                session_id
            ),
        }
        result
    }

    /// Start evicting idle sessions at the configured interval
    pub fn spawn_session_sweeper(&self) -> Result<JoinHandle<()>> {
        let interval = sweep_interval(&self.config)?;
        Ok(self.sessions.spawn_sweeper(interval))
    }
}

fn sweep_interval(config: &Config) -> Result<Duration> {
    parse_duration(&config.session.sweep_interval).map_err(|message| {
        VersewiseError::InvalidConfigValue {
            path: "session.sweep_interval".to_string(),
            message,
        }
    })
}

/// Empty vector index of the configured kind
pub fn build_vector_index(
    config: &IndexConfig,
    dimension: usize,
    capacity: usize,
) -> Result<Box<dyn VectorIndex>> {
    match config.kind.as_str() {
        "flat" => Ok(Box::new(FlatVectorIndex::new(dimension))),
        "hnsw" => Ok(Box::new(HnswVectorIndex::new(
            dimension,
            capacity.max(1),
            config.hnsw_m,
            config.hnsw_ef_construction,
            config.hnsw_ef_search,
        )?)),
        other => Err(VersewiseError::InvalidConfigValue {
            path: "index.kind".to_string(),
            message: format!("Unknown index kind '{}'", other),
        }),
    }
}
