/// Batch embedding of the corpus into a vector index
use super::{EmbeddingError, EmbeddingProvider, VectorIndex};
use crate::corpus::{Verse, VerseSegment};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of an indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingReport {
    pub processed: usize,
    pub failed: usize,
    /// Verses with blank text, never embedded
    pub skipped: usize,
    pub duration_ms: u64,
}

/// Embeds verses in chunks and stores them as segments
///
/// A failed chunk is logged and counted; the rest of the run continues.
pub struct CorpusIndexer {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl CorpusIndexer {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
        }
    }

    pub fn index(&self, verses: &[Verse], index: &mut dyn VectorIndex) -> IndexingReport {
        let start = std::time::Instant::now();

        let segments: Vec<String> = verses
            .iter()
            .filter(|v| !v.text.trim().is_empty())
            .map(|v| VerseSegment::from_verse(v).to_string())
            .collect();
        let skipped = verses.len() - segments.len();

        info!(
            "Indexing {} verses with {} (batch size {})",
            segments.len(),
            self.provider.model_name(),
            self.batch_size
        );

        let mut processed = 0;
        let mut failed = 0;

        for chunk in segments.chunks(self.batch_size) {
            match self.index_chunk(chunk, index) {
                Ok(count) => {
                    processed += count;
                    debug!("Indexed chunk of {} segments", count);
                }
                Err(e) => {
                    warn!("Failed to index chunk starting at {:?}: {}", chunk.first(), e);
                    failed += chunk.len();
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Indexing complete: {} processed, {} failed, {} skipped, {}ms",
            processed, failed, skipped, duration_ms
        );

        IndexingReport {
            processed,
            failed,
            skipped,
            duration_ms,
        }
    }

    fn index_chunk(
        &self,
        chunk: &[String],
        index: &mut dyn VectorIndex,
    ) -> Result<usize, EmbeddingError> {
        let embeddings = self.provider.embed_batch(chunk)?;

        if embeddings.len() != chunk.len() {
            return Err(EmbeddingError::GenerationError(format!(
                "Embedding count mismatch: expected {}, got {}",
                chunk.len(),
                embeddings.len()
            )));
        }

        for (text, embedding) in chunk.iter().zip(embeddings.iter()) {
            index
                .insert(text.clone(), embedding)
                .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;
        }

        Ok(chunk.len())
    }
}
