use crate::config::ChunkRetryConfig;
use crate::document::{document_id, ChunkStore, DocumentLoader, OutputLayout, TextChunker};
use crate::transform::RetryingInvoker;
use crate::utils::error::{Result, SanitizerError};
use crate::utils::Timer;
use crate::worker::log::{ChunkRecord, LogBuilder, ProcessingStatus};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// What to do when a chunk still fails after the invoker's own retries.
#[derive(Debug, Clone)]
pub struct ChunkRetryPolicy {
    pub pause: Duration,
    /// `None` keeps retrying the same chunk until it succeeds
    pub max_attempts: Option<u32>,
}

impl Default for ChunkRetryPolicy {
    fn default() -> Self {
        Self::from(&ChunkRetryConfig::default())
    }
}

impl From<&ChunkRetryConfig> for ChunkRetryPolicy {
    fn from(config: &ChunkRetryConfig) -> Self {
        Self {
            pause: Duration::from_secs(config.pause_seconds),
            max_attempts: config.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Chunking,
    PersistingChunks,
    Transforming,
    Recombining,
}

/// Result handed back to the orchestrator; errors never cross this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub doc_id: String,
    pub status: ProcessingStatus,
    pub cleaned_chunks: usize,
    pub total_chunks: usize,
}

pub struct FileProcessor {
    loader: Arc<DocumentLoader>,
    chunker: TextChunker,
    invoker: RetryingInvoker,
    layout: OutputLayout,
    chunk_retry: ChunkRetryPolicy,
}

impl FileProcessor {
    pub fn new(
        loader: Arc<DocumentLoader>,
        chunker: TextChunker,
        invoker: RetryingInvoker,
        layout: OutputLayout,
        chunk_retry: ChunkRetryPolicy,
    ) -> Self {
        Self {
            loader,
            chunker,
            invoker,
            layout,
            chunk_retry,
        }
    }

    /// Run one document through chunk → transform → persist → recombine.
    ///
    /// Chunks are transformed strictly in index order, one at a time. The
    /// processing log is written exactly once on every exit path.
    pub async fn process(&self, path: &Path) -> FileOutcome {
        let doc_id = document_id(path);
        info!("📄 Starting to process file: {:?}", path);

        let timer = Timer::new();
        let mut log = LogBuilder::start(&doc_id);

        let status = match self.run(path, &doc_id, &mut log).await {
            Ok(()) => {
                info!("✅ Finished processing file: {:?}", path);
                ProcessingStatus::Completed
            }
            Err(e) => {
                error!("❌ Error processing {:?}: {}", path, e);
                log.push_error(e.to_string());
                ProcessingStatus::Failed
            }
        };

        let log = log.finish(status, timer.elapsed());
        if let Err(e) = log.write(&self.layout.log_path(&doc_id)).await {
            error!("Failed to write processing log for {}: {}", doc_id, e);
        }

        FileOutcome {
            doc_id,
            status,
            cleaned_chunks: log.cleaned_chunks,
            total_chunks: log.total_chunks,
        }
    }

    async fn run(&self, path: &Path, doc_id: &str, log: &mut LogBuilder) -> Result<()> {
        let store = self.layout.chunk_store(doc_id);

        self.enter(doc_id, Stage::Chunking);
        let text = self.loader.read_with_fallback(path).await?;
        let chunks = self.chunker.chunk(&text);
        let total = chunks.len();
        log.set_total_chunks(total);

        self.enter(doc_id, Stage::PersistingChunks);
        store.create().await?;
        info!("Generating {} chunks for {}", total, doc_id);
        for chunk in &chunks {
            store.write(chunk.index, &chunk.content).await?;
        }

        self.enter(doc_id, Stage::Transforming);
        for index in 1..=total {
            self.transform_with_retry(&store, doc_id, index, total, log).await?;
        }

        self.enter(doc_id, Stage::Recombining);
        let cleaned_text = store.combine(total).await?;
        let output = self.layout.cleaned_path(doc_id);
        tokio::fs::write(&output, cleaned_text).await?;
        info!("Wrote combined cleaned text to {:?}", output);

        Ok(())
    }

    async fn transform_with_retry(
        &self,
        store: &ChunkStore,
        doc_id: &str,
        index: usize,
        total: usize,
        log: &mut LogBuilder,
    ) -> Result<()> {
        let mut failures: u32 = 0;

        loop {
            match self.transform_chunk(store, index, total).await {
                Ok(record) => {
                    info!(
                        "Chunk {} of {} processed {}",
                        index,
                        doc_id,
                        if record.cleaned {
                            "and cleaned"
                        } else {
                            "but not cleaned due to content filter"
                        }
                    );
                    log.record_chunk(record);
                    return Ok(());
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    error!("Error processing chunk {} of {}: {}", index, doc_id, e);
                    log.push_error(format!("Chunk {}: {}", index, e));

                    if let Some(max) = self.chunk_retry.max_attempts {
                        if failures >= max {
                            return Err(SanitizerError::ChunkRetriesExhausted {
                                chunk: index,
                                attempts: failures,
                                last_error: e.to_string(),
                            });
                        }
                    }

                    sleep(self.chunk_retry.pause).await;
                }
            }
        }
    }

    async fn transform_chunk(&self, store: &ChunkStore, index: usize, total: usize) -> Result<ChunkRecord> {
        let original = store.read(index).await?;
        let (cleaned, was_cleaned) = self.invoker.invoke(&original, index, total).await?;

        store.write(index, &format!("{}\n\n", cleaned)).await?;

        Ok(ChunkRecord {
            chunk_number: index,
            original_length: original.chars().count(),
            cleaned_length: cleaned.chars().count(),
            cleaned: was_cleaned,
        })
    }

    fn enter(&self, doc_id: &str, stage: Stage) {
        debug!("{}: entering {:?}", doc_id, stage);
    }
}
