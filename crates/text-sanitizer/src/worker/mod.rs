pub mod log;
pub mod orchestrator;
pub mod processor;
pub mod summary;

pub use log::{ChunkRecord, ProcessingLog, ProcessingStatus};
pub use orchestrator::BatchOrchestrator;
pub use processor::{ChunkRetryPolicy, FileOutcome, FileProcessor};
pub use summary::BatchSummary;

use crate::config::Settings;
use crate::document::{DocumentLoader, OutputLayout, TextChunker};
use crate::transform::{RateLimiter, RetryPolicy, RetryingInvoker, TextTransformer};
use crate::utils::error::Result;
use std::sync::Arc;

/// Wire a batch orchestrator from settings around the given service.
pub fn build_orchestrator(
    settings: &Settings,
    transformer: Arc<dyn TextTransformer>,
    layout: OutputLayout,
) -> Result<BatchOrchestrator> {
    let limiter = Arc::new(RateLimiter::new(
        settings.rate_limit.max_calls,
        settings.rate_limit.period(),
    ));
    let invoker = RetryingInvoker::new(transformer, limiter, RetryPolicy::from(&settings.retry));
    let loader = Arc::new(DocumentLoader::new(settings.encoding.encodings()?));

    let processor = Arc::new(FileProcessor::new(
        loader,
        TextChunker::new(settings.chunking.size),
        invoker,
        layout.clone(),
        ChunkRetryPolicy::from(&settings.chunk_retry),
    ));

    Ok(BatchOrchestrator::new(
        processor,
        layout,
        settings.worker.max_concurrency,
    ))
}
