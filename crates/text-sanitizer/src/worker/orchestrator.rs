use crate::document::OutputLayout;
use crate::utils::{Metrics, Timer};
use crate::worker::log::ProcessingStatus;
use crate::worker::processor::FileProcessor;
use crate::worker::summary::BatchSummary;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub struct BatchOrchestrator {
    processor: Arc<FileProcessor>,
    layout: OutputLayout,
    max_concurrency: Option<usize>,
}

impl BatchOrchestrator {
    pub fn new(
        processor: Arc<FileProcessor>,
        layout: OutputLayout,
        max_concurrency: Option<usize>,
    ) -> Self {
        Self {
            processor,
            layout,
            max_concurrency,
        }
    }

    /// Process every document in parallel and aggregate the results in
    /// completion order. A failing document never affects the others.
    pub async fn run(&self, inputs: Vec<PathBuf>) -> BatchSummary {
        let total = inputs.len();
        let workers = self.max_concurrency.unwrap_or(total).max(1);
        info!("🚀 Starting batch: {} documents, {} workers", total, workers);

        let timer = Timer::new();
        let metrics = Metrics::new();
        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for path in inputs {
            let processor = self.processor.clone();
            let permits = permits.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so this only waits
                let _permit = permits.acquire_owned().await.ok();
                processor.process(&path).await
            });
        }

        let mut finished = 0usize;
        while let Some(joined) = tasks.join_next().await {
            finished += 1;

            match joined {
                Ok(outcome) => {
                    metrics.add_chunks(outcome.cleaned_chunks as u64, outcome.total_chunks as u64);
                    match outcome.status {
                        ProcessingStatus::Completed => metrics.increment_files_succeeded(),
                        _ => metrics.increment_files_failed(),
                    }
                    info!(
                        "Overall progress: {}/{} ({} {}, {}/{} chunks cleaned)",
                        finished,
                        total,
                        outcome.doc_id,
                        outcome.status,
                        outcome.cleaned_chunks,
                        outcome.total_chunks
                    );
                }
                Err(e) => {
                    error!("Document worker aborted: {}", e);
                    metrics.increment_files_failed();
                }
            }
        }

        let summary = BatchSummary::from_metrics(total, &metrics, timer.elapsed(), &self.layout);

        if summary.failed_files > 0 {
            warn!(
                "{} files failed to process completely. Check the logs for details.",
                summary.failed_files
            );
        }
        info!("🎉 Batch completed: {}/{} documents successful", summary.successful_files, total);

        summary
    }
}
