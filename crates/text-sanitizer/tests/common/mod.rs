#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use text_sanitizer::document::{DocumentLoader, OutputLayout, TextChunker, TextEncoding};
use text_sanitizer::transform::{
    RateLimiter, RetryPolicy, RetryingInvoker, TextTransformer, TransformOutcome, TransformRequest,
};
use text_sanitizer::utils::error::{Result, SanitizerError};
use text_sanitizer::worker::{ChunkRetryPolicy, FileProcessor};

type Script = dyn Fn(&TransformRequest, usize) -> Result<TransformOutcome> + Send + Sync;

/// Transformer driven by a closure that also sees the running call number
/// (1-based).
pub struct ScriptedTransformer {
    calls: AtomicUsize,
    script: Box<Script>,
}

impl ScriptedTransformer {
    pub fn new(
        script: impl Fn(&TransformRequest, usize) -> Result<TransformOutcome> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Box::new(script),
        })
    }

    pub fn uppercase() -> Arc<Self> {
        Self::new(|req, _| Ok(TransformOutcome::Cleaned(req.text.to_uppercase())))
    }

    pub fn rejecting() -> Arc<Self> {
        Self::new(|_, _| Ok(TransformOutcome::Rejected))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_, _| Err(SanitizerError::ServiceError("503 - overloaded".to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextTransformer for ScriptedTransformer {
    async fn transform(&self, request: TransformRequest) -> Result<TransformOutcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (self.script)(&request, call)
    }
}

pub struct Workspace {
    pub dir: TempDir,
    pub layout: OutputLayout,
}

impl Workspace {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("cleaned_text"), dir.path().join("processing_logs"));
        layout.prepare().await.unwrap();
        Self { dir, layout }
    }

    pub fn write_input(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn read_output(&self, doc_id: &str) -> String {
        std::fs::read_to_string(self.layout.cleaned_path(doc_id)).unwrap()
    }

    pub fn log_path(&self, doc_id: &str) -> PathBuf {
        self.layout.log_path(doc_id)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

pub fn processor(
    transformer: Arc<dyn TextTransformer>,
    layout: &OutputLayout,
    chunk_size: usize,
    chunk_retry: ChunkRetryPolicy,
) -> FileProcessor {
    let limiter = Arc::new(RateLimiter::new(999, std::time::Duration::from_secs(60)));
    let invoker = RetryingInvoker::new(transformer, limiter, RetryPolicy::default());

    FileProcessor::new(
        Arc::new(DocumentLoader::new(vec![TextEncoding::Utf8])),
        TextChunker::new(chunk_size),
        invoker,
        layout.clone(),
        chunk_retry,
    )
}
