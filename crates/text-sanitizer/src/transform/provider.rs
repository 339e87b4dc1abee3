use crate::utils::error::Result;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub text: String,
    /// 1-based position of the chunk inside its document
    pub position: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    Cleaned(String),
    /// The service declined the text on content-policy grounds
    Rejected,
}

/// The external text-transformation capability.
///
/// Errors returned here are treated as transient by the retrying invoker;
/// policy rejections must be reported as `TransformOutcome::Rejected`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextTransformer: Send + Sync {
    async fn transform(&self, request: TransformRequest) -> Result<TransformOutcome>;
}
