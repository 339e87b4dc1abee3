pub mod anthropic;
pub mod prompt;
pub mod provider;
pub mod rate_limiter;
pub mod retry;

pub use anthropic::AnthropicTransformer;
pub use provider::{TextTransformer, TransformOutcome, TransformRequest};
pub use rate_limiter::RateLimiter;
pub use retry::{RetryPolicy, RetryingInvoker};
