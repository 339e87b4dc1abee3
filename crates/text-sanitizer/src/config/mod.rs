pub mod settings;

pub use settings::{
    ChunkRetryConfig, ChunkingConfig, EncodingConfig, OutputConfig, RateLimitConfig, RetryConfig,
    ServiceConfig, Settings, WorkerConfig,
};
