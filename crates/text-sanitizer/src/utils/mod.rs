pub mod error;
pub mod logger;
pub mod metrics;

pub use error::{Result, SanitizerError};
pub use metrics::{Metrics, Timer};
