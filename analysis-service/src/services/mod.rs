pub mod analyzer;
pub mod executor;
pub mod extractor;
pub mod metrics;
pub mod parser;
pub mod prompt;
pub mod providers;
pub mod uploads;
pub mod validation;

pub use analyzer::Analyzer;
pub use metrics::{get_metrics, init_metrics, record_analysis};
pub use uploads::TempUpload;
