pub mod analyze;

pub use analyze::{AnalyzeForm, AnalyzeRequest, PageParams};
