pub mod analyze;
pub mod fallback;
pub mod health;
pub mod metrics;
pub mod pages;
pub mod upload;

pub use analyze::analyze_text;
pub use fallback::not_found;
pub use health::{health_check, readiness_check, root};
pub use metrics::metrics_endpoint;
pub use pages::{analyze_page, index_page, upload_page};
pub use upload::upload_document;
