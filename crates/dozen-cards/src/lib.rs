pub mod model;
pub mod report;

// Re-export commonly used types/functions for consumers
pub use model::{load_source, resolve_source};
pub use report::{build_report, render_text, CardOut, Report};
