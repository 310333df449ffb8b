pub mod search_console;
pub mod trait_def;

pub use search_console::SearchConsoleBackend;
pub use trait_def::{AnalyticsBackend, BackendError, BackendResult};
