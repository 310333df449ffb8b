//! Turning a [`QueryRequest`](crate::models::QueryRequest) into backend inputs:
//! the reporting window and the dimension filters.

pub mod dates;
pub mod filters;

pub use dates::resolve_range;
pub use filters::build_filters;

use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("malformed {field} '{value}': expected a calendar date in YYYY-MM-DD form")]
    MalformedDate { field: &'static str, value: String },
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
