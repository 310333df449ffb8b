pub mod query;
pub mod site;
pub mod wire;

pub use query::{DateSpec, Dimension, OutputFormat, QueryRequest, ResolvedRange};
pub use site::{SiteId, SiteIdError};
pub use wire::{
    AnalyticsRow, DimensionFilter, FilterGroup, FilterOperator, SearchAnalyticsQuery,
    SearchAnalyticsResponse,
};
