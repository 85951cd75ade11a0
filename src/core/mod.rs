pub mod dedupe;
pub mod etl;
pub mod extractor;
pub mod filter;
pub mod harvest;
pub mod listing_pipeline;
pub mod query_pipeline;

pub use crate::domain::model::{ListingRecord, QueryResult, Record};
pub use crate::domain::ports::{PageSource, Pipeline, QuerySource, Storage};
pub use crate::utils::error::Result;
