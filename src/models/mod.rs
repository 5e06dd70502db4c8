pub mod filters;
pub mod job;

pub use filters::SearchFilters;
pub use job::{JobRecord, JobSource};
