pub mod compiler;
pub mod error;
pub mod mapping;

pub use compiler::{compile, to_order_clause, SortDirection, SortField};
pub use error::SortError;
pub use mapping::{SortColumn, SortMapping, SortMappingEntry, SortMappingRegistry};
