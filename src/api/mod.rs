pub mod media_type;
pub mod pagination;

pub use media_type::{ApiVersion, NegotiatedMedia};
pub use pagination::{collection_body, PageMeta};
