pub mod links;
pub mod routes;

pub use links::{CollectionContext, Link, LinkService, LinkState};
pub use routes::RouteName;
