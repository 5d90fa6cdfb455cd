use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SortError {
    #[error("The provided sort parameter isn't valid: '{0}'")]
    InvalidSortField(String),

    #[error("No sort mapping registered for resource type '{0}'")]
    UnknownResourceType(String),

    #[error("Sort mapping for resource type '{0}' is already registered")]
    DuplicateRegistration(String),
}
