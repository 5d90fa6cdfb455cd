pub mod github;

pub use github::{GitHubService, GitHubUserProfileDto};
