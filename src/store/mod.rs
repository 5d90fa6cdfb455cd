//! Data-access seam. Persistence itself is an external concern; handlers
//! only see this trait and receive fully materialized entities.

pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Entry, Habit, HabitStatus, HabitType, Tag};
use crate::sorting::SortField;

pub use memory::MemoryStore;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct HabitFilter {
    pub search: Option<String>,
    pub habit_type: Option<HabitType>,
    pub status: Option<HabitStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub habit_id: Option<String>,
}

#[async_trait]
pub trait DataStore: Send + Sync {
    // Habits
    async fn list_habits(
        &self,
        filter: &HabitFilter,
        sort: &[SortField],
        page: usize,
        page_size: usize,
    ) -> Page<Habit>;
    async fn get_habit(&self, id: &str) -> Result<Habit, StoreError>;
    async fn insert_habit(&self, habit: Habit) -> Result<(), StoreError>;
    async fn update_habit(&self, habit: Habit) -> Result<(), StoreError>;
    async fn delete_habit(&self, id: &str) -> Result<(), StoreError>;

    // Tags
    async fn list_tags(&self, sort: &[SortField], page: usize, page_size: usize) -> Page<Tag>;
    async fn get_tag(&self, id: &str) -> Result<Tag, StoreError>;
    async fn insert_tag(&self, tag: Tag) -> Result<(), StoreError>;
    async fn update_tag(&self, tag: Tag) -> Result<(), StoreError>;
    async fn delete_tag(&self, id: &str) -> Result<(), StoreError>;
    /// Names for a set of tag ids, sorted; unknown ids are skipped.
    async fn tag_names(&self, ids: &HashSet<String>) -> Vec<String>;
    /// Which of the given ids exist.
    async fn existing_tag_ids(&self, ids: &HashSet<String>) -> HashSet<String>;

    // Entries
    async fn list_entries(
        &self,
        filter: &EntryFilter,
        sort: &[SortField],
        page: usize,
        page_size: usize,
    ) -> Page<Entry>;
    async fn get_entry(&self, id: &str) -> Result<Entry, StoreError>;
    async fn insert_entry(&self, entry: Entry) -> Result<(), StoreError>;
    async fn update_entry(&self, entry: Entry) -> Result<(), StoreError>;
    async fn delete_entry(&self, id: &str) -> Result<(), StoreError>;

    // GitHub personal access tokens, keyed by identity id
    async fn set_github_pat(&self, identity_id: &str, token: String);
    async fn get_github_pat(&self, identity_id: &str) -> Option<String>;
    async fn delete_github_pat(&self, identity_id: &str) -> Result<(), StoreError>;
}
