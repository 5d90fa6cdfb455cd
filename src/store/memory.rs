//! In-memory data store. Applies compiled sort fields with a stable
//! multi-key sort, so it honors the same ordering contract a relational
//! backend would get from the generated ORDER BY clause.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::models::{Entry, Habit, Tag};
use crate::sorting::{SortDirection, SortField};

use super::{DataStore, EntryFilter, HabitFilter, Page, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    habits: RwLock<HashMap<String, Habit>>,
    tags: RwLock<HashMap<String, Tag>>,
    entries: RwLock<HashMap<String, Entry>>,
    github_pats: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Total order over JSON scalar values: null < bool < number < string.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Bool(_), _) => Ordering::Less,
        (_, Value::Bool(_)) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn sort_and_page<T, F>(mut items: Vec<T>, sort: &[SortField], page: usize, page_size: usize, value_of: F) -> Page<T>
where
    F: Fn(&T, &str) -> Value,
{
    if !sort.is_empty() {
        // Stable sort: duplicate sort tokens become no-ops
        items.sort_by(|a, b| {
            for field in sort {
                let ordering = compare_values(
                    &value_of(a, field.expression),
                    &value_of(b, field.expression),
                );
                let ordering = match field.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    let total_count = items.len();
    let items = items
        .into_iter()
        .skip((page.saturating_sub(1)) * page_size)
        .take(page_size)
        .collect();
    Page { items, total_count }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list_habits(
        &self,
        filter: &HabitFilter,
        sort: &[SortField],
        page: usize,
        page_size: usize,
    ) -> Page<Habit> {
        let habits = self.habits.read().await;
        let matches: Vec<Habit> = habits
            .values()
            .filter(|habit| {
                if let Some(search) = &filter.search {
                    let needle = search.to_lowercase();
                    let in_name = habit.name.to_lowercase().contains(&needle);
                    let in_description = habit
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle));
                    if !in_name && !in_description {
                        return false;
                    }
                }
                if filter.habit_type.is_some_and(|t| t != habit.habit_type) {
                    return false;
                }
                if filter.status.is_some_and(|s| s != habit.status) {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        sort_and_page(matches, sort, page, page_size, |habit, expr| habit.storage_value(expr))
    }

    async fn get_habit(&self, id: &str) -> Result<Habit, StoreError> {
        self.habits
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Habit '{}' not found", id)))
    }

    async fn insert_habit(&self, habit: Habit) -> Result<(), StoreError> {
        self.habits.write().await.insert(habit.id.clone(), habit);
        Ok(())
    }

    async fn update_habit(&self, habit: Habit) -> Result<(), StoreError> {
        let mut habits = self.habits.write().await;
        if !habits.contains_key(&habit.id) {
            return Err(StoreError::NotFound(format!("Habit '{}' not found", habit.id)));
        }
        habits.insert(habit.id.clone(), habit);
        Ok(())
    }

    async fn delete_habit(&self, id: &str) -> Result<(), StoreError> {
        let removed = self.habits.write().await.remove(id);
        if removed.is_none() {
            return Err(StoreError::NotFound(format!("Habit '{}' not found", id)));
        }
        // Entries for a deleted habit go with it
        self.entries.write().await.retain(|_, entry| entry.habit_id != id);
        Ok(())
    }

    async fn list_tags(&self, sort: &[SortField], page: usize, page_size: usize) -> Page<Tag> {
        let tags: Vec<Tag> = self.tags.read().await.values().cloned().collect();
        sort_and_page(tags, sort, page, page_size, |tag, expr| tag.storage_value(expr))
    }

    async fn get_tag(&self, id: &str) -> Result<Tag, StoreError> {
        self.tags
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Tag '{}' not found", id)))
    }

    async fn insert_tag(&self, tag: Tag) -> Result<(), StoreError> {
        let mut tags = self.tags.write().await;
        if tags.values().any(|t| t.name.eq_ignore_ascii_case(&tag.name)) {
            return Err(StoreError::Conflict(format!("Tag '{}' already exists", tag.name)));
        }
        tags.insert(tag.id.clone(), tag);
        Ok(())
    }

    async fn update_tag(&self, tag: Tag) -> Result<(), StoreError> {
        let mut tags = self.tags.write().await;
        if !tags.contains_key(&tag.id) {
            return Err(StoreError::NotFound(format!("Tag '{}' not found", tag.id)));
        }
        if tags
            .values()
            .any(|t| t.id != tag.id && t.name.eq_ignore_ascii_case(&tag.name))
        {
            return Err(StoreError::Conflict(format!("Tag '{}' already exists", tag.name)));
        }
        tags.insert(tag.id.clone(), tag);
        Ok(())
    }

    async fn delete_tag(&self, id: &str) -> Result<(), StoreError> {
        let removed = self.tags.write().await.remove(id);
        if removed.is_none() {
            return Err(StoreError::NotFound(format!("Tag '{}' not found", id)));
        }
        // Detach the tag from any habit still referencing it
        let mut habits = self.habits.write().await;
        for habit in habits.values_mut() {
            habit.tag_ids.remove(id);
        }
        Ok(())
    }

    async fn tag_names(&self, ids: &HashSet<String>) -> Vec<String> {
        let tags = self.tags.read().await;
        let mut names: Vec<String> = ids
            .iter()
            .filter_map(|id| tags.get(id).map(|t| t.name.clone()))
            .collect();
        names.sort();
        names
    }

    async fn existing_tag_ids(&self, ids: &HashSet<String>) -> HashSet<String> {
        let tags = self.tags.read().await;
        ids.iter().filter(|id| tags.contains_key(*id)).cloned().collect()
    }

    async fn list_entries(
        &self,
        filter: &EntryFilter,
        sort: &[SortField],
        page: usize,
        page_size: usize,
    ) -> Page<Entry> {
        let entries: Vec<Entry> = self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| {
                filter
                    .habit_id
                    .as_ref()
                    .map_or(true, |habit_id| &entry.habit_id == habit_id)
            })
            .cloned()
            .collect();
        sort_and_page(entries, sort, page, page_size, |entry, expr| entry.storage_value(expr))
    }

    async fn get_entry(&self, id: &str) -> Result<Entry, StoreError> {
        self.entries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Entry '{}' not found", id)))
    }

    async fn insert_entry(&self, entry: Entry) -> Result<(), StoreError> {
        self.entries.write().await.insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn update_entry(&self, entry: Entry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(&entry.id) {
            return Err(StoreError::NotFound(format!("Entry '{}' not found", entry.id)));
        }
        entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn delete_entry(&self, id: &str) -> Result<(), StoreError> {
        let removed = self.entries.write().await.remove(id);
        if removed.is_none() {
            return Err(StoreError::NotFound(format!("Entry '{}' not found", id)));
        }
        Ok(())
    }

    async fn set_github_pat(&self, identity_id: &str, token: String) {
        self.github_pats.write().await.insert(identity_id.to_string(), token);
    }

    async fn get_github_pat(&self, identity_id: &str) -> Option<String> {
        self.github_pats.read().await.get(identity_id).cloned()
    }

    async fn delete_github_pat(&self, identity_id: &str) -> Result<(), StoreError> {
        let removed = self.github_pats.write().await.remove(identity_id);
        if removed.is_none() {
            return Err(StoreError::NotFound("No stored access token".to_string()));
        }
        Ok(())
    }
}
