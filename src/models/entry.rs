use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::shaping::{FieldSchema, Shapeable};
use crate::sorting::SortMapping;

/// One tracked completion of a habit on a given day.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: String,
    pub habit_id: String,
    pub value: i32,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn to_dto(&self) -> EntryDto {
        EntryDto {
            id: self.id.clone(),
            habit_id: self.habit_id.clone(),
            value: self.value,
            notes: self.notes.clone(),
            date: self.date,
            created_at_utc: self.created_at_utc,
            updated_at_utc: self.updated_at_utc,
        }
    }

    pub fn storage_value(&self, expression: &str) -> Value {
        match expression {
            "habit_id" => json!(self.habit_id),
            "value" => json!(self.value),
            "date" => json!(self.date),
            "created_at_utc" => json!(self.created_at_utc.to_rfc3339()),
            "updated_at_utc" => json!(self.updated_at_utc.map(|t| t.to_rfc3339())),
            _ => Value::Null,
        }
    }

    pub fn sort_mapping() -> SortMapping {
        SortMapping::new()
            .field("date", "date")
            .field("value", "value")
            .field("createdAtUtc", "created_at_utc")
            .field("updatedAtUtc", "updated_at_utc")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDto {
    pub id: String,
    pub habit_id: String,
    pub value: i32,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
}

static ENTRY_SCHEMA: FieldSchema = FieldSchema::new(&[
    "id",
    "habitId",
    "value",
    "notes",
    "date",
    "createdAtUtc",
    "updatedAtUtc",
]);

impl Shapeable for EntryDto {
    fn schema() -> &'static FieldSchema {
        &ENTRY_SCHEMA
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryDto {
    pub habit_id: String,
    pub value: i32,
    pub notes: Option<String>,
    pub date: NaiveDate,
}

impl CreateEntryDto {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if self.habit_id.trim().is_empty() {
            errors.insert("habitId".to_string(), "Habit id is required".to_string());
        }
        if self.value < 0 {
            errors.insert("value".to_string(), "Value must not be negative".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_entity(&self) -> Entry {
        Entry {
            id: format!("e_{}", Uuid::new_v4()),
            habit_id: self.habit_id.clone(),
            value: self.value,
            notes: self.notes.clone(),
            date: self.date,
            created_at_utc: Utc::now(),
            updated_at_utc: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryDto {
    pub value: i32,
    pub notes: Option<String>,
    pub date: NaiveDate,
}

impl UpdateEntryDto {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if self.value < 0 {
            errors.insert("value".to_string(), "Value must not be negative".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn apply(&self, entry: &mut Entry) {
        entry.value = self.value;
        entry.notes = self.notes.clone();
        entry.date = self.date;
        entry.updated_at_utc = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_values_are_rejected() {
        let dto = CreateEntryDto {
            habit_id: "h_1".to_string(),
            value: -1,
            notes: None,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.contains_key("value"));
    }

    #[test]
    fn entry_ids_carry_the_entry_prefix() {
        let dto = CreateEntryDto {
            habit_id: "h_1".to_string(),
            value: 3,
            notes: None,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };
        assert!(dto.to_entity().id.starts_with("e_"));
    }
}
