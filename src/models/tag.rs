use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::shaping::{FieldSchema, Shapeable};
use crate::sorting::SortMapping;

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
}

impl Tag {
    pub fn to_dto(&self) -> TagDto {
        TagDto {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            created_at_utc: self.created_at_utc,
            updated_at_utc: self.updated_at_utc,
        }
    }

    pub fn storage_value(&self, expression: &str) -> Value {
        match expression {
            "name" => json!(self.name),
            "description" => json!(self.description),
            "created_at_utc" => json!(self.created_at_utc.to_rfc3339()),
            "updated_at_utc" => json!(self.updated_at_utc.map(|t| t.to_rfc3339())),
            _ => Value::Null,
        }
    }

    pub fn sort_mapping() -> SortMapping {
        SortMapping::new()
            .field("name", "name")
            .field("description", "description")
            .field("createdAtUtc", "created_at_utc")
            .field("updatedAtUtc", "updated_at_utc")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
}

static TAG_SCHEMA: FieldSchema =
    FieldSchema::new(&["id", "name", "description", "createdAtUtc", "updatedAtUtc"]);

impl Shapeable for TagDto {
    fn schema() -> &'static FieldSchema {
        &TAG_SCHEMA
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagDto {
    pub name: String,
    pub description: Option<String>,
}

impl CreateTagDto {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        validate_tag(&self.name, self.description.as_deref())
    }

    pub fn to_entity(&self) -> Tag {
        Tag {
            id: format!("t_{}", Uuid::new_v4()),
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            created_at_utc: Utc::now(),
            updated_at_utc: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagDto {
    pub name: String,
    pub description: Option<String>,
}

impl UpdateTagDto {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        validate_tag(&self.name, self.description.as_deref())
    }

    pub fn apply(&self, tag: &mut Tag) {
        tag.name = self.name.trim().to_string();
        tag.description = self.description.clone();
        tag.updated_at_utc = Some(Utc::now());
    }
}

fn validate_tag(name: &str, description: Option<&str>) -> Result<(), HashMap<String, String>> {
    let mut errors = HashMap::new();
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    } else if trimmed.len() < 3 {
        errors.insert("name".to_string(), "Name must be at least 3 characters".to_string());
    } else if trimmed.len() > 10 {
        errors.insert("name".to_string(), "Name must be at most 10 characters".to_string());
    }
    if description.is_some_and(|d| d.len() > 50) {
        errors.insert(
            "description".to_string(),
            "Description must be at most 50 characters".to_string(),
        );
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
