use std::collections::HashMap;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::shaping::{FieldSchema, Shapeable};
use crate::sorting::{SortColumn, SortMapping};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    Binary,
    Measurable,
}

impl HabitType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "binary" => Some(HabitType::Binary),
            "measurable" => Some(HabitType::Measurable),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            HabitType::Binary => "binary",
            HabitType::Measurable => "measurable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    Ongoing,
    Completed,
}

impl HabitStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ongoing" => Some(HabitStatus::Ongoing),
            "completed" => Some(HabitStatus::Completed),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            HabitStatus::Ongoing => "ongoing",
            HabitStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyType {
    Daily,
    Weekly,
    Monthly,
}

impl FrequencyType {
    fn as_str(self) -> &'static str {
        match self {
            FrequencyType::Daily => "daily",
            FrequencyType::Weekly => "weekly",
            FrequencyType::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frequency {
    #[serde(rename = "type")]
    pub kind: FrequencyType,
    pub times_per_period: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub value: i32,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub target: i32,
    pub current: i32,
}

/// Canonical habit entity as held by the data layer.
#[derive(Debug, Clone)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub habit_type: HabitType,
    pub frequency: Frequency,
    pub target: Target,
    pub status: HabitStatus,
    pub is_archived: bool,
    pub end_date: Option<NaiveDate>,
    pub milestone: Option<Milestone>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
    pub last_completed_at_utc: Option<DateTime<Utc>>,
    pub tag_ids: HashSet<String>,
}

impl Habit {
    pub fn to_dto(&self, tags: Vec<String>) -> HabitDto {
        HabitDto {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            habit_type: self.habit_type,
            frequency: self.frequency.clone(),
            target: self.target.clone(),
            status: self.status,
            is_archived: self.is_archived,
            end_date: self.end_date,
            milestone: self.milestone.clone(),
            created_at_utc: self.created_at_utc,
            updated_at_utc: self.updated_at_utc,
            last_completed_at_utc: self.last_completed_at_utc,
            tags,
        }
    }

    pub fn to_dto_v2(&self, tags: Vec<String>) -> HabitDtoV2 {
        HabitDtoV2 {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            habit_type: self.habit_type,
            frequency: self.frequency.clone(),
            target: self.target.clone(),
            status: self.status,
            is_archived: self.is_archived,
            end_date: self.end_date,
            milestone: self.milestone.clone(),
            created_at: self.created_at_utc,
            updated_at: self.updated_at_utc,
            last_completed_at: self.last_completed_at_utc,
            tags,
        }
    }

    /// Value of one registered storage expression, for in-memory ordering.
    pub fn storage_value(&self, expression: &str) -> Value {
        match expression {
            "name" => json!(self.name),
            "description" => json!(self.description),
            "type" => json!(self.habit_type.as_str()),
            "status" => json!(self.status.as_str()),
            "end_date" => json!(self.end_date),
            "frequency_type" => json!(self.frequency.kind.as_str()),
            "frequency_times_per_period" => json!(self.frequency.times_per_period),
            "created_at_utc" => json!(self.created_at_utc.to_rfc3339()),
            "updated_at_utc" => json!(self.updated_at_utc.map(|t| t.to_rfc3339())),
            "last_completed_at_utc" => json!(self.last_completed_at_utc.map(|t| t.to_rfc3339())),
            _ => Value::Null,
        }
    }

    /// Public sort keys exposed for habits.
    pub fn sort_mapping() -> SortMapping {
        SortMapping::new()
            .field("name", "name")
            .field("description", "description")
            .field("type", "type")
            .field("status", "status")
            .field("endDate", "end_date")
            .field("createdAtUtc", "created_at_utc")
            .field("updatedAtUtc", "updated_at_utc")
            .field("lastCompletedAtUtc", "last_completed_at_utc")
            .compound(
                "frequency",
                vec![
                    SortColumn::new("frequency_type"),
                    SortColumn::new("frequency_times_per_period"),
                ],
            )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub frequency: Frequency,
    pub target: Target,
    pub status: HabitStatus,
    pub is_archived: bool,
    pub end_date: Option<NaiveDate>,
    pub milestone: Option<Milestone>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: Option<DateTime<Utc>>,
    pub last_completed_at_utc: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

static HABIT_SCHEMA: FieldSchema = FieldSchema::new(&[
    "id",
    "name",
    "description",
    "type",
    "frequency",
    "target",
    "status",
    "isArchived",
    "endDate",
    "milestone",
    "createdAtUtc",
    "updatedAtUtc",
    "lastCompletedAtUtc",
    "tags",
]);

impl Shapeable for HabitDto {
    fn schema() -> &'static FieldSchema {
        &HABIT_SCHEMA
    }
}

/// v2 representation: timestamp fields drop the `Utc` suffix.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDtoV2 {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub frequency: Frequency,
    pub target: Target,
    pub status: HabitStatus,
    pub is_archived: bool,
    pub end_date: Option<NaiveDate>,
    pub milestone: Option<Milestone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

static HABIT_SCHEMA_V2: FieldSchema = FieldSchema::new(&[
    "id",
    "name",
    "description",
    "type",
    "frequency",
    "target",
    "status",
    "isArchived",
    "endDate",
    "milestone",
    "createdAt",
    "updatedAt",
    "lastCompletedAt",
    "tags",
]);

impl Shapeable for HabitDtoV2 {
    fn schema() -> &'static FieldSchema {
        &HABIT_SCHEMA_V2
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMilestoneDto {
    pub target: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitDto {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub frequency: Frequency,
    pub target: Target,
    pub end_date: Option<NaiveDate>,
    pub milestone: Option<UpsertMilestoneDto>,
}

impl CreateHabitDto {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        validate_common(
            &self.name,
            &self.frequency,
            &self.target,
            self.milestone.as_ref(),
            &mut errors,
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_entity(&self) -> Habit {
        Habit {
            id: format!("h_{}", Uuid::new_v4()),
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            habit_type: self.habit_type,
            frequency: self.frequency.clone(),
            target: self.target.clone(),
            status: HabitStatus::Ongoing,
            is_archived: false,
            end_date: self.end_date,
            // Milestone progress always starts at zero
            milestone: self
                .milestone
                .as_ref()
                .map(|m| Milestone { target: m.target, current: 0 }),
            created_at_utc: Utc::now(),
            updated_at_utc: None,
            last_completed_at_utc: None,
            tag_ids: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitDto {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub frequency: Frequency,
    pub target: Target,
    pub end_date: Option<NaiveDate>,
    pub milestone: Option<UpsertMilestoneDto>,
}

impl UpdateHabitDto {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        validate_common(
            &self.name,
            &self.frequency,
            &self.target,
            self.milestone.as_ref(),
            &mut errors,
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn apply(&self, habit: &mut Habit) {
        habit.name = self.name.trim().to_string();
        habit.description = self.description.clone();
        habit.habit_type = self.habit_type;
        habit.frequency = self.frequency.clone();
        habit.target = self.target.clone();
        habit.end_date = self.end_date;

        // Milestone progress is preserved across updates
        if let Some(milestone) = &self.milestone {
            match &mut habit.milestone {
                Some(existing) => existing.target = milestone.target,
                None => habit.milestone = Some(Milestone { target: milestone.target, current: 0 }),
            }
        }

        habit.updated_at_utc = Some(Utc::now());
    }
}

/// Merge patch over the mutable text fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchHabitDto {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PatchHabitDto {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if let Some(name) = &self.name {
            validate_name(name, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn apply(&self, habit: &mut Habit) {
        if let Some(name) = &self.name {
            habit.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            habit.description = Some(description.clone());
        }
        habit.updated_at_utc = Some(Utc::now());
    }
}

fn validate_name(name: &str, errors: &mut HashMap<String, String>) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    } else if trimmed.len() > 100 {
        errors.insert("name".to_string(), "Name must be at most 100 characters".to_string());
    }
}

fn validate_common(
    name: &str,
    frequency: &Frequency,
    target: &Target,
    milestone: Option<&UpsertMilestoneDto>,
    errors: &mut HashMap<String, String>,
) {
    validate_name(name, errors);
    if frequency.times_per_period < 1 {
        errors.insert(
            "frequency.timesPerPeriod".to_string(),
            "Times per period must be at least 1".to_string(),
        );
    }
    if target.value < 1 {
        errors.insert("target.value".to_string(), "Target value must be at least 1".to_string());
    }
    if target.unit.trim().is_empty() {
        errors.insert("target.unit".to_string(), "Target unit is required".to_string());
    }
    if let Some(milestone) = milestone {
        if milestone.target < 1 {
            errors.insert(
                "milestone.target".to_string(),
                "Milestone target must be at least 1".to_string(),
            );
        }
    }
}
