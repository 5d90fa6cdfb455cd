pub mod entry;
pub mod habit;
pub mod tag;

pub use entry::{CreateEntryDto, Entry, EntryDto, UpdateEntryDto};
pub use habit::{
    CreateHabitDto, Frequency, FrequencyType, Habit, HabitDto, HabitDtoV2, HabitStatus, HabitType,
    Milestone, PatchHabitDto, Target, UpdateHabitDto,
};
pub use tag::{CreateTagDto, Tag, TagDto, UpdateTagDto};

/// The resource kinds served by this API. Keys the sort-mapping registry
/// and selects the link eligibility table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Habit,
    Tag,
    Entry,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Habit => "habit",
            ResourceKind::Tag => "tag",
            ResourceKind::Entry => "entry",
        }
    }
}
