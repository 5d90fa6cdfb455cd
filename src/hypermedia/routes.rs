//! The canonical route table.
//!
//! Both the axum router and the link builder read from this table, so a
//! hypermedia href can never drift from the path the router actually
//! serves.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteName {
    Habits,
    HabitById,
    HabitArchive,
    HabitUnarchive,
    HabitTags,
    HabitTagById,
    Tags,
    TagById,
    Entries,
    EntryBatch,
    EntryById,
    GitHubPat,
    GitHubProfile,
}

impl RouteName {
    /// Path template in axum syntax (`:name` placeholders).
    pub const fn template(self) -> &'static str {
        match self {
            RouteName::Habits => "/habits",
            RouteName::HabitById => "/habits/:id",
            RouteName::HabitArchive => "/habits/:id/archive",
            RouteName::HabitUnarchive => "/habits/:id/unarchive",
            RouteName::HabitTags => "/habits/:id/tags",
            RouteName::HabitTagById => "/habits/:id/tags/:tag_id",
            RouteName::Tags => "/tags",
            RouteName::TagById => "/tags/:id",
            RouteName::Entries => "/entries",
            RouteName::EntryBatch => "/entries/batch",
            RouteName::EntryById => "/entries/:id",
            RouteName::GitHubPat => "/github/personal-access-token",
            RouteName::GitHubProfile => "/github/profile",
        }
    }

    /// Materialize an href by substituting `:name` segments from `params`.
    pub fn href(self, base_url: &str, params: &[(&str, &str)]) -> String {
        let path: Vec<String> = self
            .template()
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => params
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value).to_string())
                    .unwrap_or_default(),
                None => segment.to_string(),
            })
            .collect();
        format!("{}{}", base_url, path.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_substitutes_path_params() {
        let href = RouteName::HabitTagById.href(
            "http://localhost:3000",
            &[("id", "h_1"), ("tag_id", "t_9")],
        );
        assert_eq!(href, "http://localhost:3000/habits/h_1/tags/t_9");
    }

    #[test]
    fn href_without_params_is_the_template() {
        let href = RouteName::Habits.href("http://localhost:3000", &[]);
        assert_eq!(href, "http://localhost:3000/habits");
    }
}
