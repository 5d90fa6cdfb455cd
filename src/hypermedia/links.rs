//! Link building: which follow-up operations are valid for a resource in
//! its current state.
//!
//! Eligibility rules are plain data rows per resource kind; adding a new
//! kind means adding a table, not a type.

use serde::Serialize;

use crate::models::ResourceKind;

use super::routes::RouteName;

/// A named, method-tagged hyperlink.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Link {
    pub rel: String,
    pub href: String,
    pub method: String,
}

impl Link {
    fn new(rel: &str, href: String, method: &str) -> Self {
        Self { rel: rel.to_string(), href, method: method.to_string() }
    }
}

/// Minimal resource state needed to decide link eligibility.
#[derive(Debug, Clone)]
pub struct LinkState {
    pub id: String,
    pub is_archived: bool,
}

impl LinkState {
    pub fn new(id: impl Into<String>, is_archived: bool) -> Self {
        Self { id: id.into(), is_archived }
    }
}

#[derive(Debug, Clone, Copy)]
enum Eligibility {
    Always,
    WhenArchived(bool),
}

impl Eligibility {
    fn allows(self, state: &LinkState) -> bool {
        match self {
            Eligibility::Always => true,
            Eligibility::WhenArchived(wanted) => state.is_archived == wanted,
        }
    }
}

struct LinkRule {
    rel: &'static str,
    method: &'static str,
    route: RouteName,
    when: Eligibility,
}

static HABIT_LINK_RULES: &[LinkRule] = &[
    LinkRule { rel: "self", method: "GET", route: RouteName::HabitById, when: Eligibility::Always },
    LinkRule { rel: "update", method: "PUT", route: RouteName::HabitById, when: Eligibility::Always },
    LinkRule {
        rel: "partial-update",
        method: "PATCH",
        route: RouteName::HabitById,
        when: Eligibility::Always,
    },
    LinkRule {
        rel: "delete",
        method: "DELETE",
        route: RouteName::HabitById,
        when: Eligibility::Always,
    },
    LinkRule {
        rel: "upsert-tags",
        method: "PUT",
        route: RouteName::HabitTags,
        when: Eligibility::Always,
    },
    LinkRule {
        rel: "archive",
        method: "PUT",
        route: RouteName::HabitArchive,
        when: Eligibility::WhenArchived(false),
    },
    LinkRule {
        rel: "un-archive",
        method: "PUT",
        route: RouteName::HabitUnarchive,
        when: Eligibility::WhenArchived(true),
    },
];

static TAG_LINK_RULES: &[LinkRule] = &[
    LinkRule { rel: "self", method: "GET", route: RouteName::TagById, when: Eligibility::Always },
    LinkRule { rel: "update", method: "PUT", route: RouteName::TagById, when: Eligibility::Always },
    LinkRule { rel: "delete", method: "DELETE", route: RouteName::TagById, when: Eligibility::Always },
];

static ENTRY_LINK_RULES: &[LinkRule] = &[
    LinkRule { rel: "self", method: "GET", route: RouteName::EntryById, when: Eligibility::Always },
    LinkRule { rel: "update", method: "PUT", route: RouteName::EntryById, when: Eligibility::Always },
    LinkRule {
        rel: "delete",
        method: "DELETE",
        route: RouteName::EntryById,
        when: Eligibility::Always,
    },
];

/// Pagination/query context for collection-level links.
#[derive(Debug, Clone)]
pub struct CollectionContext<'a> {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub sort: Option<&'a str>,
    pub fields: Option<&'a str>,
}

impl CollectionContext<'_> {
    fn query_string(&self, page: usize) -> String {
        let mut query = format!("?page={}&page_size={}", page, self.page_size);
        if let Some(sort) = self.sort {
            query.push_str(&format!("&sort={}", sort));
        }
        if let Some(fields) = self.fields {
            query.push_str(&format!("&fields={}", fields));
        }
        query
    }
}

/// Builds hrefs from the canonical route table against the configured
/// public base URL. Pure and stateless; safe to share across requests.
#[derive(Debug)]
pub struct LinkService {
    base_url: String,
}

impl LinkService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    /// Links for a single resource, filtered by its current state.
    pub fn resource_links(&self, kind: ResourceKind, state: &LinkState) -> Vec<Link> {
        let rules = match kind {
            ResourceKind::Habit => HABIT_LINK_RULES,
            ResourceKind::Tag => TAG_LINK_RULES,
            ResourceKind::Entry => ENTRY_LINK_RULES,
        };

        rules
            .iter()
            .filter(|rule| rule.when.allows(state))
            .map(|rule| {
                Link::new(
                    rule.rel,
                    rule.route.href(&self.base_url, &[("id", state.id.as_str())]),
                    rule.method,
                )
            })
            .collect()
    }

    /// Links for a collection response: self, page navigation where a
    /// next/previous page exists, and the applicable create operations.
    pub fn collection_links(&self, kind: ResourceKind, ctx: &CollectionContext<'_>) -> Vec<Link> {
        let collection_route = match kind {
            ResourceKind::Habit => RouteName::Habits,
            ResourceKind::Tag => RouteName::Tags,
            ResourceKind::Entry => RouteName::Entries,
        };
        let base = collection_route.href(&self.base_url, &[]);

        let mut links = vec![Link::new(
            "self",
            format!("{}{}", base, ctx.query_string(ctx.page)),
            "GET",
        )];

        if ctx.page < ctx.total_pages {
            links.push(Link::new(
                "next-page",
                format!("{}{}", base, ctx.query_string(ctx.page + 1)),
                "GET",
            ));
        }
        if ctx.page > 1 {
            links.push(Link::new(
                "previous-page",
                format!("{}{}", base, ctx.query_string(ctx.page - 1)),
                "GET",
            ));
        }

        links.push(Link::new("create", base.clone(), "POST"));
        if kind == ResourceKind::Entry {
            links.push(Link::new(
                "create-batch",
                RouteName::EntryBatch.href(&self.base_url, &[]),
                "POST",
            ));
        }

        links
    }
}
