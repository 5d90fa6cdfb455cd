use super::error::SortError;
use super::mapping::SortMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn invert(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// One compiled ordering unit: a storage expression plus effective direction.
/// Sequence order is priority; the first field is the primary sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub expression: &'static str,
    pub direction: SortDirection,
}

/// Compile a raw client sort string (`field,-field2`) against a mapping.
///
/// Empty tokens are skipped, duplicates are kept (a later stable sort makes
/// the second occurrence a no-op), and any token missing from the mapping
/// fails the whole request with `InvalidSortField` naming that token.
pub fn compile(sort: &str, mapping: &SortMapping) -> Result<Vec<SortField>, SortError> {
    let mut fields = Vec::new();

    for token in sort.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let (key, direction) = match token.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Descending),
            None => (token, SortDirection::Ascending),
        };

        let entry = mapping
            .find(key)
            .ok_or_else(|| SortError::InvalidSortField(key.to_string()))?;

        for column in &entry.columns {
            let effective = if column.reverse { direction.invert() } else { direction };
            fields.push(SortField { expression: column.expression, direction: effective });
        }
    }

    Ok(fields)
}

/// Render compiled fields as an ORDER BY clause for a relational data layer.
/// Expressions come from the registered whitelist, never from client input.
pub fn to_order_clause(fields: &[SortField]) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = fields
        .iter()
        .map(|f| format!("\"{}\" {}", f.expression, f.direction.to_sql()))
        .collect();
    format!("ORDER BY {}", parts.join(", "))
}
