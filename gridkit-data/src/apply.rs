//! Built-in filter and sort steps.
//!
//! These decide *which* fields take part and *how* conditions combine; the
//! match syntax itself belongs to the [`GridQuery`] adapter.
//! [`GridManager`](crate::GridManager) wraps both in their cancellable hooks.

use crate::adapter::GridQuery;
use crate::config::GridConfig;
use crate::field::Field;
use crate::grid::SortOrder;

/// Apply a free-text filter across the filterable fields.
///
/// An empty filter is a no-op and records nothing. Otherwise one OR-group
/// with a predicate per filterable field is AND-ed onto the query (nothing
/// is added when no field is filterable) and the filter is returned so the
/// grid can record it.
pub fn apply_filter<Q: GridQuery>(query: &mut Q, fields: &[Field], filter: &str) -> Option<String> {
    if filter.is_empty() {
        return None;
    }
    let filterable: Vec<&str> = fields
        .iter()
        .filter(|f| f.is_filterable())
        .map(Field::field_name)
        .collect();
    if filterable.is_empty() {
        tracing::debug!(filter, "no filterable field, filter recorded without predicate");
    } else {
        tracing::debug!(filter, fields = ?filterable, "applying grid filter");
        query.and_where_any_contains(&filterable, filter);
    }
    Some(filter.to_string())
}

/// Apply a sort request if it targets a declared, sortable field.
///
/// Unknown or unsortable fields are ignored without error. Any order other
/// than `"DESC"` sorts ascending. Returns what the grid should record.
pub fn apply_sort<Q: GridQuery>(
    query: &mut Q,
    grid_config: &GridConfig,
    sort_field: &str,
    sort_order: &str,
) -> Option<(String, SortOrder)> {
    let field = grid_config.find_field(sort_field)?;
    if !field.is_sortable() {
        tracing::debug!(sort_field, "sort ignored: field is not sortable");
        return None;
    }
    let order = SortOrder::from_request(sort_order);
    tracing::debug!(sort_field, %order, "applying grid sort");
    query.order_by(field.field_name(), order.is_ascending());
    Some((field.field_name().to_string(), order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryQuery;

    fn config() -> GridConfig {
        GridConfig::new("id")
            .field(Field::new("id").sortable(true))
            .field(Field::new("name").filterable(true).sortable(true))
            .field(Field::new("email").filterable(true))
            .field(Field::new("secret"))
    }

    #[test]
    fn test_empty_filter_is_noop() {
        let mut q = MemoryQuery::new(Vec::new());
        assert_eq!(apply_filter(&mut q, config().field_list(), ""), None);
        assert_eq!(q.filter_group_count(), 0);
    }

    #[test]
    fn test_filter_uses_each_filterable_field_once() {
        let mut q = MemoryQuery::new(Vec::new());
        let recorded = apply_filter(&mut q, config().field_list(), "ali");
        assert_eq!(recorded.as_deref(), Some("ali"));
        let groups: Vec<_> = q.filter_groups().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], ["name".to_string(), "email".to_string()]);
    }

    #[test]
    fn test_filter_without_filterable_fields_still_records() {
        let mut q = MemoryQuery::new(Vec::new());
        let fields = [Field::new("id")];
        assert_eq!(apply_filter(&mut q, &fields, "x").as_deref(), Some("x"));
        assert_eq!(q.filter_group_count(), 0);
    }

    #[test]
    fn test_sort_on_sortable_field() {
        let mut q = MemoryQuery::new(Vec::new());
        let applied = apply_sort(&mut q, &config(), "name", "DESC");
        assert_eq!(applied, Some(("name".to_string(), SortOrder::Desc)));
        assert_eq!(q.sort_keys(), [("name".to_string(), false)]);
    }

    #[test]
    fn test_malformed_order_defaults_to_ascending() {
        let mut q = MemoryQuery::new(Vec::new());
        let applied = apply_sort(&mut q, &config(), "id", "sideways");
        assert_eq!(applied, Some(("id".to_string(), SortOrder::Asc)));
        assert_eq!(q.sort_keys(), [("id".to_string(), true)]);
    }

    #[test]
    fn test_unsortable_or_unknown_field_is_ignored() {
        let mut q = MemoryQuery::new(Vec::new());
        assert_eq!(apply_sort(&mut q, &config(), "email", "ASC"), None);
        assert_eq!(apply_sort(&mut q, &config(), "nope", "ASC"), None);
        assert!(q.sort_keys().is_empty());
    }
}
