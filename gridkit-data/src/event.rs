use crate::adapter::GridQuery;
use crate::config::{GridConfig, PaginatorConfig};
use crate::paginator::Paginator;
use crate::request::GridRequest;
use gridkit_events::{Cancellable, EventDispatcher};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Keys of [`GridEvent::values`] set by the grid pipeline.
pub mod keys {
    pub const FILTER: &str = "filter";
    pub const SORT_FIELD: &str = "sortField";
    pub const SORT_ORDER: &str = "sortOrder";
    pub const CURRENT_PAGE: &str = "currentPage";
}

/// Extension points fired while a grid is built.
///
/// Each `On*` phase precedes a built-in step that listeners may cancel; the
/// matching `After*` phase fires whether or not it was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridPhase {
    OnApplyFilter,
    AfterApplyFilter,
    OnApplySort,
    AfterApplySort,
    OnGetGridQuery,
    AfterGetGridQuery,
    OnGetPaginatorQuery,
    AfterGetPaginatorQuery,
}

impl GridPhase {
    pub const ALL: [GridPhase; 8] = [
        GridPhase::OnApplyFilter,
        GridPhase::AfterApplyFilter,
        GridPhase::OnApplySort,
        GridPhase::AfterApplySort,
        GridPhase::OnGetGridQuery,
        GridPhase::AfterGetGridQuery,
        GridPhase::OnGetPaginatorQuery,
        GridPhase::AfterGetPaginatorQuery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GridPhase::OnApplyFilter => "ON_APPLY_FILTER",
            GridPhase::AfterApplyFilter => "AFTER_APPLY_FILTER",
            GridPhase::OnApplySort => "ON_APPLY_SORT",
            GridPhase::AfterApplySort => "AFTER_APPLY_SORT",
            GridPhase::OnGetGridQuery => "ON_GET_GRID_QUERY",
            GridPhase::AfterGetGridQuery => "AFTER_GET_GRID_QUERY",
            GridPhase::OnGetPaginatorQuery => "ON_GET_PAGINATOR_QUERY",
            GridPhase::AfterGetPaginatorQuery => "AFTER_GET_PAGINATOR_QUERY",
        }
    }
}

impl std::fmt::Display for GridPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener registry for grid hooks.
pub type GridEvents<Q> = EventDispatcher<GridPhase, GridEvent<Q>>;

/// Mutable context handed to grid hook listeners.
///
/// Carries the in-progress query (which a listener may edit or replace
/// wholesale), the finalized query slot for the `*GetGridQuery` and
/// `*GetPaginatorQuery` phases, and a string-keyed map of derived values
/// (see [`keys`]).
pub struct GridEvent<Q: GridQuery> {
    grid_config: Arc<GridConfig>,
    request: Arc<GridRequest>,
    query: Q,
    prepared: Option<Q::Prepared>,
    paginator: Option<Paginator>,
    paginator_config: Option<PaginatorConfig>,
    values: Map<String, Value>,
    default_prevented: bool,
}

impl<Q: GridQuery> GridEvent<Q> {
    pub fn new(grid_config: Arc<GridConfig>, request: Arc<GridRequest>, query: Q) -> Self {
        Self {
            grid_config,
            request,
            query,
            prepared: None,
            paginator: None,
            paginator_config: None,
            values: Map::new(),
            default_prevented: false,
        }
    }

    pub(crate) fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub(crate) fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator_config = Some(paginator.paginator_config.clone());
        self.paginator = Some(paginator);
        self
    }

    pub(crate) fn with_paginator_config(mut self, config: PaginatorConfig) -> Self {
        self.paginator_config = Some(config);
        self
    }

    pub fn grid_config(&self) -> &GridConfig {
        &self.grid_config
    }

    pub fn request(&self) -> &GridRequest {
        &self.request
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Q {
        &mut self.query
    }

    /// Swap in a different query, returning the previous one.
    pub fn replace_query(&mut self, query: Q) -> Q {
        std::mem::replace(&mut self.query, query)
    }

    /// The finalized query, once the built-in step or a listener set it.
    pub fn prepared(&self) -> Option<&Q::Prepared> {
        self.prepared.as_ref()
    }

    pub fn set_prepared(&mut self, prepared: Q::Prepared) {
        self.prepared = Some(prepared);
    }

    /// Paginator computed so far (grid-query phases only).
    pub fn paginator(&self) -> Option<&Paginator> {
        self.paginator.as_ref()
    }

    /// Paginator configuration in effect. Set for the paginator-query
    /// phases, where the requested page is under `currentPage` and the
    /// count is not known yet, and for the grid-query phases.
    pub fn paginator_config(&self) -> Option<&PaginatorConfig> {
        self.paginator_config.as_ref()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn value_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub(crate) fn into_parts(self) -> (Q, Option<Q::Prepared>) {
        (self.query, self.prepared)
    }
}

impl<Q: GridQuery> Cancellable for GridEvent<Q> {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        let names: Vec<_> = GridPhase::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "ON_APPLY_FILTER",
                "AFTER_APPLY_FILTER",
                "ON_APPLY_SORT",
                "AFTER_APPLY_SORT",
                "ON_GET_GRID_QUERY",
                "AFTER_GET_GRID_QUERY",
                "ON_GET_PAGINATOR_QUERY",
                "AFTER_GET_PAGINATOR_QUERY",
            ]
        );
        assert_eq!(GridPhase::OnApplySort.to_string(), "ON_APPLY_SORT");
    }
}
