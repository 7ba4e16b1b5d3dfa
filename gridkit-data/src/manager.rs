use crate::adapter::GridQuery;
use crate::apply::{apply_filter, apply_sort};
use crate::config::{GridConfig, PaginatorConfig};
use crate::error::GridError;
use crate::event::{keys, GridEvent, GridEvents, GridPhase};
use crate::grid::{Grid, SortOrder};
use crate::paginator::Paginator;
use crate::request::GridRequest;
use crate::row::normalize_row;
use std::sync::Arc;

/// Builds [`Grid`]s: filter, sort, count, paginate, execute, normalize.
///
/// The manager owns the hook listeners and nothing request-specific, so a
/// single instance can serve concurrent requests.
///
/// # Example
///
/// ```ignore
/// let mut manager = GridManager::<MemoryQuery>::new();
/// manager.subscribe(GridPhase::OnGetGridQuery, |event| {
///     event.query_mut().order_by("id", true);
/// });
///
/// let grid = manager
///     .get_grid(&base_query, grid_config.clone(), &GridRequest::from_uri(uri))
///     .await?;
/// ```
pub struct GridManager<Q: GridQuery> {
    events: GridEvents<Q>,
}

/// Filter and sort state gathered before the grid exists.
#[derive(Default)]
struct Applied {
    filter_value: Option<String>,
    sort: Option<(String, SortOrder)>,
}

impl<Q: GridQuery> GridManager<Q> {
    pub fn new() -> Self {
        Self {
            events: GridEvents::new(),
        }
    }

    pub fn with_events(events: GridEvents<Q>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &GridEvents<Q> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut GridEvents<Q> {
        &mut self.events
    }

    /// Register a hook listener.
    pub fn subscribe<F>(&mut self, phase: GridPhase, handler: F) -> &mut Self
    where
        F: Fn(&mut GridEvent<Q>) + Send + Sync + 'static,
    {
        self.events.subscribe(phase, handler);
        self
    }

    /// Run the whole grid pipeline for one request.
    ///
    /// `query` is the caller's base query; it is cloned, never modified.
    /// Adapter errors from either the count or the row query abort the run
    /// and are returned unchanged.
    pub async fn get_grid(
        &self,
        query: &Q,
        grid_config: Arc<GridConfig>,
        request: &GridRequest,
    ) -> Result<Grid, GridError> {
        let request = Arc::new(request.clone());
        let mut applied = Applied::default();

        let grid_query = query.clone();

        let filter = request.param_or_empty(&grid_config.filter_param()).to_string();
        let grid_query = self.filter_step(grid_query, &grid_config, &request, &filter, &mut applied);

        let sort_field = request.param_or_empty(&grid_config.sort_field_param()).to_string();
        let sort_order = request.param_or_empty(&grid_config.sort_order_param()).to_string();
        let mut grid_query = self.sort_step(
            grid_query,
            &grid_config,
            &request,
            &sort_field,
            &sort_order,
            &mut applied,
        );

        let paginator_config = grid_config.effective_paginator_config();
        let paginator = self
            .get_paginator(&grid_query, &paginator_config, grid_config.clone(), request.clone())
            .await?;

        grid_query.set_limit(paginator.limit());
        grid_query.set_offset(paginator.offset());

        let mut event = GridEvent::new(grid_config.clone(), request.clone(), grid_query)
            .with_paginator(paginator.clone());
        if let Some(filter) = &applied.filter_value {
            event.set_value(keys::FILTER, filter.as_str());
        }
        if let Some((field, order)) = &applied.sort {
            event.set_value(keys::SORT_FIELD, field.as_str());
            event.set_value(keys::SORT_ORDER, order.as_str());
        }
        let (grid_query, prepared) = self.finalize(
            event,
            GridPhase::OnGetGridQuery,
            GridPhase::AfterGetGridQuery,
        )?;

        let raw_rows = grid_query.fetch_rows(&prepared).await?;
        tracing::debug!(
            rows = raw_rows.len(),
            page = paginator.current_page,
            "grid query executed"
        );
        let item_list = raw_rows.into_iter().map(normalize_row).collect();

        let (sort_field, sort_order) = match applied.sort {
            Some((field, order)) => (Some(field), Some(order)),
            None => (None, None),
        };
        Ok(Grid {
            grid_config,
            paginator,
            item_list,
            filter_value: applied.filter_value,
            sort_field,
            sort_order,
            request_uri: request.request_uri().to_string(),
        })
    }

    /// Count the rows `query` matches and compute the page window.
    ///
    /// The count runs on a clone of `query` with a count projection over the
    /// paginator's count field and no limit/offset.
    pub async fn get_paginator(
        &self,
        query: &Q,
        paginator_config: &PaginatorConfig,
        grid_config: Arc<GridConfig>,
        request: Arc<GridRequest>,
    ) -> Result<Paginator, GridError> {
        paginator_config.check()?;
        let requested_page = request.int_param(&paginator_config.current_page_param(), 1);

        let mut count_query = query.clone();
        count_query.project_count(&paginator_config.count_field_name);
        count_query.clear_limit_offset();

        let event = GridEvent::new(grid_config, request.clone(), count_query)
            .with_paginator_config(paginator_config.clone())
            .with_value(keys::CURRENT_PAGE, requested_page);
        let (count_query, prepared) = self.finalize(
            event,
            GridPhase::OnGetPaginatorQuery,
            GridPhase::AfterGetPaginatorQuery,
        )?;

        let total_item_count = count_query.fetch_count(&prepared).await?;
        let paginator = Paginator::compute(
            paginator_config.clone(),
            total_item_count,
            requested_page,
            request.request_uri(),
        );
        tracing::debug!(
            total_item_count,
            total_page_count = paginator.total_page_count,
            current_page = paginator.current_page,
            min_page = paginator.min_page,
            max_page = paginator.max_page,
            "paginator computed"
        );
        Ok(paginator)
    }

    /// Fire `on`, finalize the query unless prevented, fire `after`, then
    /// hand back whatever query and finalized query the context now holds.
    fn finalize(
        &self,
        mut event: GridEvent<Q>,
        on: GridPhase,
        after: GridPhase,
    ) -> Result<(Q, Q::Prepared), GridError> {
        if !self.events.dispatch(on, &mut event) {
            let prepared = event.query().prepare()?;
            event.set_prepared(prepared);
        }
        self.events.dispatch(after, &mut event);

        let (query, prepared) = event.into_parts();
        let prepared = prepared.ok_or(GridError::MissingQuery(after.as_str()))?;
        Ok((query, prepared))
    }

    fn filter_step(
        &self,
        query: Q,
        grid_config: &Arc<GridConfig>,
        request: &Arc<GridRequest>,
        filter: &str,
        applied: &mut Applied,
    ) -> Q {
        if filter.is_empty() {
            return query;
        }
        let mut event = GridEvent::new(grid_config.clone(), request.clone(), query)
            .with_value(keys::FILTER, filter);
        if self.events.dispatch(GridPhase::OnApplyFilter, &mut event) {
            tracing::debug!(filter, "built-in filter prevented by listener");
        } else {
            applied.filter_value = apply_filter(event.query_mut(), grid_config.field_list(), filter);
        }
        self.events.dispatch(GridPhase::AfterApplyFilter, &mut event);
        event.into_parts().0
    }

    fn sort_step(
        &self,
        query: Q,
        grid_config: &Arc<GridConfig>,
        request: &Arc<GridRequest>,
        sort_field: &str,
        sort_order: &str,
        applied: &mut Applied,
    ) -> Q {
        if sort_field.is_empty() {
            return query;
        }
        let mut event = GridEvent::new(grid_config.clone(), request.clone(), query)
            .with_value(keys::SORT_FIELD, sort_field)
            .with_value(keys::SORT_ORDER, sort_order);
        if self.events.dispatch(GridPhase::OnApplySort, &mut event) {
            tracing::debug!(sort_field, "built-in sort prevented by listener");
        } else {
            applied.sort = apply_sort(event.query_mut(), grid_config, sort_field, sort_order);
        }
        self.events.dispatch(GridPhase::AfterApplySort, &mut event);
        event.into_parts().0
    }
}

impl<Q: GridQuery> Default for GridManager<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: GridQuery> Clone for GridManager<Q> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}
