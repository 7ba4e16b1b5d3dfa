use crate::error::GridError;
use crate::row::Row;
use std::future::Future;

/// Storage-engine-specific query builder and executor consumed by
/// [`GridManager`](crate::GridManager).
///
/// `Clone` must yield an independent copy: the grid pipeline clones the
/// caller's base query and only ever mutates the clones.
///
/// Execution uses RPITIT (return-position `impl Trait` in traits). No
/// `async-trait` needed.
pub trait GridQuery: Clone + Send + Sync {
    /// A finalized query, ready to execute.
    type Prepared: Send + Sync;

    /// AND one OR-group onto the query: a case-insensitive "contains
    /// `needle`" predicate for each of `fields`.
    fn and_where_any_contains(&mut self, fields: &[&str], needle: &str);

    fn order_by(&mut self, field: &str, ascending: bool);

    /// Replace the projection with a count over `field`.
    fn project_count(&mut self, field: &str);

    fn clear_limit_offset(&mut self);

    fn set_limit(&mut self, limit: u64);

    fn set_offset(&mut self, offset: u64);

    /// Finalize the builder into an executable query.
    fn prepare(&self) -> Result<Self::Prepared, GridError>;

    /// Execute a finalized row query.
    fn fetch_rows(
        &self,
        prepared: &Self::Prepared,
    ) -> impl Future<Output = Result<Vec<Row>, GridError>> + Send;

    /// Execute a finalized count query.
    fn fetch_count(
        &self,
        prepared: &Self::Prepared,
    ) -> impl Future<Output = Result<u64, GridError>> + Send;
}
