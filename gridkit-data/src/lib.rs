//! # gridkit-data — filtered, sorted, paginated grids
//!
//! Turns a queryable row source into one page of rows plus the state
//! needed to render pagination controls.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Field`] | One displayable/queryable column and its capabilities |
//! | [`GridConfig`] | Fields, count field, optional [`PaginatorConfig`], parameter namespace |
//! | [`Paginator`] | Page count, current page, visible window, previous/next buttons |
//! | [`GridManager`] | Runs filter → sort → count → paginate → execute → normalize |
//! | [`GridQuery`] | Adapter trait implemented per storage engine |
//! | [`QueryBuilder`] | SQL statement builder used by SQL adapters |
//! | [`MemoryQuery`] | In-memory document adapter |
//! | [`GridEvent`] / [`GridPhase`] | Cancellable hooks around each pipeline step |
//!
//! Query execution is delegated to the adapter; this crate performs no I/O
//! of its own.

pub mod adapter;
pub mod apply;
pub mod config;
pub mod error;
pub mod event;
pub mod field;
pub mod grid;
pub mod manager;
pub mod memory;
pub mod paginator;
pub mod query;
pub mod request;
pub mod row;

pub use adapter::GridQuery;
pub use apply::{apply_filter, apply_sort};
pub use config::{GridConfig, PaginatorConfig};
pub use error::{ConfigError, ConfigValidationDetail, GridError};
pub use event::{GridEvent, GridEvents, GridPhase};
pub use field::{Field, FieldOption, FieldOptionKey, FormatValueCallback};
pub use grid::{Grid, SortOrder};
pub use manager::GridManager;
pub use memory::{MemoryPlan, MemoryQuery};
pub use paginator::Paginator;
pub use query::{Dialect, IdentifierPolicy, Projection, QueryBuilder, QueryError, SqlStatement};
pub use request::GridRequest;
pub use row::{normalize_row, Row};

pub mod prelude {
    //! Re-exports of the most commonly used grid types.
    pub use crate::{
        Field, Grid, GridConfig, GridEvent, GridManager, GridPhase, GridQuery, GridRequest,
        PaginatorConfig, QueryBuilder, Row,
    };
    pub use gridkit_events::Cancellable;
}
