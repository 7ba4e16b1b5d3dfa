//! # gridkit-data-sqlx — SQLx backend for gridkit grids
//!
//! Runs [`gridkit_data`] grids against a SQLite database through
//! [SQLx](https://github.com/launchbadge/sqlx). The grid pipeline stays in
//! `gridkit-data`; this crate supplies the adapter that renders the
//! accumulated query with [`QueryBuilder`](gridkit_data::QueryBuilder),
//! executes it on a pool, and decodes rows into JSON maps.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxGridQuery`] | [`GridQuery`](gridkit_data::GridQuery) implementation holding a `SqlitePool` |
//! | [`decode_row`] | Converts a `SqliteRow` into a [`Row`](gridkit_data::Row) |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `GridError` (`.into_grid_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, GridError>` |
//!
//! # Quick start
//!
//! ```ignore
//! use gridkit_data_sqlx::prelude::*;
//!
//! let config = Arc::new(
//!     GridConfig::new("id")
//!         .field(Field::new("id").sortable(true))
//!         .field(Field::new("name").filterable(true).sortable(true)),
//! );
//! let base = SqlxGridQuery::for_table(pool.clone(), "users");
//! let grid = GridManager::new()
//!     .get_grid(&base, config, &GridRequest::from_uri("/users?filter=ann"))
//!     .await?;
//! ```
//!
//! # Error bridging
//!
//! Due to Rust's orphan rules, `From<sqlx::Error> for GridError` can't be
//! implemented here. Use the [`SqlxErrorExt`] trait instead:
//!
//! ```ignore
//! use gridkit_data_sqlx::SqlxErrorExt;
//!
//! let rows = sqlx::query("SELECT ...")
//!     .fetch_all(&pool)
//!     .await
//!     .map_err(|e| e.into_grid_error())?;
//! ```

pub mod error;
pub mod query;

pub use error::{SqlxErrorExt, SqlxResult};
pub use query::{decode_row, SqlxGridQuery};

/// Re-exports of the most commonly used types from both `gridkit-data` and this crate.
pub mod prelude {
    pub use crate::{SqlxErrorExt, SqlxGridQuery};
    pub use gridkit_data::prelude::*;
}
