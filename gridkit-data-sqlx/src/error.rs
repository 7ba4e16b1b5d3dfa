use gridkit_data::GridError;

/// Extension trait for converting `sqlx::Error` into `GridError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for GridError`
/// in this crate. Instead, use `.into_grid_error()`.
pub trait SqlxErrorExt {
    fn into_grid_error(self) -> GridError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_grid_error(self) -> GridError {
        tracing::debug!(error = %self, "grid query failed");
        GridError::database(self)
    }
}

/// Convenience alias for grid results using `GridError`.
pub type SqlxResult<T> = Result<T, GridError>;
