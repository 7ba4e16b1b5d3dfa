use crate::error::{SqlxErrorExt, SqlxResult};
use gridkit_data::{Dialect, GridQuery, Projection, QueryBuilder, Row, SqlStatement};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, SqlitePool, TypeInfo, ValueRef};

/// Grid query over a SQLite pool.
///
/// Holds a [`QueryBuilder`] and the pool it runs against. Cloning is cheap:
/// the pool is reference-counted and the builder is plain data.
///
/// # Example
///
/// ```ignore
/// let base = SqlxGridQuery::for_table(pool.clone(), "users")
///     .map_builder(|b| b.where_eq("active", "1"));
/// let grid = manager.get_grid(&base, config, &request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlxGridQuery {
    pool: SqlitePool,
    builder: QueryBuilder,
}

impl SqlxGridQuery {
    pub fn new(pool: SqlitePool, builder: QueryBuilder) -> Self {
        Self { pool, builder }
    }

    /// `SELECT * FROM table` with SQLite placeholders.
    pub fn for_table(pool: SqlitePool, table: &str) -> Self {
        Self::new(pool, QueryBuilder::new_with_dialect(table, Dialect::Sqlite))
    }

    pub fn map_builder(mut self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        self.builder = f(self.builder);
        self
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut QueryBuilder {
        &mut self.builder
    }
}

impl GridQuery for SqlxGridQuery {
    type Prepared = SqlStatement;

    fn and_where_any_contains(&mut self, fields: &[&str], needle: &str) {
        self.builder.push_any_contains(fields, needle);
    }

    fn order_by(&mut self, field: &str, ascending: bool) {
        self.builder.push_order(field, ascending);
    }

    fn project_count(&mut self, field: &str) {
        self.builder.set_projection(Projection::Count(field.to_string()));
    }

    fn clear_limit_offset(&mut self) {
        self.builder.set_limit(None);
        self.builder.set_offset(None);
    }

    fn set_limit(&mut self, limit: u64) {
        self.builder.set_limit(Some(limit));
    }

    fn set_offset(&mut self, offset: u64) {
        self.builder.set_offset(Some(offset));
    }

    fn prepare(&self) -> SqlxResult<SqlStatement> {
        Ok(self.builder.build()?)
    }

    async fn fetch_rows(&self, statement: &SqlStatement) -> SqlxResult<Vec<Row>> {
        tracing::trace!(sql = %statement.sql, params = ?statement.params, "fetching grid rows");
        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = query.bind(param.as_str());
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into_grid_error())?;
        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.into_grid_error())
    }

    async fn fetch_count(&self, statement: &SqlStatement) -> SqlxResult<u64> {
        tracing::trace!(sql = %statement.sql, params = ?statement.params, "counting grid rows");
        let mut query = sqlx::query_scalar::<_, i64>(&statement.sql);
        for param in &statement.params {
            query = query.bind(param.as_str());
        }
        let count = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.into_grid_error())?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// Decode a result row by the storage class of each value.
///
/// SQLite is dynamically typed, so the runtime type of the value decides the
/// JSON shape rather than the declared column type. Blobs become arrays of
/// bytes.
pub fn decode_row(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut out = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" | "NUMERIC" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => Value::from(row.try_get_unchecked::<Vec<u8>, _>(index)?),
                _ => Value::String(row.try_get_unchecked::<String, _>(index)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}
