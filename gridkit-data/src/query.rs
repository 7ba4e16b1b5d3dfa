/// A fluent builder for the SELECT statements a grid runs.
///
/// # Example
///
/// ```ignore
/// let q = QueryBuilder::new("users u")
///     .select(&["u.id", "u.name"])
///     .where_eq("u.status", "active")
///     .where_any_contains(&["u.name", "u.email"], "ali")
///     .order_by("u.id", true)
///     .limit(10);
/// let stmt = q.build()?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }

    /// Lower-case a filter the same way the dialect's `LOWER()` does.
    /// SQLite's built-in `LOWER()` folds ASCII letters only.
    fn lowercase(self, text: &str) -> String {
        match self {
            Dialect::Generic | Dialect::Sqlite => text.to_ascii_lowercase(),
            Dialect::MySql | Dialect::Postgres => text.to_lowercase(),
        }
    }

    fn text_type(self) -> &'static str {
        match self {
            Dialect::MySql => "CHAR",
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Do not validate or quote identifiers; allows raw SQL expressions.
    Raw,
    /// Validate identifiers against a conservative pattern.
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    Quote,
}

/// What a statement selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Columns(Vec<String>),
    Count(String),
}

/// A rendered statement with its positional bind values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<String>,
}

/// `LIKE` escape character used for "contains" predicates.
const LIKE_ESCAPE: char = '!';

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    projection: Projection,
    conditions: Vec<Condition>,
    order: Vec<(String, bool)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, String),
    Like(String, String),
    Gt(String, String),
    In(String, Vec<String>),
    /// OR-group of case-insensitive substring matches, one per column.
    AnyContains(Vec<String>, String),
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            projection: Projection::Columns(vec!["*".to_string()]),
            conditions: Vec::new(),
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
            dialect: Dialect::Generic,
            identifier_policy: IdentifierPolicy::Raw,
        }
    }

    /// Create a new builder with an explicit SQL dialect.
    pub fn new_with_dialect(table: &str, dialect: Dialect) -> Self {
        Self::new(table).dialect(dialect)
    }

    /// Set the SQL dialect (affects placeholder style and quoting).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Configure identifier validation/quoting behavior.
    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.projection = Projection::Columns(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn where_eq(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn where_like(mut self, column: &str, pattern: &str) -> Self {
        self.conditions
            .push(Condition::Like(column.to_string(), pattern.to_string()));
        self
    }

    pub fn where_gt(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Gt(column.to_string(), value.to_string()));
        self
    }

    pub fn where_in(mut self, column: &str, values: &[&str]) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn where_any_contains(mut self, columns: &[&str], needle: &str) -> Self {
        self.push_any_contains(columns, needle);
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.push_order(column, ascending);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    // ── In-place mutation, used by grid adapters ──────────────────────

    /// Add an OR-group with one case-insensitive "contains" predicate per
    /// column. An empty column list adds nothing.
    pub fn push_any_contains(&mut self, columns: &[&str], needle: &str) {
        if columns.is_empty() {
            return;
        }
        self.conditions.push(Condition::AnyContains(
            columns.iter().map(|c| c.to_string()).collect(),
            needle.to_string(),
        ));
    }

    pub fn push_order(&mut self, column: &str, ascending: bool) {
        self.order.push((column.to_string(), ascending));
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    pub fn set_limit(&mut self, limit: Option<u64>) {
        self.limit_val = limit;
    }

    pub fn set_offset(&mut self, offset: Option<u64>) {
        self.offset_val = offset;
    }

    // ── Inspection ────────────────────────────────────────────────────

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn order(&self) -> &[(String, bool)] {
        &self.order
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit_val
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset_val
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// Render the statement.
    ///
    /// Identifiers are validated and quoted according to the configured
    /// [`IdentifierPolicy`]. A count projection drops `ORDER BY`, which some
    /// databases reject next to an aggregate.
    pub fn build(&self) -> Result<SqlStatement, QueryError> {
        let table = self.format_identifier(&self.table, false, "table")?;
        let (projection, is_count) = match &self.projection {
            Projection::Columns(columns) => (self.format_column_list(columns)?, false),
            Projection::Count(column) => {
                (format!("COUNT({})", self.format_identifier(column, true, "column")?), true)
            }
        };

        let mut sql = format!("SELECT {projection} FROM {table}");
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx)?;
        if !is_count {
            self.append_order(&mut sql)?;
        }
        self.append_limit_offset(&mut sql);
        Ok(SqlStatement { sql, params })
    }

    fn next_placeholder(&self, placeholder_idx: &mut usize) -> String {
        let placeholder = self.dialect.placeholder(*placeholder_idx);
        *placeholder_idx += 1;
        placeholder
    }

    fn append_where(
        &self,
        sql: &mut String,
        params: &mut Vec<String>,
        placeholder_idx: &mut usize,
    ) -> Result<(), QueryError> {
        if self.conditions.is_empty() {
            return Ok(());
        }
        let mut clauses = Vec::with_capacity(self.conditions.len());
        for cond in &self.conditions {
            let clause = match cond {
                Condition::Eq(col, val) => self.binary(col, "=", val, params, placeholder_idx)?,
                Condition::Like(col, pat) => self.binary(col, "LIKE", pat, params, placeholder_idx)?,
                Condition::Gt(col, val) => self.binary(col, ">", val, params, placeholder_idx)?,
                Condition::In(col, vals) => {
                    let col = self.format_identifier(col, false, "column")?;
                    let placeholders: Vec<_> = vals
                        .iter()
                        .map(|_| self.next_placeholder(placeholder_idx))
                        .collect();
                    params.extend(vals.iter().cloned());
                    format!("{col} IN ({})", placeholders.join(", "))
                }
                Condition::AnyContains(cols, needle) => {
                    let pattern = contains_pattern(&self.dialect.lowercase(needle));
                    let mut alternatives = Vec::with_capacity(cols.len());
                    for col in cols {
                        let col = self.format_identifier(col, false, "column")?;
                        let placeholder = self.next_placeholder(placeholder_idx);
                        params.push(pattern.clone());
                        alternatives.push(format!(
                            "LOWER(CAST({col} AS {})) LIKE {placeholder} ESCAPE '{LIKE_ESCAPE}'",
                            self.dialect.text_type()
                        ));
                    }
                    format!("({})", alternatives.join(" OR "))
                }
            };
            clauses.push(clause);
        }
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
        Ok(())
    }

    fn binary(
        &self,
        col: &str,
        op: &str,
        val: &str,
        params: &mut Vec<String>,
        placeholder_idx: &mut usize,
    ) -> Result<String, QueryError> {
        let col = self.format_identifier(col, false, "column")?;
        let placeholder = self.next_placeholder(placeholder_idx);
        params.push(val.to_string());
        Ok(format!("{col} {op} {placeholder}"))
    }

    fn append_order(&self, sql: &mut String) -> Result<(), QueryError> {
        if self.order.is_empty() {
            return Ok(());
        }
        sql.push_str(" ORDER BY ");
        let mut clauses = Vec::with_capacity(self.order.len());
        for (col, asc) in &self.order {
            let col = self.format_identifier(col, false, "column")?;
            if *asc {
                clauses.push(format!("{col} ASC"));
            } else {
                clauses.push(format!("{col} DESC"));
            }
        }
        sql.push_str(&clauses.join(", "));
        Ok(())
    }

    fn append_limit_offset(&self, sql: &mut String) {
        match (self.limit_val, self.offset_val, self.dialect) {
            (Some(limit), _, _) => sql.push_str(&format!(" LIMIT {limit}")),
            // OFFSET needs a LIMIT clause outside Postgres
            (None, Some(_), Dialect::Generic | Dialect::Sqlite) => sql.push_str(" LIMIT -1"),
            (None, Some(_), Dialect::MySql) => sql.push_str(&format!(" LIMIT {}", u64::MAX)),
            _ => {}
        }
        if let Some(offset) = self.offset_val {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }

    fn format_column_list(&self, columns: &[String]) -> Result<String, QueryError> {
        let mut out = Vec::with_capacity(columns.len());
        for col in columns {
            out.push(self.format_identifier(col, true, "column")?);
        }
        Ok(out.join(", "))
    }

    fn format_identifier(
        &self,
        ident: &str,
        allow_star: bool,
        kind: &'static str,
    ) -> Result<String, QueryError> {
        if self.identifier_policy == IdentifierPolicy::Raw {
            return Ok(ident.to_string());
        }
        if !is_valid_identifier(ident, allow_star) {
            return Err(QueryError::InvalidIdentifier {
                kind,
                ident: ident.to_string(),
            });
        }
        match self.identifier_policy {
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect, allow_star)),
            IdentifierPolicy::Raw | IdentifierPolicy::Validate => Ok(ident.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// `%needle%` with `LIKE` wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str, dialect: Dialect, allow_star: bool) -> String {
    let quote = dialect.quote_char();
    let parts: Vec<&str> = ident.split('.').collect();
    let last_idx = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            if allow_star && part == "*" && idx == last_idx {
                part.to_string()
            } else {
                format!("{quote}{part}{quote}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let stmt = QueryBuilder::new("users").build().unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM users");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_complex_query() {
        let stmt = QueryBuilder::new("users")
            .select(&["id", "name"])
            .where_eq("status", "active")
            .where_like("name", "%alice%")
            .order_by("id", true)
            .limit(10)
            .offset(20)
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT id, name FROM users WHERE status = ? AND name LIKE ? ORDER BY id ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(stmt.params, vec!["active", "%alice%"]);
    }

    #[test]
    fn test_any_contains_is_one_or_group() {
        let stmt = QueryBuilder::new("users")
            .where_eq("status", "active")
            .where_any_contains(&["name", "email"], "Ali")
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM users WHERE status = ? AND (LOWER(CAST(name AS TEXT)) LIKE ? ESCAPE '!' OR LOWER(CAST(email AS TEXT)) LIKE ? ESCAPE '!')"
        );
        assert_eq!(stmt.params, vec!["active", "%ali%", "%ali%"]);
    }

    #[test]
    fn test_any_contains_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off!"), "%50!%!_off!!%");
    }

    #[test]
    fn test_any_contains_folds_case_like_the_dialect() {
        let pattern = |dialect| {
            QueryBuilder::new_with_dialect("users", dialect)
                .where_any_contains(&["name"], "ÉMILE")
                .build()
                .unwrap()
                .params
        };
        assert_eq!(pattern(Dialect::Sqlite), vec!["%Émile%"]);
        assert_eq!(pattern(Dialect::Generic), vec!["%Émile%"]);
        assert_eq!(pattern(Dialect::Postgres), vec!["%émile%"]);
        assert_eq!(pattern(Dialect::MySql), vec!["%émile%"]);
    }

    #[test]
    fn test_offset_without_limit() {
        let sql = |dialect| {
            QueryBuilder::new_with_dialect("users", dialect)
                .offset(20)
                .build()
                .unwrap()
                .sql
        };
        assert_eq!(sql(Dialect::Sqlite), "SELECT * FROM users LIMIT -1 OFFSET 20");
        assert_eq!(
            sql(Dialect::MySql),
            "SELECT * FROM users LIMIT 18446744073709551615 OFFSET 20"
        );
        assert_eq!(sql(Dialect::Postgres), "SELECT * FROM users OFFSET 20");
    }

    #[test]
    fn test_any_contains_without_columns_is_noop() {
        let q = QueryBuilder::new("users").where_any_contains(&[], "x");
        assert_eq!(q.condition_count(), 0);
    }

    #[test]
    fn test_count_projection_drops_order() {
        let mut q = QueryBuilder::new("users")
            .where_eq("active", "true")
            .order_by("name", false)
            .limit(5);
        q.set_projection(Projection::Count("id".into()));
        q.set_limit(None);
        let stmt = q.build().unwrap();
        assert_eq!(stmt.sql, "SELECT COUNT(id) FROM users WHERE active = ?");
        assert_eq!(stmt.params, vec!["true"]);
    }

    #[test]
    fn test_postgres_placeholders() {
        let stmt = QueryBuilder::new_with_dialect("users", Dialect::Postgres)
            .where_eq("status", "active")
            .where_in("role", &["admin", "user"])
            .where_any_contains(&["name"], "bo")
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM users WHERE status = $1 AND role IN ($2, $3) AND (LOWER(CAST(name AS TEXT)) LIKE $4 ESCAPE '!')"
        );
        assert_eq!(stmt.params, vec!["active", "admin", "user", "%bo%"]);
    }

    #[test]
    fn test_mysql_contains_casts_to_char() {
        let stmt = QueryBuilder::new_with_dialect("users", Dialect::MySql)
            .where_any_contains(&["id"], "4")
            .build()
            .unwrap();
        assert!(stmt.sql.contains("CAST(id AS CHAR)"), "{}", stmt.sql);
    }

    #[test]
    fn test_checked_identifiers_and_quoting() {
        let stmt = QueryBuilder::new("users")
            .dialect(Dialect::Postgres)
            .identifier_policy(IdentifierPolicy::Quote)
            .select(&["users.id", "users.email"])
            .where_eq("users.email", "a@b.com")
            .order_by("users.id", true)
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"users\".\"id\", \"users\".\"email\" FROM \"users\" WHERE \"users\".\"email\" = $1 ORDER BY \"users\".\"id\" ASC"
        );
        assert_eq!(stmt.params, vec!["a@b.com"]);
    }

    #[test]
    fn test_checked_invalid_identifier() {
        let err = QueryBuilder::new("users;drop")
            .identifier_policy(IdentifierPolicy::Validate)
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { kind: "table", .. }));

        let err = QueryBuilder::new("users")
            .identifier_policy(IdentifierPolicy::Validate)
            .order_by("name; DROP TABLE users", true)
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { kind: "column", .. }));
    }
}
