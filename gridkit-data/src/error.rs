use crate::query::QueryError;

/// A single validation error detail from typed config validation (garde).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationDetail {
    pub key: String,
    pub message: String,
}

/// Errors raised while building a grid configuration.
///
/// These are fail-fast: a grid cannot be built from a configuration that
/// produced one.
#[derive(Debug)]
pub enum ConfigError {
    /// A field was given an option key outside the supported option set.
    UnknownFieldOption { field: String, key: String },
    /// A field option key was recognised but its value had the wrong type.
    InvalidFieldOption { field: String, key: String, expected: &'static str },
    /// The YAML source could not be parsed.
    Load(String),
    /// Validation errors from typed config (garde constraints).
    Validation(Vec<ConfigValidationDetail>),
}

impl ConfigError {
    pub(crate) fn from_report(prefix: &str, report: &garde::Report) -> Self {
        let details = report
            .iter()
            .map(|(path, error)| {
                let path = path.to_string();
                let key = match (prefix.is_empty(), path.is_empty()) {
                    (true, _) => path,
                    (false, true) => prefix.to_string(),
                    (false, false) => format!("{prefix}.{path}"),
                };
                ConfigValidationDetail {
                    key,
                    message: error.message().to_string(),
                }
            })
            .collect();
        ConfigError::Validation(details)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownFieldOption { field, key } => {
                write!(f, "Unknown option '{key}' for field '{field}'")
            }
            ConfigError::InvalidFieldOption { field, key, expected } => {
                write!(f, "Option '{key}' for field '{field}' expects {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Grid config load error: {msg}"),
            ConfigError::Validation(details) => {
                write!(f, "Grid config validation errors:")?;
                for detail in details {
                    write!(f, "\n  - {}: {}", detail.key, detail.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur while building a grid.
///
/// Adapter failures travel through [`GridError::Database`] untouched; the
/// grid pipeline never retries or swallows them.
#[derive(Debug)]
pub enum GridError {
    Config(ConfigError),
    Query(QueryError),
    Database(Box<dyn std::error::Error + Send + Sync>),
    /// A listener prevented the default query finalisation for the named
    /// phase without injecting a query of its own.
    MissingQuery(&'static str),
}

impl GridError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by adapter crates (e.g. `gridkit-data-sqlx`) to wrap
    /// driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        GridError::Database(Box::new(err))
    }
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::Config(err) => write!(f, "{err}"),
            GridError::Query(err) => write!(f, "Query error: {err}"),
            GridError::Database(err) => write!(f, "Database error: {err}"),
            GridError::MissingQuery(phase) => {
                write!(f, "No query available after {phase}: default prevented without replacement")
            }
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::Config(err) => Some(err),
            GridError::Query(err) => Some(err),
            GridError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ConfigError> for GridError {
    fn from(err: ConfigError) -> Self {
        GridError::Config(err)
    }
}

impl From<QueryError> for GridError {
    fn from(err: QueryError) -> Self {
        GridError::Query(err)
    }
}
