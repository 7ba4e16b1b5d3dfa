use crate::error::ConfigError;
use crate::row::Row;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

/// Maps a raw cell value (and the row it came from) to its display value.
pub type FormatValueCallback = Arc<dyn Fn(&Value, &Row) -> Value + Send + Sync>;

/// One displayable, queryable column of a grid.
///
/// The field name is the identifier in the underlying source (e.g.
/// `"u.email"` for a SQL alias) and is fixed at construction; every other
/// attribute can be changed afterwards.
///
/// ```ignore
/// let email = Field::new("u.email")
///     .with_label("Email")
///     .filterable(true)
///     .sortable(true);
/// ```
#[derive(Clone)]
pub struct Field {
    field_name: String,
    label: String,
    sortable: bool,
    filterable: bool,
    visible: bool,
    format_value_callback: Option<FormatValueCallback>,
    auto_escape: bool,
    translatable: bool,
}

/// The closed set of options a [`Field`] accepts.
#[derive(Clone)]
pub enum FieldOption {
    Label(String),
    Sortable(bool),
    Filterable(bool),
    Visible(bool),
    FormatValueCallback(FormatValueCallback),
    AutoEscape(bool),
    Translatable(bool),
}

/// Option names accepted by [`Field::from_option_keys`].
///
/// Both the camelCase and snake_case spellings parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOptionKey {
    Label,
    Sortable,
    Filterable,
    Visible,
    FormatValueCallback,
    AutoEscape,
    Translatable,
}

impl FieldOptionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldOptionKey::Label => "label",
            FieldOptionKey::Sortable => "sortable",
            FieldOptionKey::Filterable => "filterable",
            FieldOptionKey::Visible => "visible",
            FieldOptionKey::FormatValueCallback => "formatValueCallback",
            FieldOptionKey::AutoEscape => "autoEscape",
            FieldOptionKey::Translatable => "translatable",
        }
    }
}

/// Error returned when parsing an unsupported option name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOptionKey(pub String);

impl FromStr for FieldOptionKey {
    type Err = UnknownOptionKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(FieldOptionKey::Label),
            "sortable" => Ok(FieldOptionKey::Sortable),
            "filterable" => Ok(FieldOptionKey::Filterable),
            "visible" => Ok(FieldOptionKey::Visible),
            "formatValueCallback" | "format_value_callback" => {
                Ok(FieldOptionKey::FormatValueCallback)
            }
            "autoEscape" | "auto_escape" => Ok(FieldOptionKey::AutoEscape),
            "translatable" => Ok(FieldOptionKey::Translatable),
            other => Err(UnknownOptionKey(other.to_string())),
        }
    }
}

impl Field {
    /// Create a field with default options: label equal to the field name,
    /// not sortable, not filterable, visible, auto-escaped, not translatable.
    pub fn new(field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            label: field_name.clone(),
            field_name,
            sortable: false,
            filterable: false,
            visible: true,
            format_value_callback: None,
            auto_escape: true,
            translatable: false,
        }
    }

    /// Create a field and apply each option in order.
    pub fn with_options(
        field_name: impl Into<String>,
        options: impl IntoIterator<Item = FieldOption>,
    ) -> Self {
        let mut field = Self::new(field_name);
        for option in options {
            field.apply(option);
        }
        field
    }

    /// Create a field from loosely-typed `(key, value)` pairs.
    ///
    /// Fails on the first key outside [`FieldOptionKey`], or on a value of
    /// the wrong type. `formatValueCallback` cannot be expressed as a plain
    /// value and is rejected here; use [`FieldOption::FormatValueCallback`].
    pub fn from_option_keys<K: AsRef<str>>(
        field_name: impl Into<String>,
        options: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Self, ConfigError> {
        let mut field = Self::new(field_name);
        for (key, value) in options {
            let key = key.as_ref();
            let parsed = key.parse::<FieldOptionKey>().map_err(|UnknownOptionKey(key)| {
                ConfigError::UnknownFieldOption {
                    field: field.field_name.clone(),
                    key,
                }
            })?;
            let option = field.option_from_value(parsed, value)?;
            field.apply(option);
        }
        Ok(field)
    }

    fn option_from_value(&self, key: FieldOptionKey, value: Value) -> Result<FieldOption, ConfigError> {
        let invalid = |expected| ConfigError::InvalidFieldOption {
            field: self.field_name.clone(),
            key: key.as_str().to_string(),
            expected,
        };
        let flag = |value: &Value| value.as_bool().ok_or_else(|| invalid("a boolean"));
        Ok(match key {
            FieldOptionKey::Label => match value {
                Value::String(label) => FieldOption::Label(label),
                _ => return Err(invalid("a string")),
            },
            FieldOptionKey::Sortable => FieldOption::Sortable(flag(&value)?),
            FieldOptionKey::Filterable => FieldOption::Filterable(flag(&value)?),
            FieldOptionKey::Visible => FieldOption::Visible(flag(&value)?),
            FieldOptionKey::AutoEscape => FieldOption::AutoEscape(flag(&value)?),
            FieldOptionKey::Translatable => FieldOption::Translatable(flag(&value)?),
            FieldOptionKey::FormatValueCallback => return Err(invalid("a callback")),
        })
    }

    pub fn apply(&mut self, option: FieldOption) {
        match option {
            FieldOption::Label(label) => self.label = label,
            FieldOption::Sortable(v) => self.sortable = v,
            FieldOption::Filterable(v) => self.filterable = v,
            FieldOption::Visible(v) => self.visible = v,
            FieldOption::FormatValueCallback(cb) => self.format_value_callback = Some(cb),
            FieldOption::AutoEscape(v) => self.auto_escape = v,
            FieldOption::Translatable(v) => self.translatable = v,
        }
    }

    // ── Builder ────────────────────────────────────────────────────────

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn format_value<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Value, &Row) -> Value + Send + Sync + 'static,
    {
        self.format_value_callback = Some(Arc::new(callback));
        self
    }

    pub fn auto_escape(mut self, auto_escape: bool) -> Self {
        self.auto_escape = auto_escape;
        self
    }

    pub fn translatable(mut self, translatable: bool) -> Self {
        self.translatable = translatable;
        self
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn set_sortable(&mut self, sortable: bool) {
        self.sortable = sortable;
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn set_filterable(&mut self, filterable: bool) {
        self.filterable = filterable;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn format_value_callback(&self) -> Option<&FormatValueCallback> {
        self.format_value_callback.as_ref()
    }

    pub fn set_format_value_callback(&mut self, callback: Option<FormatValueCallback>) {
        self.format_value_callback = callback;
    }

    pub fn is_auto_escape(&self) -> bool {
        self.auto_escape
    }

    pub fn set_auto_escape(&mut self, auto_escape: bool) {
        self.auto_escape = auto_escape;
    }

    pub fn is_translatable(&self) -> bool {
        self.translatable
    }

    pub fn set_translatable(&mut self, translatable: bool) {
        self.translatable = translatable;
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("field_name", &self.field_name)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("visible", &self.visible)
            .field("format_value_callback", &self.format_value_callback.is_some())
            .field("auto_escape", &self.auto_escape)
            .field("translatable", &self.translatable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let field = Field::new("u.email");
        assert_eq!(field.field_name(), "u.email");
        assert_eq!(field.label(), "u.email");
        assert!(!field.is_sortable());
        assert!(!field.is_filterable());
        assert!(field.is_visible());
        assert!(field.is_auto_escape());
        assert!(!field.is_translatable());
        assert!(field.format_value_callback().is_none());
    }

    #[test]
    fn test_with_options() {
        let field = Field::with_options(
            "name",
            [
                FieldOption::Label("Name".into()),
                FieldOption::Sortable(true),
                FieldOption::Filterable(true),
                FieldOption::Visible(false),
            ],
        );
        assert_eq!(field.label(), "Name");
        assert!(field.is_sortable());
        assert!(field.is_filterable());
        assert!(!field.is_visible());
    }

    #[test]
    fn test_from_option_keys_accepts_both_spellings() {
        let field = Field::from_option_keys(
            "name",
            [("autoEscape", json!(false)), ("translatable", json!(true))],
        )
        .unwrap();
        assert!(!field.is_auto_escape());
        assert!(field.is_translatable());

        let field = Field::from_option_keys("name", [("auto_escape", json!(false))]).unwrap();
        assert!(!field.is_auto_escape());
    }

    #[test]
    fn test_unknown_option_key_is_rejected() {
        let err = Field::from_option_keys("name", [("sortable", json!(true)), ("colour", json!("red"))])
            .unwrap_err();
        match err {
            ConfigError::UnknownFieldOption { field, key } => {
                assert_eq!(field, "name");
                assert_eq!(key, "colour");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_option_value_type_is_checked() {
        let err = Field::from_option_keys("name", [("sortable", json!("yes"))]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFieldOption { expected: "a boolean", .. }));
    }

    #[test]
    fn test_setters_keep_identity() {
        let mut field = Field::new("id").sortable(true);
        field.set_label("Identifier");
        field.set_sortable(false);
        assert_eq!(field.field_name(), "id");
        assert_eq!(field.label(), "Identifier");
        assert!(!field.is_sortable());
    }
}
