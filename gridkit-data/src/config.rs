use crate::error::ConfigError;
use crate::field::Field;
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ITEM_COUNT_IN_PAGE: u64 = 20;
pub const DEFAULT_VISIBLE_PAGE_COUNT: u64 = 10;

/// Request parameter names, before namespacing.
pub const FILTER_PARAM: &str = "filter";
pub const SORT_FIELD_PARAM: &str = "sortField";
pub const SORT_ORDER_PARAM: &str = "sortOrder";
pub const CURRENT_PAGE_PARAM: &str = "currentPage";

/// Prefix `key` with `name_` unless `name` is empty.
fn namespaced(name: &str, key: &str) -> String {
    if name.is_empty() {
        key.to_string()
    } else {
        format!("{name}_{key}")
    }
}

/// Page size, window size and request naming for one paginator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct PaginatorConfig {
    #[serde(alias = "itemCountInPage")]
    #[garde(range(min = 1))]
    pub item_count_in_page: u64,
    #[serde(alias = "visiblePageCountInPaginator")]
    #[garde(range(min = 1))]
    pub visible_page_count_in_paginator: u64,
    /// Field counted by the paginator query, e.g. `"u.id"`.
    #[serde(alias = "countFieldName")]
    #[garde(skip)]
    pub count_field_name: String,
    /// Namespace for request parameters.
    #[garde(skip)]
    pub name: String,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            item_count_in_page: DEFAULT_ITEM_COUNT_IN_PAGE,
            visible_page_count_in_paginator: DEFAULT_VISIBLE_PAGE_COUNT,
            count_field_name: String::new(),
            name: String::new(),
        }
    }
}

impl PaginatorConfig {
    pub fn new(count_field_name: impl Into<String>) -> Self {
        Self {
            count_field_name: count_field_name.into(),
            ..Self::default()
        }
    }

    pub fn item_count_in_page(mut self, count: u64) -> Self {
        self.item_count_in_page = count;
        self
    }

    pub fn visible_page_count(mut self, count: u64) -> Self {
        self.visible_page_count_in_paginator = count;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Namespaced request parameter name, e.g. `users_currentPage`.
    pub fn request_query_name(&self, key: &str) -> String {
        namespaced(&self.name, key)
    }

    pub fn current_page_param(&self) -> String {
        self.request_query_name(CURRENT_PAGE_PARAM)
    }

    /// Check the garde constraints (positive page and window sizes).
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|report| ConfigError::from_report("paginator", &report))
    }
}

/// The declared shape of a grid.
///
/// Fields keep insertion order, which is also display order. A `GridConfig`
/// is read-only while a grid is built and can be shared between requests
/// behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct GridConfig {
    name: String,
    count_field_name: String,
    fields: Vec<Field>,
    paginator_config: Option<PaginatorConfig>,
}

impl GridConfig {
    pub fn new(count_field_name: impl Into<String>) -> Self {
        Self {
            count_field_name: count_field_name.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_paginator(mut self, config: PaginatorConfig) -> Self {
        self.paginator_config = Some(config);
        self
    }

    pub fn add_field(&mut self, field: Field) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count_field_name(&self) -> &str {
        &self.count_field_name
    }

    pub fn field_list(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_list_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    pub fn find_field(&self, field_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.field_name() == field_name)
    }

    pub fn filterable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_filterable())
    }

    pub fn paginator_config(&self) -> Option<&PaginatorConfig> {
        self.paginator_config.as_ref()
    }

    /// The paginator configuration a grid run uses.
    ///
    /// The declared one if present (with an empty count field filled in from
    /// this grid), otherwise a default one built from the grid's count field
    /// and name.
    pub fn effective_paginator_config(&self) -> PaginatorConfig {
        match &self.paginator_config {
            Some(config) => {
                let mut config = config.clone();
                if config.count_field_name.is_empty() {
                    config.count_field_name = self.count_field_name.clone();
                }
                config
            }
            None => PaginatorConfig::new(self.count_field_name.clone()).name(self.name.clone()),
        }
    }

    pub fn request_query_name(&self, key: &str) -> String {
        namespaced(&self.name, key)
    }

    pub fn filter_param(&self) -> String {
        self.request_query_name(FILTER_PARAM)
    }

    pub fn sort_field_param(&self) -> String {
        self.request_query_name(SORT_FIELD_PARAM)
    }

    pub fn sort_order_param(&self) -> String {
        self.request_query_name(SORT_ORDER_PARAM)
    }

    /// Load a grid declaration from YAML.
    ///
    /// ```yaml
    /// name: users
    /// count_field_name: u.id
    /// paginator:
    ///   item_count_in_page: 25
    /// fields:
    ///   - field_name: u.email
    ///     label: Email
    ///     filterable: true
    ///     sortable: true
    /// ```
    ///
    /// Unknown keys anywhere in a field entry are rejected.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let spec: GridConfigSpec =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Load(e.to_string()))?;
        spec.validate()
            .map_err(|report| ConfigError::from_report("", &report))?;
        Ok(spec.into())
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
        Self::from_yaml_str(&content)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct GridConfigSpec {
    #[serde(default)]
    #[garde(skip)]
    name: String,
    #[serde(alias = "countFieldName")]
    #[garde(length(min = 1))]
    count_field_name: String,
    #[serde(default, alias = "paginatorConfig")]
    #[garde(dive)]
    paginator: Option<PaginatorConfig>,
    #[serde(default, alias = "fieldList")]
    #[garde(dive)]
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct FieldSpec {
    #[serde(alias = "fieldName")]
    #[garde(length(min = 1))]
    field_name: String,
    #[serde(default)]
    #[garde(skip)]
    label: Option<String>,
    #[serde(default)]
    #[garde(skip)]
    sortable: bool,
    #[serde(default)]
    #[garde(skip)]
    filterable: bool,
    #[serde(default = "default_true")]
    #[garde(skip)]
    visible: bool,
    #[serde(default = "default_true", alias = "autoEscape")]
    #[garde(skip)]
    auto_escape: bool,
    #[serde(default)]
    #[garde(skip)]
    translatable: bool,
}

fn default_true() -> bool {
    true
}

impl From<FieldSpec> for Field {
    fn from(spec: FieldSpec) -> Self {
        let mut field = Field::new(spec.field_name)
            .sortable(spec.sortable)
            .filterable(spec.filterable)
            .visible(spec.visible)
            .auto_escape(spec.auto_escape)
            .translatable(spec.translatable);
        if let Some(label) = spec.label {
            field.set_label(label);
        }
        field
    }
}

impl From<GridConfigSpec> for GridConfig {
    fn from(spec: GridConfigSpec) -> Self {
        GridConfig {
            name: spec.name,
            count_field_name: spec.count_field_name,
            fields: spec.fields.into_iter().map(Field::from).collect(),
            paginator_config: spec.paginator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginator_defaults() {
        let config = PaginatorConfig::default();
        assert_eq!(config.item_count_in_page, 20);
        assert_eq!(config.visible_page_count_in_paginator, 10);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_request_query_name() {
        assert_eq!(PaginatorConfig::default().current_page_param(), "currentPage");
        assert_eq!(
            PaginatorConfig::default().name("users").current_page_param(),
            "users_currentPage"
        );
        let grid = GridConfig::new("u.id").with_name("users");
        assert_eq!(grid.filter_param(), "users_filter");
        assert_eq!(grid.sort_field_param(), "users_sortField");
        assert_eq!(grid.sort_order_param(), "users_sortOrder");
    }

    #[test]
    fn test_zero_page_size_fails_validation() {
        let err = PaginatorConfig::default().item_count_in_page(0).check().unwrap_err();
        match err {
            ConfigError::Validation(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].key, "paginator.item_count_in_page");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_effective_paginator_is_synthesized() {
        let grid = GridConfig::new("u.id").with_name("users");
        let config = grid.effective_paginator_config();
        assert_eq!(config.count_field_name, "u.id");
        assert_eq!(config.name, "users");
        assert_eq!(config.item_count_in_page, DEFAULT_ITEM_COUNT_IN_PAGE);
    }

    #[test]
    fn test_declared_paginator_inherits_count_field() {
        let grid = GridConfig::new("u.id").with_paginator(PaginatorConfig::default().item_count_in_page(5));
        let config = grid.effective_paginator_config();
        assert_eq!(config.count_field_name, "u.id");
        assert_eq!(config.item_count_in_page, 5);
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let grid = GridConfig::new("id")
            .field(Field::new("id"))
            .field(Field::new("name").filterable(true))
            .field(Field::new("email").filterable(true));
        let names: Vec<_> = grid.field_list().iter().map(Field::field_name).collect();
        assert_eq!(names, vec!["id", "name", "email"]);
        assert_eq!(grid.filterable_fields().count(), 2);
        assert!(grid.find_field("email").is_some());
        assert!(grid.find_field("missing").is_none());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
name: users
count_field_name: u.id
paginator:
  item_count_in_page: 25
  visible_page_count_in_paginator: 7
fields:
  - field_name: u.id
  - field_name: u.email
    label: Email
    filterable: true
    sortable: true
    auto_escape: false
"#;
        let grid = GridConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(grid.name(), "users");
        assert_eq!(grid.count_field_name(), "u.id");
        let paginator = grid.paginator_config().unwrap();
        assert_eq!(paginator.item_count_in_page, 25);
        assert_eq!(paginator.visible_page_count_in_paginator, 7);

        let email = grid.find_field("u.email").unwrap();
        assert_eq!(email.label(), "Email");
        assert!(email.is_filterable());
        assert!(email.is_sortable());
        assert!(!email.is_auto_escape());

        let id = grid.find_field("u.id").unwrap();
        assert_eq!(id.label(), "u.id");
        assert!(id.is_visible());
        assert!(id.is_auto_escape());
    }

    #[test]
    fn test_from_yaml_rejects_unknown_field_option() {
        let yaml = r#"
count_field_name: id
fields:
  - field_name: id
    colour: red
"#;
        let err = GridConfig::from_yaml_str(yaml).unwrap_err();
        match err {
            ConfigError::Load(msg) => assert!(msg.contains("colour"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_yaml_validates_paginator() {
        let yaml = r#"
count_field_name: id
paginator:
  visible_page_count_in_paginator: 0
"#;
        let err = GridConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_from_yaml_file() {
        let path = std::env::temp_dir().join(format!("gridkit-config-{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "name: users\ncount_field_name: id\nfields:\n  - field_name: name\n    sortable: true\n",
        )
        .unwrap();
        let grid = GridConfig::from_yaml_file(&path);
        std::fs::remove_file(&path).unwrap();

        let grid = grid.unwrap();
        assert_eq!(grid.name(), "users");
        assert!(grid.find_field("name").unwrap().is_sortable());
    }

    #[test]
    fn test_from_yaml_file_missing() {
        let err = GridConfig::from_yaml_file("/nonexistent/gridkit/grid.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
