use crate::config::GridConfig;
use crate::field::Field;
use crate::paginator::Paginator;
use crate::row::Row;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Sort direction of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    /// `"DESC"` is descending; anything else, malformed input included, is
    /// ascending.
    pub fn from_request(value: &str) -> Self {
        if value == "DESC" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortOrder::Asc
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filtered, sorted page of rows plus what is needed to render its
/// navigation. Built fresh for each request.
#[derive(Debug, Clone, Serialize)]
pub struct Grid {
    #[serde(skip)]
    pub grid_config: Arc<GridConfig>,
    pub paginator: Paginator,
    pub item_list: Vec<Row>,
    pub filter_value: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub request_uri: String,
}

impl Grid {
    pub fn visible_fields(&self) -> impl Iterator<Item = &Field> {
        self.grid_config.field_list().iter().filter(|f| f.is_visible())
    }

    pub fn is_sorted_by(&self, field_name: &str) -> bool {
        self.sort_field.as_deref() == Some(field_name)
    }

    pub fn filter_param(&self) -> String {
        self.grid_config.filter_param()
    }

    pub fn sort_field_param(&self) -> String {
        self.grid_config.sort_field_param()
    }

    pub fn sort_order_param(&self) -> String {
        self.grid_config.sort_order_param()
    }

    /// Text of `field` in `row`: the raw value passed through the field's
    /// format callback, HTML-escaped when the field is auto-escaped.
    pub fn display_value(&self, row: &Row, field: &Field) -> String {
        let raw = row.get(field.field_name()).unwrap_or(&Value::Null);
        let value = match field.format_value_callback() {
            Some(callback) => callback(raw, row),
            None => raw.clone(),
        };
        let text = match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        };
        if field.is_auto_escape() {
            escape_html(&text)
        } else {
            text
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}
