//! In-memory document adapter.
//!
//! [`MemoryQuery`] runs grid queries over a shared collection of JSON
//! documents, the way a document store would: case-insensitive substring
//! filters, multi-key sort, skip/limit and `COUNT(field)` over non-null
//! values. Documents are returned as stored, so positional sub-documents
//! reach the grid's row normalization untouched.

use crate::adapter::GridQuery;
use crate::error::GridError;
use crate::row::{normalize_row, Row};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MemoryQuery {
    documents: Arc<Vec<Row>>,
    equals: Vec<(String, Value)>,
    contains: Vec<(Vec<String>, String)>,
    sort: Vec<(String, bool)>,
    count_field: Option<String>,
    limit: Option<u64>,
    skip: Option<u64>,
}

/// A finalized [`MemoryQuery`].
#[derive(Debug, Clone)]
pub struct MemoryPlan(MemoryQuery);

impl MemoryPlan {
    pub fn query(&self) -> &MemoryQuery {
        &self.0
    }
}

impl MemoryQuery {
    pub fn new(documents: impl Into<Arc<Vec<Row>>>) -> Self {
        Self {
            documents: documents.into(),
            equals: Vec::new(),
            contains: Vec::new(),
            sort: Vec::new(),
            count_field: None,
            limit: None,
            skip: None,
        }
    }

    /// Keep only documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.equals.push((field.to_string(), value.into()));
        self
    }

    pub fn sort(mut self, field: &str, ascending: bool) -> Self {
        self.sort.push((field.to_string(), ascending));
        self
    }

    pub fn filter_group_count(&self) -> usize {
        self.contains.len()
    }

    /// Fields of each OR-group added by `and_where_any_contains`.
    pub fn filter_groups(&self) -> impl Iterator<Item = &[String]> {
        self.contains.iter().map(|(fields, _)| fields.as_slice())
    }

    pub fn sort_keys(&self) -> &[(String, bool)] {
        &self.sort
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn skip_value(&self) -> Option<u64> {
        self.skip
    }

    pub fn count_field(&self) -> Option<&str> {
        self.count_field.as_deref()
    }

    fn matches(&self, document: &Row) -> bool {
        let view = normalize_row(document.clone());
        let equal = self
            .equals
            .iter()
            .all(|(field, expected)| view.get(field) == Some(expected));
        equal
            && self.contains.iter().all(|(fields, needle)| {
                fields
                    .iter()
                    .any(|field| view.get(field).is_some_and(|v| contains_ci(v, needle)))
            })
    }

    fn filtered(&self) -> Vec<&Row> {
        self.documents.iter().filter(|d| self.matches(d)).collect()
    }

    fn run(&self) -> Vec<Row> {
        let mut docs = self.filtered();
        if !self.sort.is_empty() {
            docs.sort_by(|a, b| {
                let (a, b) = (normalize_row((*a).clone()), normalize_row((*b).clone()));
                for (field, ascending) in &self.sort {
                    let ord = compare_values(a.get(field), b.get(field));
                    let ord = if *ascending { ord } else { ord.reverse() };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        let skip = self.skip.unwrap_or(0) as usize;
        let limit = self.limit.map_or(usize::MAX, |l| l as usize);
        docs.into_iter().skip(skip).take(limit).cloned().collect()
    }

    fn count(&self) -> u64 {
        let docs = self.filtered();
        let counted = match self.count_field.as_deref() {
            None | Some("*") => docs.len(),
            Some(field) => docs
                .into_iter()
                .filter(|d| {
                    normalize_row((*d).clone())
                        .get(field)
                        .is_some_and(|v| !v.is_null())
                })
                .count(),
        };
        counted as u64
    }
}

impl GridQuery for MemoryQuery {
    type Prepared = MemoryPlan;

    fn and_where_any_contains(&mut self, fields: &[&str], needle: &str) {
        if fields.is_empty() {
            return;
        }
        self.contains.push((
            fields.iter().map(|f| f.to_string()).collect(),
            needle.to_lowercase(),
        ));
    }

    fn order_by(&mut self, field: &str, ascending: bool) {
        self.sort.push((field.to_string(), ascending));
    }

    fn project_count(&mut self, field: &str) {
        self.count_field = Some(field.to_string());
    }

    fn clear_limit_offset(&mut self) {
        self.limit = None;
        self.skip = None;
    }

    fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    fn set_offset(&mut self, offset: u64) {
        self.skip = Some(offset);
    }

    fn prepare(&self) -> Result<MemoryPlan, GridError> {
        Ok(MemoryPlan(self.clone()))
    }

    async fn fetch_rows(&self, prepared: &MemoryPlan) -> Result<Vec<Row>, GridError> {
        Ok(prepared.0.run())
    }

    async fn fetch_count(&self, prepared: &MemoryPlan) -> Result<u64, GridError> {
        Ok(prepared.0.count())
    }
}

fn contains_ci(value: &Value, needle: &str) -> bool {
    let text = match value {
        Value::Null => return false,
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    };
    text.contains(needle)
}

/// Total order: missing/null < bool < number < string < array/object.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
