//! Row selection for table reads and writes.

use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
        }
    }
}

/// A single `column <op> value` condition.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::Gte,
            value: value.into(),
        }
    }

    /// The value as it appears in a query string.
    pub fn value_text(&self) -> String {
        value_text(&self.value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A table read: projected columns, filters, one ordering and a limit.
///
/// `columns` follows the select syntax of the REST layer, so `"*, subjects(name)"`
/// embeds the `name` of the related subject row.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::gte(column, value));
        self
    }

    pub fn order_asc(self, column: &str) -> Self {
        self.order_by(column, true)
    }

    pub fn order_desc(self, column: &str) -> Self {
        self.order_by(column, false)
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Embedded relations requested in `columns`, as `(relation, columns)` pairs.
    pub fn embedded(&self) -> Vec<(String, Vec<String>)> {
        split_columns(&self.columns)
            .into_iter()
            .filter_map(|part| {
                let open = part.find('(')?;
                let close = part.rfind(')').filter(|&close| close > open)?;
                let relation = part[..open].trim().to_string();
                let columns = part[open + 1..close]
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
                Some((relation, columns))
            })
            .collect()
    }

    /// Plain (non-embedded) columns, or `None` when every column is selected.
    pub fn plain_columns(&self) -> Option<Vec<String>> {
        let parts = split_columns(&self.columns);
        if parts.iter().any(|p| p == "*") {
            return None;
        }
        Some(parts.into_iter().filter(|p| !p.contains('(')).collect())
    }
}

/// Split a select list on top-level commas, keeping `rel(a, b)` groups intact.
fn split_columns(columns: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in columns.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_filters_in_order() {
        let query = Query::new()
            .eq("user_id", "u1")
            .eq("action_type", "download")
            .order_desc("created_at")
            .limit(5);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[1].value_text(), "download");
        assert_eq!(
            query.order,
            Some(Order {
                column: "created_at".to_string(),
                ascending: false
            })
        );
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_embedded_relations() {
        let query = Query::new().select("*, subjects(name)");
        assert_eq!(query.embedded(), vec![("subjects".to_string(), vec!["name".to_string()])]);
        assert_eq!(query.plain_columns(), None);

        let narrow = Query::new().select("note_id, created_at");
        assert!(narrow.embedded().is_empty());
        assert_eq!(
            narrow.plain_columns(),
            Some(vec!["note_id".to_string(), "created_at".to_string()])
        );
    }

    #[test]
    fn test_malformed_embed_is_skipped() {
        assert!(Query::new().select(")subjects(").embedded().is_empty());
        assert!(Query::new().select("subjects)name(").embedded().is_empty());
    }

    #[test]
    fn test_value_text() {
        assert_eq!(Filter::eq("is_published", true).value_text(), "true");
        assert_eq!(Filter::eq("id", 42).value_text(), "42");
        assert_eq!(Filter::eq("id", Value::Null).value_text(), "null");
    }
}
