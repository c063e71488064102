use serde_json::Value;

/// A row predicate supported by the hosted row store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    IsNull { column: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Read against one table: conjunction of filters, optional ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub table: String,
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub single: bool,
}

impl RowQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: None,
            filters: Vec::new(),
            order: None,
            single: false,
        }
    }

    /// Restrict the returned columns (`"id, vendor_id"`).
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push(Filter::IsNull {
            column: column.into(),
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Return at most one row.
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// PostgREST query-string pairs for this query.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        for filter in &self.filters {
            match filter {
                Filter::Eq { column, value } => pairs.push((column.clone(), format!("eq.{value}"))),
                Filter::IsNull { column } => pairs.push((column.clone(), "is.null".to_string())),
            }
        }
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if self.single {
            pairs.push(("limit".to_string(), "1".to_string()));
        }
        pairs
    }

    /// Whether a JSON row satisfies every filter.
    pub fn matches(&self, row: &serde_json::Map<String, Value>) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Eq { column, value } => match row.get(column) {
                Some(Value::String(s)) => s == value,
                Some(Value::Null) | None => false,
                Some(other) => other.to_string() == *value,
            },
            Filter::IsNull { column } => matches!(row.get(column), None | Some(Value::Null)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn renders_postgrest_pairs() {
        let query = RowQuery::new("costs")
            .select("vendor_id")
            .eq("created_by", "u-1")
            .is_null("deleted_at")
            .order("created_at", false);

        assert_eq!(
            query.to_query_pairs(),
            vec![
                pair("select", "vendor_id"),
                pair("created_by", "eq.u-1"),
                pair("deleted_at", "is.null"),
                pair("order", "created_at.desc"),
            ]
        );
    }

    #[test]
    fn single_adds_limit() {
        let pairs = RowQuery::new("users").eq("id", "u-1").single().to_query_pairs();
        assert_eq!(pairs.last(), Some(&pair("limit", "1")));
        assert_eq!(pairs.first(), Some(&pair("select", "*")));
    }

    #[test]
    fn matches_equality_and_null_checks() {
        let query = RowQuery::new("costs").eq("created_by", "u-1").is_null("deleted_at");

        let live = json!({"created_by": "u-1", "deleted_at": null});
        let deleted = json!({"created_by": "u-1", "deleted_at": "2024-01-01"});
        let other = json!({"created_by": "u-2"});

        assert!(query.matches(live.as_object().unwrap()));
        assert!(!query.matches(deleted.as_object().unwrap()));
        assert!(!query.matches(other.as_object().unwrap()));
    }

    #[test]
    fn equality_compares_non_string_values_textually() {
        let query = RowQuery::new("point_rewards").eq("points", "50");
        let row = json!({"points": 50});
        assert!(query.matches(row.as_object().unwrap()));
    }
}
