use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;

/// Upper bound of a prefix range, sorts after every printable character.
pub const PREFIX_END: char = '\u{f8ff}';

/// Maximum number of ids accepted by an `IdIn` filter.
pub const MAX_ID_IN: usize = 10;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Query {
    pub collection: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    Eq { field: String, value: Value },
    ArrayContains { field: String, value: Value },
    IdIn { ids: Vec<String> },
    Range { field: String, start: Value, end: Value },
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn array_contains(field: &str, value: impl Into<Value>) -> Self {
        Self::ArrayContains {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn id_in(ids: &[String]) -> Self {
        Self::IdIn { ids: ids.to_vec() }
    }

    /// Matches string fields starting with `prefix`, expressed as a half-open range.
    pub fn prefix(field: &str, prefix: &str) -> Self {
        Self::Range {
            field: field.to_string(),
            start: Value::String(prefix.to_string()),
            end: Value::String(format!("{}{}", prefix, PREFIX_END)),
        }
    }

    fn matches(&self, id: &str, document: &Value) -> bool {
        match self {
            Self::Eq { field, value } => document.get(field) == Some(value),
            Self::ArrayContains { field, value } => match document.get(field) {
                Some(Value::Array(items)) => items.contains(value),
                _ => false,
            },
            Self::IdIn { ids } => ids.iter().any(|candidate| candidate == id),
            Self::Range { field, start, end } => match document.get(field) {
                Some(found) => {
                    matches!(
                        compare_values(found, start),
                        Some(Ordering::Greater) | Some(Ordering::Equal)
                    ) && compare_values(found, end) == Some(Ordering::Less)
                }
                None => false,
            },
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("an id filter accepts at most {MAX_ID_IN} ids, got {0}")]
    TooManyIds(usize),
}

impl Query {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        for filter in &self.filters {
            if let Filter::IdIn { ids } = filter {
                if ids.len() > MAX_ID_IN {
                    return Err(QueryError::TooManyIds(ids.len()));
                }
            }
        }

        Ok(())
    }

    /// Runs the query over `(id, document)` rows. Rows without the ordering field are excluded,
    /// ties are broken by id so that results are stable.
    pub fn run<'a>(
        &self,
        rows: impl Iterator<Item = (&'a String, &'a Value)>,
    ) -> Vec<(&'a String, &'a Value)> {
        let mut results: Vec<(&String, &Value)> = rows
            .filter(|(id, document)| self.filters.iter().all(|f| f.matches(id, document)))
            .filter(|(_, document)| match &self.order_by {
                Some(order) => document.get(&order.field).is_some(),
                None => true,
            })
            .collect();

        match &self.order_by {
            Some(order) => results.sort_by(|(a_id, a), (b_id, b)| {
                let ordering = compare_values(&a[&order.field], &b[&order.field])
                    .unwrap_or(Ordering::Equal);
                let ordering = if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                ordering.then_with(|| a_id.cmp(b_id))
            }),
            None => results.sort_by(|(a_id, _), (b_id, _)| a_id.cmp(b_id)),
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }
}

/// Compares two scalar values of the same kind. Mixed kinds are unordered.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
