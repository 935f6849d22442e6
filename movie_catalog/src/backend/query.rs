//! Document list queries.

use serde_json::{Value, json};

/// A single list query; a listing applies all of them together
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Attribute equals any of the values
    Equal { attribute: String, values: Vec<Value> },
    /// Ascending order by attribute
    OrderAsc(String),
    /// Descending order by attribute
    OrderDesc(String),
    /// At most this many documents
    Limit(u32),
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Query::OrderAsc(attribute.into())
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc(attribute.into())
    }

    pub fn limit(limit: u32) -> Self {
        Query::Limit(limit)
    }

    /// Wire form sent as a `queries[]` parameter
    pub fn to_query_string(&self) -> String {
        let value = match self {
            Query::Equal { attribute, values } => json!({
                "method": "equal",
                "attribute": attribute,
                "values": values,
            }),
            Query::OrderAsc(attribute) => json!({
                "method": "orderAsc",
                "attribute": attribute,
            }),
            Query::OrderDesc(attribute) => json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
            Query::Limit(limit) => json!({
                "method": "limit",
                "values": [limit],
            }),
        };
        value.to_string()
    }
}
