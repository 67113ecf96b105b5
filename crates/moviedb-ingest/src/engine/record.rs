//! Record contract: how an in-memory value projects onto a table row

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::error::{IngestError, Result};

/// A single positional value bound into a statement.
///
/// Nulls carry their type so the store can bind a typed NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Int(v) => v.is_none(),
            SqlValue::Float(v) => v.is_none(),
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Date(v) => v.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(Some(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => *v,
            _ => None,
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(Some(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(Some(v))
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(v: Option<i64>) -> Self {
        SqlValue::Int(v)
    }
}

impl From<Option<f64>> for SqlValue {
    fn from(v: Option<f64>) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(Some(v.to_string()))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(Some(v))
    }
}

impl From<Option<String>> for SqlValue {
    fn from(v: Option<String>) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Option<&str>> for SqlValue {
    fn from(v: Option<&str>) -> Self {
        SqlValue::Text(v.map(str::to_string))
    }
}

impl From<Option<NaiveDate>> for SqlValue {
    fn from(v: Option<NaiveDate>) -> Self {
        SqlValue::Date(v)
    }
}

/// Contract every ingestible type implements.
///
/// `export_order` lists the persisted fields in the order `values` renders
/// them. Types that leave it at the default cannot be written: building a
/// [`Schema`] for them fails with a contract violation.
pub trait Record: Send + Sync + 'static {
    /// Type name used in error messages
    fn record_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Ordered persisted field names
    fn export_order() -> &'static [&'static str] {
        &[]
    }

    /// Field to column renames; fields not listed keep their own name
    fn override_target_names() -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// `(field, column)` for every exported field, overrides applied
    fn column_mapping() -> Vec<(&'static str, &'static str)> {
        let overrides = Self::override_target_names();
        Self::export_order()
            .iter()
            .map(|field| {
                let column = overrides
                    .iter()
                    .find(|(name, _)| name == field)
                    .map_or(*field, |(_, column)| *column);
                (*field, column)
            })
            .collect()
    }

    /// Positional values, one per exported field
    fn values(&self) -> Vec<SqlValue>;
}

/// Validated column layout of a record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    record: &'static str,
    columns: Vec<&'static str>,
}

impl Schema {
    /// Derive and validate the layout of `R`
    pub fn of<R: Record>() -> Result<Self> {
        let record = R::record_name();
        let order = R::export_order();
        if order.is_empty() {
            return Err(IngestError::contract(record, "export order was not implemented"));
        }

        let mut seen = HashSet::with_capacity(order.len());
        for field in order {
            if !seen.insert(*field) {
                return Err(IngestError::contract(
                    record,
                    format!("field '{}' appears twice in export order", field),
                ));
            }
        }

        for (field, _) in R::override_target_names() {
            if !seen.contains(field) {
                return Err(IngestError::contract(
                    record,
                    format!("override names unknown field '{}'", field),
                ));
            }
        }

        let columns = R::column_mapping().into_iter().map(|(_, column)| column).collect();
        Ok(Self { record, columns })
    }

    /// Layout of a one-column synthetic record
    pub fn single(record: &'static str, column: &'static str) -> Self {
        Self {
            record,
            columns: vec![column],
        }
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Reject a rendered row that does not line up with the columns
    pub fn check_row(&self, row: &[SqlValue]) -> Result<()> {
        if row.len() != self.width() {
            return Err(IngestError::contract(
                self.record,
                format!("rendered {} values for {} columns", row.len(), self.width()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Genre {
        id: i64,
        name: String,
    }

    impl Record for Genre {
        fn export_order() -> &'static [&'static str] {
            &["id", "name"]
        }

        fn override_target_names() -> &'static [(&'static str, &'static str)] {
            &[("name", "genre")]
        }

        fn values(&self) -> Vec<SqlValue> {
            vec![self.id.into(), self.name.as_str().into()]
        }
    }

    struct Undeclared;

    impl Record for Undeclared {
        fn values(&self) -> Vec<SqlValue> {
            Vec::new()
        }
    }

    struct BadOverride;

    impl Record for BadOverride {
        fn export_order() -> &'static [&'static str] {
            &["id"]
        }

        fn override_target_names() -> &'static [(&'static str, &'static str)] {
            &[("name", "genre")]
        }

        fn values(&self) -> Vec<SqlValue> {
            vec![SqlValue::Int(None)]
        }
    }

    #[test]
    fn test_column_mapping_applies_overrides() {
        assert_eq!(Genre::column_mapping(), vec![("id", "id"), ("name", "genre")]);
        let schema = Schema::of::<Genre>().unwrap();
        assert_eq!(schema.columns(), &["id", "genre"]);
    }

    #[test]
    fn test_column_mapping_defaults_to_identity() {
        assert!(Undeclared::column_mapping().is_empty());
        assert_eq!(BadOverride::column_mapping(), vec![("id", "id")]);
    }

    #[test]
    fn test_missing_export_order_is_contract_violation() {
        let err = Schema::of::<Undeclared>().unwrap_err();
        match err {
            IngestError::ContractViolation { message, .. } => {
                assert_eq!(message, "export order was not implemented")
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_override_of_unknown_field_rejected() {
        assert!(matches!(
            Schema::of::<BadOverride>(),
            Err(IngestError::ContractViolation { .. })
        ));
    }

    #[test]
    fn test_row_width_checked() {
        let schema = Schema::of::<Genre>().unwrap();
        let genre = Genre {
            id: 18,
            name: "Drama".to_string(),
        };
        assert!(schema.check_row(&genre.values()).is_ok());
        assert!(schema.check_row(&[SqlValue::Int(Some(1))]).is_err());
    }
}
