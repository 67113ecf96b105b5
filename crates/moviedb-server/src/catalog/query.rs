//! Filtered view queries built from request parameters
//!
//! Every query parameter except `projection` and `limit` is an equality
//! filter; repeating a parameter matches any of its values. Values are always
//! bound; only allow-listed column names are written into the SQL text.

use sqlx::{Postgres, QueryBuilder};
use std::collections::{BTreeMap, BTreeSet};

use super::columns::View;
use crate::error::{AppError, AppResult};

pub const LIMIT_PARAM: &str = "limit";
pub const PROJECTION_PARAM: &str = "projection";

/// Parse an optional `limit`, falling back to `default`
pub fn parse_limit(raw: Option<&str>, default: i64) -> AppResult<i64> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => Err(AppError::BadRequest(format!(
                "limit must be a positive integer, got {raw:?}"
            ))),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    /// column -> accepted values
    pub filters: BTreeMap<String, Vec<String>>,
    /// Empty selects every column
    pub projection: Vec<String>,
    pub limit: i64,
}

impl ViewQuery {
    pub fn from_params(params: Vec<(String, String)>, default_limit: i64) -> AppResult<Self> {
        let mut filters: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut projection: Vec<String> = Vec::new();
        let mut limit = None;

        for (key, value) in params {
            match key.as_str() {
                LIMIT_PARAM => {
                    // first occurrence wins
                    limit.get_or_insert(value);
                }
                PROJECTION_PARAM => {
                    if !projection.contains(&value) {
                        projection.push(value);
                    }
                }
                _ => filters.entry(key).or_default().push(value),
            }
        }

        Ok(Self {
            filters,
            projection,
            limit: parse_limit(limit.as_deref(), default_limit)?,
        })
    }

    /// Filter and projection names missing from `allowed`, sorted
    pub fn unknown_columns(&self, allowed: &BTreeSet<String>) -> Vec<String> {
        self.filters
            .keys()
            .chain(self.projection.iter())
            .filter(|column| !allowed.contains(column.as_str()))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn validate(&self, allowed: &BTreeSet<String>) -> AppResult<()> {
        let unknown = self.unknown_columns(allowed);
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(AppError::UnknownColumns(unknown))
        }
    }

    /// Query yielding one JSON array of row objects
    pub fn to_sql(&self, view: View) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT COALESCE(json_agg(row_to_json(t)), '[]'::json) FROM (SELECT ");

        if self.projection.is_empty() {
            builder.push("*");
        } else {
            let columns: Vec<String> = self.projection.iter().map(|c| quote_ident(c)).collect();
            builder.push(columns.join(", "));
        }
        builder.push(" FROM ").push(view.name());

        for (i, (column, values)) in self.filters.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            builder
                .push(quote_ident(column))
                .push("::text = ANY(")
                .push_bind(values.clone())
                .push(")");
        }

        builder.push(" LIMIT ").push_bind(self.limit).push(") t");
        builder
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn allowed(columns: &[&str]) -> BTreeSet<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_params_split_into_filters_projection_and_limit() {
        let query = ViewQuery::from_params(
            params(&[
                ("title", "Heat"),
                ("projection", "id"),
                ("title", "Toy Story"),
                ("limit", "5"),
                ("projection", "title"),
                ("projection", "id"),
                ("limit", "9"),
            ]),
            1000,
        )
        .unwrap();

        assert_eq!(query.filters["title"], vec!["Heat", "Toy Story"]);
        assert_eq!(query.projection, vec!["id", "title"]);
        assert_eq!(query.limit, 5);
    }

    #[test]
    fn test_default_limit_applies() {
        let query = ViewQuery::from_params(Vec::new(), 1000).unwrap();
        assert_eq!(query.limit, 1000);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_bad_limit_is_rejected() {
        for raw in ["0", "-3", "ten"] {
            let result = ViewQuery::from_params(params(&[("limit", raw)]), 1000);
            assert!(matches!(result, Err(AppError::BadRequest(_))), "{raw}");
        }
    }

    #[test]
    fn test_unknown_columns_cover_filters_and_projection() {
        let query = ViewQuery::from_params(
            params(&[("colour", "red"), ("projection", "mood"), ("projection", "title"), ("colour", "blue")]),
            1000,
        )
        .unwrap();

        let unknown = query.unknown_columns(&allowed(&["id", "title"]));
        assert_eq!(unknown, vec!["colour", "mood"]);
        assert!(matches!(
            query.validate(&allowed(&["id", "title"])),
            Err(AppError::UnknownColumns(_))
        ));
    }

    #[test]
    fn test_sql_binds_every_value() {
        let query = ViewQuery::from_params(
            params(&[("projection", "name"), ("movie_id", "862"), ("gender", "Male"), ("gender", "Female")]),
            1000,
        )
        .unwrap();

        let builder = query.to_sql(View::Cast);
        assert_eq!(
            builder.sql(),
            "SELECT COALESCE(json_agg(row_to_json(t)), '[]'::json) FROM (SELECT \"name\" FROM v_cast \
             WHERE \"gender\"::text = ANY($1) AND \"movie_id\"::text = ANY($2) LIMIT $3) t"
        );
    }

    #[test]
    fn test_sql_without_filters_selects_everything() {
        let query = ViewQuery::from_params(Vec::new(), 10).unwrap();
        let builder = query.to_sql(View::Movies);
        assert!(builder.sql().contains("SELECT * FROM v_movies LIMIT $1"));
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
