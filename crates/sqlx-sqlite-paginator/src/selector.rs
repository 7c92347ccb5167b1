//! The query-composition capability the paginator builds on.
//!
//! A [`Selector`] is an immutable SELECT builder that can also execute
//! itself. The paginator only ever calls the methods on this trait, so any
//! backend that can limit, offset, order, filter, re-project, and wrap a query
//! as a subquery can be paginated.

use std::future::Future;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

use crate::{Context, Error, Result};

/// Sort direction for an ordering column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   /// Return the opposite sort direction.
   pub fn reversed(self) -> Self {
      match self {
         SortDirection::Asc => SortDirection::Desc,
         SortDirection::Desc => SortDirection::Asc,
      }
   }

   pub fn as_sql(self) -> &'static str {
      match self {
         SortDirection::Asc => "ASC",
         SortDirection::Desc => "DESC",
      }
   }
}

/// The column used for keyset (cursor) pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetColumn {
   /// Column name as it appears in the query result set
   pub name: String,
   /// Natural (forward) sort direction for this column
   pub direction: SortDirection,
}

impl KeysetColumn {
   /// Create a keyset column with ascending sort direction.
   pub fn asc(name: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         direction: SortDirection::Asc,
      }
   }

   /// Create a keyset column with descending sort direction.
   pub fn desc(name: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         direction: SortDirection::Desc,
      }
   }

   /// Parse a column spec, where a leading `-` marks descending order.
   ///
   /// `"id"` is ascending on `id`; `"-created_at"` is descending on
   /// `created_at`. The name is validated before it is accepted.
   pub fn parse(spec: &str) -> Result<Self> {
      let column = match spec.strip_prefix('-') {
         Some(name) => Self::desc(name),
         None => Self::asc(spec),
      };
      validate_column_name(&column.name)?;
      Ok(column)
   }

   /// The name without any table qualifier, as it appears in a subquery's
   /// result set (`posts.id` becomes `id`).
   pub fn unqualified_name(&self) -> &str {
      self.name.rsplit('.').next().unwrap_or(&self.name)
   }

   /// Comparison operator selecting rows after a cursor value.
   pub(crate) fn after_operator(&self) -> &'static str {
      match self.direction {
         SortDirection::Asc => ">",
         SortDirection::Desc => "<",
      }
   }

   /// Comparison operator selecting rows before a cursor value.
   pub(crate) fn before_operator(&self) -> &'static str {
      match self.direction {
         SortDirection::Asc => "<",
         SortDirection::Desc => ">",
      }
   }
}

/// A filter expressed as `"<column> <operator>"` keys mapped to values.
///
/// All entries are ANDed together. A key without an operator means equality.
///
/// ```
/// use serde_json::json;
/// use sqlx_sqlite_paginator::Cond;
///
/// let cond = Cond::new().with("category", json!("tech")).with("score >=", json!(80));
/// assert_eq!(cond.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cond(IndexMap<String, JsonValue>);

impl Cond {
   pub fn new() -> Self {
      Self::default()
   }

   /// Add an entry, replacing any existing entry with the same key.
   pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
      self.insert(key, value);
      self
   }

   pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
      self.0.insert(key.into(), value.into());
   }

   pub fn get(&self, key: &str) -> Option<&JsonValue> {
      self.0.get(key)
   }

   pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
      self.0.iter().map(|(key, value)| (key.as_str(), value))
   }

   pub fn len(&self) -> usize {
      self.0.len()
   }

   pub fn is_empty(&self) -> bool {
      self.0.is_empty()
   }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Cond {
   fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
      Self(
         iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect(),
      )
   }
}

/// Rendered statement text with its bind values in placeholder order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
   pub sql: String,
   pub arguments: Vec<JsonValue>,
}

/// Query-composition and execution capability consumed by the paginator.
///
/// Builder methods take `self` and return the modified selector; the
/// original value is never shared with the result. Execution methods take a
/// [`Context`] that the implementation must honor for cancellation.
pub trait Selector: Clone + Send + Sync + Sized {
   /// Raw row type produced by the backend.
   type Row: sqlx::Row;
   /// Lazy, finite row sequence.
   type Rows: Send;
   /// Reusable prepared statement handle.
   type Statement: Send;

   /// Set the row limit. Negative means unlimited.
   fn limit(self, limit: i64) -> Self;

   /// Set the row offset. Negative values are passed through as-is; the
   /// paginator uses `-1` to mark an unanchored (last) page.
   fn offset(self, offset: i64) -> Self;

   /// Replace any ordering with a single column.
   fn order_by(self, column: &str, direction: SortDirection) -> Self;

   /// AND an additional filter onto the query.
   fn filter(self, cond: Cond) -> Self;

   /// Replace the projection.
   fn columns(self, columns: Vec<String>) -> Self;

   /// Turn the current query into a subquery named `alias`, selecting all of
   /// its columns.
   fn wrap(self, alias: &str) -> Self;

   /// Render the statement text and bind values.
   fn compile(&self) -> Result<CompiledQuery>;

   /// Execute and decode every row.
   fn all<T>(&self, ctx: &Context) -> impl Future<Output = Result<Vec<T>>> + Send
   where
      T: for<'r> FromRow<'r, Self::Row> + Send + Unpin;

   /// Execute and decode the first row, if any.
   fn one<T>(&self, ctx: &Context) -> impl Future<Output = Result<Option<T>>> + Send
   where
      T: for<'r> FromRow<'r, Self::Row> + Send + Unpin;

   /// Execute and return the first raw row, if any.
   fn row(&self, ctx: &Context) -> impl Future<Output = Result<Option<Self::Row>>> + Send;

   /// Build a lazy row sequence. No I/O happens until it is polled.
   fn rows(&self, ctx: &Context) -> Result<Self::Rows>;

   /// Prepare the statement for repeated execution.
   fn prepare(&self, ctx: &Context) -> impl Future<Output = Result<Self::Statement>> + Send;

   /// Execute and return the first column of the first row as an integer.
   fn scalar(&self, ctx: &Context) -> impl Future<Output = Result<i64>> + Send;
}

/// Validate that an identifier is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain column
/// names, qualified names (e.g., `table.column`), and underscored identifiers.
pub(crate) fn validate_column_name(name: &str) -> Result<()> {
   let invalid = || Error::InvalidColumnName {
      name: name.to_string(),
   };

   let mut chars = name.chars();
   let first = chars.next().ok_or_else(invalid)?;
   if !first.is_ascii_alphabetic() && first != '_' {
      return Err(invalid());
   }

   if chars.any(|ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.') {
      return Err(invalid());
   }

   Ok(())
}

/// Quote an identifier with double quotes, segment by segment.
///
/// `posts.id` becomes `"posts"."id"`. Embedded double quotes are doubled
/// per SQL standard (`"` → `""`).
pub(crate) fn quote_identifier(name: &str) -> String {
   name
      .split('.')
      .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
      .collect::<Vec<_>>()
      .join(".")
}
