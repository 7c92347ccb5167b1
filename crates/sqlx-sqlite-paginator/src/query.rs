//! SELECT statement composition and rendering.
//!
//! [`SelectQuery`] is plain data: building it never fails and never touches a
//! database. Identifier validation and operator parsing happen in
//! [`SelectQuery::compile`], which renders SQLite SQL with `$N` placeholders.

use std::fmt::Write as _;

use serde_json::Value as JsonValue;

use crate::selector::{CompiledQuery, Cond, SortDirection, quote_identifier, validate_column_name};
use crate::{Error, Result};

/// Operators accepted in [`Cond`] keys, longest first so `NOT LIKE` wins over
/// `LIKE` and `IS NOT` over `IS`.
const OPERATORS: &[&str] = &[
   "NOT LIKE", "IS NOT", "LIKE", "GLOB", "IS", "<=", ">=", "!=", "<>", "=", "<", ">",
];

#[derive(Debug, Clone, PartialEq)]
enum Source {
   Table(String),
   Subquery {
      query: Box<SelectQuery>,
      alias: String,
   },
}

/// An immutable description of a single SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
   source: Source,
   columns: Vec<String>,
   filters: Vec<Cond>,
   order_by: Option<(String, SortDirection)>,
   limit: i64,
   offset: i64,
}

impl SelectQuery {
   /// `SELECT * FROM <table>` with no limit, offset, filter, or ordering.
   pub fn from_table(table: impl Into<String>) -> Self {
      Self {
         source: Source::Table(table.into()),
         columns: vec!["*".to_string()],
         filters: Vec::new(),
         order_by: None,
         limit: -1,
         offset: 0,
      }
   }

   pub fn columns(mut self, columns: Vec<String>) -> Self {
      self.columns = columns;
      self
   }

   pub fn filter(mut self, cond: Cond) -> Self {
      if !cond.is_empty() {
         self.filters.push(cond);
      }
      self
   }

   pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
      self.order_by = Some((column.to_string(), direction));
      self
   }

   pub fn limit(mut self, limit: i64) -> Self {
      self.limit = limit;
      self
   }

   pub fn offset(mut self, offset: i64) -> Self {
      self.offset = offset;
      self
   }

   /// Wrap this query as `SELECT "alias".* FROM (<self>) AS "alias"`.
   pub fn wrap(self, alias: &str) -> Self {
      Self {
         columns: vec![format!("{}.*", quote_identifier(alias))],
         source: Source::Subquery {
            query: Box::new(self),
            alias: alias.to_string(),
         },
         filters: Vec::new(),
         order_by: None,
         limit: -1,
         offset: 0,
      }
   }

   /// Raw limit as last set (negative = unlimited).
   pub fn limit_value(&self) -> i64 {
      self.limit
   }

   /// Raw offset as last set, including negative markers.
   pub fn offset_value(&self) -> i64 {
      self.offset
   }

   pub fn compile(&self) -> Result<CompiledQuery> {
      let mut sql = String::new();
      let mut arguments = Vec::new();
      self.render(&mut sql, &mut arguments)?;
      Ok(CompiledQuery { sql, arguments })
   }

   fn render(&self, sql: &mut String, arguments: &mut Vec<JsonValue>) -> Result<()> {
      sql.push_str("SELECT ");
      sql.push_str(&self.columns.join(", "));
      sql.push_str(" FROM ");

      match &self.source {
         Source::Table(table) => {
            validate_column_name(table)?;
            sql.push_str(&quote_identifier(table));
         }
         Source::Subquery { query, alias } => {
            validate_column_name(alias)?;
            sql.push('(');
            query.render(sql, arguments)?;
            let _ = write!(sql, ") AS {}", quote_identifier(alias));
         }
      }

      let mut clauses = Vec::new();
      for cond in &self.filters {
         for (key, value) in cond.iter() {
            let (column, operator) = split_condition_key(key)?;
            arguments.push(value.clone());
            clauses.push(format!(
               "{} {} ${}",
               quote_identifier(column),
               operator,
               arguments.len()
            ));
         }
      }
      if !clauses.is_empty() {
         sql.push_str(" WHERE ");
         sql.push_str(&clauses.join(" AND "));
      }

      if let Some((column, direction)) = &self.order_by {
         validate_column_name(column)?;
         let _ = write!(
            sql,
            " ORDER BY {} {}",
            quote_identifier(column),
            direction.as_sql()
         );
      }

      // SQLite only accepts OFFSET after a LIMIT; -1 means "no limit"
      match (self.limit >= 0, self.offset > 0) {
         (true, true) => {
            let _ = write!(sql, " LIMIT {} OFFSET {}", self.limit, self.offset);
         }
         (true, false) => {
            let _ = write!(sql, " LIMIT {}", self.limit);
         }
         (false, true) => {
            let _ = write!(sql, " LIMIT -1 OFFSET {}", self.offset);
         }
         (false, false) => {}
      }

      Ok(())
   }
}

/// Split a condition key like `"score >="` into its column and operator.
///
/// A key with no operator compares for equality.
pub(crate) fn split_condition_key(key: &str) -> Result<(&str, &'static str)> {
   let key = key.trim();
   let (column, rest) = match key.split_once(char::is_whitespace) {
      Some((column, rest)) => (column, rest.trim()),
      None => (key, ""),
   };

   validate_column_name(column)?;

   if rest.is_empty() {
      return Ok((column, "="));
   }

   let normalized = rest.split_whitespace().collect::<Vec<_>>().join(" ");
   OPERATORS
      .iter()
      .find(|op| op.eq_ignore_ascii_case(&normalized))
      .map(|op| (column, *op))
      .ok_or_else(|| Error::InvalidOperator {
         key: key.to_string(),
      })
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   // ─── split_condition_key ───

   #[test]
   fn condition_key_with_operator() {
      assert_eq!(split_condition_key("id >").unwrap(), ("id", ">"));
      assert_eq!(split_condition_key("score >=").unwrap(), ("score", ">="));
      assert_eq!(split_condition_key("name <>").unwrap(), ("name", "<>"));
   }

   #[test]
   fn condition_key_without_operator_is_equality() {
      assert_eq!(split_condition_key("category").unwrap(), ("category", "="));
   }

   #[test]
   fn condition_key_multi_word_operator() {
      assert_eq!(
         split_condition_key("title not   like").unwrap(),
         ("title", "NOT LIKE")
      );
      assert_eq!(
         split_condition_key("deleted_at IS NOT").unwrap(),
         ("deleted_at", "IS NOT")
      );
   }

   #[test]
   fn condition_key_rejects_unknown_operator() {
      let err = split_condition_key("id ~~").unwrap_err();
      assert!(matches!(err, Error::InvalidOperator { .. }));
   }

   #[test]
   fn condition_key_rejects_bad_column() {
      let err = split_condition_key("id) OR (1 =").unwrap_err();
      assert!(matches!(err, Error::InvalidColumnName { .. }));
   }

   // ─── compile ───

   #[test]
   fn plain_table_select() {
      let compiled = SelectQuery::from_table("posts").compile().unwrap();

      assert_eq!(compiled.sql, r#"SELECT * FROM "posts""#);
      assert!(compiled.arguments.is_empty());
   }

   #[test]
   fn filters_are_anded_with_numbered_placeholders() {
      let compiled = SelectQuery::from_table("posts")
         .columns(vec!["id".into(), "title".into()])
         .filter(Cond::new().with("category", json!("tech")))
         .filter(Cond::new().with("score >=", json!(80)))
         .compile()
         .unwrap();

      assert_eq!(
         compiled.sql,
         r#"SELECT id, title FROM "posts" WHERE "category" = $1 AND "score" >= $2"#
      );
      assert_eq!(compiled.arguments, vec![json!("tech"), json!(80)]);
   }

   #[test]
   fn order_limit_offset() {
      let compiled = SelectQuery::from_table("posts")
         .order_by("id", SortDirection::Desc)
         .limit(10)
         .offset(20)
         .compile()
         .unwrap();

      assert_eq!(
         compiled.sql,
         r#"SELECT * FROM "posts" ORDER BY "id" DESC LIMIT 10 OFFSET 20"#
      );
   }

   #[test]
   fn order_by_replaces_previous_ordering() {
      let compiled = SelectQuery::from_table("posts")
         .order_by("score", SortDirection::Desc)
         .order_by("id", SortDirection::Asc)
         .compile()
         .unwrap();

      assert_eq!(compiled.sql, r#"SELECT * FROM "posts" ORDER BY "id" ASC"#);
   }

   #[test]
   fn zero_limit_is_rendered() {
      let compiled = SelectQuery::from_table("posts").limit(0).compile().unwrap();
      assert_eq!(compiled.sql, r#"SELECT * FROM "posts" LIMIT 0"#);
   }

   #[test]
   fn offset_without_limit_uses_unbounded_limit() {
      let compiled = SelectQuery::from_table("posts").offset(5).compile().unwrap();
      assert_eq!(compiled.sql, r#"SELECT * FROM "posts" LIMIT -1 OFFSET 5"#);
   }

   #[test]
   fn negative_offset_is_kept_but_not_rendered() {
      let query = SelectQuery::from_table("posts").limit(10).offset(-1);

      assert_eq!(query.offset_value(), -1);
      assert_eq!(
         query.compile().unwrap().sql,
         r#"SELECT * FROM "posts" LIMIT 10"#
      );
   }

   #[test]
   fn wrapped_query_numbers_inner_arguments_first() {
      let compiled = SelectQuery::from_table("posts")
         .filter(Cond::new().with("category", json!("tech")))
         .filter(Cond::new().with("id <", json!(42)))
         .order_by("id", SortDirection::Desc)
         .limit(3)
         .wrap("_q0")
         .order_by("id", SortDirection::Asc)
         .compile()
         .unwrap();

      assert_eq!(
         compiled.sql,
         r#"SELECT "_q0".* FROM (SELECT * FROM "posts" WHERE "category" = $1 AND "id" < $2 ORDER BY "id" DESC LIMIT 3) AS "_q0" ORDER BY "id" ASC"#
      );
      assert_eq!(compiled.arguments, vec![json!("tech"), json!(42)]);
   }

   #[test]
   fn empty_cond_adds_no_where_clause() {
      let compiled = SelectQuery::from_table("posts")
         .filter(Cond::new())
         .compile()
         .unwrap();

      assert_eq!(compiled.sql, r#"SELECT * FROM "posts""#);
   }

   #[test]
   fn invalid_table_name_fails_compile() {
      let err = SelectQuery::from_table("posts; DROP TABLE x")
         .compile()
         .unwrap_err();

      assert!(matches!(err, Error::InvalidColumnName { .. }));
   }

   #[test]
   fn invalid_order_column_fails_compile() {
      let err = SelectQuery::from_table("posts")
         .order_by("id desc", SortDirection::Asc)
         .compile()
         .unwrap_err();

      assert!(matches!(err, Error::InvalidColumnName { .. }));
   }
}
