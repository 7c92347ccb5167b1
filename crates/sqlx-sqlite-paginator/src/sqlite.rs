//! [`Selector`] implementation for SQLite on top of a SQLx pool.

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteArguments, SqliteColumn, SqlitePool, SqliteRow, SqliteStatement};
use sqlx::{Arguments, Executor, FromRow, Statement};
use tracing::debug;

use crate::query::SelectQuery;
use crate::selector::{CompiledQuery, Cond, SortDirection};
use crate::{Context, Error, Result, Selector};

/// A SELECT against a SQLite pool.
///
/// Cloning is cheap: the pool is reference counted and the query is plain
/// data.
///
/// ```no_run
/// # async fn demo(pool: sqlx::SqlitePool) -> sqlx_sqlite_paginator::Result<()> {
/// use serde_json::json;
/// use sqlx_sqlite_paginator::{Cond, Paginator, Selector, SqliteSelector};
///
/// let posts = SqliteSelector::new(pool, "posts")
///    .select(["id", "title"])
///    .filter(Cond::new().with("category", json!("tech")));
///
/// let page: Vec<(i64, String)> = Paginator::new(posts, 20).page(2).all().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteSelector {
   pool: SqlitePool,
   query: SelectQuery,
}

impl SqliteSelector {
   /// `SELECT * FROM <table>` on `pool`.
   pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
      Self {
         pool,
         query: SelectQuery::from_table(table),
      }
   }

   /// Replace the projection with the given column expressions.
   pub fn select<I, S>(self, columns: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      Selector::columns(self, columns.into_iter().map(Into::into).collect())
   }

   pub fn pool(&self) -> &SqlitePool {
      &self.pool
   }

   pub fn query(&self) -> &SelectQuery {
      &self.query
   }

   fn map_query(self, f: impl FnOnce(SelectQuery) -> SelectQuery) -> Self {
      Self {
         pool: self.pool,
         query: f(self.query),
      }
   }

   fn compile_with_arguments<'q>(&self) -> Result<(String, SqliteArguments<'q>)> {
      let compiled = self.query.compile()?;
      debug!(
         sql = %compiled.sql,
         arguments = compiled.arguments.len(),
         "executing select"
      );
      let arguments = to_arguments(compiled.arguments)?;
      Ok((compiled.sql, arguments))
   }
}

impl Selector for SqliteSelector {
   type Row = SqliteRow;
   type Rows = SqliteRows;
   type Statement = SqliteStatementHandle;

   fn limit(self, limit: i64) -> Self {
      self.map_query(|q| q.limit(limit))
   }

   fn offset(self, offset: i64) -> Self {
      self.map_query(|q| q.offset(offset))
   }

   fn order_by(self, column: &str, direction: SortDirection) -> Self {
      self.map_query(|q| q.order_by(column, direction))
   }

   fn filter(self, cond: Cond) -> Self {
      self.map_query(|q| q.filter(cond))
   }

   fn columns(self, columns: Vec<String>) -> Self {
      self.map_query(|q| q.columns(columns))
   }

   fn wrap(self, alias: &str) -> Self {
      self.map_query(|q| q.wrap(alias))
   }

   fn compile(&self) -> Result<CompiledQuery> {
      self.query.compile()
   }

   async fn all<T>(&self, ctx: &Context) -> Result<Vec<T>>
   where
      T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
   {
      let (sql, arguments) = self.compile_with_arguments()?;
      ctx.run(async {
         let rows = sqlx::query_as_with::<_, T, _>(&sql, arguments)
            .fetch_all(&self.pool)
            .await?;
         Ok(rows)
      })
      .await
   }

   async fn one<T>(&self, ctx: &Context) -> Result<Option<T>>
   where
      T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
   {
      let (sql, arguments) = self.compile_with_arguments()?;
      ctx.run(async {
         let row = sqlx::query_as_with::<_, T, _>(&sql, arguments)
            .fetch_optional(&self.pool)
            .await?;
         Ok(row)
      })
      .await
   }

   async fn row(&self, ctx: &Context) -> Result<Option<SqliteRow>> {
      let (sql, arguments) = self.compile_with_arguments()?;
      ctx.run(async {
         let row = sqlx::query_with(&sql, arguments)
            .fetch_optional(&self.pool)
            .await?;
         Ok(row)
      })
      .await
   }

   fn rows(&self, ctx: &Context) -> Result<SqliteRows> {
      let compiled = self.query.compile()?;
      Ok(SqliteRows {
         pool: self.pool.clone(),
         sql: compiled.sql,
         arguments: Some(compiled.arguments),
         ctx: ctx.clone(),
      })
   }

   async fn prepare(&self, ctx: &Context) -> Result<SqliteStatementHandle> {
      let compiled = self.query.compile()?;
      debug!(sql = %compiled.sql, "preparing select");
      let statement = ctx
         .run(async {
            let statement = (&self.pool).prepare(&compiled.sql).await?;
            Ok(Statement::to_owned(&statement))
         })
         .await?;

      Ok(SqliteStatementHandle {
         pool: self.pool.clone(),
         statement,
         arguments: compiled.arguments,
      })
   }

   async fn scalar(&self, ctx: &Context) -> Result<i64> {
      let (sql, arguments) = self.compile_with_arguments()?;
      ctx.run(async {
         let value = sqlx::query_scalar_with::<_, i64, _>(&sql, arguments)
            .fetch_one(&self.pool)
            .await?;
         Ok(value)
      })
      .await
   }
}

/// A lazy, single-use sequence of rows.
///
/// Nothing is sent to the database until [`SqliteRows::stream`] is polled.
/// The stream can be taken once; later calls yield [`Error::RowsConsumed`].
pub struct SqliteRows {
   pool: SqlitePool,
   sql: String,
   arguments: Option<Vec<JsonValue>>,
   ctx: Context,
}

impl SqliteRows {
   pub fn sql(&self) -> &str {
      &self.sql
   }

   pub fn is_consumed(&self) -> bool {
      self.arguments.is_none()
   }

   /// Stream the rows. Stops with an error if the context finishes first.
   pub fn stream(&mut self) -> BoxStream<'_, Result<SqliteRow>> {
      let Some(values) = self.arguments.take() else {
         return stream::once(async { Err(Error::RowsConsumed) }).boxed();
      };

      let arguments = match to_arguments(values) {
         Ok(arguments) => arguments,
         Err(err) => return stream::once(async move { Err(err) }).boxed(),
      };

      debug!(sql = %self.sql, "streaming select");
      let rows = sqlx::query_with(&self.sql, arguments).fetch(&self.pool);
      let ctx = self.ctx.clone();

      stream::unfold(Some(rows), move |state| {
         let ctx = ctx.clone();
         async move {
            let mut rows = state?;
            let next = ctx.run(async { Ok(rows.next().await) }).await;
            match next {
               Ok(Some(Ok(row))) => Some((Ok(row), Some(rows))),
               Ok(Some(Err(err))) => Some((Err(Error::from(err)), None)),
               Ok(None) => None,
               Err(err) => Some((Err(err), None)),
            }
         }
      })
      .boxed()
   }

   /// Drain the stream into a vector.
   pub async fn collect(mut self) -> Result<Vec<SqliteRow>> {
      let mut rows = Vec::new();
      let mut stream = self.stream();
      while let Some(row) = stream.next().await {
         rows.push(row?);
      }
      Ok(rows)
   }
}

/// A statement prepared on the pool, reusable with its original arguments.
pub struct SqliteStatementHandle {
   pool: SqlitePool,
   statement: SqliteStatement<'static>,
   arguments: Vec<JsonValue>,
}

impl SqliteStatementHandle {
   pub fn sql(&self) -> &str {
      self.statement.sql()
   }

   pub fn columns(&self) -> &[SqliteColumn] {
      self.statement.columns()
   }

   pub fn arguments(&self) -> &[JsonValue] {
      &self.arguments
   }

   /// Execute the prepared statement and decode every row.
   pub async fn fetch_all<T>(&self, ctx: &Context) -> Result<Vec<T>>
   where
      T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
   {
      let arguments = to_arguments(self.arguments.clone())?;
      ctx.run(async {
         let rows = self
            .statement
            .query_as_with::<T, _>(arguments)
            .fetch_all(&self.pool)
            .await?;
         Ok(rows)
      })
      .await
   }
}

/// Build SQLite arguments from JSON bind values.
fn to_arguments<'q>(values: Vec<JsonValue>) -> Result<SqliteArguments<'q>> {
   let mut arguments = SqliteArguments::default();
   for value in values {
      bind_value(&mut arguments, value)?;
   }
   Ok(arguments)
}

/// Bind a JSON value with the closest SQLite storage class.
fn bind_value(arguments: &mut SqliteArguments<'_>, value: JsonValue) -> Result<()> {
   let added = match value {
      JsonValue::Null => arguments.add(None::<JsonValue>),
      JsonValue::String(text) => arguments.add(text),
      JsonValue::Bool(flag) => arguments.add(flag),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 when possible
         if let Some(int_val) = number.as_i64() {
            arguments.add(int_val)
         } else if let Some(uint_val) = number.as_u64() {
            // Value too large for i64, use f64 (will lose precision)
            arguments.add(uint_val as f64)
         } else {
            arguments.add(number.as_f64().unwrap_or_default())
         }
      }
      other => arguments.add(other),
   };
   added.map_err(sqlx::Error::Encode)?;
   Ok(())
}
