//! Offset and keyset pagination over any [`Selector`].
//!
//! A [`Paginator`] is a handle to a persistent chain of steps. Every fluent
//! call (`page`, `cursor`, `next_page`, `prev_page`) returns a new handle and
//! leaves the receiver alone, so one configured paginator can be forked into
//! many pages:
//!
//! ```no_run
//! # async fn demo(posts: sqlx_sqlite_paginator::SqliteSelector) -> sqlx_sqlite_paginator::Result<()> {
//! use sqlx_sqlite_paginator::Paginator;
//!
//! let by_id = Paginator::new(posts, 20).cursor("id");
//!
//! let first: Vec<(i64, String)> = by_id.all().await?;
//! let after_40: Vec<(i64, String)> = by_id.next_page(40).all().await?;
//! let before_40: Vec<(i64, String)> = by_id.prev_page(40).all().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Keyset pages
//!
//! Once a cursor value is staged the numeric offset is dropped and the query
//! seeks with `column > value` (forward) or `column < value` (backward). A
//! backward page has to read the rows closest to the cursor, so the inner
//! query runs in reverse order under the limit and an outer query restores
//! the natural order:
//!
//! ```text
//! SELECT "_q0".* FROM (
//!    SELECT * FROM "posts" WHERE "id" < $1 ORDER BY "id" DESC LIMIT 20
//! ) AS "_q0" ORDER BY "id" ASC
//! ```

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::FromRow;

use crate::chain::{Chain, Mutation};
use crate::selector::{CompiledQuery, Cond, KeysetColumn};
use crate::{Context, Error, PaginatorConfig, Result, Selector};

/// Normalized page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
   /// No limit; every row is on the single page.
   Unlimited,
   /// At most this many rows per page. Zero fetches nothing but still counts
   /// as one page.
   Limited(u64),
}

impl PageSize {
   /// Any negative size means unlimited.
   pub fn from_raw(size: i64) -> Self {
      u64::try_from(size).map_or(PageSize::Unlimited, PageSize::Limited)
   }

   /// The limit handed to the selector (`-1` for unlimited).
   pub fn as_raw(self) -> i64 {
      match self {
         PageSize::Unlimited => -1,
         PageSize::Limited(size) => i64::try_from(size).unwrap_or(i64::MAX),
      }
   }
}

/// Normalized page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
   /// Unanchored (last) page, forwarded to the selector as offset `-1`.
   Last,
   /// Zero-based page index.
   Number(u64),
}

impl PageNumber {
   /// Any negative number means the unanchored page.
   pub fn from_raw(number: i64) -> Self {
      u64::try_from(number).map_or(PageNumber::Last, PageNumber::Number)
   }

   /// Offset for this page at the given size.
   pub fn offset(self, size: PageSize) -> i64 {
      match (self, size) {
         (PageNumber::Last, _) => -1,
         (PageNumber::Number(_), PageSize::Unlimited) => 0,
         (PageNumber::Number(number), PageSize::Limited(size)) => {
            i64::try_from(size.saturating_mul(number)).unwrap_or(i64::MAX)
         }
      }
   }
}

/// One recorded paginator call.
#[derive(Debug)]
enum Step {
   Init { page_size: PageSize },
   Page(PageNumber),
   Cursor(String),
   NextPage(JsonValue),
   PrevPage(JsonValue),
}

/// State rebuilt from the chain on every terminal call.
#[derive(Debug, Clone)]
pub(crate) struct PaginatorQuery<S> {
   pub(crate) sel: S,
   pub(crate) cursor_column: Option<KeysetColumn>,
   pub(crate) cursor_value: Option<JsonValue>,
   pub(crate) cursor_cond: Option<Cond>,
   pub(crate) reverse: bool,
   pub(crate) page_size: PageSize,
   pub(crate) page_number: PageNumber,
}

impl<S: Selector> PaginatorQuery<S> {
   fn new(sel: S) -> Self {
      Self {
         sel,
         cursor_column: None,
         cursor_value: None,
         cursor_cond: None,
         reverse: false,
         page_size: PageSize::Unlimited,
         page_number: PageNumber::Number(0),
      }
   }

   fn stage_cursor(&mut self, value: &JsonValue, reverse: bool) -> Result<()> {
      let column = self
         .cursor_column
         .as_ref()
         .ok_or(Error::MissingCursorColumn)?;

      let operator = if reverse {
         column.before_operator()
      } else {
         column.after_operator()
      };

      self.cursor_cond = Some(Cond::new().with(format!("{} {}", column.name, operator), value.clone()));
      self.cursor_value = Some(value.clone());
      self.reverse = reverse;
      Ok(())
   }
}

impl<S: Selector> Mutation<PaginatorQuery<S>> for Step {
   type Error = Error;

   fn apply(&self, mut pq: PaginatorQuery<S>) -> Result<PaginatorQuery<S>> {
      match self {
         Step::Init { page_size } => {
            pq.page_size = *page_size;
            pq.sel = pq.sel.limit(page_size.as_raw());
         }
         Step::Page(number) => {
            // Back to offset mode: drop any staged cursor, keep the column
            pq.page_number = *number;
            pq.cursor_value = None;
            pq.cursor_cond = None;
            pq.reverse = false;
            pq.sel = pq.sel.offset(number.offset(pq.page_size));
         }
         Step::Cursor(spec) => {
            pq.cursor_column = if spec.is_empty() {
               None
            } else {
               Some(KeysetColumn::parse(spec)?)
            };
            pq.cursor_value = None;
         }
         Step::NextPage(value) => pq.stage_cursor(value, false)?,
         Step::PrevPage(value) => pq.stage_cursor(value, true)?,
      }
      Ok(pq)
   }
}

/// Immutable, forkable paginator over a [`Selector`].
#[derive(Debug, Clone)]
pub struct Paginator<S> {
   selector: Arc<S>,
   config: Arc<PaginatorConfig>,
   chain: Chain<Step>,
}

impl<S: Selector> Paginator<S> {
   /// Paginate `selector` with `page_size` rows per page, starting at page 0.
   ///
   /// A negative size means unlimited. Zero is kept as a literal `LIMIT 0`.
   pub fn new(selector: S, page_size: i64) -> Self {
      Self::with_config(selector, page_size, PaginatorConfig::default())
   }

   /// Like [`Paginator::new`], with custom aliases.
   pub fn with_config(selector: S, page_size: i64, config: PaginatorConfig) -> Self {
      let paginator = Self {
         selector: Arc::new(selector),
         config: Arc::new(config),
         chain: Chain::new(),
      };
      paginator
         .frame(Step::Init {
            page_size: PageSize::from_raw(page_size),
         })
         .page(0)
   }

   fn frame(&self, step: Step) -> Self {
      Self {
         selector: Arc::clone(&self.selector),
         config: Arc::clone(&self.config),
         chain: self.chain.extend(step),
      }
   }

   /// Jump to a zero-based page.
   ///
   /// Negative numbers select the unanchored page: the selector receives
   /// offset `-1` and decides what it means. [`SqliteSelector`] renders no
   /// OFFSET for it, so the rows are those of page 0, not the last page.
   ///
   /// [`SqliteSelector`]: crate::SqliteSelector
   #[must_use]
   pub fn page(&self, number: i64) -> Self {
      self.frame(Step::Page(PageNumber::from_raw(number)))
   }

   /// Use `column` for keyset pagination. A leading `-` marks a column whose
   /// natural order is descending; an empty string clears the column.
   #[must_use]
   pub fn cursor(&self, column: impl Into<String>) -> Self {
      self.frame(Step::Cursor(column.into()))
   }

   /// Fetch the page after `value` in the cursor column's natural order.
   #[must_use]
   pub fn next_page(&self, value: impl Into<JsonValue>) -> Self {
      self.frame(Step::NextPage(value.into()))
   }

   /// Fetch the page before `value`. Rows still come back in natural order.
   #[must_use]
   pub fn prev_page(&self, value: impl Into<JsonValue>) -> Self {
      self.frame(Step::PrevPage(value.into()))
   }

   /// Aliases used when rendering wrapped and count queries.
   pub fn config(&self) -> &PaginatorConfig {
      &self.config
   }

   /// Replay the chain without applying cursor ordering or filters.
   pub(crate) fn resolve(&self) -> Result<PaginatorQuery<S>> {
      self.chain.resolve(PaginatorQuery::new(S::clone(&self.selector)))
   }

   /// Replay the chain and apply the keyset ordering, filter, and wrapping.
   pub(crate) fn resolve_with_cursor(&self) -> Result<PaginatorQuery<S>> {
      let mut pq = self.resolve()?;

      if let Some(column) = &pq.cursor_column {
         let direction = if pq.reverse {
            column.direction.reversed()
         } else {
            column.direction
         };
         pq.sel = pq.sel.order_by(&column.name, direction);
      }

      if let Some(cond) = pq.cursor_cond.clone() {
         pq.sel = pq.sel.filter(cond).offset(0);
      }

      if pq.reverse
         && let Some(column) = &pq.cursor_column
      {
         pq.sel = pq
            .sel
            .wrap(&self.config.subquery_alias)
            .order_by(column.unqualified_name(), column.direction);
      }

      Ok(pq)
   }

   fn count_selector(&self, sel: S) -> S {
      sel.columns(vec![format!("count(1) AS {}", self.config.count_alias)])
         .limit(-1)
         .offset(0)
   }

   /// Number of rows matched by the query, ignoring page and cursor.
   pub async fn total_items(&self) -> Result<u64> {
      self.total_items_with(&Context::background()).await
   }

   /// Like [`Paginator::total_items`], honoring `ctx`.
   pub async fn total_items_with(&self, ctx: &Context) -> Result<u64> {
      let pq = self.resolve()?;
      let count = self.count_selector(pq.sel).scalar(ctx).await?;
      Ok(u64::try_from(count).unwrap_or_default())
   }

   /// Number of pages at the configured size.
   ///
   /// Always 1 for unlimited and zero page sizes, without querying.
   pub async fn total_pages(&self) -> Result<u64> {
      self.total_pages_with(&Context::background()).await
   }

   /// Like [`Paginator::total_pages`], honoring `ctx`.
   pub async fn total_pages_with(&self, ctx: &Context) -> Result<u64> {
      let pq = self.resolve()?;
      let size = match pq.page_size {
         PageSize::Limited(size) if size > 0 => size,
         _ => return Ok(1),
      };

      let count = self.count_selector(pq.sel).scalar(ctx).await?;
      Ok(u64::try_from(count).unwrap_or_default().div_ceil(size))
   }

   /// Fetch and decode every row on this page.
   pub async fn all<T>(&self) -> Result<Vec<T>>
   where
      T: for<'r> FromRow<'r, S::Row> + Send + Unpin,
   {
      self.all_with(&Context::background()).await
   }

   /// Like [`Paginator::all`], honoring `ctx`.
   pub async fn all_with<T>(&self, ctx: &Context) -> Result<Vec<T>>
   where
      T: for<'r> FromRow<'r, S::Row> + Send + Unpin,
   {
      let pq = self.resolve_with_cursor()?;
      pq.sel.all(ctx).await
   }

   /// Fetch and decode the first row on this page.
   pub async fn one<T>(&self) -> Result<Option<T>>
   where
      T: for<'r> FromRow<'r, S::Row> + Send + Unpin,
   {
      self.one_with(&Context::background()).await
   }

   /// Like [`Paginator::one`], honoring `ctx`.
   pub async fn one_with<T>(&self, ctx: &Context) -> Result<Option<T>>
   where
      T: for<'r> FromRow<'r, S::Row> + Send + Unpin,
   {
      let pq = self.resolve_with_cursor()?;
      pq.sel.one(ctx).await
   }

   /// Fetch the first raw row on this page.
   pub async fn row(&self) -> Result<Option<S::Row>> {
      self.row_with(&Context::background()).await
   }

   /// Like [`Paginator::row`], honoring `ctx`.
   pub async fn row_with(&self, ctx: &Context) -> Result<Option<S::Row>> {
      let pq = self.resolve_with_cursor()?;
      pq.sel.row(ctx).await
   }

   /// Lazy row sequence for this page.
   pub fn rows(&self) -> Result<S::Rows> {
      self.rows_with(&Context::background())
   }

   /// Like [`Paginator::rows`], honoring `ctx` while the rows are read.
   pub fn rows_with(&self, ctx: &Context) -> Result<S::Rows> {
      let pq = self.resolve_with_cursor()?;
      pq.sel.rows(ctx)
   }

   /// Prepare this page's statement for repeated execution.
   pub async fn prepare(&self) -> Result<S::Statement> {
      self.prepare_with(&Context::background()).await
   }

   /// Like [`Paginator::prepare`], honoring `ctx`.
   pub async fn prepare_with(&self, ctx: &Context) -> Result<S::Statement> {
      let pq = self.resolve_with_cursor()?;
      pq.sel.prepare(ctx).await
   }

   /// Statement text and bind values for this page.
   pub fn compile(&self) -> Result<CompiledQuery> {
      self.resolve_with_cursor()?.sel.compile()
   }

   /// Statement text for this page.
   pub fn sql(&self) -> Result<String> {
      Ok(self.compile()?.sql)
   }

   /// Bind values for this page, in placeholder order.
   pub fn arguments(&self) -> Result<Vec<JsonValue>> {
      Ok(self.compile()?.arguments)
   }

   /// Statement text, panicking if the chain cannot be resolved.
   ///
   /// Legacy accessor for callers that relied on infallible rendering;
   /// prefer [`Paginator::sql`].
   #[cfg(feature = "legacy-render")]
   pub fn sql_or_panic(&self) -> String {
      match self.sql() {
         Ok(sql) => sql,
         Err(err) => panic!("paginator query could not be rendered: {err}"),
      }
   }
}
