//! Configuration for paginators

/// Configuration for [`Paginator`](crate::Paginator) query generation
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_paginator::PaginatorConfig;
///
/// // Use defaults
/// let config = PaginatorConfig::default();
///
/// // Override just one field
/// let config = PaginatorConfig {
///     subquery_alias: "page_rows".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatorConfig {
   /// Alias for the inner query when a backward cursor page is wrapped
   ///
   /// Backward pages are fetched in reverse order and re-sorted by an outer
   /// query. Pick something that cannot clash with a real table name.
   ///
   /// Default: `_q0`
   pub subquery_alias: String,

   /// Column alias for the count-only projection used by
   /// [`Paginator::total_items`](crate::Paginator::total_items)
   ///
   /// Default: `_t`
   pub count_alias: String,
}

impl Default for PaginatorConfig {
   fn default() -> Self {
      Self {
         subquery_alias: "_q0".to_string(),
         count_alias: "_t".to_string(),
      }
   }
}
