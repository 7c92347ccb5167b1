//! # sqlx-sqlite-paginator
//!
//! Immutable, forkable pagination over SQLx SQLite queries.
//!
//! ## Core Types
//!
//! - **[`Paginator`]**: Page-number and keyset (cursor) navigation, totals, and fetching
//! - **[`Selector`]**: The query-composition capability a paginator drives
//! - **[`SqliteSelector`]**: [`Selector`] backed by a [`sqlx::SqlitePool`]
//! - **[`Chain`]**: Persistent step chain every builder handle is made of
//! - **[`Context`]**: Deadline and cancellation for fetch calls
//! - **[`Error`]**: Error type for resolution and execution
//!
//! ## Architecture
//!
//! - **Persistent builders**: Each call appends one shared frame; handles fork freely
//! - **Lazy resolution**: Steps are replayed only when a terminal call runs
//! - **Keyset reversal**: Backward pages query in reverse and re-sort in an outer query
//!
//! ```no_run
//! # async fn demo(pool: sqlx::SqlitePool) -> sqlx_sqlite_paginator::Result<()> {
//! use sqlx_sqlite_paginator::{Paginator, SqliteSelector};
//!
//! let posts = SqliteSelector::new(pool, "posts").select(["id", "title"]);
//! let pages = Paginator::new(posts, 10);
//!
//! let total = pages.total_pages().await?;
//! let third: Vec<(i64, String)> = pages.page(2).all().await?;
//! # Ok(())
//! # }
//! ```

mod chain;
mod config;
mod context;
mod error;
mod paginator;
mod query;
mod selector;
mod sqlite;

// Re-export public types
pub use chain::{Chain, Mutation};
pub use config::PaginatorConfig;
pub use context::{CancelHandle, Context};
pub use error::{Error, Result};
pub use paginator::{PageNumber, PageSize, Paginator};
pub use query::SelectQuery;
pub use selector::{CompiledQuery, Cond, KeysetColumn, Selector, SortDirection};
pub use sqlite::{SqliteRows, SqliteSelector, SqliteStatementHandle};
