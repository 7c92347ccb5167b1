//! # sqlx-sqlite-array
//!
//! Brace-delimited array literals (`{"a","b,c"}`, `{1,-2,3}`) stored in SQLite
//! TEXT columns.
//!
//! ## Core Types
//!
//! - **[`StringArray`]**: Nullable array of strings, quoted and backslash-escaped on the wire
//! - **[`Int64Array`]**: Nullable array of `i64`, unquoted base-10 on the wire
//! - **[`ArrayLiteral`]**: Decode/encode contract shared by both
//! - **[`Error`]**: Decode errors
//!
//! Both types implement SQLx's `Type`, `Encode`, and `Decode` for SQLite, so
//! they bind and fetch like any other column value:
//!
//! ```no_run
//! # async fn demo(pool: sqlx::SqlitePool) -> Result<(), sqlx::Error> {
//! use sqlx_sqlite_array::StringArray;
//!
//! sqlx::query("INSERT INTO posts (tags) VALUES ($1)")
//!    .bind(StringArray::from(vec!["rust", "sql"]))
//!    .execute(&pool)
//!    .await?;
//!
//! let tags: StringArray = sqlx::query_scalar("SELECT tags FROM posts")
//!    .fetch_one(&pool)
//!    .await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod int;
mod literal;
mod sqlite;
mod text;

// Re-export public types
pub use error::{Error, Result};
pub use int::Int64Array;
pub use literal::{ArrayLiteral, decode, encode};
pub use text::StringArray;
