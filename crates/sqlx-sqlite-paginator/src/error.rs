/// Result type alias for paginator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pagination and query composition.
///
/// Resolution errors are produced by whichever chain step failed and are
/// returned unchanged. Execution errors come straight from SQLx.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations (connectivity, constraints, syntax).
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Cursor navigation was requested without a cursor column.
   #[error("missing cursor column")]
   MissingCursorColumn,

   /// Column or table name contains invalid characters.
   ///
   /// Identifiers must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `table.column`).
   #[error("invalid identifier '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidColumnName { name: String },

   /// Condition key uses an operator the selector does not support.
   #[error("unsupported operator in condition '{key}'")]
   InvalidOperator { key: String },

   /// The context was cancelled before the query finished.
   #[error("query cancelled")]
   Cancelled,

   /// The context deadline passed before the query finished.
   #[error("query deadline exceeded")]
   DeadlineExceeded,

   /// A row stream was asked to run a second time.
   #[error("row stream has already been consumed")]
   RowsConsumed,

   /// Generic error for operations that don't fit other categories.
   #[error("{0}")]
   Other(String),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::MissingCursorColumn => "MISSING_CURSOR_COLUMN".to_string(),
         Error::InvalidColumnName { .. } => "INVALID_COLUMN_NAME".to_string(),
         Error::InvalidOperator { .. } => "INVALID_OPERATOR".to_string(),
         Error::Cancelled => "CANCELLED".to_string(),
         Error::DeadlineExceeded => "DEADLINE_EXCEEDED".to_string(),
         Error::RowsConsumed => "ROWS_CONSUMED".to_string(),
         Error::Other(_) => "ERROR".to_string(),
      }
   }
}
