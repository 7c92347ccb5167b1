use std::num::ParseIntError;
use std::str::Utf8Error;

/// Result type alias for array codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while decoding an array literal.
///
/// Encoding never fails; every variant here describes malformed input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// The stored value is neither TEXT nor BLOB.
   #[error("cannot decode array from {type_name} value: expected TEXT or BLOB")]
   UnsupportedSource { type_name: String },

   /// The literal does not start with `{`.
   #[error("expected '{{' at position 0")]
   MissingOpenBracket,

   /// Input ended before the closing `}`.
   #[error("array literal is missing its closing '}}'")]
   MissingCloseBracket,

   /// Bytes follow the closing `}`.
   #[error("unexpected data past closing bracket at position {position}")]
   TrailingData { position: usize },

   /// Input ended inside a double-quoted element.
   #[error("unterminated quoted element")]
   UnterminatedQuote,

   /// Input ended right after a backslash inside a quoted element.
   #[error("dangling escape at end of input")]
   DanglingEscape,

   /// An element is not valid UTF-8.
   #[error("array element is not valid UTF-8: {0}")]
   InvalidUtf8(#[from] Utf8Error),

   /// An integer array element is not a base-10 `i64`.
   #[error("invalid integer element '{token}': {source}")]
   InvalidInteger {
      token: String,
      #[source]
      source: ParseIntError,
   },
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::UnsupportedSource { .. } => "UNSUPPORTED_SOURCE".to_string(),
         Error::MissingOpenBracket => "MISSING_OPEN_BRACKET".to_string(),
         Error::MissingCloseBracket => "MISSING_CLOSE_BRACKET".to_string(),
         Error::TrailingData { .. } => "TRAILING_DATA".to_string(),
         Error::UnterminatedQuote => "UNTERMINATED_QUOTE".to_string(),
         Error::DanglingEscape => "DANGLING_ESCAPE".to_string(),
         Error::InvalidUtf8(_) => "INVALID_UTF8".to_string(),
         Error::InvalidInteger { .. } => "INVALID_INTEGER".to_string(),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_error_code_trailing_data() {
      let err = Error::TrailingData { position: 4 };
      assert_eq!(err.error_code(), "TRAILING_DATA");
      assert_eq!(
         err.to_string(),
         "unexpected data past closing bracket at position 4"
      );
   }

   #[test]
   fn test_error_code_brackets() {
      assert_eq!(Error::MissingOpenBracket.error_code(), "MISSING_OPEN_BRACKET");
      assert_eq!(Error::MissingOpenBracket.to_string(), "expected '{' at position 0");
      assert_eq!(
         Error::MissingCloseBracket.to_string(),
         "array literal is missing its closing '}'"
      );
   }

   #[test]
   fn test_error_code_invalid_integer() {
      let source = "x1".parse::<i64>().unwrap_err();
      let err = Error::InvalidInteger {
         token: "x1".into(),
         source,
      };
      assert_eq!(err.error_code(), "INVALID_INTEGER");
      assert!(err.to_string().starts_with("invalid integer element 'x1'"));
   }

   #[test]
   fn test_error_code_unsupported_source() {
      let err = Error::UnsupportedSource {
         type_name: "INTEGER".into(),
      };
      assert_eq!(err.error_code(), "UNSUPPORTED_SOURCE");
      assert_eq!(
         err.to_string(),
         "cannot decode array from INTEGER value: expected TEXT or BLOB"
      );
   }
}
