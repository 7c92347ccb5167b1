//! Conversion contract shared by every array type.

use crate::Result;

/// A value stored as a brace-delimited array literal.
///
/// Absence maps to absence in both directions: a missing source decodes to a
/// null array and a null array encodes to no bytes at all (SQL `NULL`), which
/// is distinct from the empty literal `{}`.
pub trait ArrayLiteral: Sized {
   /// Decode from the stored bytes, or from their absence.
   fn decode_literal(src: Option<&[u8]>) -> Result<Self>;

   /// Encode to the stored bytes. `None` means SQL `NULL`.
   fn encode_literal(&self) -> Option<Vec<u8>>;
}

/// Decode any [`ArrayLiteral`] from raw stored bytes.
///
/// ```
/// use sqlx_sqlite_array::{Int64Array, decode};
///
/// let ids: Int64Array = decode(Some(b"{1,2,3}".as_slice())).unwrap();
/// assert_eq!(ids.as_slice(), Some([1, 2, 3].as_slice()));
///
/// let missing: Int64Array = decode(None).unwrap();
/// assert!(missing.is_null());
/// ```
pub fn decode<A: ArrayLiteral>(src: Option<&[u8]>) -> Result<A> {
   A::decode_literal(src)
}

/// Encode any [`ArrayLiteral`] to raw stored bytes.
///
/// ```
/// use sqlx_sqlite_array::{StringArray, encode};
///
/// let tags = StringArray::from(vec!["a", "b,c"]);
/// assert_eq!(encode(&tags).as_deref(), Some(br#"{"a","b,c"}"#.as_slice()));
/// assert_eq!(encode(&StringArray::null()), None);
/// ```
pub fn encode<A: ArrayLiteral>(array: &A) -> Option<Vec<u8>> {
   array.encode_literal()
}
