//! Integer arrays.

use std::io::Write as _;

use serde::{Deserialize, Serialize};

use crate::{ArrayLiteral, Error, Result};

/// A nullable array of 64-bit integers, stored as `{1,-2,3}`.
///
/// ```
/// use sqlx_sqlite_array::{ArrayLiteral, Int64Array};
///
/// let ids = Int64Array::from(vec![-1, 0, 9_223_372_036_854_775_807]);
/// assert_eq!(
///    ids.encode_literal().as_deref(),
///    Some(b"{-1,0,9223372036854775807}".as_slice())
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Int64Array(Option<Vec<i64>>);

impl Int64Array {
   pub fn new(values: Vec<i64>) -> Self {
      Self(Some(values))
   }

   pub fn null() -> Self {
      Self(None)
   }

   pub fn is_null(&self) -> bool {
      self.0.is_none()
   }

   pub fn as_slice(&self) -> Option<&[i64]> {
      self.0.as_deref()
   }

   pub fn into_inner(self) -> Option<Vec<i64>> {
      self.0
   }
}

fn parse_token(token: &str) -> Result<i64> {
   token.parse().map_err(|source| Error::InvalidInteger {
      token: token.to_string(),
      source,
   })
}

impl ArrayLiteral for Int64Array {
   fn decode_literal(src: Option<&[u8]>) -> Result<Self> {
      let src = match src {
         None | Some([]) => return Ok(Self::null()),
         Some(src) => src,
      };

      let body = src.strip_prefix(b"{").ok_or(Error::MissingOpenBracket)?;
      let body = body.strip_suffix(b"}").ok_or(Error::MissingCloseBracket)?;
      let body = std::str::from_utf8(body)?;

      if body.is_empty() {
         return Ok(Self::new(Vec::new()));
      }

      body
         .split(',')
         .map(parse_token)
         .collect::<Result<Vec<_>>>()
         .map(Self::new)
   }

   fn encode_literal(&self) -> Option<Vec<u8>> {
      let values = self.0.as_ref()?;

      let mut out = Vec::with_capacity(2 + values.len() * 4);
      out.push(b'{');
      for (index, value) in values.iter().enumerate() {
         if index > 0 {
            out.push(b',');
         }
         // Writing to a Vec cannot fail
         let _ = write!(out, "{value}");
      }
      out.push(b'}');
      Some(out)
   }
}

impl From<Vec<i64>> for Int64Array {
   fn from(values: Vec<i64>) -> Self {
      Self::new(values)
   }
}

impl From<Option<Vec<i64>>> for Int64Array {
   fn from(values: Option<Vec<i64>>) -> Self {
      Self(values)
   }
}

impl From<Int64Array> for Option<Vec<i64>> {
   fn from(array: Int64Array) -> Self {
      array.0
   }
}

impl FromIterator<i64> for Int64Array {
   fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
      Self::new(iter.into_iter().collect())
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   fn decode(src: &[u8]) -> Result<Int64Array> {
      Int64Array::decode_literal(Some(src))
   }

   // ─── decode ───

   #[test]
   fn decode_absent_and_empty_input_is_null() {
      assert!(Int64Array::decode_literal(None).unwrap().is_null());
      assert!(decode(b"").unwrap().is_null());
   }

   #[test]
   fn decode_empty_literal() {
      assert_eq!(decode(b"{}").unwrap(), Int64Array::new(Vec::new()));
   }

   #[test]
   fn decode_values() {
      assert_eq!(
         decode(b"{1,-2,300}").unwrap().as_slice(),
         Some([1, -2, 300].as_slice())
      );
   }

   #[test]
   fn decode_extremes() {
      let array = decode(b"{-9223372036854775808,9223372036854775807}").unwrap();
      assert_eq!(array.as_slice(), Some([i64::MIN, i64::MAX].as_slice()));
   }

   #[test]
   fn decode_rejects_unparsable_token() {
      let err = decode(b"{1,two,3}").unwrap_err();
      assert!(matches!(err, Error::InvalidInteger { ref token, .. } if token == "two"));
   }

   #[test]
   fn decode_rejects_overflow() {
      assert!(matches!(
         decode(b"{9223372036854775808}"),
         Err(Error::InvalidInteger { .. })
      ));
   }

   #[test]
   fn decode_rejects_padding_and_empty_tokens() {
      assert!(matches!(decode(b"{1, 2}"), Err(Error::InvalidInteger { .. })));
      assert!(matches!(decode(b"{1,,2}"), Err(Error::InvalidInteger { .. })));
   }

   #[test]
   fn decode_requires_brackets() {
      assert!(matches!(decode(b"1,2}"), Err(Error::MissingOpenBracket)));
      assert!(matches!(decode(b"{1,2"), Err(Error::MissingCloseBracket)));
      assert!(matches!(decode(b"{"), Err(Error::MissingCloseBracket)));
   }

   #[test]
   fn decode_rejects_invalid_utf8() {
      assert!(matches!(decode(b"{\xff}"), Err(Error::InvalidUtf8(_))));
   }

   // ─── encode ───

   #[test]
   fn encode_null_and_empty_are_distinct() {
      assert_eq!(Int64Array::null().encode_literal(), None);
      assert_eq!(
         Int64Array::new(Vec::new()).encode_literal().as_deref(),
         Some(b"{}".as_slice())
      );
   }

   #[test]
   fn encode_is_unquoted_minimal_digits() {
      let array: Int64Array = [7, -10, 0].into_iter().collect();
      assert_eq!(array.encode_literal().as_deref(), Some(b"{7,-10,0}".as_slice()));
   }

   #[test]
   fn round_trip_extremes() {
      let values = vec![-1, 0, i64::MAX];
      let encoded = Int64Array::from(values.clone()).encode_literal();
      let decoded = Int64Array::decode_literal(encoded.as_deref()).unwrap();

      assert_eq!(decoded.into_inner(), Some(values));
   }
}
