//! SQLx glue: array types bind and decode as SQLite TEXT.
//!
//! `NULL` columns decode to a null array and null arrays bind as `NULL`.
//! TEXT and BLOB values go through the literal codec; any other storage class
//! is rejected.

use sqlx::decode::Decode;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
use sqlx::{TypeInfo, ValueRef};
use tracing::trace;

use crate::{ArrayLiteral, Error, Int64Array, StringArray};

fn text_or_blob(ty: &SqliteTypeInfo) -> bool {
   <String as sqlx::Type<Sqlite>>::compatible(ty) || <Vec<u8> as sqlx::Type<Sqlite>>::compatible(ty)
}

fn decode_value<A: ArrayLiteral>(value: SqliteValueRef<'_>) -> Result<A, BoxDynError> {
   if value.is_null() {
      return Ok(A::decode_literal(None)?);
   }

   {
      let type_info = value.type_info();
      if !matches!(type_info.name(), "TEXT" | "BLOB") {
         return Err(Box::new(Error::UnsupportedSource {
            type_name: type_info.name().to_string(),
         }));
      }
   }

   let bytes = <&[u8] as Decode<Sqlite>>::decode(value)?;
   trace!(len = bytes.len(), "decoding array literal");
   Ok(A::decode_literal(Some(bytes))?)
}

fn encode_value<'q, A: ArrayLiteral>(
   array: &A,
   buf: &mut Vec<SqliteArgumentValue<'q>>,
) -> Result<IsNull, BoxDynError> {
   let Some(bytes) = array.encode_literal() else {
      return Ok(IsNull::Yes);
   };

   // Element text is UTF-8 and the literal adds only ASCII around it
   let text = String::from_utf8(bytes)?;
   <String as Encode<'q, Sqlite>>::encode(text, buf)
}

macro_rules! impl_sqlite_array {
   ($ty:ty) => {
      impl sqlx::Type<Sqlite> for $ty {
         fn type_info() -> SqliteTypeInfo {
            <String as sqlx::Type<Sqlite>>::type_info()
         }

         fn compatible(ty: &SqliteTypeInfo) -> bool {
            text_or_blob(ty)
         }
      }

      impl<'q> Encode<'q, Sqlite> for $ty {
         fn encode_by_ref(
            &self,
            buf: &mut Vec<SqliteArgumentValue<'q>>,
         ) -> Result<IsNull, BoxDynError> {
            encode_value(self, buf)
         }
      }

      impl<'r> Decode<'r, Sqlite> for $ty {
         fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
            decode_value(value)
         }
      }
   };
}

impl_sqlite_array!(StringArray);
impl_sqlite_array!(Int64Array);
