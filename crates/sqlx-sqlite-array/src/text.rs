//! Text arrays and the literal scanner behind them.
//!
//! Decoding walks the literal one byte at a time through [`transition`], a pure
//! `(state, byte) -> (state, action)` table. The scanner owns the pending
//! element buffer and carries out each action.
//!
//! ```text
//! AwaitElement  '}' -> Stopped   ' ' -> skip   ',' -> element   '"' -> Quoted   else -> Bare
//! Bare          '}' -> Stopped   ',' -> AwaitElement             else -> append
//! Quoted        '\' -> Escape   '"' -> AwaitElement             else -> append
//! Escape        any -> append, Quoted
//! Stopped       any -> trailing data
//! ```

use serde::{Deserialize, Serialize};

use crate::{ArrayLiteral, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
   AwaitElement,
   Quoted,
   Bare,
   Escape,
   Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
   /// Consume the byte without touching the buffer.
   Skip,
   /// Append the byte to the pending element.
   Append,
   /// Start a new pending element holding just this byte.
   Start,
   /// Start a new, empty pending element.
   StartEmpty,
   /// Complete the pending element (empty if none) and open another.
   Delimit,
   /// Complete the pending element (empty if none) and end the array.
   Close,
   /// Complete the pending element only if one exists, and end the array.
   CloseIfPending,
   /// The byte is not allowed here.
   Reject,
}

pub(crate) fn transition(state: State, byte: u8) -> (State, Action) {
   match (state, byte) {
      (State::AwaitElement, b'}') => (State::Stopped, Action::CloseIfPending),
      (State::AwaitElement, b' ') => (State::AwaitElement, Action::Skip),
      (State::AwaitElement, b',') => (State::AwaitElement, Action::Delimit),
      (State::AwaitElement, b'"') => (State::Quoted, Action::StartEmpty),
      (State::AwaitElement, _) => (State::Bare, Action::Start),

      (State::Bare, b'}') => (State::Stopped, Action::Close),
      (State::Bare, b',') => (State::AwaitElement, Action::Delimit),
      (State::Bare, _) => (State::Bare, Action::Append),

      (State::Quoted, b'\\') => (State::Escape, Action::Skip),
      (State::Quoted, b'"') => (State::AwaitElement, Action::Skip),
      (State::Quoted, _) => (State::Quoted, Action::Append),

      (State::Escape, _) => (State::Quoted, Action::Append),

      (State::Stopped, _) => (State::Stopped, Action::Reject),
   }
}

fn element(buffer: Vec<u8>) -> Result<String> {
   String::from_utf8(buffer).map_err(|err| Error::InvalidUtf8(err.utf8_error()))
}

/// Scan a `{...}` literal into its elements.
pub(crate) fn scan(src: &[u8]) -> Result<Vec<String>> {
   let Some((&b'{', body)) = src.split_first() else {
      return Err(Error::MissingOpenBracket);
   };

   let mut elements = Vec::new();
   let mut pending: Option<Vec<u8>> = None;
   let mut state = State::AwaitElement;

   for (index, &byte) in body.iter().enumerate() {
      let (next, action) = transition(state, byte);
      match action {
         Action::Skip => {}
         Action::Append => pending.get_or_insert_default().push(byte),
         Action::Start => pending = Some(vec![byte]),
         Action::StartEmpty => pending = Some(Vec::new()),
         Action::Delimit => {
            elements.push(element(pending.take().unwrap_or_default())?);
            pending = Some(Vec::new());
         }
         Action::Close => elements.push(element(pending.take().unwrap_or_default())?),
         Action::CloseIfPending => {
            if let Some(buffer) = pending.take() {
               elements.push(element(buffer)?);
            }
         }
         Action::Reject => return Err(Error::TrailingData { position: index + 1 }),
      }
      state = next;
   }

   match state {
      State::Stopped => Ok(elements),
      State::Quoted => Err(Error::UnterminatedQuote),
      State::Escape => Err(Error::DanglingEscape),
      State::AwaitElement | State::Bare => Err(Error::MissingCloseBracket),
   }
}

fn push_quoted(out: &mut Vec<u8>, value: &str) {
   out.push(b'"');
   for &byte in value.as_bytes() {
      if byte == b'"' || byte == b'\\' {
         out.push(b'\\');
      }
      out.push(byte);
   }
   out.push(b'"');
}

/// A nullable array of strings.
///
/// `StringArray::null()` and `StringArray::default()` are SQL `NULL`; an
/// array built from an empty vector is the literal `{}`.
///
/// ```
/// use sqlx_sqlite_array::{ArrayLiteral, StringArray};
///
/// let tags = StringArray::decode_literal(Some(br#"{red,"dark blue",""}"#)).unwrap();
/// assert_eq!(tags.as_slice().unwrap(), ["red", "dark blue", ""]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringArray(Option<Vec<String>>);

impl StringArray {
   pub fn new(values: Vec<String>) -> Self {
      Self(Some(values))
   }

   pub fn null() -> Self {
      Self(None)
   }

   pub fn is_null(&self) -> bool {
      self.0.is_none()
   }

   pub fn as_slice(&self) -> Option<&[String]> {
      self.0.as_deref()
   }

   pub fn into_inner(self) -> Option<Vec<String>> {
      self.0
   }
}

impl ArrayLiteral for StringArray {
   fn decode_literal(src: Option<&[u8]>) -> Result<Self> {
      match src {
         None | Some([]) => Ok(Self::null()),
         Some(src) => scan(src).map(Self::new),
      }
   }

   fn encode_literal(&self) -> Option<Vec<u8>> {
      let values = self.0.as_ref()?;

      // Two brackets, two quotes per element, and the delimiters
      let capacity = values.iter().map(|v| v.len() + 3).sum::<usize>() + 1;
      let mut out = Vec::with_capacity(capacity);
      out.push(b'{');
      for (index, value) in values.iter().enumerate() {
         if index > 0 {
            out.push(b',');
         }
         push_quoted(&mut out, value);
      }
      out.push(b'}');
      Some(out)
   }
}

impl From<Vec<String>> for StringArray {
   fn from(values: Vec<String>) -> Self {
      Self::new(values)
   }
}

impl From<Vec<&str>> for StringArray {
   fn from(values: Vec<&str>) -> Self {
      values.into_iter().collect()
   }
}

impl From<Option<Vec<String>>> for StringArray {
   fn from(values: Option<Vec<String>>) -> Self {
      Self(values)
   }
}

impl From<StringArray> for Option<Vec<String>> {
   fn from(array: StringArray) -> Self {
      array.0
   }
}

impl<S: Into<String>> FromIterator<S> for StringArray {
   fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
      Self::new(iter.into_iter().map(Into::into).collect())
   }
}
