//! Persistent, append-only chain of builder steps.
//!
//! Every fluent call on a builder appends one immutable frame that points back
//! at the frame it was derived from. Nothing is ever mutated in place, so a
//! handle can be cloned, shared across threads, and extended in several
//! directions without the branches seeing each other's steps.
//!
//! Resolution replays the frames oldest-first over a fresh state value. The
//! first step that fails stops the replay and its error is returned as-is.
//!
//! ```text
//! base ── page(0) ── cursor("id") ──┬── next_page(10)   (handle A)
//!                                   └── prev_page(50)   (handle B)
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::trace;

/// A step that can be replayed over a state value.
pub trait Mutation<S> {
   /// Error produced when the step cannot be applied.
   type Error;

   /// Apply this step, returning the updated state.
   fn apply(&self, state: S) -> Result<S, Self::Error>;
}

struct Frame<M> {
   step: M,
   prev: Option<Arc<Frame<M>>>,
}

impl<M> Drop for Frame<M> {
   // Unlink iteratively so long chains don't recurse once per frame on drop.
   fn drop(&mut self) {
      let mut prev = self.prev.take();
      while let Some(frame) = prev {
         match Arc::try_unwrap(frame) {
            Ok(mut frame) => prev = frame.prev.take(),
            Err(_) => break,
         }
      }
   }
}

/// Handle to the newest frame of a persistent step chain.
///
/// Cloning is an `Arc` clone; frames are shared, never copied.
pub struct Chain<M> {
   head: Option<Arc<Frame<M>>>,
   len: usize,
}

impl<M> Chain<M> {
   /// Create an empty chain.
   pub fn new() -> Self {
      Self { head: None, len: 0 }
   }

   /// Return a new handle with `step` appended. `self` is left untouched.
   #[must_use]
   pub fn extend(&self, step: M) -> Self {
      Self {
         head: Some(Arc::new(Frame {
            step,
            prev: self.head.clone(),
         })),
         len: self.len + 1,
      }
   }

   /// Number of frames reachable from this handle.
   pub fn len(&self) -> usize {
      self.len
   }

   pub fn is_empty(&self) -> bool {
      self.len == 0
   }

   /// Steps in application order (oldest first).
   pub fn steps(&self) -> Vec<&M> {
      let mut steps = Vec::with_capacity(self.len);
      let mut cursor = self.head.as_deref();
      while let Some(frame) = cursor {
         steps.push(&frame.step);
         cursor = frame.prev.as_deref();
      }
      steps.reverse();
      steps
   }

   /// Replay every step over `base`, oldest first.
   ///
   /// Stops at the first failing step and returns its error unchanged; later
   /// steps are not applied.
   pub fn resolve<S>(&self, base: S) -> Result<S, <M as Mutation<S>>::Error>
   where
      M: Mutation<S>,
   {
      let steps = self.steps();
      trace!(frames = steps.len(), "resolving builder chain");
      steps.into_iter().try_fold(base, |state, step| step.apply(state))
   }
}

impl<M> Clone for Chain<M> {
   fn clone(&self) -> Self {
      Self {
         head: self.head.clone(),
         len: self.len,
      }
   }
}

impl<M> Default for Chain<M> {
   fn default() -> Self {
      Self::new()
   }
}

impl<M> fmt::Debug for Chain<M> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Chain").field("len", &self.len).finish()
   }
}
