//! Cancellation and deadline context for query execution.
//!
//! A [`Context`] is an opaque value handed to the `*_with` fetch methods. The
//! paginator never looks inside it; it is passed unchanged to the selector,
//! which races the database work against it.

use std::future::{Future, pending};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::{Error, Result};

/// Cancellation/deadline carrier forwarded to the selector.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sqlx_sqlite_paginator::Context;
///
/// // No deadline, never cancelled
/// let ctx = Context::background();
///
/// // Give up after two seconds
/// let ctx = Context::background().with_timeout(Duration::from_secs(2));
///
/// // Cancel explicitly from elsewhere
/// let (ctx, handle) = Context::background().with_cancel();
/// handle.cancel();
/// assert!(ctx.is_done());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
   deadline: Option<Instant>,
   cancelled: Option<watch::Receiver<bool>>,
}

/// Cancels the [`Context`] it was created with.
///
/// Dropping the handle without calling [`CancelHandle::cancel`] leaves the
/// context running.
#[derive(Debug)]
pub struct CancelHandle {
   tx: watch::Sender<bool>,
}

impl CancelHandle {
   /// Cancel the associated context and every clone of it.
   pub fn cancel(&self) {
      self.tx.send_replace(true);
   }
}

impl Context {
   /// A context that never expires and cannot be cancelled.
   pub fn background() -> Self {
      Self::default()
   }

   /// Expire after `timeout`, or earlier if a deadline is already set.
   pub fn with_timeout(self, timeout: Duration) -> Self {
      self.with_deadline(Instant::now() + timeout)
   }

   /// Expire at `deadline`, or earlier if a deadline is already set.
   pub fn with_deadline(mut self, deadline: Instant) -> Self {
      self.deadline = Some(match self.deadline {
         Some(existing) => existing.min(deadline),
         None => deadline,
      });
      self
   }

   /// Attach a cancellation handle, replacing any previous one.
   pub fn with_cancel(mut self) -> (Self, CancelHandle) {
      let (tx, rx) = watch::channel(false);
      self.cancelled = Some(rx);
      (self, CancelHandle { tx })
   }

   pub fn deadline(&self) -> Option<Instant> {
      self.deadline
   }

   /// The reason this context is done, if it is.
   pub fn err(&self) -> Option<Error> {
      if self.cancelled.as_ref().is_some_and(|rx| *rx.borrow()) {
         return Some(Error::Cancelled);
      }
      if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
         return Some(Error::DeadlineExceeded);
      }
      None
   }

   pub fn is_done(&self) -> bool {
      self.err().is_some()
   }

   /// Resolve once the context is cancelled or its deadline passes.
   ///
   /// Never resolves for a background context.
   pub async fn done(&self) {
      let cancelled = async {
         match &self.cancelled {
            Some(rx) => {
               let mut rx = rx.clone();
               let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
               // Sender dropped without cancelling: this context can no longer be cancelled
               if closed {
                  pending::<()>().await;
               }
            }
            None => pending::<()>().await,
         }
      };

      let expired = async {
         match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => pending::<()>().await,
         }
      };

      tokio::select! {
         _ = cancelled => {}
         _ = expired => {}
      }
   }

   /// Drive `work` to completion unless the context finishes first.
   pub async fn run<T, F>(&self, work: F) -> Result<T>
   where
      F: Future<Output = Result<T>>,
   {
      if let Some(err) = self.err() {
         return Err(err);
      }

      tokio::select! {
         biased;
         result = work => result,
         _ = self.done() => Err(self.err().unwrap_or(Error::Cancelled)),
      }
   }
}
