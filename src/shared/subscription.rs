//! Live, cancellable event streams handed out by the realtime stores.
//!
//! Every query against the trip or location store is a long-lived
//! subscription. The consumer side implements [`Stream`]; the producer keeps a
//! [`Publisher`] and learns about cancellation through
//! [`Publisher::is_cancelled`] or a failed [`Publisher::publish`].

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::Stream;

pub fn channel<T>() -> (Publisher<T>, Subscription<T>) {
  let (sender, receiver) = mpsc::unbounded();
  (Publisher { sender }, Subscription { receiver })
}

#[derive(Debug)]
pub struct Publisher<T> {
  sender: UnboundedSender<T>,
}

impl<T> Publisher<T> {
  /// Returns `false` once the subscriber has cancelled or been dropped.
  pub fn publish(&self, event: T) -> bool {
    self.sender.unbounded_send(event).is_ok()
  }

  pub fn is_cancelled(&self) -> bool {
    self.sender.is_closed()
  }

  /// Ends the stream from the producer side.
  pub fn close(&self) {
    self.sender.close_channel();
  }
}

#[derive(Debug)]
pub struct Subscription<T> {
  receiver: UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
  /// Stops further delivery. Events already queued can still be drained.
  pub fn cancel(&mut self) {
    self.receiver.close();
  }
}

impl<T> Stream for Subscription<T> {
  type Item = T;

  fn poll_next(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    Pin::new(&mut self.receiver).poll_next(cx)
  }
}
