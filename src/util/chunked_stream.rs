use std::{
  pin::Pin,
  task::{Context, Poll},
};

use bytes::Bytes;
use futures::Stream;

// Re-frames a byte stream so no yielded chunk exceeds `chunk_size` bytes.
pub struct ChunkedStream<T> {
  stream: T,
  chunk_size: usize,
  // remainder of the last upstream chunk not yet yielded
  pending: Bytes,
}

impl<T> ChunkedStream<T> {
  pub fn new(stream: T, chunk_size: usize) -> Self {
    ChunkedStream {
      stream,
      chunk_size: chunk_size.max(1),
      pending: Bytes::new(),
    }
  }

  fn take_pending(&mut self) -> Bytes {
    let len = self.pending.len().min(self.chunk_size);
    self.pending.split_to(len)
  }
}

impl<T, E> Stream for ChunkedStream<T>
where
  T: Stream<Item = Result<Bytes, E>> + Unpin,
{
  type Item = Result<Bytes, E>;

  fn poll_next(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    let this = &mut *self;

    loop {
      if !this.pending.is_empty() {
        return Poll::Ready(Some(Ok(this.take_pending())));
      }

      match Pin::new(&mut this.stream).poll_next(cx) {
        Poll::Ready(Some(Ok(bytes))) => {
          // empty upstream chunks are dropped
          this.pending = bytes;
        }
        Poll::Ready(Some(Err(err))) => return Poll::Ready(Some(Err(err))),
        Poll::Ready(None) => return Poll::Ready(None),
        Poll::Pending => return Poll::Pending,
      }
    }
  }
}
