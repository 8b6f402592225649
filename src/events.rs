use heapless::Deque;

use crate::{AxisEvent, InputSink};

/// Bounded [`InputSink`] buffer for consumers that drain motion from another
/// place in the main loop.
///
/// When full, the oldest event is dropped to make room.
#[derive(Debug, Default)]
pub struct EventQueue<const N: usize> {
  dequeue: Deque<AxisEvent, N>,
}

impl<const N: usize> EventQueue<N> {
  pub const fn new() -> Self {
    Self { dequeue: Deque::new() }
  }

  pub fn pop(&mut self) -> Option<AxisEvent> {
    self.dequeue.pop_front()
  }

  /// Pop a complete report: every event up to and including the first one
  /// without `more_follows`.
  ///
  /// Returns the number of events written to `out`. Events beyond `out.len()`
  /// are discarded.
  pub fn pop_report(&mut self, out: &mut [AxisEvent]) -> usize {
    let mut n = 0;
    while let Some(evt) = self.dequeue.pop_front() {
      if let Some(slot) = out.get_mut(n) {
        *slot = evt;
        n += 1;
      }
      if !evt.more_follows {
        break;
      }
    }
    n
  }

  pub fn len(&self) -> usize {
    self.dequeue.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dequeue.is_empty()
  }

  pub fn clear(&mut self) {
    self.dequeue.clear()
  }
}

impl<const N: usize> InputSink for EventQueue<N> {
  #[inline]
  fn emit(&mut self, event: AxisEvent) {
    if self.dequeue.is_full() {
      let _ = self.dequeue.pop_front();
    }
    let _ = self.dequeue.push_back(event);
  }
}
