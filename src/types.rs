/// One relative axis update handed to an [`InputSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisEvent {
  /// Event type from [`crate::Config::event_type`].
  pub event_type: u16,
  /// Axis code, [`crate::Config::x_code`] or [`crate::Config::y_code`].
  pub code: u16,
  pub value: i16,
  /// Another event of the same report follows. The consumer should only
  /// commit the report once it sees `false`.
  pub more_follows: bool,
}

/// Destination of decoded motion, typically the host input subsystem.
pub trait InputSink {
  fn emit(&mut self, event: AxisEvent);
}

impl<S: InputSink + ?Sized> InputSink for &mut S {
  fn emit(&mut self, event: AxisEvent) {
    (**self).emit(event)
  }
}
