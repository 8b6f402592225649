//! Motion burst decoding and report accumulation.
//!
//! Each motion interrupt produces one burst of up to seven registers starting
//! at MOTION_BURST. The 12-bit deltas are decoded, oriented, accumulated and
//! handed to an [`InputSink`] as at most one X and one Y event.
//!
//! With a minimum report interval configured, deltas arriving faster than the
//! interval are summed into the next report, and a sample that arrives after
//! a gap longer than the interval first discards whatever was still pending.

use embassy_time::{Duration, Instant};
use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};
use micromath::vector::Vector2d;

use crate::{defs::*, AxisEvent, Config, Error, InputSink, LayerControl, Pmw3610};

/// Sign-extend a 12-bit two's complement value.
#[inline]
pub fn to_i12(raw: u16) -> i16 {
  let raw = (raw & 0x0FFF) as i16;
  if raw >= 0x800 {
    raw - 0x1000
  } else {
    raw
  }
}

/// Decode the X/Y deltas of a motion burst. Only the first four bytes are used.
pub(crate) fn decode_delta(packet: &[u8; BURST_LEN_SMART]) -> Vector2d<i16> {
  let xy_h = packet[BURST_XY_H] as u16;
  let x = packet[BURST_X_L] as u16 | (xy_h & 0xF0) << 4;
  let y = packet[BURST_Y_L] as u16 | (xy_h & 0x0F) << 8;
  Vector2d { x: to_i12(x), y: to_i12(y) }
}

/// Swap, then invert, as configured.
pub fn orient(delta: Vector2d<i16>, config: &Config) -> Vector2d<i16> {
  let (mut x, mut y) = (delta.x, delta.y);
  if config.swap_xy {
    core::mem::swap(&mut x, &mut y);
  }
  if config.invert_x {
    x = -x;
  }
  if config.invert_y {
    y = -y;
  }
  Vector2d { x, y }
}

/// 9-bit shutter value of a full burst.
pub(crate) fn shutter(packet: &[u8; BURST_LEN_SMART]) -> u16 {
  ((packet[BURST_SHUTTER_H] as u16 & 0x01) << 8) | packet[BURST_SHUTTER_L] as u16
}

/// Accumulated deltas between two reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportState {
  dx: i64,
  dy: i64,
  last_sample: Option<Instant>,
  last_report: Option<Instant>,
}

impl Default for ReportState {
  fn default() -> Self {
    Self::new()
  }
}

impl ReportState {
  pub const fn new() -> Self {
    Self { dx: 0, dy: 0, last_sample: None, last_report: None }
  }

  /// Pending, not yet reported deltas.
  pub fn pending(&self) -> (i64, i64) {
    (self.dx, self.dy)
  }

  /// Add one sample taken at `now`.
  ///
  /// Returns the clamped report to emit, or `None` while the report interval
  /// has not elapsed or when there is nothing to report.
  pub fn push(&mut self, delta: Vector2d<i16>, now: Instant, interval: Option<Duration>) -> Option<(i16, i16)> {
    if let Some(interval) = interval {
      if let Some(last) = self.last_sample {
        if now.saturating_duration_since(last) > interval {
          self.dx = 0;
          self.dy = 0;
        }
      }
      self.last_sample = Some(now);
    }

    self.dx += delta.x as i64;
    self.dy += delta.y as i64;

    if let (Some(interval), Some(last)) = (interval, self.last_report) {
      if now.saturating_duration_since(last) < interval {
        return None;
      }
    }

    let rx = self.dx.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
    let ry = self.dy.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
    if rx == 0 && ry == 0 {
      return None;
    }

    self.dx = 0;
    self.dy = 0;
    if interval.is_some() {
      self.last_report = Some(now);
    }
    Some((rx, ry))
  }
}

impl<SPI, D, IRQ, E> Pmw3610<SPI, D, IRQ>
where
  SPI: SpiDevice<u8, Error = E>,
  D: DelayNs,
{
  /// Read one motion burst and forward the resulting report, if any.
  pub(crate) async fn report_motion<S, L>(&mut self, now: Instant, sink: &mut S, layers: &mut L) -> Result<(), Error<E>>
  where
    S: InputSink,
    L: LayerControl,
  {
    let mut buf = [0u8; BURST_LEN_SMART];
    let len = if self.config.smart_algorithm { BURST_LEN_SMART } else { BURST_LEN_NORMAL };
    self.read_burst(Reg::MotionBurst, &mut buf[..len]).await?;

    let delta = orient(decode_delta(&buf), &self.config);
    trace!("motion {:#x}: dx {} dy {}", buf[BURST_MOTION], delta.x, delta.y);

    if self.config.smart_algorithm {
      self.update_smart_mode(shutter(&buf)).await;
    }

    let Some((rx, ry)) = self.state.report.push(delta, now, self.config.report_interval()) else {
      return Ok(());
    };

    let (have_x, have_y) = (rx != 0, ry != 0);
    if have_x {
      sink.emit(AxisEvent { event_type: self.config.event_type, code: self.config.x_code, value: rx, more_follows: have_y });
    }
    if have_y {
      sink.emit(AxisEvent { event_type: self.config.event_type, code: self.config.y_code, value: ry, more_follows: false });
    }

    self.automouse.on_report(rx, ry, now, layers);
    Ok(())
  }

  /// Toggle the smart exposure register around the shutter threshold.
  async fn update_smart_mode(&mut self, shutter: u16) {
    let engaged = self.state.smart_engaged;
    let value = if engaged && shutter < SHUTTER_SMART_THRESHOLD {
      SMART_MODE_LOW
    } else if !engaged && shutter > SHUTTER_SMART_THRESHOLD {
      SMART_MODE_HIGH
    } else {
      return;
    };

    match self.write_clocked(Reg::SmartMode, value).await {
      Ok(()) => {
        debug!("smart mode {} (shutter {})", if engaged { "off" } else { "on" }, shutter);
        self.state.smart_engaged = !engaged;
      }
      Err(e) => warn!("Failed to switch smart mode: {:?}", e.kind()),
    }
  }
}
