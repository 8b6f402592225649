//! Static driver configuration.
//!
//! A [`Config`] is handed to [`crate::Pmw3610::new`] and never changes
//! afterwards. Bring-up programs the sensor from it on every reset; runtime
//! changes go through [`crate::Pmw3610::set_attr`] and are not written back.
//!
//! # Examples
//!
//! ```ignore
//! use pmw3610::{AutoMouseConfig, Config};
//!
//! let config = Config {
//!     cpi: 1200,
//!     invert_y: true,
//!     report_interval_ms: 8,
//!     automouse: Some(AutoMouseConfig { layer: 3, ..Default::default() }),
//!     ..Default::default()
//! };
//! ```

use embassy_time::Duration;

/// `EV_REL` from the Linux/Zephyr input event codes.
pub const INPUT_EV_REL: u16 = 0x02;
/// `REL_X`
pub const INPUT_REL_X: u16 = 0x00;
/// `REL_Y`
pub const INPUT_REL_Y: u16 = 0x01;

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
  /// Resolution applied at bring-up (200..=3200, steps of 200).
  pub cpi: u32,
  /// Event type passed to the sink with every axis event.
  pub event_type: u16,
  /// Axis code of X events.
  pub x_code: u16,
  /// Axis code of Y events.
  pub y_code: u16,
  /// Swap X and Y. Applied before inversion.
  pub swap_xy: bool,
  /// Negate X after the optional swap.
  pub invert_x: bool,
  /// Negate Y after the optional swap.
  pub invert_y: bool,
  /// Toggle the smart exposure register from the shutter value of every packet.
  pub smart_algorithm: bool,
  /// Minimum time between two reports in ms. `0` reports on every packet.
  pub report_interval_ms: u32,
  /// Extra time added to the 10 ms power-up settling delay.
  pub power_up_extra_delay_ms: u32,
  /// Run mode downshift time in ms (32..=8160, unit 32 ms).
  pub run_downshift_ms: u32,
  /// Rest1 downshift time in ms (unit 16 × `rest1_sample_ms`).
  pub rest1_downshift_ms: u32,
  /// Rest2 downshift time in ms (unit 128 × `rest2_sample_ms`).
  pub rest2_downshift_ms: u32,
  /// Rest1 sample period in ms (10..=2550).
  pub rest1_sample_ms: u32,
  /// Rest2 sample period in ms (10..=2550).
  pub rest2_sample_ms: u32,
  /// Rest3 sample period in ms (10..=2550).
  pub rest3_sample_ms: u32,
  /// Temporary layer switch on movement, off when `None`.
  pub automouse: Option<AutoMouseConfig>,
}

impl Config {
  /// The minimum report interval, if one is configured.
  pub fn report_interval(&self) -> Option<Duration> {
    match self.report_interval_ms {
      0 => None,
      ms => Some(Duration::from_millis(ms as u64)),
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      cpi: 800,
      event_type: INPUT_EV_REL,
      x_code: INPUT_REL_X,
      y_code: INPUT_REL_Y,
      swap_xy: false,
      invert_x: false,
      invert_y: false,
      smart_algorithm: false,
      report_interval_ms: 0,
      power_up_extra_delay_ms: 0,
      run_downshift_ms: 128,
      rest1_downshift_ms: 9220,
      rest2_downshift_ms: 150_000,
      rest1_sample_ms: 40,
      rest2_sample_ms: 100,
      rest3_sample_ms: 500,
      automouse: None,
    }
  }
}

/// Automouse layer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoMouseConfig {
  /// Layer to activate while the pointer moves.
  pub layer: u8,
  /// How long the layer stays on after the last qualifying movement.
  pub timeout_ms: u32,
  /// `|x| + |y|` of a report must exceed this to count as movement.
  pub movement_threshold: u32,
}

impl Default for AutoMouseConfig {
  fn default() -> Self {
    Self { layer: 1, timeout_ms: 400, movement_threshold: 5 }
  }
}
