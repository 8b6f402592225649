#![allow(dead_code)]

/// Page 0 register map.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg {
  ProductId = 0x00,
  RevisionId = 0x01,
  Motion = 0x02,
  DeltaXL = 0x03,
  DeltaYL = 0x04,
  DeltaXYH = 0x05,
  Squal = 0x06,
  ShutterHigher = 0x07,
  ShutterLower = 0x08,
  Performance = 0x11,
  MotionBurst = 0x12,
  RunDownshift = 0x1B,
  Rest1Rate = 0x1C,
  Rest1Downshift = 0x1D,
  Rest2Rate = 0x1E,
  Rest2Downshift = 0x1F,
  Rest3Rate = 0x20,
  Observation = 0x2D,
  SmartMode = 0x32,
  PowerUpReset = 0x3A,
  Shutdown = 0x3B,
  SpiClkOnReq = 0x41,
  SpiPage = 0x7F,
}

impl From<Reg> for u8 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u8
  }
}

/// Registers only reachable after switching `SpiPage` to page 1.
#[repr(u8)]
pub(crate) enum Page1 {
  ResStep = 0x05,
}

impl From<Page1> for u8 {
  #[inline]
  fn from(r: Page1) -> Self {
    r as u8
  }
}

// Constants used across the crate
pub(crate) const PMW3610_PRODUCT_ID: u8 = 0x3E;
pub(crate) const SPI_WRITE_BIT: u8 = 0x80;

pub(crate) const POWER_UP_CMD_RESET: u8 = 0x5A;
pub(crate) const SPI_CLOCK_CMD_ENABLE: u8 = 0xBA;
pub(crate) const SPI_CLOCK_CMD_DISABLE: u8 = 0xB5;
pub(crate) const SPI_PAGE_SELECT_1: u8 = 0xFF;
pub(crate) const SPI_PAGE_SELECT_0: u8 = 0x00;

pub(crate) const SMART_MODE_LOW: u8 = 0x00;
pub(crate) const SMART_MODE_HIGH: u8 = 0x80;
pub(crate) const SHUTTER_SMART_THRESHOLD: u16 = 45;

pub(crate) const SELF_TEST_PASS: u8 = 0x0F;

// Timings
pub(crate) const T_CLOCK_ON_DELAY_US: u32 = 300;
pub(crate) const POWER_UP_DELAY_MS: u32 = 10; // >10 ms after reset
pub(crate) const CLEAR_OB1_DELAY_MS: u32 = 200; // 150 us on paper, too short in practice
pub(crate) const CHECK_OB1_DELAY_MS: u32 = 50; // 10 ms on paper, too short next to a display

// Resolution
pub(crate) const CPI_STEP: u32 = 200;
pub(crate) const MIN_CPI: u32 = 200;
pub(crate) const MAX_CPI: u32 = 3200;

// Sample / downshift timing units
pub(crate) const SAMPLE_TIME_MIN_MS: u32 = 10;
pub(crate) const SAMPLE_TIME_MAX_MS: u32 = 2550;
pub(crate) const RUN_DOWNSHIFT_UNIT_MS: u32 = 32; // 8 * pos-rate, pos-rate fixed to 4 ms
pub(crate) const REST1_DOWNSHIFT_MULT: u32 = 16;
pub(crate) const REST2_DOWNSHIFT_MULT: u32 = 128;

// Burst layout
pub(crate) const BURST_MOTION: usize = 0;
pub(crate) const BURST_X_L: usize = 1;
pub(crate) const BURST_Y_L: usize = 2;
pub(crate) const BURST_XY_H: usize = 3;
pub(crate) const BURST_SQUAL: usize = 4;
pub(crate) const BURST_SHUTTER_H: usize = 5;
pub(crate) const BURST_SHUTTER_L: usize = 6;

pub(crate) const BURST_LEN_NORMAL: usize = BURST_XY_H + 1;
pub(crate) const BURST_LEN_SMART: usize = BURST_SHUTTER_L + 1;
