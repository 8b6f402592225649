#![no_std]
#![doc = include_str!("../README.md")]
//!
//! ## Design Principles
//!
//! - **Async-first**: Built on `embedded-hal-async` SPI, delay and pin-wait traits
//! - **Non-blocking bring-up**: Settling delays between init steps are awaited, never spun
//! - **Single context**: Bring-up, motion reports and the automouse countdown share one task, no locks
//! - **Fail-stable**: A sensor that fails self-test or identity checks stays offline
//!
//! ## Module Organization
//!
//! - [`config`]: Static driver configuration
//! - [`settings`]: CPI, sample time and downshift time conversion
//! - [`init`]: Stepwise bring-up sequence
//! - [`motion`]: Motion packet decoding and report accumulation
//! - [`automouse`]: Temporary layer activation on pointer movement
//! - [`interrupt`]: Motion line handling and the service loop
//!
//! ## Basic Usage
//!
//! ```ignore
//! use pmw3610::{Config, Pmw3610};
//!
//! let mut sensor = Pmw3610::new(spi, delay, motion_pin, Config::default());
//!
//! // Bring the sensor up, then forward motion to the host forever.
//! sensor.run(&mut sink, &mut ()).await;
//! ```

mod fmt;

pub mod automouse;
pub mod config;
mod defs;
#[cfg(feature = "events")]
mod events;
pub mod init;
pub mod interrupt;
pub mod motion;
pub(crate) mod rw;
mod selftest;
pub mod settings;
mod types;

use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};

pub use automouse::{AutoMouse, LayerControl};
pub use config::*;
pub use defs::Reg;
#[cfg(feature = "events")]
pub use events::*;
pub use init::{InitProgress, InitStep};
pub use settings::Attribute;
pub use types::*;

/// SPI mode the sensor expects: CPOL = 1, CPHA = 1, MSB first.
pub const SPI_MODE: embedded_hal_async::spi::Mode = embedded_hal_async::spi::MODE_3;

/// Driver error type.
///
/// Wraps the underlying SPI error and adds PMW3610-specific conditions.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// SPI communication error
  Spi(E),
  /// Physical value outside the range the sensor accepts; nothing was written
  OutOfRange,
  /// Self-test pattern missing from the observation register (raw value)
  SelfTest(u8),
  /// Product ID mismatch (expected 0x3E)
  InvalidProductId(u8),
  /// Register cannot be used for the requested setting
  NotSupported,
  /// Bring-up has not completed yet
  NotReady,
  /// Bring-up failed earlier and will not be retried
  Stalled,
  /// Waiting on the motion line failed
  Interrupt,
}

impl<E> Error<E> {
  /// Payload-free classification of the error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Spi(_) => ErrorKind::Transport,
      Error::OutOfRange => ErrorKind::Range,
      Error::SelfTest(_) | Error::InvalidProductId(_) => ErrorKind::Validation,
      Error::NotSupported => ErrorKind::Unsupported,
      Error::NotReady | Error::Stalled => ErrorKind::NotReady,
      Error::Interrupt => ErrorKind::Interrupt,
    }
  }
}

/// Error classes, as recorded by the bring-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
  Transport,
  Range,
  Validation,
  Unsupported,
  NotReady,
  Interrupt,
}

/// PMW3610 device driver instance.
///
/// Owns the SPI device, the delay provider and the motion (interrupt) line,
/// together with all mutable per-sensor state. Several sensors can coexist,
/// each with its own instance.
///
/// # Type Parameters
///
/// - `SPI`: SPI device (must implement `embedded_hal_async::spi::SpiDevice`)
/// - `D`: Delay provider (must implement `embedded_hal_async::delay::DelayNs`)
/// - `IRQ`: Motion line (must implement `embedded_hal_async::digital::Wait` to use [`Pmw3610::run`])
pub struct Pmw3610<SPI, D, IRQ> {
  spi: SPI,
  delay: D,
  irq: IRQ,
  config: Config,
  state: State,
  automouse: AutoMouse,
}

#[derive(Debug)]
pub(crate) struct State {
  pub ready: bool,
  pub init_step: InitStep,
  pub last_error: Option<ErrorKind>,
  pub smart_engaged: bool,
  pub irq_enabled: bool,
  pub report: motion::ReportState,
}

impl State {
  const fn new() -> Self {
    Self {
      ready: false,
      init_step: InitStep::PowerUp,
      last_error: None,
      smart_engaged: false,
      irq_enabled: false,
      report: motion::ReportState::new(),
    }
  }
}

impl<SPI, D, IRQ> Pmw3610<SPI, D, IRQ> {
  /// Create a new PMW3610 driver instance.
  ///
  /// Nothing touches the bus until bring-up starts, see [`Pmw3610::init`].
  pub fn new(spi: SPI, delay: D, irq: IRQ, config: Config) -> Self {
    let automouse = AutoMouse::new(config.automouse);
    Self { spi, delay, irq, config, state: State::new(), automouse }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// `true` once bring-up finished without error.
  pub fn is_ready(&self) -> bool {
    self.state.ready
  }

  /// The next bring-up step to run, or [`InitStep::Done`].
  pub fn init_step(&self) -> InitStep {
    self.state.init_step
  }

  /// Why bring-up stopped, if it did.
  pub fn last_error(&self) -> Option<ErrorKind> {
    self.state.last_error
  }

  /// Whether the smart exposure mode is currently latched on.
  pub fn smart_engaged(&self) -> bool {
    self.state.smart_engaged
  }

  pub fn automouse_triggered(&self) -> bool {
    self.automouse.is_triggered()
  }

  /// Whether the motion line is currently armed.
  pub fn interrupt_enabled(&self) -> bool {
    self.state.irq_enabled
  }

  /// Arm or mask the motion line.
  pub fn set_interrupt(&mut self, enabled: bool) {
    trace!("motion interrupt {}", if enabled { "armed" } else { "masked" });
    self.state.irq_enabled = enabled;
  }

  /// Release the owned peripherals.
  pub fn release(self) -> (SPI, D, IRQ) {
    (self.spi, self.delay, self.irq)
  }
}

impl<SPI, D, IRQ, E> Pmw3610<SPI, D, IRQ>
where
  SPI: SpiDevice<u8, Error = E>,
  D: DelayNs,
{
  /// Read the product ID register.
  ///
  /// Returns `0x3E` for a PMW3610. Use this to verify communication.
  pub async fn get_product_id(&mut self) -> Result<u8, Error<E>> {
    self.read_reg(Reg::ProductId).await
  }

  /// Read the revision ID register.
  pub async fn get_revision_id(&mut self) -> Result<u8, Error<E>> {
    self.read_reg(Reg::RevisionId).await
  }
}
