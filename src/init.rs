//! Stepwise sensor bring-up.
//!
//! The sensor needs generous settling time between reset, self-test and
//! configuration. Each [`InitStep`] carries the delay that must elapse
//! *before* it runs. [`Pmw3610::init`] awaits those delays itself; callers
//! with their own scheduler can drive [`Pmw3610::step_init`] instead and
//! honour the delay returned in [`InitProgress::Scheduled`].

use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};

use crate::{defs::*, Error, Pmw3610};

/// Bring-up steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
  /// Soft reset through POWER_UP_RESET.
  PowerUp,
  /// Clear the OBSERVATION register.
  ClearSelfTest,
  /// Verify self-test bits and product ID.
  CheckSelfTest,
  /// Drain motion registers and program resolution and power modes.
  Configure,
  Done,
}

impl InitStep {
  /// Settling time in ms to wait before running this step.
  pub fn delay_ms(self, power_up_extra_ms: u32) -> u32 {
    match self {
      InitStep::PowerUp => POWER_UP_DELAY_MS.saturating_add(power_up_extra_ms),
      InitStep::ClearSelfTest => CLEAR_OB1_DELAY_MS,
      InitStep::CheckSelfTest => CHECK_OB1_DELAY_MS,
      InitStep::Configure | InitStep::Done => 0,
    }
  }

  pub fn next(self) -> Self {
    match self {
      InitStep::PowerUp => InitStep::ClearSelfTest,
      InitStep::ClearSelfTest => InitStep::CheckSelfTest,
      InitStep::CheckSelfTest => InitStep::Configure,
      InitStep::Configure | InitStep::Done => InitStep::Done,
    }
  }
}

/// Outcome of a successful [`Pmw3610::step_init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitProgress {
  /// Run `step` again after `delay_ms`.
  Scheduled { step: InitStep, delay_ms: u32 },
  Ready,
}

impl<SPI, D, IRQ, E> Pmw3610<SPI, D, IRQ>
where
  SPI: SpiDevice<u8, Error = E>,
  D: DelayNs,
{
  /// Run the complete bring-up sequence, awaiting every settling delay.
  ///
  /// On success the sensor is ready and the motion line is armed. On failure
  /// the failing step is kept and every later call returns [`Error::Stalled`].
  pub async fn init(&mut self) -> Result<(), Error<E>> {
    let mut delay_ms = self.state.init_step.delay_ms(self.config.power_up_extra_delay_ms);
    loop {
      if delay_ms > 0 && self.state.last_error.is_none() {
        self.delay.delay_ms(delay_ms).await;
      }
      match self.step_init().await? {
        InitProgress::Ready => return Ok(()),
        InitProgress::Scheduled { delay_ms: next, .. } => delay_ms = next,
      }
    }
  }

  /// Run the pending bring-up step without waiting its settling delay.
  ///
  /// The caller is responsible for the delay reported by the previous call
  /// (or by [`InitStep::delay_ms`] for the first one).
  pub async fn step_init(&mut self) -> Result<InitProgress, Error<E>> {
    if self.state.last_error.is_some() {
      return Err(Error::Stalled);
    }

    let step = self.state.init_step;
    if step == InitStep::Done {
      return Ok(InitProgress::Ready);
    }

    let res = match step {
      InitStep::PowerUp => self.power_up().await,
      InitStep::ClearSelfTest => self.clear_self_test().await,
      InitStep::CheckSelfTest => self.check_self_test().await,
      InitStep::Configure => self.configure().await,
      InitStep::Done => Ok(()),
    };

    if let Err(e) = res {
      error!("Init step {:?} failed: {:?}", step, e.kind());
      self.state.last_error = Some(e.kind());
      return Err(e);
    }

    let next = step.next();
    self.state.init_step = next;
    if next == InitStep::Done {
      self.state.ready = true;
      self.set_interrupt(true);
      info!("PMW3610 initialized");
      return Ok(InitProgress::Ready);
    }

    let delay_ms = next.delay_ms(self.config.power_up_extra_delay_ms);
    debug!("init step {:?} done, {:?} in {} ms", step, next, delay_ms);
    Ok(InitProgress::Scheduled { step: next, delay_ms })
  }

  async fn power_up(&mut self) -> Result<(), Error<E>> {
    self.write_reg(Reg::PowerUpReset, POWER_UP_CMD_RESET).await
  }

  async fn configure(&mut self) -> Result<(), Error<E>> {
    // Motion registers must be read once after reset regardless of the motion bit.
    for reg in [Reg::Motion, Reg::DeltaXL, Reg::DeltaYL, Reg::DeltaXYH] {
      self.read_reg(reg).await?;
    }

    let cfg = self.config;
    self.set_cpi(cfg.cpi).await?;
    self.set_downshift_time(Reg::RunDownshift, cfg.run_downshift_ms).await?;
    self.set_downshift_time(Reg::Rest1Downshift, cfg.rest1_downshift_ms).await?;
    self.set_downshift_time(Reg::Rest2Downshift, cfg.rest2_downshift_ms).await?;
    self.set_sample_time(Reg::Rest1Rate, cfg.rest1_sample_ms).await?;
    self.set_sample_time(Reg::Rest2Rate, cfg.rest2_sample_ms).await?;
    self.set_sample_time(Reg::Rest3Rate, cfg.rest3_sample_ms).await
  }
}
