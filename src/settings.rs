//! Resolution, sample time and downshift time.
//!
//! Every setter checks its input before the bus is touched; an out-of-range
//! value returns [`Error::OutOfRange`] and leaves the sensor untouched.
//! Register values are the physical quantity floor-divided by the register unit.
//!
//! | Setting           | Range (ms / cpi)        | Unit                         |
//! |-------------------|-------------------------|------------------------------|
//! | CPI               | 200..=3200              | 200 cpi                      |
//! | Rest1/2/3 sample  | 10..=2550               | 10 ms                        |
//! | Run downshift     | 32..=8160               | 32 ms                        |
//! | Rest1 downshift   | unit..=255 × unit       | 16 × rest1 sample period     |
//! | Rest2 downshift   | unit..=255 × unit       | 128 × rest2 sample period    |

use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};

use crate::{defs::*, Config, Error, Pmw3610};

/// Runtime-tunable sensor attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Attribute {
  Cpi,
  RunDownshiftTime,
  Rest1DownshiftTime,
  Rest2DownshiftTime,
  Rest1SampleTime,
  Rest2SampleTime,
  Rest3SampleTime,
}

impl<SPI, D, IRQ, E> Pmw3610<SPI, D, IRQ>
where
  SPI: SpiDevice<u8, Error = E>,
  D: DelayNs,
{
  /// Change an attribute at runtime.
  ///
  /// Rejected with [`Error::NotReady`] until bring-up has completed.
  pub async fn set_attr(&mut self, attr: Attribute, value: u32) -> Result<(), Error<E>> {
    if !self.state.ready {
      debug!("attribute {:?} rejected, sensor not ready", attr);
      return Err(Error::NotReady);
    }

    match attr {
      Attribute::Cpi => self.set_cpi(value).await,
      Attribute::RunDownshiftTime => self.set_downshift_time(Reg::RunDownshift, value).await,
      Attribute::Rest1DownshiftTime => self.set_downshift_time(Reg::Rest1Downshift, value).await,
      Attribute::Rest2DownshiftTime => self.set_downshift_time(Reg::Rest2Downshift, value).await,
      Attribute::Rest1SampleTime => self.set_sample_time(Reg::Rest1Rate, value).await,
      Attribute::Rest2SampleTime => self.set_sample_time(Reg::Rest2Rate, value).await,
      Attribute::Rest3SampleTime => self.set_sample_time(Reg::Rest3Rate, value).await,
    }
  }

  /// Set the resolution in counts per inch (200..=3200, steps of 200).
  ///
  /// RES_STEP lives on register page 1, so the page switch, the write and the
  /// switch back all happen under a single clock-enable bracket.
  pub async fn set_cpi(&mut self, cpi: u32) -> Result<(), Error<E>> {
    let Some(value) = cpi_to_reg(cpi) else {
      error!("CPI value {} out of range", cpi);
      return Err(Error::OutOfRange);
    };
    info!("Setting CPI to {} (reg value {:#x})", cpi, value);

    self.clock_on().await?;
    let res = self.write_res_step(value).await;
    let off = self.clock_off().await;

    if res.is_err() {
      error!("Failed to set CPI");
    }
    res.and(off)
  }

  async fn write_res_step(&mut self, value: u8) -> Result<(), Error<E>> {
    self.write_reg(Reg::SpiPage, SPI_PAGE_SELECT_1).await?;
    self.write_reg(Page1::ResStep, value).await?;
    self.write_reg(Reg::SpiPage, SPI_PAGE_SELECT_0).await
  }

  /// Set the sample period of a rest mode in ms (10..=2550, unit 10 ms).
  pub async fn set_sample_time(&mut self, reg: Reg, ms: u32) -> Result<(), Error<E>> {
    let Some(value) = sample_time_to_reg(ms) else {
      warn!("Sample time {} out of range [{}, {}]", ms, SAMPLE_TIME_MIN_MS, SAMPLE_TIME_MAX_MS);
      return Err(Error::OutOfRange);
    };
    info!("Set sample time to {} ms (reg value {:#x})", ms, value);

    self.write_clocked(reg, value).await.inspect_err(|_| error!("Failed to change sample time"))
  }

  /// Set a downshift time in ms.
  ///
  /// Only [`Reg::RunDownshift`], [`Reg::Rest1Downshift`] and
  /// [`Reg::Rest2Downshift`] are accepted. The rest units follow the sample
  /// periods from the static [`Config`].
  pub async fn set_downshift_time(&mut self, reg: Reg, ms: u32) -> Result<(), Error<E>> {
    let Some(unit) = downshift_unit(reg, &self.config) else {
      error!("Downshift not supported on {:?}", reg);
      return Err(Error::NotSupported);
    };
    let Some(value) = downshift_to_reg(ms, unit) else {
      warn!("Downshift time {} out of range ({} - {})", ms, unit, unit.saturating_mul(255));
      return Err(Error::OutOfRange);
    };
    info!("Set downshift time to {} ms (reg value {:#x})", ms, value);

    self.write_clocked(reg, value).await.inspect_err(|_| error!("Failed to change downshift time"))
  }
}

/// CPI to RES_STEP value, `None` outside 200..=3200.
pub fn cpi_to_reg(cpi: u32) -> Option<u8> {
  if !(MIN_CPI..=MAX_CPI).contains(&cpi) {
    return None;
  }
  Some((cpi / CPI_STEP) as u8)
}

/// Sample period to register value, `None` outside 10..=2550 ms.
pub fn sample_time_to_reg(ms: u32) -> Option<u8> {
  if !(SAMPLE_TIME_MIN_MS..=SAMPLE_TIME_MAX_MS).contains(&ms) {
    return None;
  }
  Some((ms / SAMPLE_TIME_MIN_MS) as u8)
}

/// Register unit in ms of a downshift register, `None` if `reg` is not one.
///
/// Computed in `u64` so that any configured sample period fits.
pub fn downshift_unit(reg: Reg, config: &Config) -> Option<u64> {
  match reg {
    Reg::RunDownshift => Some(RUN_DOWNSHIFT_UNIT_MS as u64),
    Reg::Rest1Downshift => Some(REST1_DOWNSHIFT_MULT as u64 * config.rest1_sample_ms as u64),
    Reg::Rest2Downshift => Some(REST2_DOWNSHIFT_MULT as u64 * config.rest2_sample_ms as u64),
    _ => None,
  }
}

/// Downshift time to register value for a given unit, `None` when out of
/// `unit..=255 * unit` or when the unit is zero.
pub fn downshift_to_reg(ms: u32, unit: u64) -> Option<u8> {
  if unit == 0 {
    return None;
  }
  let max = unit.checked_mul(u8::MAX as u64)?;
  if !(unit..=max).contains(&(ms as u64)) {
    return None;
  }
  u8::try_from(ms as u64 / unit).ok()
}
