use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};

use crate::{defs::*, Error, Pmw3610};

/// OBSERVATION register. The low nibble reads back 0xF once the power-up
/// self test has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
struct Observation {
  #[bits(4)]
  pub self_test: u8,
}

impl<SPI, D, IRQ, E> Pmw3610<SPI, D, IRQ>
where
  SPI: SpiDevice<u8, Error = E>,
  D: DelayNs,
{
  /// Clear OBSERVATION so the self-test bits can be observed fresh.
  pub(crate) async fn clear_self_test(&mut self) -> Result<(), Error<E>> {
    self.write_clocked(Reg::Observation, 0x00).await
  }

  /// Verify the self-test pattern and the product ID.
  pub(crate) async fn check_self_test(&mut self) -> Result<(), Error<E>> {
    let raw = self.read_reg(Reg::Observation).await?;
    let obs = Observation::try_from([raw]).map_err(|_| Error::SelfTest(raw))?;
    if obs.self_test != SELF_TEST_PASS {
      error!("Chip self-test failed (observation {:#x})", raw);
      return Err(Error::SelfTest(raw));
    }

    let id = self.get_product_id().await?;
    if id != PMW3610_PRODUCT_ID {
      error!("Incorrect product id {:#x} (expecting {:#x})", id, PMW3610_PRODUCT_ID);
      return Err(Error::InvalidProductId(id));
    }
    debug!("self-test passed, product id {:#x}", id);
    Ok(())
  }
}
