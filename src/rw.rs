use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};

use crate::{defs::*, Error, Pmw3610};

impl<SPI, D, IRQ, E> Pmw3610<SPI, D, IRQ>
where
  SPI: SpiDevice<u8, Error = E>,
  D: DelayNs,
{
  pub(crate) async fn read_reg(&mut self, reg: impl Into<u8>) -> Result<u8, Error<E>> {
    let mut b = [0u8; 1];
    self.read_burst(reg, &mut b).await?;
    Ok(b[0])
  }

  pub(crate) async fn read_burst(&mut self, reg: impl Into<u8>, buf: &mut [u8]) -> Result<(), Error<E>> {
    // The address goes out first and the device clocks the payload back
    // behind it, so the exchange is one byte longer than the payload.
    debug_assert!(buf.len() <= 15, "read_burst buffer too large");

    let mut tmp = [0u8; 16];
    let len = buf.len() + 1;
    tmp[0] = reg.into() & !SPI_WRITE_BIT;

    self.spi.transfer_in_place(&mut tmp[..len]).await.map_err(Error::Spi)?;

    buf.copy_from_slice(&tmp[1..len]);
    Ok(())
  }

  pub(crate) async fn write_reg(&mut self, reg: impl Into<u8>, value: u8) -> Result<(), Error<E>> {
    self.spi.write(&[reg.into() | SPI_WRITE_BIT, value]).await.map_err(Error::Spi)
  }

  /// Write a register inside the SPI clock enable/disable handshake.
  ///
  /// The disable write is always attempted; if the inner write failed its
  /// error wins over whatever the disable write returns.
  pub(crate) async fn write_clocked(&mut self, reg: impl Into<u8>, value: u8) -> Result<(), Error<E>> {
    self.clock_on().await?;
    let res = self.write_reg(reg, value).await;
    let off = self.clock_off().await;
    res.and(off)
  }

  pub(crate) async fn clock_on(&mut self) -> Result<(), Error<E>> {
    self.write_reg(Reg::SpiClkOnReq, SPI_CLOCK_CMD_ENABLE).await?;
    self.delay.delay_us(T_CLOCK_ON_DELAY_US).await;
    Ok(())
  }

  pub(crate) async fn clock_off(&mut self) -> Result<(), Error<E>> {
    self.write_reg(Reg::SpiClkOnReq, SPI_CLOCK_CMD_DISABLE).await
  }
}
