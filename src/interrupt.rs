//! Motion line handling and the service loop.
//!
//! The motion line is active low and stays asserted while motion data is
//! pending. [`Pmw3610::handle_motion`] masks it, drains one burst and arms it
//! again. [`Pmw3610::run`] ties bring-up, motion handling and the automouse
//! countdown together in a single task.
//!
//! # Examples
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn sensor_task(mut sensor: Pmw3610<Spi, Delay, Input<'static>>, mut sink: Sink, mut keymap: Keymap) {
//!     sensor.run(&mut sink, &mut keymap).await
//! }
//! ```

use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};
use embedded_hal_async::{delay::DelayNs, digital::Wait, spi::SpiDevice};

use crate::{Error, InputSink, LayerControl, Pmw3610};

impl<SPI, D, IRQ, E> Pmw3610<SPI, D, IRQ>
where
  SPI: SpiDevice<u8, Error = E>,
  D: DelayNs,
{
  /// Process one motion interrupt.
  ///
  /// The line is re-armed afterwards even when the burst read failed; the
  /// cycle is skipped in that case.
  pub async fn handle_motion<S, L>(&mut self, sink: &mut S, layers: &mut L) -> Result<(), Error<E>>
  where
    S: InputSink,
    L: LayerControl,
  {
    if !self.state.ready {
      return Err(Error::NotReady);
    }

    self.set_interrupt(false);
    let res = self.report_motion(Instant::now(), sink, layers).await;
    self.set_interrupt(true);

    if let Err(e) = &res {
      warn!("Motion read failed: {:?}", e.kind());
    }
    res
  }

  /// Switch the automouse layer off if its countdown has run out.
  pub fn poll_automouse<L: LayerControl>(&mut self, layers: &mut L) -> bool {
    self.automouse.poll(Instant::now(), layers)
  }
}

impl<SPI, D, IRQ, E> Pmw3610<SPI, D, IRQ>
where
  SPI: SpiDevice<u8, Error = E>,
  D: DelayNs,
  IRQ: Wait,
{
  /// Wait until the motion line is asserted.
  pub async fn wait_motion(&mut self) -> Result<(), Error<E>> {
    self.irq.wait_for_low().await.map_err(|_| Error::Interrupt)
  }

  /// Bring the sensor up, then serve motion interrupts and the automouse
  /// countdown forever.
  ///
  /// A failed bring-up is logged and parks the task; the sensor stays offline.
  pub async fn run<S, L>(&mut self, sink: &mut S, layers: &mut L) -> !
  where
    S: InputSink,
    L: LayerControl,
  {
    if let Err(e) = self.init().await {
      error!("PMW3610 bring-up failed: {:?}", e.kind());
      core::future::pending::<()>().await;
    }

    loop {
      let deadline = self.automouse.deadline();
      let armed = self.state.irq_enabled;

      let evt = select(
        async {
          if armed {
            self.irq.wait_for_low().await.map_err(|_| ())
          } else {
            core::future::pending().await
          }
        },
        async {
          match deadline {
            Some(at) => Timer::at(at).await,
            None => core::future::pending().await,
          }
        },
      )
      .await;

      match evt {
        Either::First(Ok(())) => {
          let _ = self.handle_motion(sink, layers).await;
        }
        Either::First(Err(())) => {
          warn!("Waiting on the motion line failed");
          Timer::after_millis(1).await;
        }
        Either::Second(()) => {
          self.automouse.expire(layers);
        }
      }
    }
  }
}
