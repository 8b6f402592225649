#![allow(dead_code)]

//! Simulated PMW3610 and recording collaborators shared by the integration tests.

use std::{
  cell::RefCell,
  collections::VecDeque,
  convert::Infallible,
  rc::Rc,
};

use embedded_hal::spi::{ErrorKind, ErrorType, Operation};
use embedded_hal_async::{delay::DelayNs, digital, spi::SpiDevice};
use pmw3610::{AxisEvent, Config, InputSink, LayerControl, Pmw3610};

#[ctor::ctor]
fn init_log() {
  let _ = env_logger::builder().filter_level(log::LevelFilter::Debug).is_test(true).try_init();
}

pub const PRODUCT_ID: u8 = 0x3E;

/// A register write as seen by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
  pub page: u8,
  pub addr: u8,
  pub value: u8,
  /// SPI clock was enabled through SPI_CLK_ON_REQ when the write landed.
  pub clocked: bool,
}

#[derive(Debug)]
pub struct SensorModel {
  pub regs: [u8; 128],
  pub page1: [u8; 128],
  pub observation: u8,
  pub product_id: u8,
  pub bursts: VecDeque<[u8; 7]>,
  pub writes: Vec<Write>,
  /// (address, payload length) of every read.
  pub reads: Vec<(u8, usize)>,
  pub fail_write_to: Option<u8>,
  pub fail_reads: bool,
  page: u8,
  clock_on: bool,
}

impl Default for SensorModel {
  fn default() -> Self {
    Self {
      regs: [0; 128],
      page1: [0; 128],
      observation: 0x0F,
      product_id: PRODUCT_ID,
      bursts: VecDeque::new(),
      writes: Vec::new(),
      reads: Vec::new(),
      fail_write_to: None,
      fail_reads: false,
      page: 0,
      clock_on: false,
    }
  }
}

impl SensorModel {
  fn write(&mut self, buf: &[u8]) -> Result<(), BusFault> {
    let [cmd, value] = buf else {
      return Err(BusFault);
    };
    if cmd & 0x80 == 0 {
      return Err(BusFault);
    }
    let addr = cmd & 0x7F;
    if self.fail_write_to == Some(addr) {
      return Err(BusFault);
    }

    let clocked = self.clock_on;
    match addr {
      0x41 => self.clock_on = *value == 0xBA,
      0x7F => self.page = if *value == 0xFF { 1 } else { 0 },
      _ => {}
    }

    let page = if addr == 0x7F { 0 } else { self.page };
    if page == 1 {
      self.page1[addr as usize] = *value;
    } else {
      self.regs[addr as usize] = *value;
    }
    self.writes.push(Write { page, addr, value: *value, clocked });
    Ok(())
  }

  fn transfer(&mut self, buf: &mut [u8]) -> Result<(), BusFault> {
    if self.fail_reads || buf.is_empty() {
      return Err(BusFault);
    }
    let addr = buf[0] & 0x7F;
    let len = buf.len() - 1;
    self.reads.push((addr, len));

    if addr == 0x12 {
      let packet = self.bursts.pop_front().unwrap_or_default();
      for (dst, src) in buf[1..].iter_mut().zip(packet.iter()) {
        *dst = *src;
      }
      return Ok(());
    }

    for i in 0..len {
      buf[i + 1] = self.read(addr + i as u8);
    }
    Ok(())
  }

  fn read(&self, addr: u8) -> u8 {
    match addr {
      0x00 => self.product_id,
      0x2D => self.observation,
      a => self.regs[a as usize & 0x7F],
    }
  }

  /// Values written to a page 0 register, in order.
  pub fn writes_to(&self, addr: u8) -> Vec<u8> {
    self.writes.iter().filter(|w| w.page == 0 && w.addr == addr).map(|w| w.value).collect()
  }

  /// Writes other than the clock handshake itself.
  pub fn data_writes(&self) -> Vec<Write> {
    self.writes.iter().filter(|w| w.addr != 0x41).copied().collect()
  }

  pub fn clear_log(&mut self) {
    self.writes.clear();
    self.reads.clear();
  }
}

/// Bus fault reported by the simulated sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl embedded_hal::spi::Error for BusFault {
  fn kind(&self) -> ErrorKind {
    ErrorKind::Other
  }
}

#[derive(Clone, Default)]
pub struct SimSpi {
  pub model: Rc<RefCell<SensorModel>>,
}

impl ErrorType for SimSpi {
  type Error = BusFault;
}

impl SpiDevice<u8> for SimSpi {
  async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
    let mut model = self.model.borrow_mut();
    for op in operations.iter_mut() {
      match op {
        Operation::Write(buf) => model.write(buf)?,
        Operation::TransferInPlace(buf) => model.transfer(buf)?,
        _ => return Err(BusFault),
      }
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayCall {
  Ns(u32),
  Us(u32),
  Ms(u32),
}

/// Delay provider that returns immediately and records what was asked for.
#[derive(Clone, Default)]
pub struct TestDelay {
  pub calls: Rc<RefCell<Vec<DelayCall>>>,
}

impl TestDelay {
  pub fn ms(&self) -> Vec<u32> {
    self
      .calls
      .borrow()
      .iter()
      .filter_map(|c| match c {
        DelayCall::Ms(ms) => Some(*ms),
        _ => None,
      })
      .collect()
  }
}

impl DelayNs for TestDelay {
  async fn delay_ns(&mut self, ns: u32) {
    self.calls.borrow_mut().push(DelayCall::Ns(ns));
  }

  async fn delay_us(&mut self, us: u32) {
    self.calls.borrow_mut().push(DelayCall::Us(us));
  }

  async fn delay_ms(&mut self, ms: u32) {
    self.calls.borrow_mut().push(DelayCall::Ms(ms));
  }
}

/// Motion line that is always asserted.
pub struct TestIrq;

impl embedded_hal::digital::ErrorType for TestIrq {
  type Error = Infallible;
}

impl digital::Wait for TestIrq {
  async fn wait_for_high(&mut self) -> Result<(), Infallible> {
    Ok(())
  }
  async fn wait_for_low(&mut self) -> Result<(), Infallible> {
    Ok(())
  }
  async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
    Ok(())
  }
  async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
    Ok(())
  }
  async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
    Ok(())
  }
}

/// Motion line that is asserted a fixed number of times and then stays idle.
pub struct CountedIrq {
  pub remaining: usize,
}

impl CountedIrq {
  async fn assert_once(&mut self) -> Result<(), Infallible> {
    if self.remaining == 0 {
      return core::future::pending().await;
    }
    self.remaining -= 1;
    Ok(())
  }
}

impl embedded_hal::digital::ErrorType for CountedIrq {
  type Error = Infallible;
}

impl digital::Wait for CountedIrq {
  async fn wait_for_high(&mut self) -> Result<(), Infallible> {
    core::future::pending().await
  }
  async fn wait_for_low(&mut self) -> Result<(), Infallible> {
    self.assert_once().await
  }
  async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
    core::future::pending().await
  }
  async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
    self.assert_once().await
  }
  async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
    self.assert_once().await
  }
}

#[derive(Default)]
pub struct RecordingSink {
  pub events: Vec<AxisEvent>,
}

impl InputSink for RecordingSink {
  fn emit(&mut self, event: AxisEvent) {
    self.events.push(event);
  }
}

#[derive(Default)]
pub struct TestLayers {
  pub active: u8,
  pub activated: Vec<u8>,
  pub deactivated: Vec<u8>,
}

impl LayerControl for TestLayers {
  fn activate_layer(&mut self, layer: u8) {
    self.active = layer;
    self.activated.push(layer);
  }
  fn deactivate_layer(&mut self, layer: u8) {
    self.active = 0;
    self.deactivated.push(layer);
  }
  fn highest_active_layer(&self) -> u8 {
    self.active
  }
}

/// Layer state shared between a running service loop and the test body.
#[derive(Clone, Default)]
pub struct SharedLayers(pub Rc<RefCell<TestLayers>>);

impl LayerControl for SharedLayers {
  fn activate_layer(&mut self, layer: u8) {
    self.0.borrow_mut().activate_layer(layer)
  }
  fn deactivate_layer(&mut self, layer: u8) {
    self.0.borrow_mut().deactivate_layer(layer)
  }
  fn highest_active_layer(&self) -> u8 {
    self.0.borrow().highest_active_layer()
  }
}

pub type TestSensor = Pmw3610<SimSpi, TestDelay, TestIrq>;

pub fn sensor(config: Config) -> (TestSensor, Rc<RefCell<SensorModel>>, TestDelay) {
  let spi = SimSpi::default();
  let model = spi.model.clone();
  let delay = TestDelay::default();
  (Pmw3610::new(spi, delay.clone(), TestIrq, config), model, delay)
}

/// A sensor that already went through bring-up, with the bus log cleared.
pub fn ready_sensor(config: Config) -> (TestSensor, Rc<RefCell<SensorModel>>) {
  let (mut sensor, model, _) = sensor(config);
  embassy_futures::block_on(sensor.init()).unwrap();
  model.borrow_mut().clear_log();
  (sensor, model)
}

/// Burst packet carrying the given 12-bit deltas.
pub fn burst(x: i16, y: i16) -> [u8; 7] {
  let (x, y) = (x as u16 & 0x0FFF, y as u16 & 0x0FFF);
  [0x80, x as u8, y as u8, ((x >> 4) & 0xF0) as u8 | (y >> 8) as u8, 0x40, 0, 0]
}

pub fn burst_with_shutter(x: i16, y: i16, shutter: u16) -> [u8; 7] {
  let mut p = burst(x, y);
  p[5] = (shutter >> 8) as u8 & 0x01;
  p[6] = shutter as u8;
  p
}
