//! Uses the global mock clock, keep to a single test in this binary.

mod common;

use common::*;
use embassy_futures::block_on;
use embassy_time::{Duration, MockDriver};
use pmw3610::{AutoMouseConfig, Config};

#[test]
fn layer_times_out_after_last_movement() {
  let clock = MockDriver::get();
  let automouse = AutoMouseConfig { layer: 4, timeout_ms: 400, movement_threshold: 5 };
  let (mut sensor, model) = ready_sensor(Config { automouse: Some(automouse), ..Default::default() });
  let mut sink = RecordingSink::default();
  let mut layers = TestLayers::default();

  model.borrow_mut().bursts.push_back(burst(6, 0));
  block_on(sensor.handle_motion(&mut sink, &mut layers)).unwrap();
  assert!(sensor.automouse_triggered());
  assert_eq!(layers.activated, vec![4]);

  clock.advance(Duration::from_millis(300));
  assert!(!sensor.poll_automouse(&mut layers));

  // movement restarts the countdown
  model.borrow_mut().bursts.push_back(burst(0, -6));
  block_on(sensor.handle_motion(&mut sink, &mut layers)).unwrap();
  clock.advance(Duration::from_millis(399));
  assert!(!sensor.poll_automouse(&mut layers));
  assert_eq!(layers.active, 4);

  clock.advance(Duration::from_millis(1));
  assert!(sensor.poll_automouse(&mut layers));
  assert!(!sensor.automouse_triggered());
  assert_eq!(layers.deactivated, vec![4]);
  assert_eq!(layers.activated, vec![4]);

  // below the threshold nothing happens
  model.borrow_mut().bursts.push_back(burst(3, 2));
  block_on(sensor.handle_motion(&mut sink, &mut layers)).unwrap();
  assert!(!sensor.automouse_triggered());
}
