//! Temporary layer activation while the pointer moves.
//!
//! When a report's `|x| + |y|` exceeds the configured threshold the mouse
//! layer is switched on (unless a higher layer is already active) and a
//! countdown of `timeout_ms` starts. Every further qualifying report restarts
//! the countdown. Once it runs out the layer is switched off again.

use embassy_time::{Duration, Instant};

use crate::AutoMouseConfig;

/// Keymap layer state the automouse feature acts on.
pub trait LayerControl {
  fn activate_layer(&mut self, layer: u8);
  fn deactivate_layer(&mut self, layer: u8);
  /// Highest currently active layer.
  fn highest_active_layer(&self) -> u8;
}

/// No keymap attached.
impl LayerControl for () {
  fn activate_layer(&mut self, _layer: u8) {}
  fn deactivate_layer(&mut self, _layer: u8) {}
  fn highest_active_layer(&self) -> u8 {
    0
  }
}

impl<L: LayerControl + ?Sized> LayerControl for &mut L {
  fn activate_layer(&mut self, layer: u8) {
    (**self).activate_layer(layer)
  }
  fn deactivate_layer(&mut self, layer: u8) {
    (**self).deactivate_layer(layer)
  }
  fn highest_active_layer(&self) -> u8 {
    (**self).highest_active_layer()
  }
}

#[derive(Debug)]
pub struct AutoMouse {
  config: Option<AutoMouseConfig>,
  triggered: bool,
  deadline: Option<Instant>,
}

impl AutoMouse {
  pub const fn new(config: Option<AutoMouseConfig>) -> Self {
    Self { config, triggered: false, deadline: None }
  }

  pub fn is_triggered(&self) -> bool {
    self.triggered
  }

  /// When the layer is due to be switched off.
  pub fn deadline(&self) -> Option<Instant> {
    self.deadline
  }

  /// Feed an emitted report.
  ///
  /// Movement counts while the layer is already ours or while some other
  /// layer than the mouse layer is on top; the layer is only activated once
  /// per trigger.
  pub fn on_report<L: LayerControl>(&mut self, x: i16, y: i16, now: Instant, layers: &mut L) {
    let Some(cfg) = self.config else {
      return;
    };

    if !self.triggered && layers.highest_active_layer() == cfg.layer {
      return;
    }

    let movement = (x as i32).unsigned_abs() + (y as i32).unsigned_abs();
    if movement <= cfg.movement_threshold {
      return;
    }

    if !self.triggered {
      debug!("automouse: activating layer {}", cfg.layer);
      layers.activate_layer(cfg.layer);
      self.triggered = true;
    }
    self.deadline = Some(now + Duration::from_millis(cfg.timeout_ms as u64));
  }

  /// Switch the layer off if the countdown has run out by `now`.
  ///
  /// Returns `true` if the layer was deactivated.
  pub fn poll<L: LayerControl>(&mut self, now: Instant, layers: &mut L) -> bool {
    match self.deadline {
      Some(deadline) if now >= deadline => {
        self.expire(layers);
        true
      }
      _ => false,
    }
  }

  /// Switch the layer off unconditionally.
  pub fn expire<L: LayerControl>(&mut self, layers: &mut L) {
    self.deadline = None;
    if !self.triggered {
      return;
    }
    self.triggered = false;
    if let Some(cfg) = self.config {
      debug!("automouse: deactivating layer {}", cfg.layer);
      layers.deactivate_layer(cfg.layer);
    }
  }
}
