//! Simulated hardware for tests and host-side dry runs (std only).
//!
//! Records every pulse, direction latch, pen angle, and timer reload so a
//! test can replay a plan tick by tick and assert on the exact pin activity
//! the real machine would see.

use crate::motion::Direction;

use super::{PenActuator, StepperBackend, TickTimer};

/// Recording stepper backend.
#[derive(Debug, Clone)]
pub struct SimBackend<const AXES: usize> {
    /// Every pulse in emission order, as (axis, latched direction).
    pub pulses: Vec<(usize, Direction)>,
    /// Net signed pulse count per axis.
    pub position: [i64; AXES],
    /// Currently latched direction per axis.
    pub direction: [Direction; AXES],
    /// Number of direction latch changes per axis.
    pub direction_changes: [u32; AXES],
    /// Driver enable state per axis.
    pub enabled: [bool; AXES],
    /// Scripted limit switch state per axis.
    pub limit: [bool; AXES],
}

impl<const AXES: usize> SimBackend<AXES> {
    /// Create a backend with no recorded activity and no tripped switches.
    pub fn new() -> Self {
        Self {
            pulses: Vec::new(),
            position: [0; AXES],
            direction: [Direction::Forward; AXES],
            direction_changes: [0; AXES],
            enabled: [false; AXES],
            limit: [false; AXES],
        }
    }

    /// Net signed pulses seen on one axis.
    pub fn pulses_on(&self, axis: usize) -> i64 {
        self.position[axis]
    }

    /// Total pulse count across all axes.
    pub fn total_pulses(&self) -> usize {
        self.pulses.len()
    }
}

impl<const AXES: usize> Default for SimBackend<AXES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const AXES: usize> StepperBackend for SimBackend<AXES> {
    fn set_direction(&mut self, axis: usize, direction: Direction) {
        if self.direction[axis] != direction {
            self.direction_changes[axis] += 1;
        }
        self.direction[axis] = direction;
    }

    fn pulse(&mut self, axis: usize) {
        let dir = self.direction[axis];
        self.pulses.push((axis, dir));
        self.position[axis] += dir.sign();
    }

    fn set_enabled(&mut self, axis: usize, enabled: bool) {
        self.enabled[axis] = enabled;
    }

    fn read_limit(&mut self, axis: usize) -> bool {
        self.limit[axis]
    }
}

/// Recording pen actuator.
#[derive(Debug, Clone, Default)]
pub struct SimPen {
    /// Every commanded angle in order.
    pub angles: Vec<u8>,
}

impl SimPen {
    /// Create a pen with no recorded activity.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently commanded angle, if any.
    pub fn current_angle(&self) -> Option<u8> {
        self.angles.last().copied()
    }
}

impl PenActuator for SimPen {
    fn set_angle(&mut self, degrees: u8) {
        self.angles.push(degrees);
    }
}

/// Recording tick timer.
#[derive(Debug, Clone)]
pub struct SimTimer {
    /// Every programmed reload value in order.
    pub reloads: Vec<u32>,
    /// Whether the tick interrupt is running.
    pub running: bool,
    /// Number of stop requests.
    pub stops: u32,
}

impl SimTimer {
    /// Create a stopped timer with no recorded activity.
    pub fn new() -> Self {
        Self {
            reloads: Vec::new(),
            running: false,
            stops: 0,
        }
    }

    /// The most recently programmed reload value, if any.
    pub fn current_reload(&self) -> Option<u32> {
        self.reloads.last().copied()
    }
}

impl Default for SimTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TickTimer for SimTimer {
    fn set_reload(&mut self, reload: u32) {
        self.reloads.push(reload);
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
        self.stops += 1;
    }
}
