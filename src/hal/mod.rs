//! Hardware abstraction for plotter-motion.
//!
//! The step engine talks to hardware only through the small traits defined
//! here, so the Bresenham core is portable and unit-testable without a real
//! board. [`GpioBackend`] implements the stepper seam over embedded-hal 1.0
//! pin types; [`sim`] provides a recording backend for tests and host-side
//! dry runs.
//!
//! Every trait method is infallible: the timer interrupt has no caller to
//! report an error to, so implementations absorb faults internally (see
//! [`GpioBackend::pin_faults`]).

mod gpio;
#[cfg(feature = "std")]
pub mod sim;

pub use gpio::{GpioBackend, UnwiredLimit};

use crate::motion::Direction;

/// Stepper motor pin seam, one logical axis per index.
///
/// Axis indices are fixed at boot; implementations are expected to hold a
/// static axis-to-pin binding and never reconfigure it at runtime.
pub trait StepperBackend {
    /// Latch the travel direction for an axis. Must be stable before the
    /// next pulse on that axis.
    fn set_direction(&mut self, axis: usize, direction: Direction);

    /// Emit one step pulse on an axis (rising edge, minimum pulse width,
    /// falling edge).
    fn pulse(&mut self, axis: usize);

    /// Energize or de-energize an axis driver.
    fn set_enabled(&mut self, axis: usize, enabled: bool);

    /// Read the limit switch for an axis. `true` means tripped. Backends
    /// without a switch on the axis return `false`.
    fn read_limit(&mut self, axis: usize) -> bool;
}

/// Pen servo seam.
pub trait PenActuator {
    /// Command the servo to an absolute angle in degrees.
    fn set_angle(&mut self, degrees: u8);
}

/// Hardware step timer seam.
///
/// The engine reprograms the reload value on every segment activation; the
/// timer fires the tick interrupt each time the counter wraps.
pub trait TickTimer {
    /// Program the counter reload value for the next segment.
    fn set_reload(&mut self, reload: u32);

    /// Start (or resume) the tick interrupt.
    fn start(&mut self);

    /// Stop the tick interrupt. Must take effect before the call returns so
    /// that an abort can safely clear shared state afterwards.
    fn stop(&mut self);
}
