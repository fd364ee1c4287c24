//! GPIO stepper backend over embedded-hal 1.0 pin types.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::motion::Direction;

use super::StepperBackend;

/// Step pulse width in microseconds (1-10 us satisfies common drivers).
const PULSE_WIDTH_US: u32 = 2;

/// Placeholder limit input for axes without a wired switch.
///
/// Always reads "not tripped", so a machine without switches can still
/// instantiate [`GpioBackend`] without inventing pin types.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnwiredLimit;

impl ErrorType for UnwiredLimit {
    type Error = core::convert::Infallible;
}

impl InputPin for UnwiredLimit {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Stepper backend over embedded-hal 1.0 pins.
///
/// Generic over:
/// - `STEP`, `DIR`, `EN`: output pin types per axis
/// - `LIMIT`: limit switch input type (use [`UnwiredLimit`] when absent)
/// - `DELAY`: delay provider for the step pulse width
/// - `AXES`: number of axes
///
/// Pin errors cannot surface in the tick interrupt, so they are counted in
/// [`pin_faults`](Self::pin_faults) instead of propagating.
pub struct GpioBackend<STEP, DIR, EN, LIMIT, DELAY, const AXES: usize>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIMIT: InputPin,
    DELAY: DelayNs,
{
    step_pins: [STEP; AXES],
    dir_pins: [DIR; AXES],
    enable_pins: [EN; AXES],
    limit_pins: [LIMIT; AXES],
    delay: DELAY,

    /// Per-axis direction pin inversion.
    invert_direction: [bool; AXES],

    /// Last direction latched per axis, cached to avoid redundant pin writes.
    current_direction: [Option<Direction>; AXES],

    pin_faults: u32,
}

impl<STEP, DIR, EN, LIMIT, DELAY, const AXES: usize> GpioBackend<STEP, DIR, EN, LIMIT, DELAY, AXES>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIMIT: InputPin,
    DELAY: DelayNs,
{
    /// Create a backend from per-axis pin arrays.
    pub fn new(
        step_pins: [STEP; AXES],
        dir_pins: [DIR; AXES],
        enable_pins: [EN; AXES],
        limit_pins: [LIMIT; AXES],
        delay: DELAY,
    ) -> Self {
        Self {
            step_pins,
            dir_pins,
            enable_pins,
            limit_pins,
            delay,
            invert_direction: [false; AXES],
            current_direction: [None; AXES],
            pin_faults: 0,
        }
    }

    /// Set which axes have inverted direction pin logic.
    pub fn with_inverted_axes(mut self, invert: [bool; AXES]) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Number of pin operations that failed since boot.
    #[inline]
    pub fn pin_faults(&self) -> u32 {
        self.pin_faults
    }
}

impl<STEP, DIR, EN, LIMIT, DELAY, const AXES: usize> StepperBackend
    for GpioBackend<STEP, DIR, EN, LIMIT, DELAY, AXES>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIMIT: InputPin,
    DELAY: DelayNs,
{
    fn set_direction(&mut self, axis: usize, direction: Direction) {
        if self.current_direction[axis] == Some(direction) {
            return;
        }

        let pin_high = match direction {
            Direction::Forward => !self.invert_direction[axis],
            Direction::Reverse => self.invert_direction[axis],
        };

        let result = if pin_high {
            self.dir_pins[axis].set_high()
        } else {
            self.dir_pins[axis].set_low()
        };

        if result.is_err() {
            self.pin_faults = self.pin_faults.saturating_add(1);
            return;
        }

        self.current_direction[axis] = Some(direction);
    }

    fn pulse(&mut self, axis: usize) {
        if self.step_pins[axis].set_high().is_err() {
            self.pin_faults = self.pin_faults.saturating_add(1);
        }

        self.delay.delay_us(PULSE_WIDTH_US);

        if self.step_pins[axis].set_low().is_err() {
            self.pin_faults = self.pin_faults.saturating_add(1);
        }
    }

    fn set_enabled(&mut self, axis: usize, enabled: bool) {
        // Driver enable inputs are active-low on A4988-style boards.
        let result = if enabled {
            self.enable_pins[axis].set_low()
        } else {
            self.enable_pins[axis].set_high()
        };

        if result.is_err() {
            self.pin_faults = self.pin_faults.saturating_add(1);
        }
    }

    fn read_limit(&mut self, axis: usize) -> bool {
        match self.limit_pins[axis].is_high() {
            Ok(tripped) => tripped,
            Err(_) => {
                self.pin_faults = self.pin_faults.saturating_add(1);
                false
            }
        }
    }
}
