//! Machine constraints derived from configuration and calibration.

use core::f32::consts::PI;

use libm::roundf;

use super::machine::MachineConfig;
use super::units::{Millimeters, StepsPerSec, Steps};

/// Tick rate used for pen dwell segments, in ticks/sec.
///
/// One dwell tick is one millisecond, so a pen settle time in milliseconds
/// converts directly to a tick count.
pub const PEN_DWELL_FEED: StepsPerSec = StepsPerSec(1_000);

/// Derived machine parameters computed once at startup.
///
/// The spool-driven axes (0 and 1) get their scale from the calibrated spool
/// diameters; any further axes use the configured auxiliary scale.
#[derive(Debug, Clone)]
pub struct MachineConstraints<const AXES: usize> {
    /// Steps per millimeter of travel, per axis.
    pub steps_per_mm: [f32; AXES],

    /// Minimum feed rate in steps/sec.
    pub min_feed_rate: StepsPerSec,

    /// Maximum feed rate in steps/sec.
    pub max_feed_rate: StepsPerSec,

    /// Maximum arc chord length.
    pub max_chord: Millimeters,

    /// Pen-up servo angle in degrees.
    pub pen_up_angle: u8,

    /// Pen-down servo angle in degrees.
    pub pen_down_angle: u8,

    /// Pen settle time expressed in dwell ticks at [`PEN_DWELL_FEED`].
    pub pen_settle_ticks: u32,

    /// Whether limit switches are wired.
    pub limit_switches: bool,

    /// Feed rate for homing seek moves.
    pub seek_feed_rate: StepsPerSec,

    /// Maximum homing seek travel per axis.
    pub seek_travel: Millimeters,

    /// Total steps per spool turn, kept for recalibration.
    total_steps_per_turn: f32,
}

impl<const AXES: usize> MachineConstraints<AXES> {
    /// Compute machine constraints from configuration and spool diameters.
    pub fn from_config(config: &MachineConfig, spool_diameters: [Millimeters; 2]) -> Self {
        let total_steps_per_turn = config.drive.total_steps_per_turn() as f32;

        let mut steps_per_mm = [config.spools.aux_steps_per_mm; AXES];
        for (axis, scale) in steps_per_mm.iter_mut().enumerate().take(2) {
            *scale = spool_scale(total_steps_per_turn, spool_diameters[axis]);
        }

        Self {
            steps_per_mm,
            min_feed_rate: config.drive.min_feed_rate,
            max_feed_rate: config.drive.max_feed_rate,
            max_chord: Millimeters(config.planner.max_chord_mm),
            pen_up_angle: config.pen.up_angle,
            pen_down_angle: config.pen.down_angle,
            pen_settle_ticks: config.pen.settle_ms * PEN_DWELL_FEED.value() / 1_000,
            limit_switches: config.homing.limit_switches,
            seek_feed_rate: config.homing.seek_feed_rate,
            seek_travel: Millimeters(config.homing.seek_travel_mm),
            total_steps_per_turn,
        }
    }

    /// Recompute the spool axis scales after a calibration change.
    pub fn recalibrate(&mut self, spool_diameters: [Millimeters; 2]) {
        for (axis, scale) in self.steps_per_mm.iter_mut().enumerate().take(2) {
            *scale = spool_scale(self.total_steps_per_turn, spool_diameters[axis]);
        }
    }

    /// Clamp a feed rate into the configured window.
    ///
    /// Returns the effective feed rate and whether clamping occurred. Out of
    /// range requests are recovered, not rejected; callers count the clamp
    /// for diagnostics.
    pub fn clamp_feed(&self, feed: StepsPerSec) -> (StepsPerSec, bool) {
        if feed < self.min_feed_rate {
            (self.min_feed_rate, true)
        } else if feed > self.max_feed_rate {
            (self.max_feed_rate, true)
        } else {
            (feed, false)
        }
    }

    /// Convert a position on an axis from millimeters to whole steps.
    #[inline]
    pub fn mm_to_steps(&self, axis: usize, position: Millimeters) -> Steps {
        Steps(roundf(position.0 * self.steps_per_mm[axis]) as i64)
    }

    /// Convert a position on an axis from steps to millimeters.
    #[inline]
    pub fn steps_to_mm(&self, axis: usize, position: Steps) -> Millimeters {
        Millimeters(position.0 as f32 / self.steps_per_mm[axis])
    }
}

/// Steps per millimeter of cable paid out by a spool of the given diameter.
fn spool_scale(total_steps_per_turn: f32, diameter: Millimeters) -> f32 {
    total_steps_per_turn / (PI * diameter.0)
}
