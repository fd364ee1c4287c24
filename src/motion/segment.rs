//! Motion segments, the unit of work between planner and step engine.

use crate::config::units::StepsPerSec;

use super::axis::AxisMove;

/// Pen command carried by a zero-motion segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PenAction {
    /// Servo angle to command at segment activation, in degrees.
    pub angle: u8,
}

/// One discretized motion: per-axis step state plus a feed rate and a
/// remaining-tick countdown.
///
/// A segment is created by the producer, owned by the ring buffer until the
/// consumer takes it, and mutated only by the consumer from then on. The
/// segment is finished when `steps_left` reaches zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<const AXES: usize> {
    /// Per-axis Bresenham state.
    pub axes: [AxisMove; AXES],
    /// Dominant step count: the largest `absdelta` across axes. Drives the
    /// tick loop; the dominant axis pulses every tick.
    pub steps: u32,
    /// Countdown of remaining ticks; zero is the terminal state.
    pub steps_left: u32,
    /// Feed rate in dominant-axis steps per second.
    pub feed_rate: StepsPerSec,
    /// Pen command applied at activation, if any.
    pub pen: Option<PenAction>,
}

impl<const AXES: usize> Segment<AXES> {
    /// Build a line (or arc chord) segment from signed per-axis step deltas.
    ///
    /// The dominant step count is the maximum `absdelta`; a segment with all
    /// deltas zero has `steps == 0` and is skipped by the engine.
    pub fn from_deltas(deltas: [i32; AXES], feed_rate: StepsPerSec) -> Self {
        let mut axes = [AxisMove::ZERO; AXES];
        let mut steps = 0u32;
        for (axis, &delta) in deltas.iter().enumerate() {
            let m = AxisMove::from_delta(delta);
            steps = steps.max(m.absdelta);
            axes[axis] = m;
        }

        Self {
            axes,
            steps,
            steps_left: steps,
            feed_rate,
            pen: None,
        }
    }

    /// Build a zero-motion pen segment that dwells for `settle_ticks` ticks
    /// after commanding the servo angle.
    pub fn pen(angle: u8, settle_ticks: u32, feed_rate: StepsPerSec) -> Self {
        Self {
            axes: [AxisMove::ZERO; AXES],
            steps: 0,
            steps_left: settle_ticks,
            feed_rate,
            pen: Some(PenAction { angle }),
        }
    }

    /// Whether this segment moves any axis.
    #[inline]
    pub fn is_motion(&self) -> bool {
        self.steps > 0
    }

    /// Whether this segment has run to completion.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.steps_left == 0
    }
}
