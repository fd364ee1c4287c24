//! Producer-side motion planner.
//!
//! The planner is the foreground half of the core: it turns line, arc, pen,
//! homing, and calibration commands into segments and appends them to the
//! queue. It keeps its own mirror of the commanded position so deltas can be
//! computed without touching engine state, and it never blocks: a full
//! queue surfaces as [`MotionError::BufferFull`] and the caller retries.

use crate::config::units::{Millimeters, Steps, StepsPerSec};
use crate::config::{MachineConstraints, PEN_DWELL_FEED};
use crate::error::{ConfigError, Error, MotionError, Result};
use crate::motion::{ArcChords, ArcDirection, Segment, SegmentProducer};
use crate::storage::{CalibrationStore, NvStorage};

/// Pen position commanded through [`Planner::set_pen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PenState {
    /// Pen lifted off the paper.
    Up,
    /// Pen on the paper.
    Down,
}

/// Diagnostic counters for planner-side recoveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlannerStats {
    /// Motion segments appended to the queue.
    pub segments_planned: u32,
    /// Feed rates clamped into the configured window.
    pub feed_clamps: u32,
    /// Arcs successfully decomposed.
    pub arcs_planned: u32,
    /// Arc requests rejected as degenerate.
    pub degenerate_arcs: u32,
}

/// Foreground command surface.
///
/// Owns the producer endpoint of the segment queue and the machine
/// constraints. Commanded positions are per-axis machine millimeters; the
/// Cartesian-to-axis kinematic transform belongs to the command parser
/// above this crate.
pub struct Planner<'q, const AXES: usize, const DEPTH: usize> {
    producer: SegmentProducer<'q, AXES, DEPTH>,
    constraints: MachineConstraints<AXES>,
    /// Mirror of the last commanded position, in steps.
    position: [Steps; AXES],
    stats: PlannerStats,
}

impl<'q, const AXES: usize, const DEPTH: usize> Planner<'q, AXES, DEPTH> {
    /// Create a planner at the origin.
    pub fn new(
        producer: SegmentProducer<'q, AXES, DEPTH>,
        constraints: MachineConstraints<AXES>,
    ) -> Self {
        Self {
            producer,
            constraints,
            position: [Steps(0); AXES],
            stats: PlannerStats::default(),
        }
    }

    /// Queue a straight move to `target` at `feed`.
    ///
    /// The feed rate is clamped into the configured window (counted in
    /// [`PlannerStats::feed_clamps`]). A move that rounds to zero steps on
    /// every axis queues nothing and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// [`MotionError::BufferFull`] when the queue has no free slot; the
    /// planner state is unchanged and the command can be retried verbatim.
    pub fn move_line(&mut self, target: [Millimeters; AXES], feed: StepsPerSec) -> Result<u32> {
        let feed = self.effective_feed(feed);

        let mut target_steps = [Steps(0); AXES];
        for axis in 0..AXES {
            target_steps[axis] = self.constraints.mm_to_steps(axis, target[axis]);
        }

        self.enqueue_line_to(target_steps, feed)
    }

    /// Queue an arc from the current position to `end` around `center`, in
    /// the axis 0/1 plane, decomposed into bounded-length chords.
    ///
    /// On backpressure the already queued chords stand: the mirror tracks
    /// them, so re-issuing the identical command continues the same circle
    /// from wherever planning stopped.
    ///
    /// # Errors
    ///
    /// [`MotionError::DegenerateArc`] for zero radius or sweep (nothing is
    /// queued); [`MotionError::BufferFull`] when the queue fills mid-arc.
    ///
    /// # Panics
    ///
    /// Panics if `AXES < 2`; arcs need the two spool axes.
    pub fn move_arc(
        &mut self,
        center: [Millimeters; 2],
        end: [Millimeters; 2],
        direction: ArcDirection,
        feed: StepsPerSec,
    ) -> Result<u32> {
        let feed = self.effective_feed(feed);

        let start = [
            self.constraints.steps_to_mm(0, self.position[0]),
            self.constraints.steps_to_mm(1, self.position[1]),
        ];

        let chords = ArcChords::new(start, center, end, direction, self.constraints.max_chord)
            .map_err(|e| {
                self.stats.degenerate_arcs += 1;
                e
            })?;

        let mut queued = 0;
        for point in chords {
            let mut target_steps = self.position;
            target_steps[0] = self.constraints.mm_to_steps(0, point[0]);
            target_steps[1] = self.constraints.mm_to_steps(1, point[1]);
            queued += self.enqueue_line_to(target_steps, feed)?;
        }

        self.stats.arcs_planned += 1;
        Ok(queued)
    }

    /// Queue a pen change. The segment commands the servo at activation and
    /// dwells for the configured settle time before motion resumes.
    ///
    /// # Errors
    ///
    /// [`MotionError::BufferFull`] when the queue has no free slot.
    pub fn set_pen(&mut self, state: PenState) -> Result<()> {
        let angle = match state {
            PenState::Up => self.constraints.pen_up_angle,
            PenState::Down => self.constraints.pen_down_angle,
        };

        self.producer.enqueue(Segment::pen(
            angle,
            self.constraints.pen_settle_ticks,
            PEN_DWELL_FEED,
        ))
    }

    /// Queue homing seek moves: each spool axis travels toward its switch
    /// at the seek feed, bounded by the configured travel. The engine's
    /// limit-trip hard stop ends the seek; afterwards the caller clears the
    /// fault, zeroes the engine, and calls [`zero_position`](Self::zero_position).
    ///
    /// The planner's position mirror is not meaningful until that re-zero.
    ///
    /// # Errors
    ///
    /// [`MotionError::HomingUnavailable`] when the machine has no limit
    /// switches; [`MotionError::BufferFull`] on backpressure.
    pub fn home_axes(&mut self) -> Result<u32> {
        if !self.constraints.limit_switches {
            return Err(Error::Motion(MotionError::HomingUnavailable));
        }

        let (feed, _) = self.constraints.clamp_feed(self.constraints.seek_feed_rate);

        let mut queued = 0;
        for axis in 0..2usize.min(AXES) {
            let travel = self
                .constraints
                .mm_to_steps(axis, self.constraints.seek_travel)
                .value();
            let mut deltas = [0i32; AXES];
            deltas[axis] = -(travel as i32);
            self.producer.enqueue(Segment::from_deltas(deltas, feed))?;
            queued += 1;
        }

        Ok(queued)
    }

    /// Apply and persist new spool diameters.
    ///
    /// The record keeps its UUID; the constraints are recomputed so later
    /// moves use the new scale.
    ///
    /// # Errors
    ///
    /// Rejects non-positive diameters; propagates storage medium failures.
    pub fn set_calibration<S: NvStorage>(
        &mut self,
        spool_diameters: [Millimeters; 2],
        store: &mut CalibrationStore<S>,
    ) -> Result<()> {
        for d in &spool_diameters {
            if d.0 <= 0.0 {
                return Err(Error::Config(ConfigError::InvalidSpoolDiameter(d.0)));
            }
        }

        let (mut record, _) = store.load()?;
        record.spool_diameter = spool_diameters;
        store.save(&record)?;

        self.constraints.recalibrate(spool_diameters);
        Ok(())
    }

    /// Reset the position mirror to the origin (after homing).
    pub fn zero_position(&mut self) {
        self.position = [Steps(0); AXES];
    }

    /// Overwrite the position mirror (to match the engine).
    pub fn sync_position(&mut self, position: [Steps; AXES]) {
        self.position = position;
    }

    /// The last commanded position, in steps.
    #[inline]
    pub fn position(&self) -> [Steps; AXES] {
        self.position
    }

    /// The last commanded position, in millimeters.
    pub fn position_mm(&self) -> [Millimeters; AXES] {
        let mut out = [Millimeters(0.0); AXES];
        for axis in 0..AXES {
            out[axis] = self.constraints.steps_to_mm(axis, self.position[axis]);
        }
        out
    }

    /// Whether the queue has a free slot right now.
    #[inline]
    pub fn ready(&self) -> bool {
        self.producer.ready()
    }

    /// Segments currently queued (producer view).
    #[inline]
    pub fn queued(&self) -> usize {
        self.producer.len()
    }

    /// Diagnostic counters.
    #[inline]
    pub fn stats(&self) -> &PlannerStats {
        &self.stats
    }

    /// The active machine constraints.
    #[inline]
    pub fn constraints(&self) -> &MachineConstraints<AXES> {
        &self.constraints
    }

    /// Clamp a requested feed, counting the clamp.
    fn effective_feed(&mut self, feed: StepsPerSec) -> StepsPerSec {
        let (feed, clamped) = self.constraints.clamp_feed(feed);
        if clamped {
            self.stats.feed_clamps += 1;
        }
        feed
    }

    /// Queue one line segment to an absolute step target and advance the
    /// mirror. Nothing changes on backpressure.
    fn enqueue_line_to(&mut self, target_steps: [Steps; AXES], feed: StepsPerSec) -> Result<u32> {
        let mut deltas = [0i32; AXES];
        let mut moved = false;
        for axis in 0..AXES {
            let delta = target_steps[axis].value() - self.position[axis].value();
            deltas[axis] = delta as i32;
            moved |= delta != 0;
        }

        if !moved {
            return Ok(0);
        }

        self.producer
            .enqueue(Segment::from_deltas(deltas, feed))?;
        self.position = target_steps;
        self.stats.segments_planned += 1;
        Ok(1)
    }
}
