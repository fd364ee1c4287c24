//! Timer-tick step engine.
//!
//! [`StepEngine::tick`] is the consumer side of the segment queue and runs
//! once per timer interrupt. Each invocation does a bounded amount of work:
//! fetch-and-activate one segment, or advance the active segment by one
//! Bresenham tick. It never blocks, never allocates, and never lets a fault
//! escape: a malformed segment is retired, a limit trip latches a fault and
//! halts motion.

use crate::config::units::{Steps, StepsPerSec};
use crate::hal::{PenActuator, StepperBackend, TickTimer};

use super::buffer::SegmentConsumer;
use super::segment::Segment;
use super::timer::TickScheduler;

/// Outcome of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Queue empty; nothing to do.
    Idle,
    /// A segment was fetched: directions latched, timer programmed, pen
    /// action applied. No pulses this tick, so a direction change always
    /// settles for at least one full tick before the first pulse.
    Activated,
    /// A zero-step segment was retired without pulsing.
    Skipped,
    /// A stepping tick; `pulses` axes pulsed. `last` marks retirement.
    Stepped {
        /// Number of axes pulsed this tick.
        pulses: u8,
        /// Whether the segment was retired this tick.
        last: bool,
    },
    /// A pen dwell tick. `last` marks retirement.
    Dwell {
        /// Whether the segment was retired this tick.
        last: bool,
    },
    /// A fault is latched; motion is halted until the fault is cleared.
    Halted,
}

/// Latched engine fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// A limit switch tripped while its axis was in motion. Hard stop.
    LimitTripped {
        /// Axis whose switch tripped.
        axis: usize,
    },
}

/// Diagnostic counters for recoveries that are reported, not fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Timer reload values that fell outside the programmable range.
    pub timer_clamps: u32,
    /// Zero-step segments retired without pulsing.
    pub segments_skipped: u32,
}

/// Snapshot for the status/telemetry boundary. Poll-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status<const AXES: usize> {
    /// Absolute position per axis, in steps from origin.
    pub position: [Steps; AXES],
    /// Whether a segment is currently being executed.
    pub busy: bool,
    /// Segments in flight: queued plus the active one.
    pub occupancy: usize,
    /// Latched fault, if any.
    pub fault: Option<Fault>,
}

/// The Bresenham step generator.
///
/// Owns the absolute axis positions and the segment currently being
/// executed. All hardware access goes through the [`StepperBackend`],
/// [`PenActuator`], and [`TickTimer`] seams passed into [`tick`](Self::tick).
#[derive(Debug)]
pub struct StepEngine<const AXES: usize> {
    scheduler: TickScheduler,
    limit_switches: bool,
    position: [i64; AXES],
    active: Option<Segment<AXES>>,
    engaged: bool,
    fault: Option<Fault>,
    stats: EngineStats,
}

impl<const AXES: usize> StepEngine<AXES> {
    /// Create an idle engine.
    ///
    /// `limit_switches` enables per-tick limit polling; leave it off for
    /// machines without wired switches.
    pub const fn new(scheduler: TickScheduler, limit_switches: bool) -> Self {
        Self {
            scheduler,
            limit_switches,
            position: [0; AXES],
            active: None,
            engaged: false,
            fault: None,
            stats: EngineStats {
                timer_clamps: 0,
                segments_skipped: 0,
            },
        }
    }

    /// Run one timer tick.
    ///
    /// Interrupt context: bounded work, no blocking, no allocation. The
    /// worst case is one limit read and one pulse per axis.
    pub fn tick<B, P, T, const DEPTH: usize>(
        &mut self,
        queue: &mut SegmentConsumer<'_, AXES, DEPTH>,
        backend: &mut B,
        pen: &mut P,
        timer: &mut T,
    ) -> Tick
    where
        B: StepperBackend,
        P: PenActuator,
        T: TickTimer,
    {
        if self.fault.is_some() {
            return Tick::Halted;
        }

        let seg = match self.active.as_mut() {
            Some(seg) => seg,
            None => {
                return match queue.take() {
                    None => Tick::Idle,
                    Some(seg) => self.activate(seg, backend, pen, timer),
                };
            }
        };

        // Pen dwell: count ticks, no pulses.
        if !seg.is_motion() {
            seg.steps_left -= 1;
            let last = seg.steps_left == 0;
            if last {
                self.active = None;
            }
            return Tick::Dwell { last };
        }

        // Limit polling happens before the pulses so a tripped axis never
        // steps into its switch.
        if self.limit_switches {
            for axis in 0..AXES {
                if seg.axes[axis].absdelta > 0 && backend.read_limit(axis) {
                    self.fault = Some(Fault::LimitTripped { axis });
                    self.active = None;
                    timer.stop();
                    return Tick::Halted;
                }
            }
        }

        // Bresenham: each axis accumulates its absdelta; crossing the
        // dominant step count emits a pulse and wraps the accumulator. The
        // dominant axis crosses every tick by construction.
        let mut pulses = 0u8;
        for (axis, m) in seg.axes.iter_mut().enumerate() {
            m.over += m.absdelta;
            if m.over >= seg.steps {
                backend.pulse(axis);
                m.over -= seg.steps;
                self.position[axis] += m.dir.sign();
                pulses += 1;
            }
        }

        seg.steps_left -= 1;
        let last = seg.steps_left == 0;
        if last {
            self.active = None;
        }
        Tick::Stepped { pulses, last }
    }

    /// Activate a freshly dequeued segment.
    fn activate<B, P, T>(
        &mut self,
        segment: Segment<AXES>,
        backend: &mut B,
        pen: &mut P,
        timer: &mut T,
    ) -> Tick
    where
        B: StepperBackend,
        P: PenActuator,
        T: TickTimer,
    {
        if let Some(action) = segment.pen {
            pen.set_angle(action.angle);
        }

        // A segment with nothing to do (no steps, no dwell) is retired on
        // the spot rather than crashing or stalling the scheduler.
        if segment.is_finished() {
            self.stats.segments_skipped += 1;
            return Tick::Skipped;
        }

        if !self.engaged {
            for axis in 0..AXES {
                backend.set_enabled(axis, true);
            }
            self.engaged = true;
        }

        for (axis, m) in segment.axes.iter().enumerate() {
            if m.absdelta > 0 {
                backend.set_direction(axis, m.dir);
            }
        }

        let reload = self.scheduler.reload_for(segment.feed_rate);
        if reload.clamped {
            self.stats.timer_clamps += 1;
        }
        timer.set_reload(reload.value);
        timer.start();

        self.active = Some(segment);
        Tick::Activated
    }

    /// Stop everything: foreground-initiated abort.
    ///
    /// The timer is stopped *first*, so the tick interrupt cannot observe
    /// the queue mid-reset; then the queue is drained, the active segment
    /// dropped, the motors de-energized, and any fault cleared. Call with
    /// the interrupt masked (e.g. inside a critical section).
    pub fn abort<B, T, const DEPTH: usize>(
        &mut self,
        queue: &mut SegmentConsumer<'_, AXES, DEPTH>,
        backend: &mut B,
        timer: &mut T,
    ) where
        B: StepperBackend,
        T: TickTimer,
    {
        timer.stop();
        queue.drain();
        self.active = None;
        self.fault = None;
        for axis in 0..AXES {
            backend.set_enabled(axis, false);
        }
        self.engaged = false;
    }

    /// The latched fault, if any.
    #[inline]
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// Clear a latched fault, returning it. Motion resumes on the next
    /// queued segment.
    pub fn clear_fault(&mut self) -> Option<Fault> {
        self.fault.take()
    }

    /// Whether no segment is being executed.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Absolute position per axis.
    pub fn position(&self) -> [Steps; AXES] {
        let mut out = [Steps(0); AXES];
        for (axis, p) in self.position.iter().enumerate() {
            out[axis] = Steps(*p);
        }
        out
    }

    /// Overwrite the absolute position (after homing).
    pub fn set_position(&mut self, position: [Steps; AXES]) {
        for (axis, p) in position.iter().enumerate() {
            self.position[axis] = p.value();
        }
    }

    /// Reset the absolute position to the origin.
    pub fn zero(&mut self) {
        self.position = [0; AXES];
    }

    /// Diagnostic counters.
    #[inline]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Snapshot for the telemetry boundary.
    ///
    /// `queued` is the current queue length as seen by the consumer side.
    pub fn status(&self, queued: usize) -> Status<AXES> {
        Status {
            position: self.position(),
            busy: self.active.is_some(),
            occupancy: queued + usize::from(self.active.is_some()),
            fault: self.fault,
        }
    }

    /// Feed rate of the segment currently being executed, if any.
    pub fn active_feed_rate(&self) -> Option<StepsPerSec> {
        self.active.as_ref().map(|s| s.feed_rate)
    }
}
