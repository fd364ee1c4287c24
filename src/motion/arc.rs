//! Arc-to-chord decomposition.
//!
//! Arcs are approximated by a sequence of short line chords of bounded
//! length, independent of radius, so the discretization error stays bounded.
//! The final chord lands on the exact requested endpoint, preventing
//! accumulated rounding drift.

use libm::{atan2f, ceilf, cosf, fabsf, sinf, sqrtf};

use crate::config::units::Millimeters;
use crate::error::{Error, MotionError, Result};

/// Sweep direction of an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArcDirection {
    /// Negative angular sweep.
    Clockwise,
    /// Positive angular sweep.
    CounterClockwise,
}

/// Geometry below which an arc is considered degenerate.
const DEGENERATE_EPS: f32 = 1e-6;

/// Iterator over the chord endpoints approximating an arc.
///
/// Deterministic: identical inputs always yield the identical sequence.
/// Arcs shorter than one chord bound collapse to a single chord. Full
/// circles cannot be expressed (start and end coincide, which is a zero
/// sweep), matching the endpoint-based arc command.
#[derive(Debug, Clone)]
pub struct ArcChords {
    center: [f32; 2],
    radius: f32,
    start_angle: f32,
    /// Signed sweep in radians; positive is counter-clockwise.
    sweep: f32,
    end: [Millimeters; 2],
    chords: u32,
    emitted: u32,
}

impl ArcChords {
    /// Plan the decomposition of an arc from `start` to `end` around
    /// `center`, splitting it into chords no longer than `max_chord`.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::DegenerateArc`] for zero radius or zero sweep;
    /// no chords are produced in that case.
    pub fn new(
        start: [Millimeters; 2],
        center: [Millimeters; 2],
        end: [Millimeters; 2],
        direction: ArcDirection,
        max_chord: Millimeters,
    ) -> Result<Self> {
        let sx = start[0].0 - center[0].0;
        let sy = start[1].0 - center[1].0;
        let ex = end[0].0 - center[0].0;
        let ey = end[1].0 - center[1].0;

        let radius = sqrtf(sx * sx + sy * sy);
        if radius < DEGENERATE_EPS {
            return Err(Error::Motion(MotionError::DegenerateArc));
        }

        let start_angle = atan2f(sy, sx);
        let end_angle = atan2f(ey, ex);

        let raw = end_angle - start_angle;
        if fabsf(raw) < DEGENERATE_EPS {
            return Err(Error::Motion(MotionError::DegenerateArc));
        }

        let sweep = match direction {
            ArcDirection::CounterClockwise => {
                if raw > 0.0 {
                    raw
                } else {
                    raw + 2.0 * core::f32::consts::PI
                }
            }
            ArcDirection::Clockwise => {
                if raw < 0.0 {
                    raw
                } else {
                    raw - 2.0 * core::f32::consts::PI
                }
            }
        };

        let arc_length = fabsf(sweep) * radius;
        let chords = (ceilf(arc_length / max_chord.0) as u32).max(1);

        Ok(Self {
            center: [center[0].0, center[1].0],
            radius,
            start_angle,
            sweep,
            end,
            chords,
            emitted: 0,
        })
    }

    /// Total number of chords this arc decomposes into.
    #[inline]
    pub fn chord_count(&self) -> u32 {
        self.chords
    }
}

impl Iterator for ArcChords {
    type Item = [Millimeters; 2];

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.chords {
            return None;
        }
        self.emitted += 1;

        if self.emitted == self.chords {
            // Snap the final chord to the exact requested endpoint.
            return Some(self.end);
        }

        let fraction = self.emitted as f32 / self.chords as f32;
        let angle = self.start_angle + self.sweep * fraction;
        Some([
            Millimeters(self.center[0] + self.radius * cosf(angle)),
            Millimeters(self.center[1] + self.radius * sinf(angle)),
        ])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.chords - self.emitted) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArcChords {}
