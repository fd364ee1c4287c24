//! Tick period computation for the hardware step timer.

use crate::config::units::StepsPerSec;

/// A computed timer reload value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reload {
    /// Counter reload value to program.
    pub value: u32,
    /// Whether the ideal value fell outside the programmable range and was
    /// clamped to the nearest bound.
    pub clamped: bool,
}

/// Computes the interrupt period from a segment's feed rate.
///
/// One tick advances the dominant axis by one step, so the tick rate equals
/// the feed rate and the reload value is `clock_hz / feed`, rounded, then
/// clamped into `[1, max_reload]`. A clamp is reported for diagnostics but
/// is never fatal: the machine keeps moving at the nearest achievable rate.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    clock_hz: u32,
    max_reload: u32,
}

impl TickScheduler {
    /// Create a scheduler for a timer clocked at `clock_hz` with the given
    /// reload ceiling.
    pub const fn new(clock_hz: u32, max_reload: u32) -> Self {
        Self {
            clock_hz,
            max_reload,
        }
    }

    /// Compute the reload value for a feed rate.
    pub fn reload_for(&self, feed_rate: StepsPerSec) -> Reload {
        let feed = feed_rate.value();
        if feed == 0 {
            // A zero feed rate cannot program a period; run at the slowest
            // achievable tick instead.
            return Reload {
                value: self.max_reload,
                clamped: true,
            };
        }

        let ideal = (self.clock_hz as u64 + (feed as u64 / 2)) / feed as u64;

        if ideal < 1 {
            Reload {
                value: 1,
                clamped: true,
            }
        } else if ideal > self.max_reload as u64 {
            Reload {
                value: self.max_reload,
                clamped: true,
            }
        } else {
            Reload {
                value: ideal as u32,
                clamped: false,
            }
        }
    }

    /// The timer input clock in Hz.
    #[inline]
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }
}
