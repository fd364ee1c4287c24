//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::MachineConfig;

/// Validate a machine configuration.
///
/// Checks every numeric range once at startup so that scattered runtime
/// checks are unnecessary:
/// - drive geometry is nonzero and the feed window is well-formed
/// - the arc chord bound is positive
/// - pen angles are physical servo setpoints
/// - the timer clock and reload ceiling are nonzero
/// - spool and auxiliary scales are positive
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    if config.drive.steps_per_turn == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerTurn(
            config.drive.steps_per_turn,
        )));
    }

    let min = config.drive.min_feed_rate.value();
    let max = config.drive.max_feed_rate.value();
    if min == 0 || min >= max {
        return Err(Error::Config(ConfigError::InvalidFeedWindow { min, max }));
    }

    if config.planner.max_chord_mm <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidChordLength(
            config.planner.max_chord_mm,
        )));
    }

    if config.pen.up_angle > 180 {
        return Err(Error::Config(ConfigError::InvalidPenAngle(config.pen.up_angle)));
    }
    if config.pen.down_angle > 180 {
        return Err(Error::Config(ConfigError::InvalidPenAngle(
            config.pen.down_angle,
        )));
    }

    if config.timer.clock_hz == 0 {
        return Err(Error::Config(ConfigError::InvalidClockFrequency(
            config.timer.clock_hz,
        )));
    }
    if config.timer.max_reload == 0 {
        return Err(Error::Config(ConfigError::InvalidMaxReload(
            config.timer.max_reload,
        )));
    }

    if config.spools.default_diameter_mm <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidSpoolDiameter(
            config.spools.default_diameter_mm,
        )));
    }
    if config.spools.aux_steps_per_mm <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAxisScale(
            config.spools.aux_steps_per_mm,
        )));
    }

    let seek = config.homing.seek_feed_rate.value();
    if seek == 0 {
        return Err(Error::Config(ConfigError::InvalidSeekRate(seek)));
    }
    if config.homing.seek_travel_mm <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidSeekTravel(
            config.homing.seek_travel_mm,
        )));
    }

    Ok(())
}
