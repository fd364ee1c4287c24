//! Machine configuration from TOML.

use serde::Deserialize;

use super::units::{Microsteps, StepsPerSec};

/// Stepper drive parameters shared by all axes.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Base steps per spool turn (before microstepping, typically 400 for
    /// 0.9-degree motors).
    #[serde(default = "default_steps_per_turn")]
    pub steps_per_turn: u16,

    /// Microstep setting (1, 2, 4, 8, 16, 32, etc.).
    #[serde(default = "default_microsteps")]
    pub microsteps: Microsteps,

    /// Minimum feed rate in steps/sec.
    #[serde(default = "default_min_feed_rate")]
    pub min_feed_rate: StepsPerSec,

    /// Maximum feed rate in steps/sec.
    #[serde(default = "default_max_feed_rate")]
    pub max_feed_rate: StepsPerSec,
}

fn default_steps_per_turn() -> u16 {
    400
}

fn default_microsteps() -> Microsteps {
    Microsteps::SIXTEENTH
}

fn default_min_feed_rate() -> StepsPerSec {
    StepsPerSec(1)
}

fn default_max_feed_rate() -> StepsPerSec {
    StepsPerSec(10_000)
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            steps_per_turn: default_steps_per_turn(),
            microsteps: default_microsteps(),
            min_feed_rate: default_min_feed_rate(),
            max_feed_rate: default_max_feed_rate(),
        }
    }
}

impl DriveConfig {
    /// Total steps per spool turn including microstepping.
    pub fn total_steps_per_turn(&self) -> u32 {
        self.steps_per_turn as u32 * self.microsteps.value() as u32
    }
}

/// Hardware timer parameters for the step interrupt.
#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    /// Timer input clock in Hz.
    #[serde(default = "default_clock_hz")]
    pub clock_hz: u32,

    /// Largest programmable reload value (counter width bound).
    #[serde(default = "default_max_reload")]
    pub max_reload: u32,
}

fn default_clock_hz() -> u32 {
    16_000_000
}

fn default_max_reload() -> u32 {
    65_535
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            clock_hz: default_clock_hz(),
            max_reload: default_max_reload(),
        }
    }
}

/// Pen servo setpoints and settle time.
#[derive(Debug, Clone, Deserialize)]
pub struct PenConfig {
    /// Servo angle for pen up, in degrees.
    #[serde(default = "default_pen_up_angle")]
    pub up_angle: u8,

    /// Servo angle for pen down, in degrees. Some servos dislike 0 degrees.
    #[serde(default = "default_pen_down_angle")]
    pub down_angle: u8,

    /// Settle time before motion resumes, in milliseconds.
    #[serde(default = "default_pen_settle_ms")]
    pub settle_ms: u32,
}

fn default_pen_up_angle() -> u8 {
    80
}

fn default_pen_down_angle() -> u8 {
    10
}

fn default_pen_settle_ms() -> u32 {
    250
}

impl Default for PenConfig {
    fn default() -> Self {
        Self {
            up_angle: default_pen_up_angle(),
            down_angle: default_pen_down_angle(),
            settle_ms: default_pen_settle_ms(),
        }
    }
}

/// Spool geometry defaults used until a calibration record is loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct SpoolConfig {
    /// Default spool diameter in millimeters, applied to both spool axes
    /// when no stored calibration exists.
    #[serde(default = "default_spool_diameter_mm")]
    pub default_diameter_mm: f32,

    /// Steps per millimeter for axes beyond the two spool-driven ones.
    #[serde(default = "default_aux_steps_per_mm")]
    pub aux_steps_per_mm: f32,
}

fn default_spool_diameter_mm() -> f32 {
    25.0
}

fn default_aux_steps_per_mm() -> f32 {
    80.0
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            default_diameter_mm: default_spool_diameter_mm(),
            aux_steps_per_mm: default_aux_steps_per_mm(),
        }
    }
}

/// Producer-side planning parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Maximum arc chord length in millimeters. Arcs are split into line
    /// segments no longer than this, independent of radius.
    #[serde(default = "default_max_chord_mm")]
    pub max_chord_mm: f32,
}

fn default_max_chord_mm() -> f32 {
    2.0
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_chord_mm: default_max_chord_mm(),
        }
    }
}

/// Limit switch and homing seek parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HomingConfig {
    /// Whether limit switches are wired. Without them homing is rejected
    /// and the engine never polls limit inputs.
    #[serde(default)]
    pub limit_switches: bool,

    /// Feed rate for homing seek moves, in steps/sec.
    #[serde(default = "default_seek_feed_rate")]
    pub seek_feed_rate: StepsPerSec,

    /// Maximum seek travel per axis in millimeters.
    #[serde(default = "default_seek_travel_mm")]
    pub seek_travel_mm: f32,
}

fn default_seek_feed_rate() -> StepsPerSec {
    StepsPerSec(400)
}

fn default_seek_travel_mm() -> f32 {
    1_000.0
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            limit_switches: false,
            seek_feed_rate: default_seek_feed_rate(),
            seek_travel_mm: default_seek_travel_mm(),
        }
    }
}

/// Root machine configuration from TOML.
///
/// Every section has defaults matching a 16-microstep, 16 MHz cable plotter,
/// so an empty TOML document is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineConfig {
    /// Stepper drive parameters.
    #[serde(default)]
    pub drive: DriveConfig,

    /// Step interrupt timer parameters.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Pen servo parameters.
    #[serde(default)]
    pub pen: PenConfig,

    /// Spool geometry defaults.
    #[serde(default)]
    pub spools: SpoolConfig,

    /// Planning parameters.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Limit switch and homing parameters.
    #[serde(default)]
    pub homing: HomingConfig,
}
