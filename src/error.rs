//! Error types for plotter-motion.
//!
//! Provides unified error handling across configuration, motion planning, and
//! calibration storage.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all plotter-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motion planning or queueing error
    Motion(MotionError),
    /// Calibration storage error
    Storage(StorageError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Invalid steps per turn (must be > 0)
    InvalidStepsPerTurn(u16),
    /// Invalid feed rate window (min must be > 0 and < max)
    InvalidFeedWindow {
        /// Minimum feed rate in steps/sec
        min: u32,
        /// Maximum feed rate in steps/sec
        max: u32,
    },
    /// Invalid arc chord length (must be > 0)
    InvalidChordLength(f32),
    /// Invalid pen servo angle (must be <= 180)
    InvalidPenAngle(u8),
    /// Invalid timer clock frequency (must be > 0)
    InvalidClockFrequency(u32),
    /// Invalid timer reload ceiling (must be > 0)
    InvalidMaxReload(u32),
    /// Invalid spool diameter (must be > 0)
    InvalidSpoolDiameter(f32),
    /// Invalid auxiliary axis scale (must be > 0)
    InvalidAxisScale(f32),
    /// Invalid homing seek rate (must be > 0)
    InvalidSeekRate(u32),
    /// Invalid homing seek travel (must be > 0)
    InvalidSeekTravel(f32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motion planning and queueing errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Segment buffer is at capacity; the producer must retry later
    BufferFull,
    /// Arc with zero radius or zero sweep; no segments were queued
    DegenerateArc,
    /// Homing requested on a machine configured without limit switches
    HomingUnavailable,
}

/// Calibration storage errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The underlying persistent medium failed to read or write
    Medium,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidStepsPerTurn(v) => {
                write!(f, "Invalid steps per turn: {}. Must be > 0", v)
            }
            ConfigError::InvalidFeedWindow { min, max } => {
                write!(f, "Invalid feed window: min ({}) must be > 0 and < max ({})", min, max)
            }
            ConfigError::InvalidChordLength(v) => {
                write!(f, "Invalid arc chord length: {}. Must be > 0", v)
            }
            ConfigError::InvalidPenAngle(v) => {
                write!(f, "Invalid pen angle: {}. Must be <= 180", v)
            }
            ConfigError::InvalidClockFrequency(v) => {
                write!(f, "Invalid timer clock frequency: {}. Must be > 0", v)
            }
            ConfigError::InvalidMaxReload(v) => {
                write!(f, "Invalid timer reload ceiling: {}. Must be > 0", v)
            }
            ConfigError::InvalidSpoolDiameter(v) => {
                write!(f, "Invalid spool diameter: {}. Must be > 0", v)
            }
            ConfigError::InvalidAxisScale(v) => {
                write!(f, "Invalid axis scale: {}. Must be > 0", v)
            }
            ConfigError::InvalidSeekRate(v) => {
                write!(f, "Invalid homing seek rate: {}. Must be > 0", v)
            }
            ConfigError::InvalidSeekTravel(v) => {
                write!(f, "Invalid homing seek travel: {}. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::BufferFull => write!(f, "Segment buffer full"),
            MotionError::DegenerateArc => write!(f, "Degenerate arc (zero radius or sweep)"),
            MotionError::HomingUnavailable => {
                write!(f, "Homing unavailable: no limit switches configured")
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Medium => write!(f, "Persistent storage medium access failed"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}
