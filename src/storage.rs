//! Persisted machine calibration.
//!
//! The calibration record lives at fixed byte offsets in a small persistent
//! medium (EEPROM or emulated flash). A version byte at offset zero guards
//! the format: readers that find an unexpected version fall back to defaults
//! instead of trusting stale bytes, and writers store the version byte
//! *last* so a torn write is detected on the next boot.

use crate::config::units::Millimeters;
use crate::error::{Error, Result, StorageError};

/// Current record format version.
///
/// Bump this whenever a field is added or the layout changes.
pub const RECORD_VERSION: u8 = 4;

/// Byte offset of the format version.
pub const ADDR_VERSION: usize = 0;
/// Byte offset of the machine UUID (u32, little-endian).
pub const ADDR_UUID: usize = ADDR_VERSION + 1;
/// Byte offset of the left spool diameter (f32, little-endian).
pub const ADDR_SPOOL_DIA_LEFT: usize = ADDR_UUID + 4;
/// Byte offset of the right spool diameter (f32, little-endian).
pub const ADDR_SPOOL_DIA_RIGHT: usize = ADDR_SPOOL_DIA_LEFT + 4;
/// Total record length in bytes.
pub const RECORD_LEN: usize = ADDR_SPOOL_DIA_RIGHT + 4;

/// Byte-addressable persistent medium.
pub trait NvStorage {
    /// Medium-specific error type.
    type Error;

    /// Read `buf.len()` bytes starting at `offset`.
    fn read_bytes(&mut self, offset: usize, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Write `data` starting at `offset`.
    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> core::result::Result<(), Self::Error>;
}

/// Where a loaded calibration record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationSource {
    /// A valid stored record was found.
    Stored,
    /// The stored version did not match; defaults were applied.
    Defaults,
}

/// Persisted machine calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRecord {
    /// Unique machine identifier.
    pub uuid: u32,
    /// Spool diameters in millimeters, left then right.
    pub spool_diameter: [Millimeters; 2],
}

impl CalibrationRecord {
    /// Build the default record for a machine with the given spool diameter.
    pub fn defaults(spool_diameter_mm: f32) -> Self {
        Self {
            uuid: 0,
            spool_diameter: [Millimeters(spool_diameter_mm); 2],
        }
    }
}

/// Versioned calibration store over a persistent medium.
pub struct CalibrationStore<S: NvStorage> {
    storage: S,
    defaults: CalibrationRecord,
}

impl<S: NvStorage> CalibrationStore<S> {
    /// Create a store with the defaults to apply when no valid record
    /// exists.
    pub fn new(storage: S, defaults: CalibrationRecord) -> Self {
        Self { storage, defaults }
    }

    /// Load the calibration record.
    ///
    /// A version mismatch (including a never-written medium) is not an
    /// error: the defaults are returned with
    /// [`CalibrationSource::Defaults`] so the caller can report it.
    ///
    /// # Errors
    ///
    /// Only a failing medium produces an error.
    pub fn load(&mut self) -> Result<(CalibrationRecord, CalibrationSource)> {
        let mut version = [0u8; 1];
        self.storage
            .read_bytes(ADDR_VERSION, &mut version)
            .map_err(|_| Error::Storage(StorageError::Medium))?;

        if version[0] != RECORD_VERSION {
            return Ok((self.defaults, CalibrationSource::Defaults));
        }

        let mut buf = [0u8; 4];

        self.storage
            .read_bytes(ADDR_UUID, &mut buf)
            .map_err(|_| Error::Storage(StorageError::Medium))?;
        let uuid = u32::from_le_bytes(buf);

        self.storage
            .read_bytes(ADDR_SPOOL_DIA_LEFT, &mut buf)
            .map_err(|_| Error::Storage(StorageError::Medium))?;
        let left = f32::from_le_bytes(buf);

        self.storage
            .read_bytes(ADDR_SPOOL_DIA_RIGHT, &mut buf)
            .map_err(|_| Error::Storage(StorageError::Medium))?;
        let right = f32::from_le_bytes(buf);

        Ok((
            CalibrationRecord {
                uuid,
                spool_diameter: [Millimeters(left), Millimeters(right)],
            },
            CalibrationSource::Stored,
        ))
    }

    /// Persist a calibration record.
    ///
    /// Fields are written at their fixed offsets first and the version byte
    /// last, so a power loss mid-write leaves a record that the next
    /// [`load`](Self::load) rejects in favor of defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium fails.
    pub fn save(&mut self, record: &CalibrationRecord) -> Result<()> {
        self.storage
            .write_bytes(ADDR_UUID, &record.uuid.to_le_bytes())
            .map_err(|_| Error::Storage(StorageError::Medium))?;
        self.storage
            .write_bytes(ADDR_SPOOL_DIA_LEFT, &record.spool_diameter[0].0.to_le_bytes())
            .map_err(|_| Error::Storage(StorageError::Medium))?;
        self.storage
            .write_bytes(ADDR_SPOOL_DIA_RIGHT, &record.spool_diameter[1].0.to_le_bytes())
            .map_err(|_| Error::Storage(StorageError::Medium))?;

        // Version last: the record only becomes valid once it is complete.
        self.storage
            .write_bytes(ADDR_VERSION, &[RECORD_VERSION])
            .map_err(|_| Error::Storage(StorageError::Medium))?;

        Ok(())
    }

    /// Access the underlying medium.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

/// In-memory medium for tests and host-side simulation.
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> MemoryStorage<N> {
    /// Create a blank (all zeroes) medium, as an erased EEPROM would read.
    pub const fn new() -> Self {
        Self { bytes: [0; N] }
    }

    /// Raw contents, for layout assertions.
    pub fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Out-of-bounds access marker for [`MemoryStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds;

impl<const N: usize> NvStorage for MemoryStorage<N> {
    type Error = OutOfBounds;

    fn read_bytes(&mut self, offset: usize, buf: &mut [u8]) -> core::result::Result<(), OutOfBounds> {
        let end = offset.checked_add(buf.len()).ok_or(OutOfBounds)?;
        if end > N {
            return Err(OutOfBounds);
        }
        buf.copy_from_slice(&self.bytes[offset..end]);
        Ok(())
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> core::result::Result<(), OutOfBounds> {
        let end = offset.checked_add(data.len()).ok_or(OutOfBounds)?;
        if end > N {
            return Err(OutOfBounds);
        }
        self.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }
}
