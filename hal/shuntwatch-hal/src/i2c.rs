//! I2C bus abstractions
//!
//! Provides traits for I2C master operations that can be implemented
//! by chip-specific HALs, plus an adapter for any `embedded-hal` 1.0
//! blocking I2C implementation.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices. Reads report how many bytes the device actually
/// delivered so callers can reject truncated responses.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// Returns the number of bytes received into `buf`.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    /// Returns the number of bytes received into `read_buf`.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<usize, Self::Error>;
}

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error (misplaced START/STOP)
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received on the address byte
    AddressNack,
    /// NACK received on a data byte
    DataNack,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

impl From<ErrorKind> for I2cBusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Bus => I2cBusError::Bus,
            ErrorKind::ArbitrationLoss => I2cBusError::ArbitrationLost,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => I2cBusError::AddressNack,
            ErrorKind::NoAcknowledge(_) => I2cBusError::DataNack,
            ErrorKind::Overrun => I2cBusError::Overrun,
            _ => I2cBusError::Other,
        }
    }
}

impl core::fmt::Display for I2cBusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            I2cBusError::Bus => write!(f, "bus error"),
            I2cBusError::ArbitrationLost => write!(f, "arbitration lost"),
            I2cBusError::AddressNack => write!(f, "address not acknowledged"),
            I2cBusError::DataNack => write!(f, "data not acknowledged"),
            I2cBusError::Overrun => write!(f, "overrun"),
            I2cBusError::Other => write!(f, "i2c error"),
        }
    }
}

/// [`I2cBus`] over any blocking `embedded-hal` I2C master
///
/// `embedded-hal` transfers either fill the whole buffer or fail, so a
/// successful read always reports `buf.len()` bytes.
pub struct EmbeddedHalBus<T> {
    inner: T,
}

impl<T: I2c> EmbeddedHalBus<T> {
    /// Wrap an `embedded-hal` I2C bus
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Release the wrapped bus
    pub fn release(self) -> T {
        self.inner
    }
}

impl<T: I2c> I2cBus for EmbeddedHalBus<T> {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.inner
            .write(address, data)
            .map_err(|e| I2cBusError::from(e.kind()))
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.inner
            .read(address, buf)
            .map_err(|e| I2cBusError::from(e.kind()))?;
        Ok(buf.len())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<usize, Self::Error> {
        self.inner
            .write_read(address, write_data, read_buf)
            .map_err(|e| I2cBusError::from(e.kind()))?;
        Ok(read_buf.len())
    }
}
