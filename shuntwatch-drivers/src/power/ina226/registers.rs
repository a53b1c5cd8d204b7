//! INA226 register protocol
//!
//! Every register is 16 bits wide and transferred big-endian. A write is a
//! single 3-byte bus write (pointer, high byte, low byte). A read sets the
//! register pointer and reads two bytes back in one repeated-start
//! transaction.

use shuntwatch_hal::I2cBus;

/// INA226 Register addresses
pub mod reg {
    /// Configuration (averaging, conversion times, mode)
    pub const CONFIG: u8 = 0x00;
    /// Shunt voltage, signed, 2.5 µV/bit
    pub const SHUNT_VOLTAGE: u8 = 0x01;
    /// Bus voltage, unsigned, 1.25 mV/bit
    pub const BUS_VOLTAGE: u8 = 0x02;
    /// Power, unsigned, power LSB/bit
    pub const POWER: u8 = 0x03;
    /// Current, signed, current LSB/bit
    pub const CURRENT: u8 = 0x04;
    /// Calibration
    pub const CALIBRATION: u8 = 0x05;
}

/// Shunt voltage register scale in volts per bit
pub const SHUNT_VOLTAGE_LSB: f32 = 0.000_002_5;

/// Bus voltage register scale in volts per bit
pub const BUS_VOLTAGE_LSB: f32 = 0.001_25;

/// Reinterpret a register word as a two's complement value
pub const fn to_signed(word: u16) -> i16 {
    word as i16
}

/// Number of samples averaged per conversion (CONFIG bits 11..9)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Averaging {
    X1 = 0b000,
    X4 = 0b001,
    X16 = 0b010,
    X64 = 0b011,
    X128 = 0b100,
    X256 = 0b101,
    X512 = 0b110,
    X1024 = 0b111,
}

/// ADC conversion time (CONFIG bits 8..6 for bus, 5..3 for shunt)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ConversionTime {
    Us140 = 0b000,
    Us204 = 0b001,
    Us332 = 0b010,
    Us588 = 0b011,
    Us1100 = 0b100,
    Us2116 = 0b101,
    Us4156 = 0b110,
    Us8244 = 0b111,
}

/// Operating mode (CONFIG bits 2..0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperatingMode {
    PowerDown = 0b000,
    ShuntTriggered = 0b001,
    BusTriggered = 0b010,
    ShuntBusTriggered = 0b011,
    ShuntContinuous = 0b101,
    BusContinuous = 0b110,
    ShuntBusContinuous = 0b111,
}

/// CONFIG register contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigWord {
    pub averaging: Averaging,
    pub bus_conversion: ConversionTime,
    pub shunt_conversion: ConversionTime,
    pub mode: OperatingMode,
}

impl ConfigWord {
    /// 4-sample averaging, 1.1 ms conversions, continuous shunt and bus
    pub const OPERATING: Self = Self {
        averaging: Averaging::X4,
        bus_conversion: ConversionTime::Us1100,
        shunt_conversion: ConversionTime::Us1100,
        mode: OperatingMode::ShuntBusContinuous,
    };

    /// Pack into the 16-bit register value
    pub const fn bits(&self) -> u16 {
        ((self.averaging as u16) << 9)
            | ((self.bus_conversion as u16) << 6)
            | ((self.shunt_conversion as u16) << 3)
            | (self.mode as u16)
    }
}

/// Value written to CONFIG during initialization
pub const OPERATING_CONFIG: u16 = ConfigWord::OPERATING.bits();

/// Register transfer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError<E> {
    /// The bus reported an error
    Bus { register: u8, error: E },
    /// The device returned fewer than 2 bytes
    ShortRead { register: u8, received: usize },
}

impl<E> RegisterError<E> {
    /// Register the failed transfer addressed
    pub fn register(&self) -> u8 {
        match self {
            RegisterError::Bus { register, .. } | RegisterError::ShortRead { register, .. } => {
                *register
            }
        }
    }

    /// Drop the bus error payload
    pub fn fault(&self) -> RegisterFault {
        match *self {
            RegisterError::Bus { register, .. } => RegisterFault::Bus { register },
            RegisterError::ShortRead { register, received } => {
                RegisterFault::ShortRead { register, received }
            }
        }
    }
}

impl<E: core::fmt::Display> core::fmt::Display for RegisterError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegisterError::Bus { register, error } => {
                write!(f, "register {:#04x}: {}", register, error)
            }
            RegisterError::ShortRead { register, received } => write!(
                f,
                "register {:#04x}: received {} of 2 bytes",
                register, received
            ),
        }
    }
}

/// [`RegisterError`] without the bus error, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterFault {
    /// The bus reported an error
    Bus { register: u8 },
    /// The device returned fewer than 2 bytes
    ShortRead { register: u8, received: usize },
}

/// Register access for one device on a borrowed bus
pub struct Registers<'a, B> {
    bus: &'a mut B,
    address: u8,
}

impl<'a, B: I2cBus> Registers<'a, B> {
    /// Address the device at `address` over `bus`
    pub fn new(bus: &'a mut B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Write a 16-bit register
    pub fn write_register(&mut self, register: u8, value: u16) -> Result<(), RegisterError<B::Error>> {
        let [high, low] = value.to_be_bytes();
        self.bus
            .write(self.address, &[register, high, low])
            .map_err(|error| RegisterError::Bus { register, error })
    }

    /// Read a 16-bit register
    pub fn read_register(&mut self, register: u8) -> Result<u16, RegisterError<B::Error>> {
        let mut buf = [0u8; 2];
        let received = self
            .bus
            .write_read(self.address, &[register], &mut buf)
            .map_err(|error| RegisterError::Bus { register, error })?;

        if received < buf.len() {
            return Err(RegisterError::ShortRead { register, received });
        }

        Ok(u16::from_be_bytes(buf))
    }
}
