//! Recording I2C bus for driver tests

use shuntwatch_hal::I2cBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Nack,
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "nack")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Write { address: u8, bytes: Vec<u8> },
    WriteRead { address: u8, register: u8 },
}

/// Devices answer with the last word written to each register
pub struct MockBus {
    devices: Vec<(u8, [u16; 8])>,
    transactions: Vec<Transaction>,
    fail_on: Option<u8>,
    short_read_on: Option<(u8, usize)>,
}

impl MockBus {
    pub fn with_device(address: u8) -> Self {
        Self {
            devices: vec![(address, [0; 8])],
            transactions: Vec::new(),
            fail_on: None,
            short_read_on: None,
        }
    }

    pub fn add_device(&mut self, address: u8) {
        self.devices.push((address, [0; 8]));
    }

    pub fn set_register(&mut self, address: u8, register: u8, value: u16) {
        if let Some(regs) = self.device_mut(address) {
            regs[register as usize] = value;
        }
    }

    pub fn register(&self, address: u8, register: u8) -> Option<u16> {
        self.devices
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, regs)| regs[register as usize])
    }

    /// Fail every transfer that addresses `register`
    pub fn fail_on(&mut self, register: u8) {
        self.fail_on = Some(register);
    }

    /// Deliver only `received` bytes when `register` is read
    pub fn short_read_on(&mut self, register: u8, received: usize) {
        self.short_read_on = Some((register, received));
    }

    pub fn clear_faults(&mut self) {
        self.fail_on = None;
        self.short_read_on = None;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    fn device_mut(&mut self, address: u8) -> Option<&mut [u16; 8]> {
        self.devices
            .iter_mut()
            .find(|(a, _)| *a == address)
            .map(|(_, regs)| regs)
    }
}

impl I2cBus for MockBus {
    type Error = MockError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.transactions.push(Transaction::Write {
            address,
            bytes: data.to_vec(),
        });

        if self.fail_on.is_some() && self.fail_on == data.first().copied() {
            return Err(MockError::Nack);
        }

        let regs = self.device_mut(address).ok_or(MockError::Nack)?;
        if let [register, high, low] = *data {
            regs[register as usize & 0x07] = u16::from_be_bytes([high, low]);
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.device_mut(address).ok_or(MockError::Nack)?;
        buf.fill(0);
        Ok(buf.len())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<usize, Self::Error> {
        let register = write_data.first().copied().unwrap_or(0);
        self.transactions
            .push(Transaction::WriteRead { address, register });

        if self.fail_on == Some(register) {
            return Err(MockError::Nack);
        }

        let short = match self.short_read_on {
            Some((r, received)) if r == register => Some(received),
            _ => None,
        };
        let regs = self.device_mut(address).ok_or(MockError::Nack)?;
        let bytes = regs[register as usize & 0x07].to_be_bytes();

        let len = short.unwrap_or(bytes.len()).min(read_buf.len());
        read_buf[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }
}
