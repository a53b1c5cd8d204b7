//! INA226 power monitor (I2C)
//!
//! The INA226 measures the voltage across a shunt resistor and the bus
//! voltage, and computes current and power internally from a calibration
//! value. This driver polls it periodically:
//!
//! 1. [`Ina226::initialize`] writes CONFIG then CALIBRATION once.
//! 2. The scheduler calls [`Ina226::sample`] with the current monotonic
//!    time. The driver reads shunt voltage, bus voltage, current and power,
//!    replaces its snapshot, reports it, and returns the next deadline.
//!
//! The driver never owns the bus. Several devices at different addresses
//! can share one [`I2cBus`] by passing it to each call in turn.

pub mod registers;

#[cfg(test)]
mod mock;

use shuntwatch_core::config::Ina226Config;
use shuntwatch_core::measurement::Measurement;
use shuntwatch_core::traits::{PowerMonitor, StatusCallback, TimeBase};
use shuntwatch_hal::I2cBus;

pub use registers::{
    reg, to_signed, ConfigWord, RegisterError, RegisterFault, Registers, BUS_VOLTAGE_LSB,
    OPERATING_CONFIG, SHUNT_VOLTAGE_LSB,
};

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverState {
    /// Device registers not yet programmed
    Uninitialized,
    /// CONFIG and CALIBRATION written, sampling enabled
    Ready,
}

/// INA226 sampling controller
pub struct Ina226 {
    config: Ina226Config,
    state: DriverState,
    snapshot: Measurement,
    valid: bool,
    callback: Option<StatusCallback>,
}

impl Ina226 {
    /// Create a driver for a validated configuration
    pub fn new(config: Ina226Config) -> Self {
        Self {
            config,
            state: DriverState::Uninitialized,
            snapshot: Measurement::ZERO,
            valid: false,
            callback: None,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Ina226Config {
        &self.config
    }

    /// 7-bit I2C address
    pub fn address(&self) -> u8 {
        self.config.i2c_address()
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Set the reporting callback, replacing any previous one
    pub fn register_callback(&mut self, callback: StatusCallback) {
        self.callback = Some(callback);
    }

    /// Remove the reporting callback
    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    /// Program CONFIG and CALIBRATION
    ///
    /// On failure the driver stays (or becomes) uninitialized.
    pub fn initialize<B: I2cBus>(&mut self, bus: &mut B) -> Result<(), RegisterError<B::Error>> {
        self.state = DriverState::Uninitialized;

        let mut regs = Registers::new(bus, self.config.i2c_address());
        regs.write_register(reg::CONFIG, OPERATING_CONFIG)?;
        regs.write_register(reg::CALIBRATION, self.config.calibration())?;

        self.state = DriverState::Ready;
        info!(
            "{=str}: initialized at {=u8:#x}, calibration {=u16}",
            self.config.name(),
            self.config.i2c_address(),
            self.config.calibration()
        );
        Ok(())
    }

    /// Read all four measurement registers
    ///
    /// Leaves the retained snapshot untouched.
    pub fn read<B: I2cBus>(&self, bus: &mut B) -> Result<Measurement, RegisterError<B::Error>> {
        let mut regs = Registers::new(bus, self.config.i2c_address());

        let shunt = regs.read_register(reg::SHUNT_VOLTAGE)?;
        let bus_voltage = regs.read_register(reg::BUS_VOLTAGE)?;
        let current = regs.read_register(reg::CURRENT)?;
        let power = regs.read_register(reg::POWER)?;

        Ok(Measurement {
            shunt_voltage: to_signed(shunt) as f32 * SHUNT_VOLTAGE_LSB,
            bus_voltage: bus_voltage as f32 * BUS_VOLTAGE_LSB,
            current: to_signed(current) as f32 * self.config.current_lsb(),
            power: power as f32 * self.config.power_lsb(),
        })
    }

    /// Run one sampling cycle
    ///
    /// Failures are contained: they are logged, the snapshot is zeroed and
    /// the cycle still reports. Returns the monotonic time (ms) at which the
    /// next cycle is due.
    pub fn sample<B: I2cBus, T: TimeBase>(&mut self, bus: &mut B, now_ms: u64, time_base: &T) -> u64 {
        match self.state {
            DriverState::Uninitialized => {
                warn!("{=str}: sampled before initialization", self.config.name());
                self.invalidate();
            }
            DriverState::Ready => match self.read(bus) {
                Ok(measurement) => {
                    self.snapshot = measurement;
                    self.valid = true;
                    info!(
                        "{=str}: shunt_voltage={=f32} bus_voltage={=f32} current={=f32} power={=f32}",
                        self.config.name(),
                        measurement.shunt_voltage,
                        measurement.bus_voltage,
                        measurement.current,
                        measurement.power
                    );
                }
                Err(e) => {
                    let fault = e.fault();
                    error!("{=str}: sample failed: {}", self.config.name(), fault);
                    self.invalidate();
                }
            },
        }

        if let Some(callback) = self.callback {
            callback(time_base.print_time_ms(now_ms), &self.snapshot);
        }

        now_ms.saturating_add(self.config.report_interval_ms())
    }

    /// Shunt voltage from the last cycle (V)
    pub fn shunt_voltage(&self) -> f32 {
        self.snapshot.shunt_voltage
    }

    /// Bus voltage from the last cycle (V)
    pub fn bus_voltage(&self) -> f32 {
        self.snapshot.bus_voltage
    }

    /// Current from the last cycle (A)
    pub fn current(&self) -> f32 {
        self.snapshot.current
    }

    /// Power from the last cycle (W)
    pub fn power(&self) -> f32 {
        self.snapshot.power
    }

    fn invalidate(&mut self) {
        self.snapshot = Measurement::ZERO;
        self.valid = false;
    }
}

impl PowerMonitor for Ina226 {
    fn name(&self) -> &str {
        self.config.name()
    }

    fn snapshot(&self) -> Measurement {
        self.snapshot
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockBus, Transaction};
    use super::*;
    use core::cell::RefCell;
    use proptest::prelude::*;
    use shuntwatch_core::config::Ina226Settings;
    use shuntwatch_core::traits::SessionClock;

    const ADDR: u8 = 0x40;

    thread_local! {
        static REPORTS: RefCell<Vec<(char, u64, Measurement)>> = RefCell::new(Vec::new());
    }

    fn record_a(print_time_ms: u64, status: &Measurement) {
        REPORTS.with(|r| r.borrow_mut().push(('a', print_time_ms, *status)));
    }

    fn record_b(print_time_ms: u64, status: &Measurement) {
        REPORTS.with(|r| r.borrow_mut().push(('b', print_time_ms, *status)));
    }

    fn take_reports() -> Vec<(char, u64, Measurement)> {
        REPORTS.with(|r| r.take())
    }

    fn config(name: &str, address: u8) -> Ina226Config {
        let mut settings = Ina226Settings::named(name).unwrap();
        settings.i2c_address = address;
        settings.calibration = Some(0x0A00);
        Ina226Config::try_from(settings).unwrap()
    }

    fn ready_driver(bus: &mut MockBus) -> Ina226 {
        let mut driver = Ina226::new(config("battery", ADDR));
        driver.initialize(bus).unwrap();
        bus.clear_transactions();
        driver
    }

    fn load_scenario(bus: &mut MockBus, address: u8) {
        bus.set_register(address, reg::SHUNT_VOLTAGE, 0x0064);
        bus.set_register(address, reg::BUS_VOLTAGE, 0x0BB8);
        bus.set_register(address, reg::CURRENT, 0xFFFF);
        bus.set_register(address, reg::POWER, 0x0032);
    }

    fn assert_close(actual: f32, expected: f32) {
        let tolerance = expected.abs() * 1e-5;
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} is not close to {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_new_driver() {
        let driver = Ina226::new(config("battery", ADDR));
        assert_eq!(driver.state(), DriverState::Uninitialized);
        assert_eq!(driver.snapshot(), Measurement::ZERO);
        assert!(!driver.is_valid());
        assert_eq!(driver.name(), "battery");
        assert_eq!(driver.address(), ADDR);
        assert_close(driver.config().power_lsb(), 0.025);
    }

    #[test]
    fn test_initialize_writes_config_then_calibration() {
        let mut bus = MockBus::with_device(ADDR);
        let mut driver = Ina226::new(config("battery", ADDR));

        driver.initialize(&mut bus).unwrap();

        assert_eq!(driver.state(), DriverState::Ready);
        assert_eq!(
            bus.transactions(),
            &[
                Transaction::Write {
                    address: ADDR,
                    bytes: vec![reg::CONFIG, 0x03, 0x27],
                },
                Transaction::Write {
                    address: ADDR,
                    bytes: vec![reg::CALIBRATION, 0x0A, 0x00],
                },
            ]
        );
        assert_eq!(bus.register(ADDR, reg::CALIBRATION), Some(0x0A00));
    }

    #[test]
    fn test_initialize_failure_propagates() {
        let mut bus = MockBus::with_device(ADDR);
        bus.fail_on(reg::CALIBRATION);
        let mut driver = Ina226::new(config("battery", ADDR));

        let err = driver.initialize(&mut bus).unwrap_err();
        assert_eq!(err.register(), reg::CALIBRATION);
        assert_eq!(driver.state(), DriverState::Uninitialized);

        bus.clear_faults();
        driver.initialize(&mut bus).unwrap();
        assert_eq!(driver.state(), DriverState::Ready);
    }

    #[test]
    fn test_sample_converts_registers() {
        let mut bus = MockBus::with_device(ADDR);
        let mut driver = ready_driver(&mut bus);
        load_scenario(&mut bus, ADDR);

        driver.sample(&mut bus, 0, &SessionClock::default());

        assert!(driver.is_valid());
        assert_close(driver.shunt_voltage(), 0.00025);
        assert_close(driver.bus_voltage(), 3.75);
        assert_close(driver.current(), -0.001);
        assert_close(driver.power(), 1.25);
        assert_eq!(driver.snapshot().get("bus_voltage"), Some(driver.bus_voltage()));
    }

    #[test]
    fn test_sample_read_order() {
        let mut bus = MockBus::with_device(ADDR);
        let mut driver = ready_driver(&mut bus);

        driver.sample(&mut bus, 0, &SessionClock::default());

        let order: Vec<u8> = bus
            .transactions()
            .iter()
            .map(|t| match t {
                Transaction::WriteRead { register, .. } => *register,
                Transaction::Write { .. } => panic!("unexpected write"),
            })
            .collect();
        assert_eq!(
            order,
            [reg::SHUNT_VOLTAGE, reg::BUS_VOLTAGE, reg::CURRENT, reg::POWER]
        );
    }

    #[test]
    fn test_any_failed_read_zeroes_snapshot() {
        for register in [reg::SHUNT_VOLTAGE, reg::BUS_VOLTAGE, reg::CURRENT, reg::POWER] {
            let mut bus = MockBus::with_device(ADDR);
            let mut driver = ready_driver(&mut bus);
            load_scenario(&mut bus, ADDR);
            driver.sample(&mut bus, 0, &SessionClock::default());
            assert!(!driver.snapshot().is_zero());

            bus.fail_on(register);
            driver.sample(&mut bus, 30_000, &SessionClock::default());

            assert_eq!(driver.snapshot(), Measurement::ZERO);
            assert_eq!(driver.shunt_voltage(), 0.0);
            assert_eq!(driver.bus_voltage(), 0.0);
            assert_eq!(driver.current(), 0.0);
            assert_eq!(driver.power(), 0.0);
            assert!(!driver.is_valid());
            assert_eq!(driver.state(), DriverState::Ready);
        }
    }

    #[test]
    fn test_short_read_zeroes_snapshot() {
        let mut bus = MockBus::with_device(ADDR);
        let mut driver = ready_driver(&mut bus);
        load_scenario(&mut bus, ADDR);
        bus.short_read_on(reg::POWER, 1);

        driver.sample(&mut bus, 0, &SessionClock::default());

        assert_eq!(driver.snapshot(), Measurement::ZERO);
        assert!(!driver.is_valid());
    }

    #[test]
    fn test_callback_once_per_cycle() {
        let mut bus = MockBus::with_device(ADDR);
        let mut driver = ready_driver(&mut bus);
        load_scenario(&mut bus, ADDR);
        driver.register_callback(record_a);

        driver.sample(&mut bus, 31_000, &SessionClock::starting_at(1_000));

        let reports = take_reports();
        assert_eq!(reports.len(), 1);
        let (tag, print_time_ms, status) = reports[0];
        assert_eq!(tag, 'a');
        assert_eq!(print_time_ms, 30_000);
        assert_eq!(status, driver.snapshot());
    }

    #[test]
    fn test_callback_receives_zeros_on_failure() {
        let mut bus = MockBus::with_device(ADDR);
        let mut driver = ready_driver(&mut bus);
        load_scenario(&mut bus, ADDR);
        bus.fail_on(reg::BUS_VOLTAGE);
        driver.register_callback(record_a);

        driver.sample(&mut bus, 5_000, &SessionClock::default());

        let reports = take_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].1, 5_000);
        assert!(reports[0].2.is_zero());
    }

    #[test]
    fn test_register_callback_replaces() {
        let mut bus = MockBus::with_device(ADDR);
        let mut driver = ready_driver(&mut bus);

        driver.register_callback(record_a);
        driver.register_callback(record_b);
        driver.sample(&mut bus, 0, &SessionClock::default());

        let tags: Vec<char> = take_reports().iter().map(|r| r.0).collect();
        assert_eq!(tags, ['b']);

        driver.clear_callback();
        driver.sample(&mut bus, 30_000, &SessionClock::default());
        assert!(take_reports().is_empty());
    }

    #[test]
    fn test_next_deadline() {
        let mut bus = MockBus::with_device(ADDR);
        let mut driver = ready_driver(&mut bus);

        assert_eq!(driver.sample(&mut bus, 1_000, &SessionClock::default()), 31_000);

        bus.fail_on(reg::SHUNT_VOLTAGE);
        assert_eq!(driver.sample(&mut bus, 31_000, &SessionClock::default()), 61_000);

        assert_eq!(
            driver.sample(&mut bus, u64::MAX - 10, &SessionClock::default()),
            u64::MAX
        );
    }

    #[test]
    fn test_sample_before_initialize() {
        let mut bus = MockBus::with_device(ADDR);
        load_scenario(&mut bus, ADDR);
        let mut driver = Ina226::new(config("battery", ADDR));
        driver.register_callback(record_a);

        let next = driver.sample(&mut bus, 2_000, &SessionClock::default());

        assert_eq!(next, 32_000);
        assert!(bus.transactions().is_empty());
        assert_eq!(driver.snapshot(), Measurement::ZERO);
        assert!(!driver.is_valid());
        assert_eq!(take_reports().len(), 1);
    }

    #[test]
    fn test_read_leaves_snapshot() {
        let mut bus = MockBus::with_device(ADDR);
        let driver = ready_driver(&mut bus);
        load_scenario(&mut bus, ADDR);

        let measurement = driver.read(&mut bus).unwrap();
        assert_close(measurement.bus_voltage, 3.75);
        assert_eq!(driver.snapshot(), Measurement::ZERO);
        assert!(!driver.is_valid());

        bus.fail_on(reg::CURRENT);
        assert_eq!(driver.read(&mut bus).unwrap_err().register(), reg::CURRENT);
    }

    #[test]
    fn test_shared_bus() {
        let mut bus = MockBus::with_device(0x40);
        bus.add_device(0x41);

        let mut battery = Ina226::new(config("battery", 0x40));
        let mut psu = Ina226::new(config("psu", 0x41));
        battery.initialize(&mut bus).unwrap();
        psu.initialize(&mut bus).unwrap();

        load_scenario(&mut bus, 0x41);
        battery.sample(&mut bus, 0, &SessionClock::default());
        psu.sample(&mut bus, 0, &SessionClock::default());

        assert!(battery.is_valid());
        assert!(battery.snapshot().is_zero());
        assert_close(psu.bus_voltage(), 3.75);
    }

    #[test]
    fn test_missing_device_is_contained() {
        let mut bus = MockBus::with_device(0x40);
        let mut driver = Ina226::new(config("ghost", 0x44));

        assert!(driver.initialize(&mut bus).is_err());
        assert_eq!(driver.sample(&mut bus, 0, &SessionClock::default()), 30_000);
        assert!(!driver.is_valid());
    }

    proptest! {
        #[test]
        fn sample_returns_now_plus_interval(
            now_ms in 0u64..1_000_000_000,
            report_time_s in 5u32..86_400,
            fail in any::<bool>(),
        ) {
            let mut settings = Ina226Settings::named("prop").unwrap();
            settings.report_time_s = report_time_s;
            let mut driver = Ina226::new(Ina226Config::try_from(settings).unwrap());

            let mut bus = MockBus::with_device(ADDR);
            driver.initialize(&mut bus).unwrap();
            if fail {
                bus.fail_on(reg::POWER);
            }

            let next = driver.sample(&mut bus, now_ms, &SessionClock::default());
            prop_assert_eq!(next, now_ms + report_time_s as u64 * 1000);
            prop_assert_eq!(driver.is_valid(), !fail);
        }
    }
}
