//! Power monitor sampling task
//!
//! Owns the I2C bus and every configured INA226. Sleeps until the earliest
//! deadline returned by the drivers, then samples each monitor that is due.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Instant, Timer};
use heapless::Vec;

use shuntwatch_core::config::MAX_MONITORS;
use shuntwatch_core::traits::{PowerMonitor, SessionClock};
use shuntwatch_drivers::power::{DriverState, Ina226};
use shuntwatch_hal::EmbeddedHalBus;

/// I2C bus shared by all monitors
pub type MonitorBus = EmbeddedHalBus<I2c<'static, I2C0, Blocking>>;

/// Power monitor task
#[embassy_executor::task]
pub async fn power_monitor_task(mut bus: MonitorBus, mut monitors: Vec<Ina226, MAX_MONITORS>) {
    info!("Power monitor task started ({} monitors)", monitors.len());

    let start_ms = Instant::now().as_millis();
    let clock = SessionClock::starting_at(start_ms);

    // First cycle for every monitor is due immediately
    let mut deadlines: Vec<u64, MAX_MONITORS> = Vec::new();
    for monitor in monitors.iter_mut() {
        init_monitor(monitor, &mut bus);
        let _ = deadlines.push(start_ms);
    }

    loop {
        let Some(next_ms) = deadlines.iter().min().copied() else {
            info!("No monitors configured, sampling stopped");
            return;
        };

        Timer::at(Instant::from_millis(next_ms)).await;
        let now_ms = Instant::now().as_millis();

        for (monitor, deadline) in monitors.iter_mut().zip(deadlines.iter_mut()) {
            if *deadline > now_ms {
                continue;
            }

            // Devices that were absent at boot get another chance each cycle
            if monitor.state() == DriverState::Uninitialized {
                init_monitor(monitor, &mut bus);
            }

            *deadline = monitor.sample(&mut bus, now_ms, &clock);
        }
    }
}

fn init_monitor(monitor: &mut Ina226, bus: &mut MonitorBus) {
    if let Err(e) = monitor.initialize(bus) {
        error!(
            "{}: initialization failed at {=u8:#x}: {}",
            monitor.name(),
            monitor.address(),
            e.fault()
        );
    }
}
