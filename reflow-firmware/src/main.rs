//! Reflow - SMD Reflow Oven Firmware
//!
//! Main firmware binary for RP2040-based reflow oven controllers.
//! Drives top and bottom heaters from MAX31855 thermocouple readings,
//! following multi-stage reflow profiles selected on a rotary knob.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_rp::watchdog::Watchdog;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use reflow_core::control::{Actuators, ThermalControlEngine};
use reflow_core::profile::ProfileLibrary;
use reflow_core::sync::BusLock;
use reflow_drivers::output::{Buzzer, PinSwitch, PwmOutput};
use reflow_drivers::sensor::ThermocoupleBank;

use crate::channels::{BUZZER, ERRORS, ROTARY};
use crate::storage::{EmbeddedStorage, PROFILE_FILES};
use crate::tasks::{SensorBank, SensorBus};

mod channels;
mod config;
mod storage;
mod tasks;

/// MAX31855 clock; the part allows up to 5 MHz
const THERMOCOUPLE_SPI_HZ: u32 = 4_000_000;

// Thermocouple bus, shared by the control loop and anything else on SPI0
static SENSOR_BUS: StaticCell<SensorBus> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Reflow firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();
    ROTARY.set_range(config.rotary.min, config.rotary.max, config.rotary.mode);

    // Heaters: slow PWM for the SSRs (125 MHz / 255 / 65536 ≈ 7.5 Hz)
    let mut heater_pwm = PwmConfig::default();
    heater_pwm.divider = 255u8.into();
    heater_pwm.top = u16::MAX;
    heater_pwm.compare_a = 0;

    // Fan: 500 Hz
    let mut fan_pwm = PwmConfig::default();
    fan_pwm.divider = 250u8.into();
    fan_pwm.top = 999;
    fan_pwm.compare_a = 0;

    // Pin assignments are board-specific
    let (top, _) = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, heater_pwm.clone()).split();
    let (bottom, _) = Pwm::new_output_a(p.PWM_SLICE2, p.PIN_4, heater_pwm).split();
    let (fan, _) = Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, fan_pwm).split();
    let buzzer_pwm = Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, PwmConfig::default());
    let light = Output::new(p.PIN_10, Level::Low);
    info!("Outputs initialized");

    let mut spi_config = SpiConfig::default();
    spi_config.frequency = THERMOCOUPLE_SPI_HZ;
    let spi = Spi::new_blocking_rxonly(p.SPI0, p.PIN_18, p.PIN_16, spi_config);

    let mut bank: SensorBank = ThermocoupleBank::new(spi);
    for (name, cs) in [
        ("tc1", Output::new(p.PIN_17, Level::High)),
        ("tc2", Output::new(p.PIN_20, Level::High)),
        ("tc3", Output::new(p.PIN_21, Level::High)),
    ] {
        if let Err(e) = bank.add_channel(name, cs) {
            error!("Thermocouple {} not added: {:?}", name, e);
        }
    }
    let bus: &'static SensorBus = SENSOR_BUS.init(BusLock::new(bank));
    info!("Thermocouples initialized");

    let actuators = Actuators {
        heater_top: PwmOutput::new(unwrap!(top)),
        heater_bottom: PwmOutput::new(unwrap!(bottom)),
        fan: PwmOutput::new(unwrap!(fan)),
        light: Some(PinSwitch::new_active_high(light)),
        buzzer: Some(Buzzer::new(&BUZZER)),
    };

    let profile_count = PROFILE_FILES
        .iter()
        .filter(|(path, _)| path.ends_with(config.storage.extension.as_str()))
        .count();
    let library = ProfileLibrary::new(EmbeddedStorage, config.storage.clone(), &ERRORS);

    let status_period = config.status_period_ms;
    let menu_period = config.menu_period_ms;
    let engine = ThermalControlEngine::new(config, actuators, &ERRORS);
    info!("Control engine ready, heaters off");

    let watchdog = Watchdog::new(p.WATCHDOG);

    let clk = Input::new(p.PIN_12, Pull::Up);
    let dt = Input::new(p.PIN_13, Pull::Up);
    let button = Input::new(p.PIN_14, Pull::Up);

    // Spawn tasks
    spawner
        .spawn(tasks::control_task(engine, library, bus, watchdog))
        .unwrap();
    spawner.spawn(tasks::status_task(status_period)).unwrap();
    spawner
        .spawn(tasks::menu_task(menu_period, profile_count))
        .unwrap();
    spawner.spawn(tasks::encoder_task(clk, dt)).unwrap();
    spawner.spawn(tasks::button_task(button)).unwrap();
    spawner.spawn(tasks::buzzer_task(buzzer_pwm)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
