//! Reflow control task
//!
//! Owns the control engine. Every period it applies pending requests,
//! samples the thermocouples under the bus lock, runs one control tick and
//! publishes the snapshot. Faults are logged and the loop keeps ticking so
//! temperature monitoring never stops.
//!
//! The task also feeds the watchdog. A hung tick or a panic (which aborts
//! without unwinding on target) resets the chip, and the reset releases
//! the heater pins.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_rp::watchdog::Watchdog;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Ticker};

use reflow_core::control::{ControlEvent, ControlRequest, ThermalControlEngine};
use reflow_core::profile::ProfileLibrary;
use reflow_core::sync::BusLock;
use reflow_drivers::output::{Buzzer, PinSwitch, PwmOutput};
use reflow_drivers::sensor::ThermocoupleBank;

use crate::channels::{CONTROL_REQUEST, ERRORS, STATUS};
use crate::storage::EmbeddedStorage;

pub type HeaterPwm = PwmOutput<embassy_rp::pwm::PwmOutput<'static>>;
pub type OvenLight = PinSwitch<Output<'static>>;
pub type OvenBuzzer = Buzzer<'static, CriticalSectionRawMutex>;

pub type OvenEngine = ThermalControlEngine<
    'static,
    CriticalSectionRawMutex,
    HeaterPwm,
    HeaterPwm,
    HeaterPwm,
    OvenLight,
    OvenBuzzer,
>;

pub type SensorBank = ThermocoupleBank<Spi<'static, SPI0, Blocking>, Output<'static>, 4>;
pub type SensorBus = BusLock<CriticalSectionRawMutex, SensorBank>;

pub type OvenLibrary = ProfileLibrary<'static, EmbeddedStorage, CriticalSectionRawMutex>;

/// Missed control periods before the watchdog resets the chip
const WATCHDOG_PERIODS: u64 = 5;

#[embassy_executor::task]
pub async fn control_task(
    mut engine: OvenEngine,
    mut library: OvenLibrary,
    bus: &'static SensorBus,
    mut watchdog: Watchdog,
) {
    info!("Control task started");

    match library.load_default() {
        Ok(profile) => {
            info!("Default profile: {}", profile.name());
            engine.set_profile(profile);
        }
        Err(e) => warn!("No default profile: {}", e),
    }

    let period = engine.config().control_period_ms;
    let mut ticker = Ticker::every(Duration::from_millis(period as u64));
    let start = Instant::now();
    watchdog.start(Duration::from_millis(period as u64 * WATCHDOG_PERIODS));

    loop {
        while let Ok(request) = CONTROL_REQUEST.try_receive() {
            handle_request(&mut engine, &mut library, request);
        }

        let now_ms = start.elapsed().as_millis() as u32;
        if let Err(e) = engine.sample_and_tick(bus, now_ms) {
            error!("Control tick failed: {}", e);
        }

        while let Some(event) = engine.next_event() {
            log_event(&event);
        }
        STATUS.publish(engine.snapshot());

        watchdog.feed();
        ticker.next().await;
    }
}

fn handle_request(engine: &mut OvenEngine, library: &mut OvenLibrary, request: ControlRequest) {
    debug!("Control request: {:?}", request);
    let was_reflowing = engine.is_reflowing();
    if let Some(index) = engine.handle_request(request) {
        load_profile(engine, library, index as usize);
    }
    if request == ControlRequest::Start && !was_reflowing && !engine.is_reflowing() {
        warn!("Reflow not started");
    }
}

fn load_profile(engine: &mut OvenEngine, library: &mut OvenLibrary, index: usize) {
    if engine.is_reflowing() {
        ERRORS.set("Stop reflow before loading", None);
        return;
    }

    let Ok(files) = library.list() else {
        return;
    };
    let Some(path) = files.get(index) else {
        warn!("No profile file {} of {}", index, files.len());
        return;
    };

    if let Ok(profile) = library.load(path) {
        info!("Loaded profile {} from {}", profile.name(), path.as_str());
        engine.set_profile(profile);
    }
}

fn log_event(event: &ControlEvent) {
    match event {
        ControlEvent::ReflowStarted => info!("Reflow started"),
        ControlEvent::SetpointChanged {
            setpoint_c,
            soak_s,
            overshoot_steps,
        } => info!(
            "Setpoint {}°C, soak {}s, {} overshoot steps",
            setpoint_c, soak_s, overshoot_steps
        ),
        ControlEvent::OvershootStep {
            index,
            top_duty,
            bottom_duty,
        } => debug!(
            "Overshoot step {}: top {}%, bottom {}%",
            index, top_duty, bottom_duty
        ),
        ControlEvent::SoakingStarted { setpoint_c } => info!("Soaking at {}°C", setpoint_c),
        ControlEvent::SoakingEnded => info!("Soak time elapsed"),
        ControlEvent::Finished | ControlEvent::Interrupted => {
            if let Some(message) = event.shutdown_message() {
                info!("{}", message);
            }
        }
        ControlEvent::Aborted(e) => error!("Reflow aborted: {}", e),
    }
}
