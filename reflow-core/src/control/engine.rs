//! Thermal control engine
//!
//! Bang-bang control of the top and bottom heaters following a reflow
//! profile. Each setpoint is approached at full power, tapered by the
//! overshoot prevention steps, then held for its soak time by switching the
//! heaters off and back on whenever the PCB cools below the setpoint.
//!
//! Safety rules:
//! - Every shutdown zeroes both heaters before touching anything else
//! - The bottom heater never switches on in the same tick as the top one
//! - Heaters are owned through [`DutyGuard`]s, so dropping the engine (or a
//!   panic unwinding through it) leaves them at 0 %. The light sits behind a
//!   [`SwitchGuard`] the same way

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::Deque;

use super::overshoot::overshoot_steps;
use super::request::ControlRequest;
use super::state::{ControlEvent, ControlPhase, HeaterDuty, ThermalState};
use crate::config::OvenConfig;
use crate::error::{ErrorChannel, FaultKind, ReflowError};
use crate::profile::{build_step_queue, ReflowProfile, StepQueue};
use crate::sync::{BusLock, DutyGuard, SwitchGuard, ThermalSnapshot};
use crate::traits::{AudibleSignal, DutyOutput, SwitchOutput, TemperatureSource};

/// Events kept between two drains; the oldest is dropped when full
pub const MAX_PENDING_EVENTS: usize = 8;

/// Outputs driven by the engine
pub struct Actuators<T, B, F, L, A> {
    pub heater_top: T,
    pub heater_bottom: B,
    /// Electronics cooling fan
    pub fan: F,
    /// Oven light, switched on when a run starts
    pub light: Option<L>,
    pub buzzer: Option<A>,
}

/// Reflow thermal control engine
///
/// Owned by the control task. Other tasks talk to it through request
/// signals (start, cancel) and read its state through a
/// [`crate::sync::StatusBoard`] fed from [`ThermalControlEngine::snapshot`].
pub struct ThermalControlEngine<'a, M, T, B, F, L, A>
where
    M: RawMutex,
    T: DutyOutput,
    B: DutyOutput,
    F: DutyOutput,
    L: SwitchOutput,
    A: AudibleSignal,
{
    config: OvenConfig,
    heater_top: DutyGuard<T>,
    heater_bottom: DutyGuard<B>,
    fan: F,
    light: Option<SwitchGuard<L>>,
    buzzer: Option<A>,
    errors: &'a ErrorChannel<M>,
    profile: Option<ReflowProfile>,
    queue: StepQueue,
    state: ThermalState,
    phase: ControlPhase,
    events: Deque<ControlEvent, MAX_PENDING_EVENTS>,
    pcb_temp_x10: Option<i16>,
}

impl<'a, M, T, B, F, L, A> ThermalControlEngine<'a, M, T, B, F, L, A>
where
    M: RawMutex,
    T: DutyOutput,
    B: DutyOutput,
    F: DutyOutput,
    L: SwitchOutput,
    A: AudibleSignal,
{
    /// Create an idle engine, forcing both heaters off
    pub fn new(
        config: OvenConfig,
        actuators: Actuators<T, B, F, L, A>,
        errors: &'a ErrorChannel<M>,
    ) -> Self {
        let mut engine = Self {
            config,
            heater_top: DutyGuard::new(actuators.heater_top),
            heater_bottom: DutyGuard::new(actuators.heater_bottom),
            fan: actuators.fan,
            light: actuators.light.map(SwitchGuard::new),
            buzzer: actuators.buzzer,
            errors,
            profile: None,
            queue: StepQueue::new(),
            state: ThermalState::new(),
            phase: ControlPhase::Idle,
            events: Deque::new(),
            pcb_temp_x10: None,
        };
        if engine.zero_heaters().is_err() {
            errors.record(ReflowError::ControlLoopFault(FaultKind::HeaterOutput));
        }
        engine
    }

    pub fn config(&self) -> &OvenConfig {
        &self.config
    }

    pub fn profile(&self) -> Option<&ReflowProfile> {
        self.profile.as_ref()
    }

    /// Replace the profile
    ///
    /// Refused while a run is in progress; returns whether it was accepted.
    pub fn set_profile(&mut self, profile: ReflowProfile) -> bool {
        if self.state.reflowing {
            return false;
        }
        self.profile = Some(profile);
        true
    }

    pub fn is_reflowing(&self) -> bool {
        self.state.reflowing
    }

    pub fn state(&self) -> &ThermalState {
        &self.state
    }

    pub fn phase(&self) -> ControlPhase {
        self.phase
    }

    /// Current heater duty readback
    pub fn heater_duty(&self) -> HeaterDuty {
        HeaterDuty {
            top: self.heater_top.duty(),
            bottom: self.heater_bottom.duty(),
        }
    }

    pub fn fan_duty(&self) -> u8 {
        self.fan.duty()
    }

    /// Check if the oven light is on; false without a light
    pub fn light_on(&self) -> bool {
        self.light.as_ref().is_some_and(|light| light.is_on())
    }

    /// Switch the oven light, returning its new state
    pub fn set_light(&mut self, on: bool) -> bool {
        if let Some(light) = self.light.as_mut() {
            let _ = light.set_on(on);
        }
        self.light_on()
    }

    /// Take the oldest pending event
    pub fn next_event(&mut self) -> Option<ControlEvent> {
        self.events.pop_front()
    }

    /// Copy of everything the status display needs
    pub fn snapshot(&self) -> ThermalSnapshot {
        let duty = self.heater_duty();
        ThermalSnapshot {
            phase: self.phase,
            reflowing: self.state.reflowing,
            setpoint_c: self.state.current_setpoint,
            soak_s: self.state.current_soaktime,
            soak_elapsed_ms: self.state.soaking_elapsed,
            top_duty: duty.top,
            bottom_duty: duty.bottom,
            fan_duty: self.fan.duty(),
            light_on: self.light_on(),
            pcb_temp_x10: self.pcb_temp_x10,
        }
    }

    /// Apply a user request
    ///
    /// Loading a profile needs storage the engine does not own, so for
    /// [`ControlRequest::LoadProfile`] the file index is handed back to the
    /// caller.
    pub fn handle_request(&mut self, request: ControlRequest) -> Option<u8> {
        match request {
            ControlRequest::Start => {
                self.start();
            }
            ControlRequest::Cancel => self.cancel(),
            ControlRequest::ToggleLight => {
                self.set_light(!self.light_on());
            }
            ControlRequest::LoadProfile(index) => return Some(index),
        }
        None
    }

    /// Start a reflow run with the current profile
    ///
    /// Does nothing if a run is already in progress. Without a usable
    /// profile the error is recorded, the heaters are forced off and the
    /// engine stays idle. Returns whether a run was started.
    pub fn start(&mut self) -> bool {
        if self.state.reflowing {
            return false;
        }

        let queue = match build_step_queue(self.profile.as_ref()) {
            Ok(queue) => queue,
            Err(error) => {
                let _ = self.zero_heaters();
                self.errors.record(error);
                return false;
            }
        };

        self.queue = queue;
        self.state = ThermalState::new();
        self.state.reflowing = true;
        if let Some(light) = self.light.as_mut() {
            // The light is cosmetic
            let _ = light.set_on(true);
        }
        self.push_event(ControlEvent::ReflowStarted);
        true
    }

    /// Cancel the current run
    ///
    /// Always safe to call. Heaters go to 0 immediately; an active run ends
    /// in the interrupted shutdown. While idle nothing else happens.
    pub fn cancel(&mut self) {
        if self.state.reflowing || self.state.has_residual() {
            self.shutdown(false, None);
        } else {
            let _ = self.zero_heaters();
        }
    }

    /// Sample the PCB thermocouple under the bus lock and run one tick
    pub fn sample_and_tick<BM, S>(
        &mut self,
        bus: &BusLock<BM, S>,
        now_ms: u32,
    ) -> Result<(), ReflowError>
    where
        BM: RawMutex,
        S: TemperatureSource,
    {
        let readings = bus.with_bus_lock(|source| source.read_temperatures());
        match readings.get(self.config.pcb_channel.as_str()) {
            Some(reading) => self.control_tick(reading.external_x10, now_ms),
            None => self.sensor_lost(),
        }
    }

    /// Run one control period
    ///
    /// `temp_x10` is the PCB temperature in 0.1°C units, `now_ms` a wrapping
    /// millisecond clock. A fault inside the reflow logic shuts the heaters
    /// off, records the error and is returned; the caller keeps ticking.
    pub fn control_tick(&mut self, temp_x10: i16, now_ms: u32) -> Result<(), ReflowError> {
        self.state.heater_duty = self.heater_duty();
        self.pcb_temp_x10 = Some(temp_x10);

        // Fan runs independently of the reflow state; a failure is not fatal
        let _ = self.fan.set_duty(self.config.fan.duty_for(temp_x10));

        if !self.state.reflowing {
            if self.state.has_residual() {
                self.shutdown(false, None);
            }
            return Ok(());
        }

        self.reflow_step(temp_x10 as i32, now_ms)
            .map_err(|fault| self.fault(fault))
    }

    fn reflow_step(&mut self, temp_x10: i32, now_ms: u32) -> Result<(), FaultKind> {
        if self.state.current_setpoint == 0 {
            if self.state.last_setpoint > 0 {
                // Explicit zero setpoint terminates the profile
                self.shutdown(true, None);
                return Ok(());
            }
            self.state.last_setpoint = 0;
            if !self.advance_setpoint() {
                return Ok(());
            }
        }

        // Checked even when the setpoint did not change, otherwise two equal
        // consecutive setpoints would soak forever
        if let Some(started) = self.state.soaking_started_at {
            self.state.soaking_elapsed = now_ms.wrapping_sub(started);
            if self.state.soaking_elapsed >= self.state.current_soaktime as u32 * 1000 {
                self.state.soaking_started_at = None;
                self.state.soaking_elapsed = 0;
                self.push_event(ControlEvent::SoakingEnded);
                self.state.last_setpoint = self.state.current_setpoint;
                if !self.advance_setpoint() {
                    return Ok(());
                }
            }
        }

        let setpoint_x10 = self.state.current_setpoint as i32 * 10;

        if setpoint_x10 > temp_x10 {
            // Bottom first so it trails the top heater by one tick
            if self.state.heating_top && !self.state.heating_bottom {
                set_duty(&mut *self.heater_bottom, self.config.heaters.bottom_max_duty)?;
                self.state.heating_bottom = true;
            }
            if !self.state.heating_top {
                set_duty(&mut *self.heater_top, self.config.heaters.top_max_duty)?;
                self.state.heating_top = true;
            }

            if let Some(step) = self.state.current_overshoot_step {
                if temp_x10 > step.threshold_c * 10 {
                    set_duty(&mut *self.heater_top, step.top_duty_cap)?;
                    // Never switches the bottom heater on, so it still trails
                    if self.state.heating_bottom {
                        set_duty(&mut *self.heater_bottom, step.bottom_duty_cap)?;
                    }

                    self.state.overshoot_step_index += 1;
                    let index = self.state.overshoot_step_index;
                    self.state.current_overshoot_step =
                        self.state.overshoot_steps.get(index as usize).copied();
                    self.push_event(ControlEvent::OvershootStep {
                        index,
                        top_duty: step.top_duty_cap,
                        bottom_duty: step.bottom_duty_cap,
                    });
                }
            }
        }

        if self.state.heating_top && setpoint_x10 <= temp_x10 {
            if self.state.soaking_started_at.is_none() {
                self.state.soaking_started_at = Some(now_ms);
                self.push_event(ControlEvent::SoakingStarted {
                    setpoint_c: self.state.current_setpoint,
                });
            }
            self.zero_heaters()?;
            self.state.heating_top = false;
            self.state.heating_bottom = false;
        }

        Ok(())
    }

    /// Load the next profile stage
    ///
    /// An exhausted queue is the normal end of a profile without a zero
    /// terminator: the run finishes and `false` is returned.
    fn advance_setpoint(&mut self) -> bool {
        let Some(entry) = self.queue.pop() else {
            self.shutdown(true, None);
            return false;
        };

        self.state.current_setpoint = entry.setpoint_c;
        self.state.current_soaktime = entry.soak_s;
        self.state.overshoot_prevention = entry.overshoot_steps;
        self.state.overshoot_steps = overshoot_steps(
            entry.setpoint_c,
            entry.overshoot_steps,
            &self.config.heaters,
            &self.config.overshoot,
        );
        self.state.overshoot_step_index = 0;
        self.state.current_overshoot_step = self.state.overshoot_steps.first().copied();

        self.push_event(ControlEvent::SetpointChanged {
            setpoint_c: entry.setpoint_c,
            soak_s: entry.soak_s,
            overshoot_steps: entry.overshoot_steps,
        });
        true
    }

    /// Stop the run
    ///
    /// `soft` marks a completed profile. With an `error` the error is
    /// recorded and no sound is made; otherwise the completion jingle plays.
    fn shutdown(&mut self, soft: bool, error: Option<ReflowError>) {
        let heaters_off = self.zero_heaters();

        self.state = ThermalState::new();
        self.state.heater_duty = self.heater_duty();
        self.queue.clear();

        match error {
            Some(error) => {
                self.errors.record(error);
                self.push_event(ControlEvent::Aborted(error));
            }
            None => {
                if heaters_off.is_err() {
                    self.errors
                        .record(ReflowError::ControlLoopFault(FaultKind::HeaterOutput));
                }
                if let Some(buzzer) = self.buzzer.as_mut() {
                    buzzer.play_completion_jingle();
                }
                self.push_event(if soft {
                    ControlEvent::Finished
                } else {
                    ControlEvent::Interrupted
                });
            }
        }
    }

    /// Fault path of the control tick
    fn fault(&mut self, fault: FaultKind) -> ReflowError {
        let error = ReflowError::ControlLoopFault(fault);
        self.shutdown(false, Some(error));
        if let Some(buzzer) = self.buzzer.as_mut() {
            buzzer.play_fault_pattern();
        }
        error
    }

    /// PCB channel missing from the readings
    fn sensor_lost(&mut self) -> Result<(), ReflowError> {
        self.state.heater_duty = self.heater_duty();
        self.pcb_temp_x10 = None;

        if self.state.reflowing {
            return Err(self.fault(FaultKind::SensorFault));
        }
        if self.state.has_residual() {
            self.shutdown(false, None);
        }
        Ok(())
    }

    /// Both heaters to 0, attempting both even if the first fails
    fn zero_heaters(&mut self) -> Result<(), FaultKind> {
        let top = self.heater_top.set_duty(0);
        let bottom = self.heater_bottom.set_duty(0);
        top.and(bottom).map_err(|_| FaultKind::HeaterOutput)
    }

    fn push_event(&mut self, event: ControlEvent) {
        self.phase = self.phase.transition(event);
        if self.events.is_full() {
            self.events.pop_front();
        }
        let _ = self.events.push_back(event);
    }
}

fn set_duty<D: DutyOutput>(heater: &mut D, percent: u8) -> Result<(), FaultKind> {
    heater
        .set_duty(percent)
        .map_err(|_| FaultKind::HeaterOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileEntry;
    use crate::traits::OutputError;
    use core::cell::Cell;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    // Heater whose duty and failure mode are visible from the test
    struct MockHeater<'h> {
        duty: &'h Cell<u8>,
        fail: &'h Cell<bool>,
    }

    impl DutyOutput for MockHeater<'_> {
        fn set_duty(&mut self, percent: u8) -> Result<(), OutputError> {
            if self.fail.get() && percent > 0 {
                return Err(OutputError::Hardware);
            }
            self.duty.set(percent);
            Ok(())
        }

        fn duty(&self) -> u8 {
            self.duty.get()
        }
    }

    struct MockFan {
        duty: u8,
    }

    impl DutyOutput for MockFan {
        fn set_duty(&mut self, percent: u8) -> Result<(), OutputError> {
            self.duty = percent;
            Ok(())
        }

        fn duty(&self) -> u8 {
            self.duty
        }
    }

    struct MockLight<'h> {
        on: &'h Cell<bool>,
    }

    impl SwitchOutput for MockLight<'_> {
        fn set_on(&mut self, on: bool) -> Result<(), OutputError> {
            self.on.set(on);
            Ok(())
        }

        fn is_on(&self) -> bool {
            self.on.get()
        }
    }

    struct MockBuzzer<'h> {
        jingles: &'h Cell<u8>,
        alarms: &'h Cell<u8>,
    }

    impl AudibleSignal for MockBuzzer<'_> {
        fn play_completion_jingle(&mut self) {
            self.jingles.set(self.jingles.get() + 1);
        }

        fn play_fault_pattern(&mut self) {
            self.alarms.set(self.alarms.get() + 1);
        }
    }

    #[derive(Default)]
    struct Rig {
        top: Cell<u8>,
        bottom: Cell<u8>,
        top_fail: Cell<bool>,
        bottom_fail: Cell<bool>,
        light: Cell<bool>,
        jingles: Cell<u8>,
        alarms: Cell<u8>,
    }

    type TestEngine<'r> = ThermalControlEngine<
        'r,
        NoopRawMutex,
        MockHeater<'r>,
        MockHeater<'r>,
        MockFan,
        MockLight<'r>,
        MockBuzzer<'r>,
    >;

    fn engine<'r>(rig: &'r Rig, errors: &'r ErrorChannel<NoopRawMutex>) -> TestEngine<'r> {
        let actuators = Actuators {
            heater_top: MockHeater {
                duty: &rig.top,
                fail: &rig.top_fail,
            },
            heater_bottom: MockHeater {
                duty: &rig.bottom,
                fail: &rig.bottom_fail,
            },
            fan: MockFan { duty: 0 },
            light: Some(MockLight { on: &rig.light }),
            buzzer: Some(MockBuzzer {
                jingles: &rig.jingles,
                alarms: &rig.alarms,
            }),
        };
        ThermalControlEngine::new(OvenConfig::default(), actuators, errors)
    }

    fn profile(entries: &[ProfileEntry]) -> ReflowProfile {
        ReflowProfile::from_entries("test", entries).unwrap()
    }

    #[test]
    fn test_start_without_profile() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);

        assert!(!engine.start());
        assert!(!engine.is_reflowing());
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
        assert_eq!(engine.phase(), ControlPhase::Idle);
        assert_eq!(errors.take().unwrap().cause, Some(ReflowError::ProfileMissing));

        engine.set_profile(profile(&[]));
        assert!(!engine.start());
        assert!(!engine.is_reflowing());
        assert_eq!(errors.take().unwrap().cause, Some(ReflowError::ProfileMissing));
    }

    #[test]
    fn test_start_switches_light_on() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(150, 10, 0)]));

        assert!(engine.start());
        assert!(rig.light.get());
        assert_eq!(engine.phase(), ControlPhase::Heating);
        assert_eq!(engine.next_event(), Some(ControlEvent::ReflowStarted));

        // Second start is a no-op
        assert!(!engine.start());
        assert_eq!(engine.next_event(), None);
    }

    #[test]
    fn test_light_toggle() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);

        assert!(!engine.light_on());
        assert!(engine.set_light(true));
        assert!(!engine.set_light(false));
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
    }

    #[test]
    fn test_snapshot_follows_light_switched_by_start() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(150, 10, 0)]));

        engine.start();
        assert!(engine.snapshot().light_on);

        // A toggle after start switches the light off rather than on again
        assert_eq!(engine.handle_request(ControlRequest::ToggleLight), None);
        assert!(!engine.snapshot().light_on);
        assert!(engine.is_reflowing());
    }

    #[test]
    fn test_requests_between_ticks_all_applied() {
        use crate::control::RequestQueue;

        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        let requests: RequestQueue<NoopRawMutex> = RequestQueue::new();
        engine.set_profile(profile(&[ProfileEntry::new(200, 10, 0)]));

        requests.try_send(ControlRequest::Start).unwrap();
        while let Ok(request) = requests.try_receive() {
            engine.handle_request(request);
        }
        engine.control_tick(250, 0).unwrap();
        assert_eq!(engine.heater_duty().top, 100);

        // Two presses within one control period
        requests.try_send(ControlRequest::Cancel).unwrap();
        requests.try_send(ControlRequest::ToggleLight).unwrap();
        let mut loads = None;
        while let Ok(request) = requests.try_receive() {
            loads = loads.or(engine.handle_request(request));
        }

        assert!(!engine.is_reflowing());
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
        assert!(!engine.light_on());
        assert_eq!(loads, None);
        assert_eq!(
            engine.handle_request(ControlRequest::LoadProfile(2)),
            Some(2)
        );
    }

    #[test]
    fn test_profile_locked_while_reflowing() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(150, 10, 0)]));
        engine.start();

        assert!(!engine.set_profile(profile(&[ProfileEntry::new(200, 10, 0)])));
        assert_eq!(engine.profile().unwrap().entries()[0].setpoint_c, 150);
    }

    #[test]
    fn test_cancel_while_idle_is_silent() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);

        engine.cancel();
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
        assert_eq!(rig.jingles.get(), 0);
        assert_eq!(engine.phase(), ControlPhase::Idle);
        assert!(!errors.is_set());
    }

    #[test]
    fn test_cancel_mid_run() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(200, 10, 2)]));
        engine.start();

        engine.control_tick(250, 0).unwrap();
        engine.control_tick(270, 200).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty { top: 100, bottom: 50 });

        engine.cancel();
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
        assert!(!engine.is_reflowing());
        assert_eq!(engine.state().overshoot_step_index, 0);
        assert_eq!(engine.phase(), ControlPhase::Shutdown);
        assert_eq!(rig.jingles.get(), 1);
        assert!(!errors.is_set());
    }

    #[test]
    fn test_fan_follows_temperature_when_idle() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);

        engine.control_tick(250, 0).unwrap();
        assert_eq!(engine.fan_duty(), 0);
        engine.control_tick(500, 200).unwrap();
        assert_eq!(engine.fan_duty(), 10);
        engine.control_tick(1200, 400).unwrap();
        assert_eq!(engine.fan_duty(), 20);
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
    }

    #[test]
    fn test_bottom_heater_trails_top() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(200, 10, 0)]));
        engine.start();

        engine.control_tick(250, 0).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty { top: 100, bottom: 0 });

        engine.control_tick(260, 200).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty { top: 100, bottom: 50 });
    }

    #[test]
    fn test_first_step_before_bottom_heater() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(160, 10, 3)]));
        engine.start();

        // Already above the first threshold (130°C) on the first tick
        engine.control_tick(1350, 0).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty { top: 80, bottom: 0 });
        assert_eq!(engine.state().overshoot_step_index, 1);

        // Bottom joins at full power, next step applies to both
        engine.control_tick(1450, 200).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty { top: 60, bottom: 30 });
        assert_eq!(engine.state().overshoot_step_index, 2);
    }

    #[test]
    fn test_zero_setpoint_terminates() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[
            ProfileEntry::new(100, 1, 0),
            ProfileEntry::new(0, 0, 0),
            ProfileEntry::new(200, 1, 0),
        ]));
        engine.start();

        engine.control_tick(900, 0).unwrap();
        engine.control_tick(1000, 200).unwrap();
        assert_eq!(engine.phase(), ControlPhase::Soaking);
        engine.control_tick(1000, 1200).unwrap();
        assert_eq!(engine.state().current_setpoint, 0);
        assert!(engine.is_reflowing());

        engine.control_tick(1000, 1400).unwrap();
        assert!(!engine.is_reflowing());
        assert_eq!(engine.phase(), ControlPhase::Done);
        assert_eq!(rig.jingles.get(), 1);
        assert!(!errors.is_set());
    }

    #[test]
    fn test_equal_setpoints_advance() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[
            ProfileEntry::new(150, 1, 0),
            ProfileEntry::new(150, 1, 0),
        ]));
        engine.start();

        engine.control_tick(1400, 0).unwrap();
        engine.control_tick(1500, 200).unwrap();
        engine.control_tick(1500, 1200).unwrap();
        assert_eq!(engine.queue.len(), 0);

        // Second stage starts its soak once the heaters have cycled again
        engine.control_tick(1490, 1400).unwrap();
        engine.control_tick(1500, 1600).unwrap();
        engine.control_tick(1500, 2600).unwrap();
        assert!(!engine.is_reflowing());
        assert_eq!(engine.phase(), ControlPhase::Done);
    }

    #[test]
    fn test_soak_reasserts_heat_when_cooling() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(150, 60, 0)]));
        engine.start();

        engine.control_tick(1400, 0).unwrap();
        engine.control_tick(1500, 200).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
        let started = engine.state().soaking_started_at;
        assert_eq!(started, Some(200));

        engine.control_tick(1490, 400).unwrap();
        assert_eq!(engine.heater_duty().top, 100);
        engine.control_tick(1505, 600).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty::default());

        // Soak timer is not restarted
        assert_eq!(engine.state().soaking_started_at, started);
        assert_eq!(engine.phase(), ControlPhase::Soaking);
    }

    #[test]
    fn test_soak_reheat_at_full_power_after_steps() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(160, 60, 3)]));
        engine.start();

        for (i, temp) in [250, 260, 1310, 1410, 1510].into_iter().enumerate() {
            engine.control_tick(temp, i as u32 * 200).unwrap();
        }
        assert_eq!(engine.heater_duty(), HeaterDuty { top: 40, bottom: 20 });
        assert_eq!(engine.state().overshoot_step_index, 3);

        engine.control_tick(1600, 1000).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
        assert_eq!(engine.phase(), ControlPhase::Soaking);

        // Cooling during the soak brings the heaters back at their maxima
        engine.control_tick(1590, 1200).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty { top: 100, bottom: 0 });
        engine.control_tick(1590, 1400).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty { top: 100, bottom: 50 });
    }

    #[test]
    fn test_heater_fault_shuts_down() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        engine.set_profile(profile(&[ProfileEntry::new(200, 10, 0)]));
        engine.start();

        engine.control_tick(250, 0).unwrap();
        rig.bottom_fail.set(true);

        let err = engine.control_tick(260, 200).unwrap_err();
        assert_eq!(err, ReflowError::ControlLoopFault(FaultKind::HeaterOutput));
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
        assert!(!engine.is_reflowing());
        assert_eq!(engine.phase(), ControlPhase::Shutdown);
        assert_eq!(rig.jingles.get(), 0);
        assert_eq!(rig.alarms.get(), 1);
        assert_eq!(errors.take().unwrap().cause, Some(err));

        // The loop keeps ticking afterwards
        engine.control_tick(260, 400).unwrap();
        assert_eq!(engine.heater_duty(), HeaterDuty::default());
    }

    #[test]
    fn test_drop_forces_outputs_off() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        {
            let mut engine = engine(&rig, &errors);
            engine.set_profile(profile(&[ProfileEntry::new(200, 10, 0)]));
            engine.start();
            engine.control_tick(250, 0).unwrap();
            engine.control_tick(260, 200).unwrap();
            assert_eq!(rig.top.get(), 100);
            assert_eq!(rig.bottom.get(), 50);
            assert!(rig.light.get());
        }
        assert_eq!(rig.top.get(), 0);
        assert_eq!(rig.bottom.get(), 0);
        assert!(!rig.light.get());
    }

    #[test]
    fn test_event_queue_drops_oldest() {
        let rig = Rig::default();
        let errors = ErrorChannel::new();
        let mut engine = engine(&rig, &errors);
        for _ in 0..MAX_PENDING_EVENTS + 2 {
            engine.push_event(ControlEvent::SoakingEnded);
        }
        engine.push_event(ControlEvent::Finished);

        let mut last = None;
        let mut count = 0;
        while let Some(event) = engine.next_event() {
            last = Some(event);
            count += 1;
        }
        assert_eq!(count, MAX_PENDING_EVENTS);
        assert_eq!(last, Some(ControlEvent::Finished));
    }
}
