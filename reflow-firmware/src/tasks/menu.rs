//! Front panel menu task
//!
//! Polls the knob and turns presses into control requests. The position
//! may jump by several units between polls; only the latest value counts.

use defmt::*;
use embassy_time::{Duration, Ticker};

use reflow_core::config::RotaryMode;
use reflow_core::control::ControlRequest;

use crate::channels::{CONTROL_REQUEST, ROTARY, STATUS};

const MAIN_ITEMS: [&str; 3] = ["Load profile", "Start/Stop reflow", "Light on/off"];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Screen {
    Main,
    Profiles,
}

#[embassy_executor::task]
pub async fn menu_task(period_ms: u32, profile_count: usize) {
    info!("Menu task started");

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));
    let mut screen = Screen::Main;
    let mut last_cursor = None;
    enter(Screen::Main, MAIN_ITEMS.len());

    loop {
        ticker.next().await;

        let value = ROTARY.value();
        let (min, max) = ROTARY.range();
        let cursor = value.position.clamp(min, max) as usize;

        if last_cursor != Some(cursor) {
            match screen {
                Screen::Main => debug!("> {}", MAIN_ITEMS[cursor.min(MAIN_ITEMS.len() - 1)]),
                Screen::Profiles => debug!("> profile {}", cursor),
            }
            last_cursor = Some(cursor);
        }

        if !value.pressed {
            continue;
        }

        screen = match (screen, cursor) {
            (Screen::Main, 0) if profile_count > 0 => {
                enter(Screen::Profiles, profile_count);
                Screen::Profiles
            }
            (Screen::Main, 0) => {
                warn!("No profiles available");
                Screen::Main
            }
            (Screen::Main, 1) => {
                let request = if STATUS.read().reflowing {
                    ControlRequest::Cancel
                } else {
                    ControlRequest::Start
                };
                send(request);
                Screen::Main
            }
            (Screen::Main, _) => {
                debug!("Light {}", if STATUS.read().light_on { "off" } else { "on" });
                send(ControlRequest::ToggleLight);
                Screen::Main
            }
            (Screen::Profiles, index) => {
                send(ControlRequest::LoadProfile(index as u8));
                enter(Screen::Main, MAIN_ITEMS.len());
                Screen::Main
            }
        };
        last_cursor = None;
    }
}

fn send(request: ControlRequest) {
    if CONTROL_REQUEST.try_send(request).is_err() {
        warn!("Control busy, {:?} dropped", request);
    }
}

/// Bound the knob to the items of a screen
fn enter(screen: Screen, items: usize) {
    let max = items.saturating_sub(1) as i32;
    ROTARY.set_range(0, max, RotaryMode::Wrap);
    ROTARY.reset();
    if screen == Screen::Profiles {
        debug!("Select profile (0..={})", max);
    }
}
