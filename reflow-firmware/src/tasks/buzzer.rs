//! Buzzer player task
//!
//! Plays tunes requested through [`BUZZER`]. A new request replaces the
//! tune being played at the next note boundary.

use defmt::*;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Timer;

use reflow_drivers::output::buzzer::VOLUME_PERCENT;

use crate::channels::BUZZER;

/// PWM clock divider; keeps `top` in range from ~30 Hz up
const DIVIDER: u8 = 64;

/// System clock feeding the PWM slices
const SYS_CLK_HZ: u32 = 125_000_000;

#[embassy_executor::task]
pub async fn buzzer_task(mut pwm: Pwm<'static>) {
    info!("Buzzer task started");

    let mut config = PwmConfig::default();
    config.divider = DIVIDER.into();
    config.compare_a = 0;
    pwm.set_config(&config);

    loop {
        let mut tune = BUZZER.wait().await;

        'tune: loop {
            for note in tune {
                if note.hz == 0 {
                    config.compare_a = 0;
                } else {
                    let top = (SYS_CLK_HZ / DIVIDER as u32 / note.hz).clamp(2, 65_535) - 1;
                    config.top = top as u16;
                    config.compare_a = (top * VOLUME_PERCENT as u32 / 100) as u16;
                }
                pwm.set_config(&config);
                Timer::after_millis(note.ms as u64).await;

                if let Some(next) = BUZZER.try_take() {
                    tune = next;
                    continue 'tune;
                }
            }
            break;
        }

        config.compare_a = 0;
        pwm.set_config(&config);
    }
}
