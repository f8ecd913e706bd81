//! Status refresh task
//!
//! Reads the control snapshot and the error mailbox once per period. The
//! TFT layer is not part of this firmware; the status line goes to the log.

use defmt::*;
use embassy_time::{Duration, Ticker};

use reflow_core::control::ControlPhase;

use crate::channels::{ERRORS, STATUS};

#[embassy_executor::task]
pub async fn status_task(period_ms: u32) {
    info!("Status task started");

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));
    let mut last_phase = ControlPhase::Idle;

    loop {
        ticker.next().await;

        if let Some(record) = ERRORS.take() {
            error!("{}", record.message.as_str());
        }

        let snapshot = STATUS.read();
        if snapshot.phase != last_phase {
            info!("Phase: {:?}", snapshot.phase);
            last_phase = snapshot.phase;
        }

        match snapshot.pcb_temp_x10 {
            Some(temp_x10) => trace!(
                "PCB {}.{}°C, set {}°C, top {}%, bottom {}%, fan {}%",
                temp_x10 / 10,
                (temp_x10 % 10).abs(),
                snapshot.setpoint_c,
                snapshot.top_duty,
                snapshot.bottom_duty,
                snapshot.fan_duty
            ),
            None => trace!("PCB temperature unavailable"),
        }
    }
}
