//! Rotary encoder input tasks
//!
//! The edge waits stand in for the pin interrupts: each edge on CLK or DT
//! feeds one sample into the shared decoder. The button's debounce delay
//! runs here too, never in the edge handler.

use defmt::*;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use reflow_drivers::input::DEBOUNCE_MS;

use crate::channels::ROTARY;

#[embassy_executor::task]
pub async fn encoder_task(mut clk: Input<'static>, mut dt: Input<'static>) {
    info!("Encoder task started");

    loop {
        select(clk.wait_for_any_edge(), dt.wait_for_any_edge()).await;
        ROTARY.on_edge(clk.is_high(), dt.is_high());
    }
}

#[embassy_executor::task]
pub async fn button_task(mut button: Input<'static>) {
    info!("Button task started");

    loop {
        button.wait_for_falling_edge().await;
        ROTARY.button().on_falling_edge();

        Timer::after_millis(DEBOUNCE_MS).await;
        if ROTARY.button().confirm(button.is_low()) {
            debug!("Button pressed");
        }
    }
}
