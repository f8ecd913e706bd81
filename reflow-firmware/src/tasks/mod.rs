//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! `channels`.

pub mod buzzer;
pub mod control;
pub mod encoder;
pub mod menu;
pub mod status;

pub use buzzer::buzzer_task;
pub use control::{control_task, OvenEngine, OvenLibrary, SensorBank, SensorBus};
pub use encoder::{button_task, encoder_task};
pub use menu::menu_task;
pub use status::status_task;
