//! Oven configuration
//!
//! `oven.toml` is embedded at build time (and validated by build.rs). The
//! defaults are used if it still fails to parse on the target.

use defmt::*;
use reflow_core::config::{parse_config, OvenConfig};

/// Embedded configuration; edit oven.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../oven.toml");

pub fn load_config() -> OvenConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            warn!("Using default configuration");
            OvenConfig::default()
        }
    }
}
