//! Settings persistence with logging
//!
//! Wraps the core load/save functions for the RP2040 flash.

use defmt::*;

use parfocal_core::config::{clear_settings, save_settings, try_load_settings, FocuserSettings};
use parfocal_hal_rp2040::flash::Rp2040FlashStorage;

/// Load settings from flash
///
/// Falls back to defaults if nothing is stored or the record is invalid.
pub async fn load_focuser_settings(storage: &mut Rp2040FlashStorage<'_>) -> FocuserSettings {
    match try_load_settings(storage).await {
        Ok(settings) => {
            info!("Loaded focuser settings from flash");
            log_settings_summary(&settings);
            settings
        }
        Err(e) if e.is_not_found() => {
            debug!("No focuser settings in flash, using defaults");
            FocuserSettings::default()
        }
        Err(e) => {
            warn!("Failed to load focuser settings: {:?}, using defaults", e);
            // Drop the bad record
            if let Err(e) = clear_settings(storage).await {
                error!("Failed to clear focuser settings: {:?}", e);
            }
            FocuserSettings::default()
        }
    }
}

/// Save settings to flash
///
/// Errors are logged; the focuser keeps running on its in-memory state.
pub async fn save_focuser_settings(
    storage: &mut Rp2040FlashStorage<'_>,
    settings: &mut FocuserSettings,
) -> bool {
    match save_settings(storage, settings).await {
        Ok(()) => {
            info!("Focuser settings saved");
            true
        }
        Err(e) => {
            error!("Failed to save focuser settings: {:?}", e);
            false
        }
    }
}

fn log_settings_summary(settings: &FocuserSettings) {
    info!(
        "  {} rpm, backlash {}, {} on channel {}",
        settings.speed_rpm,
        settings.backlash_steps,
        settings.step_style.as_str(),
        settings.channel.as_str(),
    );
    match settings.parked_position {
        Some(position) => info!("  parked at {}", position),
        None => debug!("  no parked position"),
    }
}
