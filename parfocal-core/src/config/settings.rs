//! Persisted focuser settings
//!
//! The settings record is what survives a power cycle: speed, backlash,
//! wiring choices, presets and (when parking is enabled) the position the
//! focuser was parked at.

use serde::{Deserialize, Serialize};

use parfocal_protocol::{MotorPolarity, StepStyle, StepperChannel};

use crate::focuser::{
    FocuserState, MAX_BACKLASH_STEPS, MAX_SPEED_RPM, MAX_STEPS, MIN_SPEED_RPM, PRESET_COUNT,
};

/// Magic number to identify a valid settings record
pub const SETTINGS_MAGIC: u32 = 0x464F4355; // "FOCU"

/// Current settings record version
pub const SETTINGS_VERSION: u8 = 1;

/// Settings record stored in flash
///
/// This struct is serialized to flash using postcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FocuserSettings {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    pub speed_rpm: u16,
    pub backlash_steps: u16,
    pub park_on_disconnect: bool,
    pub polarity: MotorPolarity,
    pub step_style: StepStyle,
    pub channel: StepperChannel,
    pub presets: [u32; PRESET_COUNT],
    /// Position at shutdown; only recorded when parking is enabled
    pub parked_position: Option<u32>,
    /// CRC32 checksum (calculated over magic..parked_position)
    pub crc: u32,
}

impl Default for FocuserSettings {
    fn default() -> Self {
        Self::from_state(&FocuserState::new())
    }
}

impl FocuserSettings {
    /// Build a record from the controller state, CRC included
    pub fn from_state(state: &FocuserState) -> Self {
        let mut settings = Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            speed_rpm: state.speed_rpm,
            backlash_steps: state.backlash_steps,
            park_on_disconnect: state.park_on_disconnect,
            polarity: state.polarity,
            step_style: state.step_style,
            channel: state.channel,
            presets: state.presets,
            parked_position: if state.park_on_disconnect {
                Some(state.position)
            } else {
                None
            },
            crc: 0,
        };
        settings.update_crc();
        settings
    }

    /// Copy the stored values into `state`
    ///
    /// Values outside their limits are clamped so that a record written by
    /// a build with different limits cannot put the controller out of range.
    pub fn apply_to(&self, state: &mut FocuserState) {
        state.speed_rpm = self.speed_rpm.clamp(MIN_SPEED_RPM, MAX_SPEED_RPM);
        state.backlash_steps = self.backlash_steps.min(MAX_BACKLASH_STEPS);
        state.park_on_disconnect = self.park_on_disconnect;
        state.polarity = self.polarity;
        state.step_style = self.step_style;
        state.channel = self.channel;
        for (slot, &preset) in state.presets.iter_mut().zip(self.presets.iter()) {
            *slot = preset.min(MAX_STEPS);
        }
        if let Some(position) = self.parked_position {
            if position <= MAX_STEPS {
                state.position = position;
            }
        }
    }

    /// Check if the data is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC && self.version == SETTINGS_VERSION
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.speed_rpm.to_le_bytes());
        crc = crc32_update(crc, &self.backlash_steps.to_le_bytes());
        crc = crc32_update(
            crc,
            &[
                self.park_on_disconnect as u8,
                self.polarity as u8,
                self.step_style as u8,
                self.channel as u8,
            ],
        );
        for preset in &self.presets {
            crc = crc32_update(crc, &preset.to_le_bytes());
        }
        match self.parked_position {
            Some(position) => {
                crc = crc32_update(crc, &[1]);
                crc = crc32_update(crc, &position.to_le_bytes());
            }
            None => crc = crc32_update(crc, &[0]),
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
