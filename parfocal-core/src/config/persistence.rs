//! Settings persistence
//!
//! Loads and saves the settings record through any [`FlashStorage`].

use parfocal_hal::{FlashError, FlashStorage, StorageKey};

use super::settings::FocuserSettings;

/// Maximum serialized settings size
pub const MAX_SETTINGS_SIZE: usize = 128;

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistenceError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
}

impl From<FlashError> for PersistenceError {
    fn from(e: FlashError) -> Self {
        PersistenceError::Flash(e)
    }
}

impl PersistenceError {
    /// Check if the error only means nothing was saved yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::Flash(FlashError::NotFound))
    }
}

/// Load settings from flash
///
/// Returns the stored settings, or defaults if nothing is stored or the
/// record is invalid.
pub async fn load_settings<F: FlashStorage>(storage: &mut F) -> FocuserSettings {
    try_load_settings(storage).await.unwrap_or_default()
}

/// Load settings from flash, reporting why a record was rejected
pub async fn try_load_settings<F: FlashStorage>(
    storage: &mut F,
) -> Result<FocuserSettings, PersistenceError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let len = storage
        .read(StorageKey::FocuserSettings, &mut buffer)
        .await?;

    let settings: FocuserSettings =
        postcard::from_bytes(&buffer[..len]).map_err(|_| PersistenceError::Deserialize)?;

    if !settings.is_valid() {
        return Err(PersistenceError::InvalidFormat);
    }

    if !settings.verify_crc() {
        return Err(PersistenceError::CrcMismatch);
    }

    Ok(settings)
}

/// Save settings to flash
///
/// Updates the CRC before saving.
pub async fn save_settings<F: FlashStorage>(
    storage: &mut F,
    settings: &mut FocuserSettings,
) -> Result<(), PersistenceError> {
    settings.update_crc();

    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let bytes =
        postcard::to_slice(settings, &mut buffer).map_err(|_| PersistenceError::Serialize)?;

    storage.write(StorageKey::FocuserSettings, bytes).await?;
    Ok(())
}

/// Forget the saved settings; the next load returns defaults
pub async fn clear_settings<F: FlashStorage>(storage: &mut F) -> Result<(), PersistenceError> {
    storage.erase_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focuser::FocuserState;
    use embassy_futures::block_on;
    use heapless::Vec;
    use parfocal_protocol::StepperChannel;

    /// Single-record in-memory flash
    #[derive(Default)]
    struct MemFlash {
        record: Option<Vec<u8, MAX_SETTINGS_SIZE>>,
        fail_writes: bool,
    }

    impl FlashStorage for MemFlash {
        async fn read(
            &mut self,
            _key: StorageKey,
            buffer: &mut [u8],
        ) -> Result<usize, FlashError> {
            let record = self.record.as_ref().ok_or(FlashError::NotFound)?;
            if buffer.len() < record.len() {
                return Err(FlashError::BufferTooSmall);
            }
            buffer[..record.len()].copy_from_slice(record);
            Ok(record.len())
        }

        async fn write(&mut self, _key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
            if self.fail_writes {
                return Err(FlashError::Flash);
            }
            self.record = Some(Vec::from_slice(data).map_err(|_| FlashError::Full)?);
            Ok(())
        }

        async fn exists(&mut self, _key: StorageKey) -> bool {
            self.record.is_some()
        }

        async fn erase_all(&mut self) -> Result<(), FlashError> {
            self.record = None;
            Ok(())
        }
    }

    #[test]
    fn test_load_defaults_when_empty() {
        let mut flash = MemFlash::default();
        let err = block_on(try_load_settings(&mut flash)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(block_on(load_settings(&mut flash)), FocuserSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut flash = MemFlash::default();
        let mut state = FocuserState::new();
        state.channel = StepperChannel::B;
        state.position = 4321;
        let mut settings = FocuserSettings::from_state(&state);

        block_on(save_settings(&mut flash, &mut settings)).unwrap();
        let loaded = block_on(try_load_settings(&mut flash)).unwrap();
        assert_eq!(loaded.channel, StepperChannel::B);
        assert_eq!(loaded.parked_position, Some(4321));
    }

    #[test]
    fn test_save_refreshes_crc() {
        let mut flash = MemFlash::default();
        let mut settings = FocuserSettings::default();
        settings.speed_rpm = 90;
        assert!(!settings.verify_crc());

        block_on(save_settings(&mut flash, &mut settings)).unwrap();
        assert!(settings.verify_crc());
        assert_eq!(block_on(load_settings(&mut flash)).speed_rpm, 90);
    }

    #[test]
    fn test_corrupted_record_rejected() {
        let mut flash = MemFlash::default();
        let mut settings = FocuserSettings::default();
        block_on(save_settings(&mut flash, &mut settings)).unwrap();

        // Speed follows the 5-byte magic varint and the version byte
        let record = flash.record.as_mut().unwrap();
        assert_eq!(record[6], 30);
        record[6] ^= 0x01;

        assert_eq!(
            block_on(try_load_settings(&mut flash)),
            Err(PersistenceError::CrcMismatch)
        );
        assert_eq!(block_on(load_settings(&mut flash)), FocuserSettings::default());
    }

    #[test]
    fn test_wrong_magic_rejected() {
        let mut flash = MemFlash::default();
        let mut settings = FocuserSettings::default();
        settings.magic = 0xDEADBEEF;
        block_on(save_settings(&mut flash, &mut settings)).unwrap();

        assert_eq!(
            block_on(try_load_settings(&mut flash)),
            Err(PersistenceError::InvalidFormat)
        );
    }

    #[test]
    fn test_clear_forgets_record() {
        let mut flash = MemFlash::default();
        let mut settings = FocuserSettings::default();
        settings.backlash_steps = 40;
        block_on(save_settings(&mut flash, &mut settings)).unwrap();
        assert!(block_on(flash.exists(StorageKey::FocuserSettings)));

        block_on(clear_settings(&mut flash)).unwrap();
        assert!(!block_on(flash.exists(StorageKey::FocuserSettings)));
        assert!(block_on(try_load_settings(&mut flash))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_write_failure_reported() {
        let mut flash = MemFlash {
            fail_writes: true,
            ..MemFlash::default()
        };
        let mut settings = FocuserSettings::default();
        assert_eq!(
            block_on(save_settings(&mut flash, &mut settings)),
            Err(PersistenceError::Flash(FlashError::Flash))
        );
    }
}
