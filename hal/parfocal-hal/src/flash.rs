//! Persistent key-value storage
//!
//! The focuser keeps its settings record in flash between power cycles.
//! Chip HALs implement [`FlashStorage`] on top of whatever wear-leveling
//! scheme suits their flash; callers only see whole records by key.

/// Record keys
///
/// Key bytes are written to flash, so a variant's value never changes once
/// released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Focuser settings record (postcard)
    FocuserSettings = 0,
}

impl StorageKey {
    /// Key byte as stored in flash
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Key for a stored byte, if it is one we know
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::FocuserSettings),
            _ => None,
        }
    }
}

/// Flash storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Low-level program or erase failure
    Flash,
    /// Storage layer rejected the operation
    Storage,
    /// No record under this key
    NotFound,
    /// Record larger than the caller's buffer
    BufferTooSmall,
    /// Record failed its integrity check
    Corrupted,
    /// No room left for the record
    Full,
}

/// Record-level flash storage
///
/// A write replaces the whole record under its key. A read either returns
/// the last complete write or fails; never a partial record.
pub trait FlashStorage {
    /// Copy the record for `key` into `buffer`, returning its length
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Store `data` as the record for `key`
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Check for a record under `key`
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;

    /// Drop every record
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        let slot = buffer
            .first_mut()
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        *slot = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        let byte = buffer
            .first()
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        StorageKey::from_u8(*byte)
            .map(|key| (key, 1))
            .ok_or(sequential_storage::map::SerializationError::InvalidFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_key_byte() {
        // Flash written by older firmware must stay readable
        assert_eq!(StorageKey::FocuserSettings.as_u8(), 0);
        assert_eq!(StorageKey::from_u8(0), Some(StorageKey::FocuserSettings));
    }

    #[test]
    fn test_unknown_storage_key() {
        assert_eq!(StorageKey::from_u8(1), None);
        assert_eq!(StorageKey::from_u8(0xFF), None);
    }
}
