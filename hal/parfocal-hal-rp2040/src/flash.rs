//! Flash storage driver for RP2040
//!
//! Keeps the focuser settings in a small wear-leveled key-value map
//! (sequential-storage) at the end of flash, clear of the program image.
//!
//! Implements the `FlashStorage` trait from `parfocal-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use parfocal_hal::flash::{FlashError, StorageKey};

/// Total flash on a Pico-class board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Settings partition: two erase sectors is the sequential-storage minimum
pub const SETTINGS_PARTITION_SIZE: usize = 2 * ERASE_SIZE;
pub const SETTINGS_PARTITION_START: usize = FLASH_SIZE - SETTINGS_PARTITION_SIZE;

/// Flash range for the settings partition
pub const SETTINGS_RANGE: core::ops::Range<u32> =
    (SETTINGS_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer for map items; a settings record is well under this
const ITEM_BUFFER_SIZE: usize = 256;

/// RP2040 flash-backed settings storage
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Look up `key`, copying the item into `buffer` if found
    async fn fetch(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> Result<Option<usize>, FlashError> {
        let mut item_buffer = [0u8; ITEM_BUFFER_SIZE];

        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut item_buffer,
            &key,
        )
        .await
        .map_err(|_| FlashError::Storage)?;

        let Some(item) = item else {
            return Ok(None);
        };
        let dest = buffer
            .get_mut(..item.len())
            .ok_or(FlashError::BufferTooSmall)?;
        dest.copy_from_slice(item);
        Ok(Some(item.len()))
    }
}

impl<'d> parfocal_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        self.fetch(key, buffer).await?.ok_or(FlashError::NotFound)
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut item_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut item_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        // Large enough for any record this map holds
        let mut scratch = [0u8; ITEM_BUFFER_SIZE];
        matches!(self.fetch(key, &mut scratch).await, Ok(Some(_)))
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.flash
            .erase(SETTINGS_RANGE.start, SETTINGS_RANGE.end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}
