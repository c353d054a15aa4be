//! Flash-backed key/value store.
//!
//! The whole namespace image lives in the last 4 KiB sector of the first
//! writable data partition, as one postcard record behind a checksummed
//! header. Reads are served from RAM; `commit` rewrites the sector.

use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use log::{info, warn};
use traindisplay_core::settings::{KeyValueStore, KvImage, StorageError, Value};

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 16 * 1024 * 1024;

const RECORD_MAGIC: u32 = 0x3153_4454; // "TDS1"
const RECORD_VERSION: u8 = 1;
/// magic(4) version(1) reserved(1) len(2) checksum(4)
const HEADER_LEN: usize = 12;
const MAX_PAYLOAD_LEN: usize = FLASH_SECTOR_SIZE as usize - HEADER_LEN;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NvsStoreError {
    PartitionTable,
    PartitionMissing,
    PartitionTooSmall,
    FlashOpFailed(i32),
    Corrupted,
    Unsupported,
}

impl From<NvsStoreError> for StorageError {
    fn from(err: NvsStoreError) -> Self {
        match err {
            NvsStoreError::Corrupted => StorageError::Corrupted,
            _ => StorageError::Backend,
        }
    }
}

#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, NvsStoreError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(NvsStoreError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), NvsStoreError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(NvsStoreError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(NvsStoreError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, NvsStoreError> {
        if !addr.is_multiple_of(4) {
            return Err(NvsStoreError::Unsupported);
        }

        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(NvsStoreError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), NvsStoreError> {
        if !addr.is_multiple_of(4) {
            return Err(NvsStoreError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(NvsStoreError::FlashOpFailed(rc));
        }
        Ok(())
    }

    /// Word-aligned reads covering `out`, which may start unaligned.
    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), NvsStoreError> {
        let start = addr & !0b11;
        let end = (addr + out.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let bytes = self.read_word(word_addr)?.to_le_bytes();
            for (i, byte) in bytes.iter().enumerate() {
                let pos = (word_addr + i as u32).wrapping_sub(addr) as usize;
                if let Some(slot) = out.get_mut(pos) {
                    *slot = *byte;
                }
            }
        }
        Ok(())
    }

    /// Writes into an erased region; bytes outside `data` stay 0xFF.
    fn write_erased_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), NvsStoreError> {
        let start = addr & !0b11;
        let end = (addr + data.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let mut bytes = [0xFFu8; 4];
            for (i, slot) in bytes.iter_mut().enumerate() {
                let pos = (word_addr + i as u32).wrapping_sub(addr) as usize;
                if let Some(byte) = data.get(pos) {
                    *slot = *byte;
                }
            }
            self.write_word(word_addr, u32::from_le_bytes(bytes))?;
        }
        Ok(())
    }
}

impl ReadStorage for RawFlash {
    type Error = NvsStoreError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(NvsStoreError::Unsupported)
    }
}

/// `KeyValueStore` persisted to one flash sector.
#[derive(Debug)]
pub struct NvsStore {
    flash: RawFlash,
    sector_addr: u32,
    image: KvImage,
    dirty: bool,
}

impl NvsStore {
    /// Locates the settings sector and loads the stored image. A missing or
    /// damaged record starts an empty namespace.
    pub fn open() -> Result<Self, NvsStoreError> {
        let mut flash = RawFlash::new()?;
        let sector_addr = locate_sector(&mut flash)?;

        let mut store = Self {
            flash,
            sector_addr,
            image: KvImage::new(),
            dirty: false,
        };

        match store.load() {
            Ok(Some(image)) => {
                info!("nvs: loaded {} keys", image.len());
                store.image = image;
            }
            Ok(None) => info!("nvs: no stored settings"),
            Err(err) => warn!("nvs: stored settings unreadable ({:?}), starting empty", err),
        }
        Ok(store)
    }

    pub fn image(&self) -> &KvImage {
        &self.image
    }

    fn load(&mut self) -> Result<Option<KvImage>, NvsStoreError> {
        let mut header = [0u8; HEADER_LEN];
        self.flash.read_bytes(self.sector_addr, &mut header)?;

        if header.iter().all(|b| *b == 0xFF) {
            return Ok(None);
        }

        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if magic != RECORD_MAGIC || header[4] != RECORD_VERSION {
            return Ok(None);
        }

        let len = u16::from_le_bytes([header[6], header[7]]) as usize;
        if len > MAX_PAYLOAD_LEN {
            return Err(NvsStoreError::Corrupted);
        }
        let expected = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

        let mut payload = [0u8; MAX_PAYLOAD_LEN];
        self.flash
            .read_bytes(self.sector_addr + HEADER_LEN as u32, &mut payload[..len])?;
        if checksum32(&payload[..len]) != expected {
            return Err(NvsStoreError::Corrupted);
        }

        postcard::from_bytes(&payload[..len])
            .map(Some)
            .map_err(|_| NvsStoreError::Corrupted)
    }

    fn save(&mut self) -> Result<(), StorageError> {
        let mut record = [0xFFu8; FLASH_SECTOR_SIZE as usize];
        let len = postcard::to_slice(&self.image, &mut record[HEADER_LEN..])
            .map_err(|_| StorageError::Full)?
            .len();

        let checksum = checksum32(&record[HEADER_LEN..HEADER_LEN + len]);
        record[0..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        record[4] = RECORD_VERSION;
        record[5] = 0;
        record[6..8].copy_from_slice(&(len as u16).to_le_bytes());
        record[8..12].copy_from_slice(&checksum.to_le_bytes());

        self.flash.erase_sector(self.sector_addr)?;
        self.flash
            .write_erased_bytes(self.sector_addr, &record[..HEADER_LEN + len])?;
        Ok(())
    }
}

impl KeyValueStore for NvsStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.image.get(key)
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        if self.image.put(key, value)? {
            self.dirty = true;
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.image.remove(key) {
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        self.save()?;
        self.dirty = false;
        Ok(())
    }
}

/// Last sector of the first writable "undefined" data partition, falling
/// back to the NVS partition.
fn locate_sector(flash: &mut RawFlash) -> Result<u32, NvsStoreError> {
    let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
    let table =
        read_partition_table(flash, &mut table_buf).map_err(|_| NvsStoreError::PartitionTable)?;

    let mut data_undefined: Option<(u32, u32)> = None;
    let mut fallback_nvs: Option<(u32, u32)> = None;

    for entry in table.iter() {
        if entry.is_read_only() || entry.len() < FLASH_SECTOR_SIZE {
            continue;
        }

        match entry.partition_type() {
            PartitionType::Data(DataPartitionSubType::Undefined) => {
                data_undefined = Some((entry.offset(), entry.len()));
                break;
            }
            PartitionType::Data(DataPartitionSubType::Nvs) if fallback_nvs.is_none() => {
                fallback_nvs = Some((entry.offset(), entry.len()));
            }
            _ => {}
        }
    }

    let (offset, len) = data_undefined
        .or(fallback_nvs)
        .ok_or(NvsStoreError::PartitionMissing)?;
    if len < FLASH_SECTOR_SIZE {
        return Err(NvsStoreError::PartitionTooSmall);
    }
    Ok(offset + len - FLASH_SECTOR_SIZE)
}

/// FNV-1a.
fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C_9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}
