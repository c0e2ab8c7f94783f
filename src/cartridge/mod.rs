//! Cartridge image, header, CRAM, and MBC dispatch (§3, §4.2, §6).

pub mod header;
pub mod mbc;
pub mod rtc;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CoreError;
use header::Header;
use mbc::Mbc;

pub struct Cartridge {
    rom: Vec<u8>,
    cram: Vec<u8>,
    mbc: Box<dyn Mbc>,
    pub header: Header,
    has_battery: bool,
    has_rtc: bool,
    save_path: PathBuf,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("title", &self.header.title)
            .field("cartridge_type", &self.header.cartridge_type)
            .field("has_battery", &self.has_battery)
            .finish_non_exhaustive()
    }
}

fn save_path_for(rom_path: &Path) -> PathBuf {
    rom_path.with_extension("sav")
}

impl Cartridge {
    pub fn load(rom_path: &Path, rom_bytes: &[u8]) -> Result<Self, CoreError> {
        let header = Header::parse(rom_bytes)?;
        let rom_banks = header.rom_banks()?;
        let expected_rom_size = rom_banks * 16 * 1024;
        if rom_bytes.len() < expected_rom_size {
            log::warn!(
                "rom '{}' shorter ({} bytes) than header implies ({} bytes)",
                header.title,
                rom_bytes.len(),
                expected_rom_size
            );
        }

        let cram_size = if matches!(header.cartridge_type, 0x05 | 0x06) {
            512 // MBC2 fixed nibble RAM
        } else {
            header.cram_bytes()
        };

        let (mbc, has_battery) = mbc::from_header_type(header.cartridge_type, rom_banks, cram_size)?;
        let has_rtc = matches!(header.cartridge_type, 0x0F | 0x10);

        let mut cartridge = Cartridge {
            rom: rom_bytes.to_vec(),
            cram: vec![0u8; cram_size],
            mbc,
            header,
            has_battery,
            has_rtc,
            save_path: save_path_for(rom_path),
        };

        if has_battery {
            cartridge.load_save_file();
        }

        Ok(cartridge)
    }

    fn load_save_file(&mut self) {
        let bytes = match std::fs::read(&self.save_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
            Err(err) => {
                log::warn!("could not read save file {:?}: {err}", self.save_path);
                return;
            }
        };

        let cram_len = self.cram.len();
        if bytes.len() < cram_len {
            log::warn!("save file {:?} shorter than expected CRAM size", self.save_path);
            return;
        }
        self.cram.copy_from_slice(&bytes[..cram_len]);

        if self.has_rtc {
            if let Some(rtc_bytes) = bytes.get(cram_len..cram_len + 5) {
                let mut arr = [0u8; 5];
                arr.copy_from_slice(rtc_bytes);
                let mut rtc = rtc::Rtc::from_bytes(arr);

                if let Some(ts_bytes) = bytes.get(cram_len + 5..cram_len + 13) {
                    let mut ts_arr = [0u8; 8];
                    ts_arr.copy_from_slice(ts_bytes);
                    let saved_unix = u64::from_le_bytes(ts_arr);
                    let now_unix = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_secs();
                    let delta = now_unix.saturating_sub(saved_unix);
                    if !rtc.is_halted() {
                        rtc.add_seconds(delta);
                    }
                }

                if let Some(live) = self.mbc.rtc_mut() {
                    *live = rtc;
                }
            }
        }
    }

    /// Flushes CRAM (and RTC state, if any) to the `.sav` path. Best-effort:
    /// failures are logged, never propagated as a hard error (§7 kind 2).
    pub fn close(&mut self) {
        if !self.has_battery {
            return;
        }
        if let Err(err) = self.write_save_file() {
            log::warn!("failed to write save file {:?}: {err}", self.save_path);
        }
    }

    fn write_save_file(&self) -> std::io::Result<()> {
        let mut file = std::fs::File::create(&self.save_path)?;
        file.write_all(&self.cram)?;
        if self.has_rtc {
            if let Some(rtc) = self.mbc.rtc() {
                file.write_all(&rtc.to_bytes())?;
                let now_unix = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                file.write_all(&now_unix.to_le_bytes())?;
            }
        }
        Ok(())
    }

    pub fn read_rom(&self, addr: u16) -> u8 {
        self.mbc.read_rom(&self.rom, addr)
    }

    pub fn write_rom_control(&mut self, addr: u16, value: u8) {
        self.mbc.write_rom_control(addr, value);
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        self.mbc.read_ram(&self.cram, addr)
    }

    pub fn write_ram(&mut self, addr: u16, value: u8) {
        self.mbc.write_ram(&mut self.cram, addr, value);
    }

    pub fn tick(&mut self) {
        self.mbc.tick();
    }

    #[cfg(test)]
    pub fn cram(&self) -> &[u8] {
        &self.cram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn make_rom(cart_type: u8, rom_code: u8, ram_code: u8) -> Vec<u8> {
        let mut rom = vec![0u8; 32 * 1024];
        rom[0x0147] = cart_type;
        rom[0x0148] = rom_code;
        rom[0x0149] = ram_code;
        let mut acc: u8 = 0;
        for &byte in &rom[0x0134..=0x014C] {
            acc = acc.wrapping_sub(byte).wrapping_sub(1);
        }
        rom[0x014D] = acc;
        rom
    }

    #[test]
    fn battery_save_round_trips() {
        let dir = std::env::temp_dir().join(format!("dmgcore-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let rom_path = dir.join("game.gb");
        let rom = make_rom(0x13, 0x00, 0x02); // MBC3+RAM+BATTERY, 8KiB RAM
        std::fs::File::create(&rom_path).unwrap().write_all(&rom).unwrap();

        {
            let mut cart = Cartridge::load(&rom_path, &rom).unwrap();
            cart.write_ram(0xA000, 0x5A);
            cart.close();
        }
        {
            let cart = Cartridge::load(&rom_path, &rom).unwrap();
            assert_eq!(cart.cram()[0], 0x5A);
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unsupported_mapper_fails_to_load() {
        let rom = make_rom(0x19, 0x00, 0x00); // MBC5, unsupported
        let result = Cartridge::load(Path::new("x.gb"), &rom);
        assert!(matches!(result, Err(CoreError::UnsupportedMapper { code: 0x19 })));
    }
}
