//! Central address decoder and per-cycle tick fan-out (§4.2, §4.8).

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::apu::Apu;
use crate::audio::AudioBuffer;
use crate::cartridge::Cartridge;
use crate::dma::Dma;
use crate::error::CoreError;
use crate::interrupts::InterruptLatch;
use crate::joypad::{Button, Joypad};
use crate::memory_map::*;
use crate::ppu::Ppu;
use crate::serial::Serial;
use crate::timer::Timer;

pub struct Bus {
    cartridge: Option<Cartridge>,
    wram: Box<[u8; 0x2000]>,
    hram: Box<[u8; 0x7F]>,

    pub interrupts: InterruptLatch,
    pub ppu: Ppu,
    pub apu: Apu,
    pub timer: Timer,
    pub serial: Serial,
    pub joypad: Joypad,
    dma: Dma,
    cycle_count: u64,
}

impl Bus {
    pub fn new(audio: Arc<Mutex<AudioBuffer>>) -> Self {
        Bus {
            cartridge: None,
            wram: Box::new([0; 0x2000]),
            hram: Box::new([0; 0x7F]),
            interrupts: InterruptLatch::new(),
            ppu: Ppu::new(),
            apu: Apu::new(audio),
            timer: Timer::new(),
            serial: Serial::new(),
            joypad: Joypad::new(),
            dma: Dma::new(),
            cycle_count: 0,
        }
    }

    /// Total master-clock cycles ticked since construction. Used by
    /// `Machine::update` to know when it has emulated enough real time.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn load_cartridge(&mut self, rom_path: &Path, rom_bytes: &[u8]) -> Result<(), CoreError> {
        let cartridge = Cartridge::load(rom_path, rom_bytes)?;
        self.cartridge = Some(cartridge);
        Ok(())
    }

    pub fn close_cartridge(&mut self) {
        if let Some(cartridge) = self.cartridge.as_mut() {
            cartridge.close();
        }
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if self.joypad.set_button(button, pressed) {
            self.interrupts.request(crate::interrupts::JOYPAD_BIT);
        }
    }

    pub fn drain_serial_output(&mut self) -> Vec<u8> {
        self.serial.drain_output()
    }

    /// Advances every hardware subsystem by one master-clock cycle.
    pub fn tick(&mut self) {
        self.cycle_count = self.cycle_count.wrapping_add(1);
        self.timer.tick(&mut self.interrupts);
        self.serial.tick(&mut self.interrupts);
        self.ppu.tick(&mut self.interrupts);
        self.apu.tick(self.timer.read_div());
        if let Some(cartridge) = self.cartridge.as_mut() {
            cartridge.tick();
        }
        self.step_dma();
    }

    /// Ticks `m_cycles` machine cycles (4 clock cycles each), as the CPU
    /// calls between bus accesses.
    pub fn tick_m_cycles(&mut self, m_cycles: u32) {
        for _ in 0..(m_cycles * 4) {
            self.tick();
        }
    }

    fn step_dma(&mut self) {
        if let Some((source_addr, oam_index)) = self.dma.tick() {
            let byte = self.read_byte_for_dma(source_addr);
            self.ppu.oam_mut()[oam_index as usize] = byte;
        }
    }

    /// DMA may read from any address except OAM itself; this bypasses the
    /// PPU-mode read restrictions real hardware doesn't model here either.
    fn read_byte_for_dma(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.cartridge.as_ref().map(|c| c.read_rom(addr)).unwrap_or(0xFF),
            0x8000..=0x9FFF => self.ppu.read_vram(addr),
            0xA000..=0xBFFF => self.cartridge.as_ref().map(|c| c.read_ram(addr)).unwrap_or(0xFF),
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize],
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize],
            _ => 0xFF,
        }
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.cartridge.as_ref().map(|c| c.read_rom(addr)).unwrap_or(0xFF),
            VRAM_START..=VRAM_END => self.ppu.read_vram(addr),
            EXT_RAM_START..=EXT_RAM_END => self.cartridge.as_ref().map(|c| c.read_ram(addr)).unwrap_or(0xFF),
            WRAM_BANK_0_START..=WRAM_BANK_N_END => self.wram[(addr - WRAM_BANK_0_START) as usize],
            ECHO_RAM_START..=ECHO_RAM_END => self.wram[(addr - ECHO_RAM_START) as usize],
            OAM_START..=OAM_END => self.ppu.read_oam(addr),
            NOT_USABLE_START..=NOT_USABLE_END => 0xFF,
            P1_JOYP_ADDR => self.joypad.read_p1(),
            SB_ADDR => self.serial.read_sb(),
            SC_ADDR => self.serial.read_sc(),
            DIV_ADDR => self.timer.read_div(),
            TIMA_ADDR => self.timer.read_tima(),
            TMA_ADDR => self.timer.read_tma(),
            TAC_ADDR => self.timer.read_tac(),
            IF_ADDR => self.interrupts.read_if(),
            0xFF10..=0xFF3F => self.apu.read_reg(addr),
            DMA_ADDR => self.dma.source_register(),
            LCDC_ADDR..=WX_ADDR => self.ppu.read_reg(addr),
            HRAM_START..=HRAM_END => self.hram[(addr - HRAM_START) as usize],
            INTERRUPT_ENABLE_REGISTER => self.interrupts.read_ie(),
            _ => {
                log::trace!("read from unmapped address {addr:#06x}");
                0xFF
            }
        }
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => {
                if let Some(cartridge) = self.cartridge.as_mut() {
                    cartridge.write_rom_control(addr, value);
                }
            }
            VRAM_START..=VRAM_END => self.ppu.write_vram(addr, value),
            EXT_RAM_START..=EXT_RAM_END => {
                if let Some(cartridge) = self.cartridge.as_mut() {
                    cartridge.write_ram(addr, value);
                }
            }
            WRAM_BANK_0_START..=WRAM_BANK_N_END => self.wram[(addr - WRAM_BANK_0_START) as usize] = value,
            ECHO_RAM_START..=ECHO_RAM_END => self.wram[(addr - ECHO_RAM_START) as usize] = value,
            OAM_START..=OAM_END => self.ppu.write_oam(addr, value),
            NOT_USABLE_START..=NOT_USABLE_END => {}
            P1_JOYP_ADDR => self.joypad.write_p1(value),
            SB_ADDR => self.serial.write_sb(value),
            SC_ADDR => self.serial.write_sc(value),
            DIV_ADDR => self.timer.write_div(),
            TIMA_ADDR => self.timer.write_tima(value),
            TMA_ADDR => self.timer.write_tma(value),
            TAC_ADDR => self.timer.write_tac(value, &mut self.interrupts),
            IF_ADDR => self.interrupts.write_if(value),
            0xFF10..=0xFF3F => self.apu.write_reg(addr, value),
            DMA_ADDR => self.dma.start(value),
            LCDC_ADDR..=WX_ADDR => self.ppu.write_reg(addr, value),
            HRAM_START..=HRAM_END => self.hram[(addr - HRAM_START) as usize] = value,
            INTERRUPT_ENABLE_REGISTER => self.interrupts.write_ie(value),
            _ => {
                log::trace!("write to unmapped address {addr:#06x} (value {value:#04x})");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_bus() -> Bus {
        Bus::new(Arc::new(Mutex::new(AudioBuffer::new())))
    }

    #[test]
    fn echo_ram_mirrors_working_ram() {
        let mut bus = new_bus();
        bus.write_byte(0xC010, 0x42);
        assert_eq!(bus.read_byte(0xE010), 0x42);
        bus.write_byte(0xE020, 0x99);
        assert_eq!(bus.read_byte(0xC020), 0x99);
    }

    #[test]
    fn unmapped_reads_return_ff() {
        let bus = new_bus();
        assert_eq!(bus.read_byte(0xFEA0), 0xFF);
    }

    #[test]
    fn dma_write_starts_transfer_copied_on_tick() {
        let mut bus = new_bus();
        bus.write_byte(0xC000, 0xAB);
        bus.write_byte(DMA_ADDR, 0xC0);
        for _ in 0..(4 + 4) {
            bus.tick();
        }
        assert_eq!(bus.read_byte(OAM_START), 0xAB);
    }

    #[test]
    fn hram_round_trips() {
        let mut bus = new_bus();
        bus.write_byte(0xFF80, 7);
        assert_eq!(bus.read_byte(0xFF80), 7);
    }
}
