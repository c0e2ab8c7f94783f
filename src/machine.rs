//! The single host-facing aggregate (§6, §9 design note): owns `Cpu` and
//! `Bus` by value and hands each a `&mut` to the other only for the
//! duration of a call, so neither ever holds a back-pointer to the other.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::audio::AudioBuffer;
use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::error::{CoreError, OpcodeFault};
use crate::joypad::Button;
use crate::ppu::FRAME_BUFFER_SIZE;

const CLOCKS_PER_SECOND: f32 = 4_194_304.0;
/// `update` clamps `delta_time` so a host that stalls (breakpoint, window
/// drag) doesn't ask the core to fast-forward an unbounded amount of time.
const MAX_DELTA_TIME: f32 = 0.125;

pub struct Machine {
    cpu: Cpu,
    bus: Bus,
    audio: Arc<Mutex<AudioBuffer>>,
    paused: bool,
    speed_scale: f32,
}

impl Machine {
    pub fn new() -> Self {
        let audio = Arc::new(Mutex::new(AudioBuffer::new()));
        Machine {
            cpu: Cpu::new(),
            bus: Bus::new(audio.clone()),
            audio,
            paused: false,
            speed_scale: 1.0,
        }
    }

    /// Loads a cartridge image, replacing any previously loaded one and
    /// resetting CPU/bus state to the post-boot-ROM register values.
    pub fn load(&mut self, path: &Path, rom_bytes: &[u8]) -> Result<(), CoreError> {
        self.bus.load_cartridge(path, rom_bytes)?;
        self.cpu = Cpu::new();
        Ok(())
    }

    /// Flushes the battery-backed save file, if any. Save I/O failures are
    /// logged and swallowed (§7 kind 2), so this never fails in practice;
    /// it returns `Result` to leave room for a future hard-failure path.
    pub fn close(&mut self) -> Result<(), CoreError> {
        self.bus.close_cartridge();
        Ok(())
    }

    /// Runs CPU steps until the emulated clock has advanced by
    /// `4_194_304 * delta_time * speed_scale` cycles, or the core is paused.
    pub fn update(&mut self, delta_time: f32) {
        if self.paused {
            return;
        }
        if let Some(fault) = self.cpu.fault() {
            log::error!("core halted on {fault}, update() is a no-op until reloaded");
            return;
        }

        let delta = delta_time.clamp(0.0, MAX_DELTA_TIME);
        let target_cycles = (CLOCKS_PER_SECOND * delta * self.speed_scale) as u64;
        let start = self.bus.cycle_count();
        while self.bus.cycle_count().wrapping_sub(start) < target_cycles {
            self.cpu.step(&mut self.bus);
            if self.cpu.fault().is_some() {
                break;
            }
        }
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.bus.set_button(button, pressed);
    }

    pub fn read_framebuffer(&self) -> &[u8; FRAME_BUFFER_SIZE] {
        self.bus.ppu.read_framebuffer()
    }

    pub fn drain_serial_output(&mut self) -> Vec<u8> {
        self.bus.drain_serial_output()
    }

    pub fn audio_pull(&mut self, n: usize) -> (Vec<f32>, Vec<f32>) {
        self.audio.lock().unwrap().pull(n)
    }

    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_speed(&mut self, speed_scale: f32) {
        self.speed_scale = speed_scale;
    }

    /// `Some` once the CPU has hit an undefined opcode and parked itself;
    /// a debug host can poll this to show the faulting PC/opcode.
    pub fn fault(&self) -> Option<OpcodeFault> {
        self.cpu.fault()
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x0100] = 0x00; // NOP
        rom[0x0101] = 0xC3; // JP 0x0150
        rom[0x0102] = 0x50;
        rom[0x0103] = 0x01;
        rom[0x0147] = 0x00; // ROM ONLY
        rom[0x0148] = 0x00; // 32 KiB
        rom[0x0149] = 0x00; // no RAM
        let checksum = rom[0x0134..=0x014C].iter().fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
        rom[0x014D] = checksum;
        rom
    }

    #[test]
    fn update_advances_cpu_past_boot_entry_point() {
        let mut machine = Machine::new();
        let rom = blank_rom();
        machine.load(Path::new("test.gb"), &rom).unwrap();
        machine.update(0.016);
        assert!(machine.cpu.pc() >= 0x0150);
    }

    #[test]
    fn paused_machine_does_not_advance() {
        let mut machine = Machine::new();
        let rom = blank_rom();
        machine.load(Path::new("test.gb"), &rom).unwrap();
        machine.pause(true);
        let pc_before = machine.cpu.pc();
        machine.update(0.016);
        assert_eq!(machine.cpu.pc(), pc_before);
    }

    #[test]
    fn double_speed_advances_the_clock_roughly_twice_as_far() {
        let mut slow = Machine::new();
        let mut fast = Machine::new();
        let rom = blank_rom();
        slow.load(Path::new("slow.gb"), &rom).unwrap();
        fast.load(Path::new("fast.gb"), &rom).unwrap();
        fast.set_speed(2.0);

        slow.update(0.01);
        fast.update(0.01);

        // Not an exact factor of two: each call's cycle budget is only
        // checked between CPU steps, so the last instruction of a run can
        // overshoot its target by a handful of cycles.
        let slow_cycles = slow.bus.cycle_count();
        let fast_cycles = fast.bus.cycle_count();
        assert!(fast_cycles > slow_cycles * 19 / 10);
    }
}
