//! A cycle-accurate DMG (original monochrome Game Boy) hardware-emulation
//! core: CPU, memory bus, MBC/cartridge, timer, serial, PPU, APU, DMA and
//! joypad. Host concerns (window, audio sink, file dialogs, debug UI) stay
//! outside the crate; see [`Machine`] for the interface a host drives.

pub mod apu;
pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod dma;
pub mod error;
pub mod interrupts;
pub mod joypad;
mod machine;
mod memory_map;
pub mod ppu;
pub mod serial;
pub mod timer;

pub use error::{CoreError, OpcodeFault};
pub use joypad::Button;
pub use machine::Machine;
