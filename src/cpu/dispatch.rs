//! Exhaustive `match` dispatch over all 256 primary opcodes and all 256
//! CB-prefixed opcodes. Deliberately not a function-pointer table: every
//! opcode's timing and side effects are visible at its own match arm.

use super::Cpu;
use crate::bus::Bus;
use crate::error::OpcodeFault;

impl Cpu {
    /// Maps the 3-bit register-index encoding shared by `LD r,r'` and the
    /// ALU-A block: 0=B 1=C 2=D 3=E 4=H 5=L 6=(HL) 7=A.
    fn read_r8(&mut self, bus: &mut Bus, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            6 => {
                let hl = self.hl();
                self.read_byte(bus, hl)
            }
            7 => self.a,
            _ => unreachable!("register index out of range: {index}"),
        }
    }

    fn write_r8(&mut self, bus: &mut Bus, index: u8, value: u8) {
        match index {
            0 => self.b = value,
            1 => self.c = value,
            2 => self.d = value,
            3 => self.e = value,
            4 => self.h = value,
            5 => self.l = value,
            6 => {
                let hl = self.hl();
                self.write_byte(bus, hl, value);
            }
            7 => self.a = value,
            _ => unreachable!("register index out of range: {index}"),
        }
    }

    fn illegal_opcode(&mut self, opcode: u8) {
        let pc = self.pc.wrapping_sub(1);
        log::error!("undefined opcode {opcode:#04x} at pc {pc:#06x}; halting emulation");
        self.paused_on_fault = Some(OpcodeFault { pc, opcode, prefixed: false });
    }

    /// Relative jump shared by `JR`/`JR cc`: always reads the offset byte,
    /// only pays the extra internal-delay M-cycle when the branch is taken.
    fn jr(&mut self, bus: &mut Bus, take: bool) {
        let offset = self.fetch_byte(bus) as i8;
        if take {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
            bus.tick_m_cycles(1);
        }
    }

    fn jp(&mut self, bus: &mut Bus, take: bool) {
        let target = self.fetch_word(bus);
        if take {
            self.pc = target;
            bus.tick_m_cycles(1);
        }
    }

    fn call(&mut self, bus: &mut Bus, take: bool) {
        let target = self.fetch_word(bus);
        if take {
            bus.tick_m_cycles(1);
            let pc = self.pc;
            self.push_word(bus, pc);
            self.pc = target;
        }
    }

    fn ret(&mut self, bus: &mut Bus, take: bool) {
        if take {
            self.pc = self.pop_word(bus);
            bus.tick_m_cycles(1);
        }
    }

    fn rst(&mut self, bus: &mut Bus, vector: u16) {
        bus.tick_m_cycles(1);
        let pc = self.pc;
        self.push_word(bus, pc);
        self.pc = vector;
    }

    pub(super) fn execute(&mut self, bus: &mut Bus, opcode: u8) {
        match opcode {
            0x00 => {}
            0x01 => {
                let value = self.fetch_word(bus);
                self.set_bc(value);
            }
            0x02 => {
                let addr = self.bc();
                let a = self.a;
                self.write_byte(bus, addr, a);
            }
            0x03 => {
                self.set_bc(self.bc().wrapping_add(1));
                bus.tick_m_cycles(1);
            }
            0x04 => self.b = self.inc8(self.b),
            0x05 => self.b = self.dec8(self.b),
            0x06 => self.b = self.fetch_byte(bus),
            0x07 => {
                self.a = self.rlc(self.a);
                self.set_flag(super::constants::FLAG_Z, false);
            }
            0x08 => {
                let addr = self.fetch_word(bus);
                let sp = self.sp;
                self.write_byte(bus, addr, sp as u8);
                self.write_byte(bus, addr.wrapping_add(1), (sp >> 8) as u8);
            }
            0x09 => {
                self.add_hl(self.bc());
                bus.tick_m_cycles(1);
            }
            0x0A => {
                let addr = self.bc();
                self.a = self.read_byte(bus, addr);
            }
            0x0B => {
                self.set_bc(self.bc().wrapping_sub(1));
                bus.tick_m_cycles(1);
            }
            0x0C => self.c = self.inc8(self.c),
            0x0D => self.c = self.dec8(self.c),
            0x0E => self.c = self.fetch_byte(bus),
            0x0F => {
                self.a = self.rrc(self.a);
                self.set_flag(super::constants::FLAG_Z, false);
            }

            0x10 => {
                // STOP: consumes the padding byte; low-power mode itself is
                // out of scope without a real button-wake path.
                self.fetch_byte(bus);
            }
            0x11 => {
                let value = self.fetch_word(bus);
                self.set_de(value);
            }
            0x12 => {
                let addr = self.de();
                let a = self.a;
                self.write_byte(bus, addr, a);
            }
            0x13 => {
                self.set_de(self.de().wrapping_add(1));
                bus.tick_m_cycles(1);
            }
            0x14 => self.d = self.inc8(self.d),
            0x15 => self.d = self.dec8(self.d),
            0x16 => self.d = self.fetch_byte(bus),
            0x17 => {
                self.a = self.rl(self.a);
                self.set_flag(super::constants::FLAG_Z, false);
            }
            0x18 => self.jr(bus, true),
            0x19 => {
                self.add_hl(self.de());
                bus.tick_m_cycles(1);
            }
            0x1A => {
                let addr = self.de();
                self.a = self.read_byte(bus, addr);
            }
            0x1B => {
                self.set_de(self.de().wrapping_sub(1));
                bus.tick_m_cycles(1);
            }
            0x1C => self.e = self.inc8(self.e),
            0x1D => self.e = self.dec8(self.e),
            0x1E => self.e = self.fetch_byte(bus),
            0x1F => {
                self.a = self.rr(self.a);
                self.set_flag(super::constants::FLAG_Z, false);
            }

            0x20 => {
                let take = !self.flag(super::constants::FLAG_Z);
                self.jr(bus, take);
            }
            0x21 => {
                let value = self.fetch_word(bus);
                self.set_hl(value);
            }
            0x22 => {
                let addr = self.hl();
                let a = self.a;
                self.write_byte(bus, addr, a);
                self.set_hl(addr.wrapping_add(1));
            }
            0x23 => {
                self.set_hl(self.hl().wrapping_add(1));
                bus.tick_m_cycles(1);
            }
            0x24 => self.h = self.inc8(self.h),
            0x25 => self.h = self.dec8(self.h),
            0x26 => self.h = self.fetch_byte(bus),
            0x27 => self.daa(),
            0x28 => {
                let take = self.flag(super::constants::FLAG_Z);
                self.jr(bus, take);
            }
            0x29 => {
                self.add_hl(self.hl());
                bus.tick_m_cycles(1);
            }
            0x2A => {
                let addr = self.hl();
                self.a = self.read_byte(bus, addr);
                self.set_hl(addr.wrapping_add(1));
            }
            0x2B => {
                self.set_hl(self.hl().wrapping_sub(1));
                bus.tick_m_cycles(1);
            }
            0x2C => self.l = self.inc8(self.l),
            0x2D => self.l = self.dec8(self.l),
            0x2E => self.l = self.fetch_byte(bus),
            0x2F => self.cpl(),

            0x30 => {
                let take = !self.flag(super::constants::FLAG_C);
                self.jr(bus, take);
            }
            0x31 => self.sp = self.fetch_word(bus),
            0x32 => {
                let addr = self.hl();
                let a = self.a;
                self.write_byte(bus, addr, a);
                self.set_hl(addr.wrapping_sub(1));
            }
            0x33 => {
                self.sp = self.sp.wrapping_add(1);
                bus.tick_m_cycles(1);
            }
            0x34 => {
                let addr = self.hl();
                let value = self.read_byte(bus, addr);
                let result = self.inc8(value);
                self.write_byte(bus, addr, result);
            }
            0x35 => {
                let addr = self.hl();
                let value = self.read_byte(bus, addr);
                let result = self.dec8(value);
                self.write_byte(bus, addr, result);
            }
            0x36 => {
                let value = self.fetch_byte(bus);
                let addr = self.hl();
                self.write_byte(bus, addr, value);
            }
            0x37 => self.scf(),
            0x38 => {
                let take = self.flag(super::constants::FLAG_C);
                self.jr(bus, take);
            }
            0x39 => {
                self.add_hl(self.sp);
                bus.tick_m_cycles(1);
            }
            0x3A => {
                let addr = self.hl();
                self.a = self.read_byte(bus, addr);
                self.set_hl(addr.wrapping_sub(1));
            }
            0x3B => {
                self.sp = self.sp.wrapping_sub(1);
                bus.tick_m_cycles(1);
            }
            0x3C => self.a = self.inc8(self.a),
            0x3D => self.a = self.dec8(self.a),
            0x3E => self.a = self.fetch_byte(bus),
            0x3F => self.ccf(),

            0x76 => self.halted = true,
            0x40..=0x7F => {
                let dst = (opcode >> 3) & 0x07;
                let src = opcode & 0x07;
                let value = self.read_r8(bus, src);
                self.write_r8(bus, dst, value);
            }

            0x80..=0xBF => {
                let src = opcode & 0x07;
                let value = self.read_r8(bus, src);
                match (opcode >> 3) & 0x07 {
                    0 => self.add_a(value, false),
                    1 => self.add_a(value, true),
                    2 => self.sub_a_apply(value, false),
                    3 => self.sub_a_apply(value, true),
                    4 => self.and_a(value),
                    5 => self.xor_a(value),
                    6 => self.or_a(value),
                    7 => self.cp_a(value),
                    _ => unreachable!(),
                }
            }

            0xC0 => {
                let take = !self.flag(super::constants::FLAG_Z);
                bus.tick_m_cycles(1);
                self.ret(bus, take);
            }
            0xC1 => {
                let value = self.pop_word(bus);
                self.set_bc(value);
            }
            0xC2 => {
                let take = !self.flag(super::constants::FLAG_Z);
                self.jp(bus, take);
            }
            0xC3 => self.jp(bus, true),
            0xC4 => {
                let take = !self.flag(super::constants::FLAG_Z);
                self.call(bus, take);
            }
            0xC5 => {
                bus.tick_m_cycles(1);
                let bc = self.bc();
                self.push_word(bus, bc);
            }
            0xC6 => {
                let value = self.fetch_byte(bus);
                self.add_a(value, false);
            }
            0xC7 => self.rst(bus, 0x00),
            0xC8 => {
                let take = self.flag(super::constants::FLAG_Z);
                bus.tick_m_cycles(1);
                self.ret(bus, take);
            }
            0xC9 => self.ret(bus, true),
            0xCA => {
                let take = self.flag(super::constants::FLAG_Z);
                self.jp(bus, take);
            }
            0xCB => {
                let cb_opcode = self.fetch_byte(bus);
                self.execute_cb(bus, cb_opcode);
            }
            0xCC => {
                let take = self.flag(super::constants::FLAG_Z);
                self.call(bus, take);
            }
            0xCD => self.call(bus, true),
            0xCE => {
                let value = self.fetch_byte(bus);
                self.add_a(value, true);
            }
            0xCF => self.rst(bus, 0x08),

            0xD0 => {
                let take = !self.flag(super::constants::FLAG_C);
                bus.tick_m_cycles(1);
                self.ret(bus, take);
            }
            0xD1 => {
                let value = self.pop_word(bus);
                self.set_de(value);
            }
            0xD2 => {
                let take = !self.flag(super::constants::FLAG_C);
                self.jp(bus, take);
            }
            0xD4 => {
                let take = !self.flag(super::constants::FLAG_C);
                self.call(bus, take);
            }
            0xD5 => {
                bus.tick_m_cycles(1);
                let de = self.de();
                self.push_word(bus, de);
            }
            0xD6 => {
                let value = self.fetch_byte(bus);
                self.sub_a_apply(value, false);
            }
            0xD7 => self.rst(bus, 0x10),
            0xD8 => {
                let take = self.flag(super::constants::FLAG_C);
                bus.tick_m_cycles(1);
                self.ret(bus, take);
            }
            0xD9 => {
                self.pc = self.pop_word(bus);
                self.ime = true;
                self.ime_scheduled = None;
            }
            0xDA => {
                let take = self.flag(super::constants::FLAG_C);
                self.jp(bus, take);
            }
            0xDC => {
                let take = self.flag(super::constants::FLAG_C);
                self.call(bus, take);
            }
            0xDE => {
                let value = self.fetch_byte(bus);
                self.sub_a_apply(value, true);
            }
            0xDF => self.rst(bus, 0x18),

            0xE0 => {
                let offset = self.fetch_byte(bus);
                let addr = 0xFF00 | offset as u16;
                let a = self.a;
                self.write_byte(bus, addr, a);
            }
            0xE1 => {
                let value = self.pop_word(bus);
                self.set_hl(value);
            }
            0xE2 => {
                let addr = 0xFF00 | self.c as u16;
                let a = self.a;
                self.write_byte(bus, addr, a);
            }
            0xE5 => {
                bus.tick_m_cycles(1);
                let hl = self.hl();
                self.push_word(bus, hl);
            }
            0xE6 => {
                let value = self.fetch_byte(bus);
                self.and_a(value);
            }
            0xE7 => self.rst(bus, 0x20),
            0xE8 => {
                let offset = self.fetch_byte(bus) as i8;
                let result = self.add_sp_signed(offset);
                bus.tick_m_cycles(2);
                self.sp = result;
            }
            0xE9 => self.pc = self.hl(),
            0xEA => {
                let addr = self.fetch_word(bus);
                let a = self.a;
                self.write_byte(bus, addr, a);
            }
            0xEE => {
                let value = self.fetch_byte(bus);
                self.xor_a(value);
            }
            0xEF => self.rst(bus, 0x28),

            0xF0 => {
                let offset = self.fetch_byte(bus);
                let addr = 0xFF00 | offset as u16;
                self.a = self.read_byte(bus, addr);
            }
            0xF1 => {
                let value = self.pop_word(bus);
                self.set_af(value);
            }
            0xF2 => {
                let addr = 0xFF00 | self.c as u16;
                self.a = self.read_byte(bus, addr);
            }
            0xF3 => {
                self.ime = false;
                self.ime_scheduled = None;
            }
            0xF5 => {
                bus.tick_m_cycles(1);
                let af = self.af();
                self.push_word(bus, af);
            }
            0xF6 => {
                let value = self.fetch_byte(bus);
                self.or_a(value);
            }
            0xF7 => self.rst(bus, 0x30),
            0xF8 => {
                let offset = self.fetch_byte(bus) as i8;
                let result = self.add_sp_signed(offset);
                bus.tick_m_cycles(1);
                self.set_hl(result);
            }
            0xF9 => {
                self.sp = self.hl();
                bus.tick_m_cycles(1);
            }
            0xFA => {
                let addr = self.fetch_word(bus);
                self.a = self.read_byte(bus, addr);
            }
            0xFB => self.schedule_ei(),
            0xFE => {
                let value = self.fetch_byte(bus);
                self.cp_a(value);
            }
            0xFF => self.rst(bus, 0x38),

            0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => {
                self.illegal_opcode(opcode);
            }
        }
    }

    fn execute_cb(&mut self, bus: &mut Bus, opcode: u8) {
        let target = opcode & 0x07;
        let bit_index = (opcode >> 3) & 0x07;
        let group = (opcode >> 6) & 0x03;

        match group {
            0 => {
                // Rotates/shifts, selected by bits 3-5.
                let value = self.read_r8(bus, target);
                let result = match bit_index {
                    0 => self.rlc(value),
                    1 => self.rrc(value),
                    2 => self.rl(value),
                    3 => self.rr(value),
                    4 => self.sla(value),
                    5 => self.sra(value),
                    6 => self.swap(value),
                    7 => self.srl(value),
                    _ => unreachable!(),
                };
                self.write_r8(bus, target, result);
            }
            1 => {
                let value = self.read_r8(bus, target);
                self.bit(value, bit_index);
            }
            2 => {
                let value = self.read_r8(bus, target) & !(1 << bit_index);
                self.write_r8(bus, target, value);
            }
            3 => {
                let value = self.read_r8(bus, target) | (1 << bit_index);
                self.write_r8(bus, target, value);
            }
            _ => unreachable!(),
        }
    }
}
