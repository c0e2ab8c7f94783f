//! Flag-register bit layout shared by every ALU and dispatch routine.

pub const FLAG_Z_POS: u8 = 7; // Zero
pub const FLAG_N_POS: u8 = 6; // Subtract
pub const FLAG_H_POS: u8 = 5; // Half carry
pub const FLAG_C_POS: u8 = 4; // Carry

pub const FLAG_Z: u8 = 1 << FLAG_Z_POS;
pub const FLAG_N: u8 = 1 << FLAG_N_POS;
pub const FLAG_H: u8 = 1 << FLAG_H_POS;
pub const FLAG_C: u8 = 1 << FLAG_C_POS;
