//! Machine state implementation: register file, memory map, status flags.

use core::fmt;

/// Total addressable memory.
pub const MEMORY_SIZE: usize = 256;
/// Cells of the display surface, at the top of memory.
pub const VIDEO_RAM: usize = 64;
/// Cells of the character table, directly below the display.
pub const CHAR_MEM: usize = 32;
/// First address of the character table.
pub const CHAR_BASE: usize = MEMORY_SIZE - VIDEO_RAM - CHAR_MEM;
/// First address of the display surface.
pub const VIDEO_BASE: usize = MEMORY_SIZE - VIDEO_RAM;
/// Bytes available to a loaded program. Everything above belongs to the
/// character table and the display.
pub const PROGRAM_CAPACITY: usize = CHAR_BASE;

/// One of the three general registers.
///
/// The discriminant is the 2-bit operand code used in instruction bytes;
/// code 0 is the "immediate follows" marker and names no register, which is
/// why [`Reg::from_code`] returns an [`Option`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Reg {
    Al = 1,
    Bl = 2,
    Cl = 3,
}

impl Reg {
    /// All registers, in file order.
    pub const VARIANTS: &'static [Reg] = &[Reg::Al, Reg::Bl, Reg::Cl];

    /// Gets a register from a 2-bit operand code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Al),
            2 => Some(Self::Bl),
            3 => Some(Self::Cl),
            _ => None,
        }
    }

    /// Operand code of this register.
    pub const fn to_code(self) -> u8 {
        self as u8
    }

    /// Assembly name of this register.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Al => "AL",
            Self::Bl => "BL",
            Self::Cl => "CL",
        }
    }

    /// Looks a register up by its assembly name. Case-sensitive.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "AL" => Some(Self::Al),
            "BL" => Some(Self::Bl),
            "CL" => Some(Self::Cl),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize - 1
    }
}

/// The machine. Owns the register file and the flat 256-byte memory; nothing
/// else aliases either.
///
/// [`Cpu::new`] zeroes everything and seeds the character table, then
/// [`Cpu::load`] places a Program Image at address 0. Execution lives in
/// [`crate::runner`].
#[derive(Clone, Debug)]
pub struct Cpu {
    /// Program counter, addressing the program region.
    pub pc: u8,
    pub carry: bool,
    pub zero: bool,
    /// Most recently fetched instruction byte.
    pub ir: u8,
    pub regs: [u8; 3],
    pub ram: [u8; MEMORY_SIZE],
}

impl Cpu {
    /// Allocates a machine with zeroed registers and memory and a seeded
    /// character table. Cell 160 holds the space glyph, 161..=186 hold
    /// `A`..=`Z`, 187..=191 hold `.` `,` `!` `?` `:`.
    pub fn new() -> Self {
        let mut ram = [0; MEMORY_SIZE];

        ram[CHAR_BASE] = b' ';
        for i in 0..26u8 {
            ram[CHAR_BASE + 1 + i as usize] = b'A' + i;
        }
        for (off, glyph) in [b'.', b',', b'!', b'?', b':'].into_iter().enumerate() {
            ram[CHAR_BASE + 27 + off] = glyph;
        }

        Self {
            pc: 0,
            carry: false,
            zero: false,
            ir: 0,
            regs: [0; 3],
            ram,
        }
    }

    /// Gets value of a register.
    pub fn get_register(&self, reg: Reg) -> u8 {
        self.regs[reg.index()]
    }

    /// Sets value of a register.
    pub fn set_register(&mut self, reg: Reg, v: u8) {
        self.regs[reg.index()] = v;
    }

    /// Places a Program Image at address 0.
    ///
    /// Rejects an image that would spill into the character table or the
    /// display; exactly [`PROGRAM_CAPACITY`] bytes still fit.
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > PROGRAM_CAPACITY {
            return Err(LoadError { len: program.len() });
        }
        self.ram[..program.len()].copy_from_slice(program);

        Ok(())
    }

    /// The 64-cell display surface. Each cell holds an index into the
    /// character table.
    pub fn display(&self) -> &[u8] {
        &self.ram[VIDEO_BASE..]
    }

    /// Glyph currently shown at a display cell, resolved through the
    /// character table. The table address wraps modulo 256 when a cell
    /// holds an out-of-table index.
    ///
    /// Panics if `cell >= VIDEO_RAM`.
    pub fn glyph(&self, cell: usize) -> u8 {
        let addr = self.ram[VIDEO_BASE + cell].wrapping_add(CHAR_BASE as u8);

        self.ram[addr as usize]
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Program Image does not fit below the character table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadError {
    pub len: usize,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "program too big: {} bytes, capacity is {PROGRAM_CAPACITY}",
            self.len
        )
    }
}
#[cfg(not(feature = "no-std"))]
impl std::error::Error for LoadError {}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use super::*;

    #[test]
    fn region_boundaries() {
        assert_eq!(CHAR_BASE, 160);
        assert_eq!(VIDEO_BASE, 192);
        assert_eq!(PROGRAM_CAPACITY, 160);
    }

    #[test]
    fn character_table() {
        let cpu = Cpu::new();

        assert_eq!(cpu.ram[CHAR_BASE], b' ');
        assert_eq!(cpu.ram[CHAR_BASE + 1], b'A');
        assert_eq!(cpu.ram[CHAR_BASE + 26], b'Z');

        for (off, glyph) in [(27, b'.'), (28, b','), (29, b'!'), (30, b'?'), (31, b':')] {
            assert_eq!(cpu.ram[CHAR_BASE + off], glyph);
        }
    }

    #[test]
    fn register_file() {
        let mut cpu = Cpu::new();

        for (i, reg) in Reg::VARIANTS.iter().enumerate() {
            cpu.set_register(*reg, 40 + i as u8);
        }

        assert_eq!(cpu.regs, [40, 41, 42]);
        assert_eq!(cpu.get_register(Reg::Cl), 42);
    }

    #[test]
    fn reg_codes() {
        assert_eq!(Reg::from_code(0), None);
        for reg in Reg::VARIANTS {
            assert_eq!(Reg::from_code(reg.to_code()), Some(*reg));
            assert_eq!(Reg::from_name(reg.name()), Some(*reg));
        }
        assert_eq!(Reg::from_name("al"), None);
    }

    #[test]
    fn load_respects_capacity() {
        let mut cpu = Cpu::new();

        assert_eq!(cpu.load(&vec![0x00; PROGRAM_CAPACITY]), Ok(()));
        assert_eq!(
            cpu.load(&vec![0x00; PROGRAM_CAPACITY + 1]),
            Err(LoadError { len: 161 })
        );
        // the failed load must not have clobbered the character table
        assert_eq!(cpu.ram[CHAR_BASE], b' ');
    }

    #[test]
    fn display_starts_blank() {
        let cpu = Cpu::new();

        assert!(cpu.display().iter().all(|cell| *cell == 0));
        for cell in 0..VIDEO_RAM {
            assert_eq!(cpu.glyph(cell), b' ');
        }
    }
}
