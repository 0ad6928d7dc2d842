//! The fetch-decode-execute cycle.
//!
//! [`Cpu::step`] runs one cycle, [`Cpu::run`] loops until the machine
//! stops. Opcode 0 doubles as the halt signal: the cycle exits the moment
//! it decodes opcode 0, before any execute stage, so `NOP` never runs as an
//! in-program no-op.
//!
//! # Example
//! ```
//! # use t8_base::{vm::{Cpu, Reg}, runner::Signal};
//! #
//! let mut cpu = Cpu::new();
//! cpu.load(&[
//!     0x34, 0x2A, // LOAD AL,42
//!     0x00,       // NOP
//! ]).unwrap();
//!
//! assert_eq!(cpu.step(), Signal::Continue);
//! assert_eq!(cpu.step(), Signal::Halt);
//! assert_eq!(cpu.get_register(Reg::Al), 42);
//! ```

use crate::{
    opcode::OpCode,
    vm::{Cpu, Reg, VIDEO_BASE},
};

/// Outcome of one executed cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Instruction retired, more to run.
    Continue,
    /// Opcode 0 was fetched; the machine stopped before executing it.
    Halt,
    /// An instruction required a register in an operand slot that decoded
    /// as "immediate follows". Well-formed images never produce this.
    Fault,
}

impl Cpu {
    /// Runs one fetch-decode-execute cycle.
    ///
    /// All arithmetic wraps modulo 256. The carry comparisons are
    /// pre-operation checks on the unwrapped operands; they are not
    /// recomputed from wrapped results, the two disagree at the boundary.
    pub fn step(&mut self) -> Signal {
        self.ir = self.ram[self.pc as usize];

        let op = OpCode::from_raw(self.ir >> 4);
        if let OpCode::Nop = op {
            return Signal::Halt;
        }

        let write = Reg::from_code((self.ir >> 2) & 0b11);
        let read = Reg::from_code(self.ir & 0b11);
        // Literal byte trailing the instruction. Loaded up front; only the
        // immediate-bearing opcodes consume it and advance past it.
        let imm = self.ram[self.pc.wrapping_add(1) as usize];

        match op {
            OpCode::Mov => {
                let (Some(w), Some(r)) = (write, read) else {
                    return Signal::Fault;
                };
                let v = self.get_register(r);
                self.set_register(w, v);
                if v == 0 {
                    self.zero = true;
                }

                self.pc = self.pc.wrapping_add(1);
            }
            OpCode::Stor => {
                let Some(r) = read else {
                    return Signal::Fault;
                };
                let addr = imm.wrapping_add(VIDEO_BASE as u8);
                self.ram[addr as usize] = self.get_register(r);

                self.pc = self.pc.wrapping_add(2);
            }
            OpCode::Load => {
                let Some(w) = write else {
                    return Signal::Fault;
                };
                self.set_register(w, imm);

                self.pc = self.pc.wrapping_add(2);
            }
            OpCode::Inc => {
                let (Some(w), Some(r)) = (write, read) else {
                    return Signal::Fault;
                };
                if self.get_register(r) == 255 {
                    self.carry = true;
                }
                let v = self.get_register(r).wrapping_add(1);
                self.set_register(w, v);
                if v == 0 {
                    self.zero = true;
                }

                self.pc = self.pc.wrapping_add(1);
            }
            OpCode::Add => {
                let (Some(w), Some(r)) = (write, read) else {
                    return Signal::Fault;
                };
                if self.get_register(r) > 255 - self.get_register(w) {
                    self.carry = true;
                }
                let v = self.get_register(w).wrapping_add(self.get_register(r));
                self.set_register(w, v);
                if v == 0 {
                    self.zero = true;
                }

                self.pc = self.pc.wrapping_add(1);
            }
            OpCode::Addiv => {
                let Some(w) = write else {
                    return Signal::Fault;
                };
                if imm > 255 - self.get_register(w) {
                    self.carry = true;
                }
                let v = self.get_register(w).wrapping_add(imm);
                self.set_register(w, v);
                if v == 0 {
                    self.zero = true;
                }

                self.pc = self.pc.wrapping_add(2);
            }
            OpCode::Dec => {
                let (Some(w), Some(r)) = (write, read) else {
                    return Signal::Fault;
                };
                // no underflow signal, only the zero flag
                let v = self.get_register(r).wrapping_sub(1);
                self.set_register(w, v);
                if v == 0 {
                    self.zero = true;
                }

                self.pc = self.pc.wrapping_add(1);
            }
            OpCode::Sub => {
                let (Some(w), Some(r)) = (write, read) else {
                    return Signal::Fault;
                };
                if self.get_register(r) > self.get_register(w) {
                    self.carry = true;
                }
                let v = self.get_register(w).wrapping_sub(self.get_register(r));
                self.set_register(w, v);
                if v == 0 {
                    self.zero = true;
                }

                self.pc = self.pc.wrapping_add(1);
            }
            OpCode::Subiv => {
                let Some(w) = write else {
                    return Signal::Fault;
                };
                if imm > self.get_register(w) {
                    self.carry = true;
                }
                let v = self.get_register(w).wrapping_sub(imm);
                self.set_register(w, v);
                if v == 0 {
                    self.zero = true;
                }

                self.pc = self.pc.wrapping_add(2);
            }
            OpCode::Or | OpCode::And => {
                let (Some(w), Some(r)) = (write, read) else {
                    return Signal::Fault;
                };
                let (lhs, rhs) = (self.get_register(w), self.get_register(r));
                let v = match op {
                    OpCode::Or => lhs | rhs,
                    OpCode::And => lhs & rhs,

                    _ => unreachable!(),
                };
                self.set_register(w, v);
                if v == 0 {
                    self.zero = true;
                }

                self.pc = self.pc.wrapping_add(1);
            }
            OpCode::Cmp => {
                let (Some(w), Some(r)) = (write, read) else {
                    return Signal::Fault;
                };
                // overwrites the flag instead of OR-ing it in
                self.carry = self.get_register(w) > self.get_register(r);

                self.pc = self.pc.wrapping_add(1);
            }
            OpCode::Jmp => {
                self.pc = imm;
            }
            OpCode::Flg => {
                if self.carry || self.zero {
                    self.pc = imm;
                } else {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            OpCode::Rstfg => {
                self.carry = false;
                self.zero = false;

                self.pc = self.pc.wrapping_add(1);
            }

            OpCode::Nop => unreachable!(),
        }

        Signal::Continue
    }

    /// Runs cycles until the machine halts or faults.
    ///
    /// Does not return for programs that never fetch opcode 0, such as an
    /// infinite jump loop; callers are responsible for supplying a
    /// terminating program.
    pub fn run(&mut self) -> Signal {
        loop {
            match self.step() {
                Signal::Continue => continue,
                sig => return sig,
            }
        }
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use alloc::vec::Vec;

    use crate::vm::{Reg, VIDEO_RAM};
    use super::*;

    fn machine(image: &[u8], regs: [u8; 3]) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.load(image).unwrap();
        cpu.regs = regs;
        cpu
    }

    #[test]
    fn nop_halts_before_executing() {
        let mut cpu = Cpu::new();

        assert_eq!(cpu.run(), Signal::Halt);
        assert_eq!(cpu.pc, 0);
        assert_eq!(cpu.ir, 0);
        assert!(cpu.display().iter().all(|cell| *cell == 0));
    }

    #[test]
    fn mov_copies_and_keeps_source() {
        let mut cpu = machine(&[0x16, 0x00], [0, 7, 0]); // MOV AL,BL

        assert_eq!(cpu.run(), Signal::Halt);
        assert_eq!(cpu.regs, [7, 7, 0]);
        assert!(!cpu.zero);
    }

    #[test]
    fn mov_zero_sets_zero_flag() {
        let mut cpu = machine(&[0x16, 0x00], [9, 0, 0]); // MOV AL,BL

        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 0);
        assert!(cpu.zero);
    }

    #[test]
    fn load_is_a_literal_not_an_indirect_read() {
        // memory[5] holds 99; LOAD AL,5 must still set AL to 5
        let mut cpu = machine(&[0x34, 0x05, 0x00, 0x00, 0x00, 99], [0; 3]);

        assert_eq!(cpu.run(), Signal::Halt);
        assert_eq!(cpu.get_register(Reg::Al), 5);
        assert_eq!(cpu.pc, 2);
    }

    #[test]
    fn stor_writes_the_display() {
        let mut cpu = machine(&[0x21, 0x00, 0x00], [2, 0, 0]); // STOR 0,AL

        assert_eq!(cpu.run(), Signal::Halt);
        assert_eq!(cpu.display()[0], 2);
        assert_eq!(cpu.glyph(0), b'B');
    }

    #[test]
    fn inc_wraps_with_carry_and_zero() {
        let mut cpu = machine(&[0x45, 0x00], [255, 0, 0]); // INC AL,AL

        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 0);
        assert!(cpu.carry);
        assert!(cpu.zero);
    }

    #[test]
    fn inc_below_boundary_leaves_carry() {
        let mut cpu = machine(&[0x45, 0x00], [254, 0, 0]); // INC AL,AL

        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 255);
        assert!(!cpu.carry);
        assert!(!cpu.zero);
    }

    #[test]
    fn dec_wraps_without_carry() {
        let mut cpu = machine(&[0x75, 0x00], [0, 0, 0]); // DEC AL,AL

        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 255);
        assert!(!cpu.carry);
    }

    #[test]
    fn add_carry_is_a_pre_op_check() {
        // 200 + 56 wraps to 0: carry and zero
        let mut cpu = machine(&[0x56, 0x00], [200, 56, 0]); // ADD AL,BL
        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 0);
        assert!(cpu.carry);
        assert!(cpu.zero);

        // 200 + 55 = 255 exactly: no carry
        let mut cpu = machine(&[0x56, 0x00], [200, 55, 0]);
        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 255);
        assert!(!cpu.carry);
    }

    #[test]
    fn addiv_carry_checks_the_immediate() {
        let mut cpu = machine(&[0x64, 0x0A, 0x00], [250, 0, 0]); // ADDIV AL,10

        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 4);
        assert!(cpu.carry);
        assert_eq!(cpu.pc, 2);
    }

    #[test]
    fn sub_signals_borrow() {
        let mut cpu = machine(&[0x86, 0x00], [5, 9, 0]); // SUB AL,BL

        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 252);
        assert!(cpu.carry);
        assert!(!cpu.zero);
    }

    #[test]
    fn subiv_to_zero_sets_only_zero() {
        let mut cpu = machine(&[0x94, 0x05, 0x00], [5, 0, 0]); // SUBIV AL,5

        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 0);
        assert!(!cpu.carry);
        assert!(cpu.zero);
    }

    #[test]
    fn or_and_touch_only_zero() {
        let mut cpu = machine(&[0xA6, 0x00], [0b1100, 0b0011, 0]); // OR AL,BL
        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 0b1111);
        assert!(!cpu.zero);

        let mut cpu = machine(&[0xB6, 0x00], [0b1100, 0b0011, 0]); // AND AL,BL
        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 0);
        assert!(cpu.zero);
        assert!(!cpu.carry);
    }

    #[test]
    fn cmp_overwrites_the_carry_flag() {
        let mut cpu = machine(&[0xC6, 0x00], [1, 2, 0]); // CMP AL,BL
        cpu.carry = true;

        cpu.run();
        assert!(!cpu.carry);
    }

    #[test]
    fn jmp_is_absolute() {
        // JMP 5; padding; NOP at 5
        let mut cpu = machine(&[0xD0, 0x05, 0xFF, 0xFF, 0xFF, 0x00], [0; 3]);

        assert_eq!(cpu.run(), Signal::Halt);
        assert_eq!(cpu.pc, 5);
    }

    #[test]
    fn flg_falls_through_when_flags_are_clear() {
        let mut cpu = machine(&[0xE0, 0x03, 0x00, 0x00], [0; 3]); // FLG 3

        assert_eq!(cpu.run(), Signal::Halt);
        assert_eq!(cpu.pc, 2);
    }

    #[test]
    fn flg_taken_skips_the_jump() {
        // LOAD AL,1; SUBIV AL,1 sets zero; FLG 8 jumps over the JMP 0 loop
        let image = &[0x34, 0x01, 0x94, 0x01, 0xE0, 0x08, 0xD0, 0x00, 0x00];
        let mut cpu = machine(image, [0; 3]);

        assert_eq!(cpu.run(), Signal::Halt);
        assert_eq!(cpu.pc, 8);
        assert!(cpu.zero);
    }

    #[test]
    fn rstfg_clears_both_flags() {
        let mut cpu = machine(&[0xF0, 0x00], [0; 3]);
        cpu.carry = true;
        cpu.zero = true;

        assert_eq!(cpu.run(), Signal::Halt);
        assert!(!cpu.carry);
        assert!(!cpu.zero);
        assert_eq!(cpu.pc, 1);
    }

    #[test]
    fn register_slots_never_dereference_the_immediate_marker() {
        let images: &[&[u8]] = &[
            &[0x14],       // MOV with immediate read slot
            &[0x11],       // MOV with immediate write slot
            &[0x20, 0x00], // STOR with immediate read slot
            &[0x30, 0x00], // LOAD with immediate write slot
            &[0x44],       // INC with immediate read slot
            &[0x60, 0x00], // ADDIV with immediate write slot
            &[0xC4],       // CMP with immediate read slot
        ];

        for image in images {
            let mut cpu = machine(image, [0; 3]);
            assert_eq!(cpu.run(), Signal::Fault, "image: {image:?}");
        }
    }

    #[test]
    fn flags_are_sticky_until_reset() {
        // INC AL,AL twice: the first wraps and sets both flags, the second
        // must leave them set even though it signals nothing itself
        let mut cpu = machine(&[0x45, 0x45, 0x00], [255, 0, 0]);

        cpu.run();
        assert_eq!(cpu.get_register(Reg::Al), 1);
        assert!(cpu.carry);
        assert!(cpu.zero);
    }

    #[test]
    fn fills_every_display_cell() {
        // STOR n,AL for every cell, then halt
        let mut image = Vec::new();
        for cell in 0..VIDEO_RAM as u8 {
            image.extend_from_slice(&[0x21, cell]);
        }
        image.push(0x00);

        let mut cpu = machine(&image, [1, 0, 0]);
        assert_eq!(cpu.run(), Signal::Halt);
        for cell in 0..VIDEO_RAM {
            assert_eq!(cpu.glyph(cell), b'A');
        }
    }
}
