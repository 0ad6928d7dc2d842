//! # t8 Virtual Machine
//!
//! This crate contains the base things of t8: the byte-code contract and the
//! machine that executes it. A Program Image goes through 3 stages to be
//! executed:
//!
//! 1. [`image`] -- decode the hexadecimal digit stream to raw bytes.
//! 2. [`vm`] -- the machine: register file, memory map, status flags.
//! 3. [`runner`] -- the fetch-decode-execute cycle, driven by [`opcode`].
//!
//! The assembler half of the toolchain lives in the `t8-as` crate.
//!
//! # Example
//! ```
//! # use t8_base::{vm::Cpu, runner::Signal};
//! #
//! let image = &[
//!     0x34, 0x08, // LOAD AL,8   # index of 'H'
//!     0x21, 0x00, // STOR 0,AL
//!     0x34, 0x09, // LOAD AL,9   # index of 'I'
//!     0x21, 0x01, // STOR 1,AL
//!     0x00,       // NOP         # halts the machine
//! ];
//!
//! let mut cpu = Cpu::new();
//! cpu.load(image).unwrap();
//! assert_eq!(cpu.run(), Signal::Halt);
//!
//! assert_eq!(cpu.glyph(0), b'H');
//! assert_eq!(cpu.glyph(1), b'I');
//! assert_eq!(cpu.glyph(2), b' ');
//! ```
//!
//! # Specification
//!
//! One instruction byte packs an opcode and two operand codes:
//!
//! | Bits | Field         | Values                                 |
//! |------|---------------|----------------------------------------|
//! | 4-7  | opcode        | one of 16 operations, see [`OpCode`]   |
//! | 2-3  | write operand | 0 = immediate follows, 1-3 = AL/BL/CL  |
//! | 0-1  | read operand  | 0 = immediate follows, 1-3 = AL/BL/CL  |
//!
//! `STOR`, `LOAD`, `ADDIV`, `SUBIV`, `JMP` and `FLG` carry one literal byte
//! directly after the instruction byte; every other instruction is a single
//! byte.
//!
//! ## Memory map
//!
//! |   Range   | Contents                                                |
//! |-----------|---------------------------------------------------------|
//! | `0..160`  | program and data, written once at load time             |
//! | `160..192`| character table: space, `A`-`Z`, `.` `,` `!` `?` `:`    |
//! | `192..256`| display surface, one character-table index per cell     |
//!
//! The region boundaries are fixed constants ([`PROGRAM_CAPACITY`],
//! [`CHAR_BASE`], [`VIDEO_BASE`]); the loader rejects any image that would
//! spill out of the program region.
//!
//! ## Registers and flags
//!
//! Three general 8-bit registers AL, BL and CL ([`Reg`]), plus two status
//! flags. Instructions only ever *set* the carry and zero flags; nothing
//! clears them except the explicit `RSTFG` instruction.

#![cfg_attr(feature = "no-std", no_std)]
extern crate alloc;

// doc imports
#[allow(unused_imports)]
use {opcode::*, vm::*};

pub mod image;
pub mod opcode;
pub mod runner;
pub mod vm;
