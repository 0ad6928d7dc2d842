//! Writer from scanned lines to the raw program bytes.
//!
//! Each line becomes one instruction byte, `(opcode << 4) | (write << 2) |
//! read`, plus for some opcodes one literal trailing byte. Serialize the
//! result with [`t8_base::image::encode`] to obtain the Program Image.

use core::fmt;
use alloc::{string::String, vec::Vec};
use hashbrown::HashMap;

use t8_base::{opcode::OpCode, vm::Reg};

use crate::lex::Line;

/// A classified operand token: a register name, or anything else coerced to
/// an 8-bit immediate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arg {
    Register(Reg),
    Immediate(u8),
}

/// Classifies an operand token.
///
/// `AL`, `BL` and `CL` name registers; every other token is a decimal
/// immediate folded modulo 256, with non-numeric and empty tokens resolving
/// to 0 rather than failing. The assembler is deliberately permissive here.
///
/// # Example
/// ```
/// # use t8_as::writer::{resolve, Arg};
/// # use t8_base::vm::Reg;
/// #
/// assert_eq!(resolve("BL"), Arg::Register(Reg::Bl));
/// assert_eq!(resolve("42"), Arg::Immediate(42));
/// assert_eq!(resolve("XY"), Arg::Immediate(0));
/// ```
pub fn resolve(token: &str) -> Arg {
    if let Some(reg) = Reg::from_name(token) {
        return Arg::Register(reg);
    }

    Arg::Immediate(parse_immediate(token))
}

/// Folds the leading decimal digit run of a token, wrapping modulo 256.
fn parse_immediate(token: &str) -> u8 {
    token
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u8, |acc, d| acc.wrapping_mul(10).wrapping_add(d as u8))
}

/// Mnemonic lookup table and encoder.
///
/// # Example
/// ```
/// # use t8_as::{lex::Line, writer::Context};
/// #
/// let ctx = Context::new();
/// let lines = [Line::scan("LOAD AL,5;"), Line::scan("NOP")];
///
/// assert_eq!(ctx.generate(lines), Ok(vec![0x34, 0x05, 0x00]));
/// ```
#[derive(Clone)]
pub struct Context {
    mnemonics: HashMap<&'static str, OpCode>,
}

impl Context {
    /// Builds the lookup table from the machine's opcode set.
    pub fn new() -> Self {
        let mnemonics = OpCode::VARIANTS
            .iter()
            .map(|op| (op.mnemonic(), *op))
            .collect();

        Self { mnemonics }
    }

    /// Encodes scanned lines into raw program bytes.
    ///
    /// Packing rules per opcode class:
    /// - `NOP` and `RSTFG` emit only the instruction byte.
    /// - `JMP` and `FLG` emit the instruction byte, then one literal byte
    ///   holding operand 1's numeric value; the operand is never treated as
    ///   a register even when it is spelled like one.
    /// - `INC` and `DEC` take the canonical two-register form and never
    ///   emit a trailing byte, so their encoded and executed widths agree.
    /// - Everything else packs both resolved operands into the instruction
    ///   byte and, when either resolved to an immediate, appends it as one
    ///   literal byte. Resolution runs left to right into a single
    ///   immediate slot, so operand 2 wins when both are immediates.
    pub fn generate<I>(&self, lines: I) -> Result<Vec<u8>, AsmError>
    where
        I: IntoIterator<Item = Line>,
    {
        let mut buffer = Vec::new();

        for (line_no, line) in lines.into_iter().enumerate() {
            let Some(op) = self.mnemonics.get(line.mnemonic.as_str()).copied() else {
                return Err(AsmError {
                    line: line_no,
                    kind: AsmErrorKind::UnknownMnemonic(line.mnemonic),
                });
            };
            let mut instruction = op.as_raw() << 4;

            match op {
                OpCode::Nop | OpCode::Rstfg => buffer.push(instruction),

                OpCode::Jmp | OpCode::Flg => {
                    buffer.push(instruction);
                    buffer.push(parse_immediate(&line.args[0]));
                }

                _ => {
                    let write = resolve(&line.args[0]);
                    let read = resolve(&line.args[1]);

                    if let Arg::Register(reg) = write {
                        instruction |= reg.to_code() << 2;
                    }
                    if let Arg::Register(reg) = read {
                        instruction |= reg.to_code();
                    }
                    buffer.push(instruction);

                    if matches!(op, OpCode::Inc | OpCode::Dec) {
                        continue;
                    }
                    match (write, read) {
                        (_, Arg::Immediate(v)) | (Arg::Immediate(v), Arg::Register(_)) => {
                            buffer.push(v)
                        }
                        (Arg::Register(_), Arg::Register(_)) => {}
                    }
                }
            }
        }

        Ok(buffer)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembly error, carrying the zero-based source line it occurred on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsmError {
    pub line: usize,
    pub kind: AsmErrorKind,
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        write!(f, " at line {}", self.line + 1)
    }
}
#[cfg(not(feature = "no-std"))]
impl std::error::Error for AsmError {}

/// Kind of assembly error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AsmErrorKind {
    /// Keyword does not name any opcode
    UnknownMnemonic(String),
}

impl fmt::Display for AsmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMnemonic(s) => write!(f, "unknown mnemonic `{s}`"),
        }
    }
}
