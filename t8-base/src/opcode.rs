//! The 16-entry instruction table.

use core::fmt;

/// Implements an opcode table.
///
/// Generates the enum itself plus `VARIANTS`, `mnemonic`, `from_mnemonic`
/// and the raw 4-bit conversions. `from_raw` masks its input to 4 bits, so
/// it is total: every instruction byte decodes to a defined opcode.
macro_rules! impl_opcodes {
    ($(#[$m:meta])* $v:vis enum $name:ident { $($(#[$mv:meta])* $var:ident = $code:literal => $mn:literal),* $(,)? }) => {
        $(#[$m])*
        $v enum $name {$(
            $(#[$mv])*
            $var = $code,
        )*}

        impl $name {
            /// Array of all variants, in opcode order.
            pub const VARIANTS: &'static [$name] = &[$(Self::$var,)*];

            /// Assembly mnemonic of this opcode.
            pub const fn mnemonic(self) -> &'static str {
                match self {$(
                    Self::$var => $mn,
                )*}
            }

            /// Looks an opcode up by its assembly mnemonic. Case-sensitive.
            pub fn from_mnemonic(s: &str) -> Option<Self> {
                Self::VARIANTS.iter().find(|op| op.mnemonic() == s).copied()
            }

            /// Decodes the high nibble of an instruction byte. The input is
            /// masked to 4 bits, so this never fails.
            pub const fn from_raw(raw: u8) -> Self {
                match raw & 0x0F {
                    $($code => Self::$var,)*
                    _ => unreachable!(),
                }
            }

            /// Raw 4-bit opcode id.
            pub const fn as_raw(self) -> u8 {
                self as u8
            }
        }
    };
}

impl_opcodes! {
    /// Operation selector occupying the high 4 bits of an instruction byte.
    /// Can be obtained from a raw byte using [`OpCode::from_raw`] and
    /// converted back by [`OpCode::as_raw`].
    ///
    /// `imm` below is the literal byte following the instruction byte;
    /// `reg[w]`/`reg[r]` are the registers named by the write and read
    /// operand codes.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    #[repr(u8)]
    pub enum OpCode {
        /// Halts the run loop. Never executes as an in-program no-op: the
        /// cycle exits before reaching the execute stage.
        Nop = 0 => "NOP",
        /// `reg[w] <- reg[r]`
        Mov = 1 => "MOV",
        /// `ram[192 + imm] <- reg[r]`, the display store
        Stor = 2 => "STOR",
        /// `reg[w] <- imm` (the literal trailing byte, not an indirect load)
        Load = 3 => "LOAD",
        /// `reg[w] <- reg[r] + 1`
        Inc = 4 => "INC",
        /// `reg[w] <- reg[w] + reg[r]`
        Add = 5 => "ADD",
        /// `reg[w] <- reg[w] + imm`
        Addiv = 6 => "ADDIV",
        /// `reg[w] <- reg[r] - 1`
        Dec = 7 => "DEC",
        /// `reg[w] <- reg[w] - reg[r]`
        Sub = 8 => "SUB",
        /// `reg[w] <- reg[w] - imm`
        Subiv = 9 => "SUBIV",
        /// `reg[w] <- reg[w] | reg[r]`
        Or = 10 => "OR",
        /// `reg[w] <- reg[w] & reg[r]`
        And = 11 => "AND",
        /// `carry <- reg[w] > reg[r]` (overwrites the flag)
        Cmp = 12 => "CMP",
        /// `pc <- imm`, absolute jump
        Jmp = 13 => "JMP",
        /// `pc <- imm` if carry or zero is set, else fall through
        Flg = 14 => "FLG",
        /// Clears both status flags.
        Rstfg = 15 => "RSTFG",
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
