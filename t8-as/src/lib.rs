#![cfg_attr(feature = "no-std", no_std)]
extern crate alloc;

/// Line scanner implementation
pub mod lex;
/// Writer to t8 bytecode
pub mod writer;
