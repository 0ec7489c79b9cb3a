use std::io;

/// Errors surfaced by loading or executing a program
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("bad instruction {opcode:#06X} at {addr:#05X}")]
    BadInstruction { opcode: u16, addr: u16 },

    #[error("stack overflow: CALL at {addr:#05X} with a full call stack")]
    StackOverflow { addr: u16 },

    #[error("stack underflow: RET at {addr:#05X} with an empty call stack")]
    StackUnderflow { addr: u16 },

    #[error("failed to read ROM: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
