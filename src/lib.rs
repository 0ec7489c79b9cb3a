//! A CHIP-8 virtual machine core.
//!
//! The host owns the clock: call [`Chip8::step`] at the instruction rate and
//! [`Chip8::tick`] at 60Hz, pushing key state with [`Chip8::set_keys`] and
//! reading the framebuffer back through [`Chip8::gfx`].

pub mod chip8;

pub use crate::chip8::{
    decode, Chip8, Chip8Error, Config, Instruction, Result, ShiftQuirk, SpriteEdge,
    MAX_PROGRAM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
};
