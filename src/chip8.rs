use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write;
use std::path::Path;

mod config;
mod error;
mod exec;
mod font;
mod opcode;

pub use self::config::{Config, ShiftQuirk, SpriteEdge};
pub use self::error::{Chip8Error, Result};
pub use self::opcode::{decode, Instruction};

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200; // programs start at 0x200
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

const ADDR_MASK: u16 = 0x0FFF;
const STACK_SIZE: usize = 16;
const FLAG: usize = 0xF; // VF

pub struct Chip8 {
    // CHIP-8 VM
    memory: [u8; MEMORY_SIZE],               // system memory
    v: [u8; 16],                             // registers V0-VE (VF is flag for some instructions)
    i: u16,                                  // address register
    pc: u16,                                 // program counter
    gfx: [u8; SCREEN_WIDTH * SCREEN_HEIGHT], // pixels state
    delay_timer: u8,
    sound_timer: u8, // timers count down at 60Hz
    stack: [u16; STACK_SIZE],
    sp: u8,          // stack pointer
    key: [bool; 16], // hex keypad state, latched by the host

    // emulator resources
    waiting_for_key: Option<usize>, // FX0A destination register while suspended
    draw_flag: bool,
    rng: StdRng,
    config: Config,
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut memory = [0; MEMORY_SIZE];

        // CHIP-8 systems had the interpreter in the first 512 bytes of memory
        // since we're emulating that we can just store the fontset there
        memory[..font::FONTSET.len()].copy_from_slice(&font::FONTSET);

        Self {
            memory,
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            gfx: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            sp: 0,
            key: [false; 16],

            waiting_for_key: None,
            draw_flag: false,
            rng: seed_rng(config.seed),
            config,
        }
    }

    /// Put the CPU back to its power-on state.
    ///
    /// Memory is left alone, so a loaded (and possibly self-modified)
    /// program survives a reset.
    pub fn reset(&mut self) {
        self.pc = PROGRAM_START;
        self.i = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.sp = 0;
        self.v = [0; 16];
        self.stack = [0; STACK_SIZE];
        self.gfx = [0; SCREEN_WIDTH * SCREEN_HEIGHT];

        self.waiting_for_key = None;
        self.draw_flag = false;
        if self.config.seed.is_some() {
            self.rng = seed_rng(self.config.seed);
        }
        debug!("reset");
    }

    /// Copy a raw ROM image to 0x200. Whatever is left of the program region
    /// past the image is zeroed.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let program = &mut self.memory[PROGRAM_START as usize..];
        program[..rom.len()].copy_from_slice(rom);
        for b in &mut program[rom.len()..] {
            *b = 0;
        }
        debug!("loaded {} byte program", rom.len());
        Ok(())
    }

    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let rom = std::fs::read(path)?;
        self.load_program(&rom)
    }

    /// Run one fetch-decode-execute cycle.
    ///
    /// On error the program counter is left on the faulting instruction and
    /// nothing else has changed. While an FX0A is pending this only polls
    /// the keypad.
    pub fn step(&mut self) -> Result<()> {
        self.draw_flag = false;

        if let Some(x) = self.waiting_for_key {
            if let Some(key) = self.first_pressed_key() {
                trace!("key {:X} -> V{:X}", key, x);
                self.v[x] = key;
                self.waiting_for_key = None;
            }
            return Ok(());
        }

        let addr = self.pc;
        // two-byte opcodes
        let opcode = (self.read(addr) as u16) << 8 | self.read(addr.wrapping_add(1)) as u16;
        let instruction = decode(opcode);
        trace!("{:03X}: {:04X}  {}", addr, opcode, instruction);

        self.pc = addr.wrapping_add(2) & ADDR_MASK;
        if let Err(e) = self.execute(instruction, addr) {
            warn!("{}", e);
            self.pc = addr;
            return Err(e);
        }
        Ok(())
    }

    /// Count both timers down by one; call this at 60Hz.
    pub fn tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn set_keys(&mut self, keys: [bool; 16]) {
        self.key = keys;
    }

    pub fn press_key(&mut self, key: usize) {
        if let Some(k) = self.key.get_mut(key) {
            *k = true;
        }
    }

    pub fn release_key(&mut self, key: usize) {
        if let Some(k) = self.key.get_mut(key) {
            *k = false;
        }
    }

    pub fn clear_keys(&mut self) {
        self.key = [false; 16];
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.waiting_for_key.is_some()
    }

    /// true if the last step touched the framebuffer
    pub fn draw_flag(&self) -> bool {
        self.draw_flag
    }

    /// Row-major 64x32 pixels, 1 is lit.
    pub fn gfx(&self) -> &[u8] {
        &self.gfx
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.gfx[y * SCREEN_WIDTH + x] == 1
    }

    pub fn sound_flag(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn v(&self, x: usize) -> u8 {
        self.v[x & 0xF]
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hex dump of all of memory, 16 bytes a row.
    pub fn ram_dump(&self) -> String {
        let mut out = String::with_capacity(MEMORY_SIZE * 4);
        for (row, bytes) in self.memory.chunks(16).enumerate() {
            let _ = write!(out, "{:04x} ", row * 16);
            for b in bytes {
                let _ = write!(out, " {:02x}", b);
            }
            out.push('\n');
        }
        out
    }

    fn read(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDR_MASK) as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        let addr = (addr & ADDR_MASK) as usize;
        if addr < font::FONTSET.len() {
            warn!("ignoring write of {:02X} to font memory at {:03X}", value, addr);
            return;
        }
        self.memory[addr] = value;
    }

    fn first_pressed_key(&self) -> Option<u8> {
        self.key.iter().position(|&k| k).map(|k| k as u8)
    }
}

fn seed_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_program(words: &[u16]) -> Chip8 {
        let rom: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes().to_vec()).collect();
        let mut chip = Chip8::with_config(Config::default().with_seed(0));
        chip.load_program(&rom).unwrap();
        chip
    }

    #[test]
    fn new_machine_is_zeroed_except_font() {
        let chip = Chip8::new();
        assert_eq!(chip.pc(), 0x200);
        assert_eq!(chip.sp(), 0);
        assert_eq!(chip.i(), 0);
        assert_eq!(&chip.memory()[..80], &font::FONTSET[..]);
        assert!(chip.memory()[80..].iter().all(|&b| b == 0));
        assert!(chip.gfx().iter().all(|&p| p == 0));
    }

    #[test]
    fn load_program_copies_to_0x200() {
        let mut chip = Chip8::new();
        chip.load_program(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        assert_eq!(&chip.memory()[0x200..0x204], &[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(chip.memory()[0x204], 0);
    }

    #[test]
    fn load_program_accepts_exactly_max_size() {
        let mut chip = Chip8::new();
        chip.load_program(&[0xAB; MAX_PROGRAM_SIZE]).unwrap();
        assert_eq!(chip.memory()[0xFFF], 0xAB);
    }

    #[test]
    fn load_program_rejects_oversized_rom() {
        let mut chip = Chip8::new();
        chip.load_program(&[0x11; 4]).unwrap();
        let err = chip.load_program(&[0xFF; MAX_PROGRAM_SIZE + 1]).unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::RomTooLarge { size: 3585, max: 3584 }
        ));
        // previous program untouched
        assert_eq!(&chip.memory()[0x200..0x205], &[0x11, 0x11, 0x11, 0x11, 0]);
    }

    #[test]
    fn shorter_program_clears_previous_tail() {
        let mut chip = Chip8::new();
        chip.load_program(&[0x11; 8]).unwrap();
        chip.load_program(&[0x22; 2]).unwrap();
        assert_eq!(&chip.memory()[0x200..0x208], &[0x22, 0x22, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn load_rom_reports_missing_file() {
        let mut chip = Chip8::new();
        let err = chip.load_rom("/nonexistent/rom.ch8").unwrap_err();
        assert!(matches!(err, Chip8Error::Io(_)));
    }

    #[test]
    fn reset_keeps_memory() {
        // LD VA, 5; LD I, 0x300; LD B, VA; LD F, VA; DRW V0, V0, 5; CALL 0x300
        let mut chip = with_program(&[0x6A05, 0xA300, 0xFA33, 0xFA29, 0xD005, 0x2300]);
        for _ in 0..6 {
            chip.step().unwrap();
        }
        assert!(chip.pixel(0, 0));
        chip.delay_timer = 9;
        chip.sound_timer = 9;
        assert_eq!(chip.sp(), 1);

        let before = chip.memory().to_vec();
        chip.reset();
        assert_eq!(chip.memory(), &before[..]);
        assert_eq!(chip.pc(), 0x200);
        assert_eq!(chip.i(), 0);
        assert_eq!(chip.sp(), 0);
        assert_eq!(chip.delay_timer(), 0);
        assert_eq!(chip.sound_timer(), 0);
        assert!((0..16).all(|x| chip.v(x) == 0));
        assert!(chip.gfx().iter().all(|&p| p == 0));
    }

    #[test]
    fn tick_floors_at_zero() {
        let mut chip = Chip8::new();
        chip.delay_timer = 2;
        chip.sound_timer = 1;
        chip.tick();
        assert_eq!((chip.delay_timer(), chip.sound_timer()), (1, 0));
        assert!(!chip.sound_flag());
        chip.tick();
        chip.tick();
        assert_eq!((chip.delay_timer(), chip.sound_timer()), (0, 0));
    }

    #[test]
    fn cls_then_self_jump() {
        let mut chip = with_program(&[0x00E0, 0x1202]);
        chip.gfx[5] = 1;
        chip.step().unwrap();
        assert!(chip.draw_flag());
        assert!(chip.gfx().iter().all(|&p| p == 0));
        assert_eq!(chip.pc(), 0x202);
        chip.step().unwrap();
        assert!(!chip.draw_flag());
        assert_eq!(chip.pc(), 0x202);
        chip.step().unwrap();
        assert_eq!(chip.pc(), 0x202);
    }

    #[test]
    fn fetch_wraps_at_end_of_memory() {
        let mut chip = Chip8::new();
        chip.memory[0xFFF] = 0x60;
        chip.pc = 0xFFF;
        // 60 followed by the first font byte, F0
        chip.step().unwrap();
        assert_eq!(chip.v(0), 0xF0);
        assert_eq!(chip.pc(), 0x001);
    }

    #[test]
    fn bad_instruction_leaves_pc_on_it() {
        let mut chip = with_program(&[0x6101, 0x8128]);
        chip.step().unwrap();
        let err = chip.step().unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::BadInstruction { opcode: 0x8128, addr: 0x202 }
        ));
        assert_eq!(chip.pc(), 0x202);
        assert!(chip.step().is_err());
    }

    #[test]
    fn keys_latch() {
        let mut chip = Chip8::new();
        chip.press_key(3);
        chip.press_key(99);
        assert_eq!(chip.first_pressed_key(), Some(3));
        chip.release_key(3);
        assert_eq!(chip.first_pressed_key(), None);
        let mut keys = [false; 16];
        keys[0xA] = true;
        keys[0xC] = true;
        chip.set_keys(keys);
        assert_eq!(chip.first_pressed_key(), Some(0xA));
        chip.clear_keys();
        assert_eq!(chip.first_pressed_key(), None);
    }

    #[test]
    fn ram_dump_has_a_row_per_16_bytes() {
        let chip = Chip8::new();
        let dump = chip.ram_dump();
        assert_eq!(dump.lines().count(), 256);
        assert!(dump.starts_with("0000  f0 90 90 90 f0 20 60 20"));
        assert!(dump.lines().last().unwrap().starts_with("0ff0  00"));
    }

    #[test]
    fn font_memory_is_read_only() {
        let mut chip = Chip8::new();
        chip.write(0x000, 0xAA);
        chip.write(0x04F, 0xAA);
        chip.write(0x050, 0xAA);
        assert_eq!(chip.memory()[0], 0xF0);
        assert_eq!(chip.memory()[0x4F], 0x80);
        assert_eq!(chip.memory()[0x50], 0xAA);
    }
}
