use std::fmt;

/// A decoded instruction word.
///
/// Register operands are indices 0x0-0xF, addresses are 12 bits. Anything
/// that isn't one of the 35 defined instructions decodes to `Bad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Cls,                    // 00E0
    Ret,                    // 00EE
    Jp(u16),                // 1NNN
    Call(u16),              // 2NNN
    SeByte(usize, u8),      // 3XKK
    SneByte(usize, u8),     // 4XKK
    SeReg(usize, usize),    // 5XY0
    LdByte(usize, u8),      // 6XKK
    AddByte(usize, u8),     // 7XKK
    LdReg(usize, usize),    // 8XY0
    Or(usize, usize),       // 8XY1
    And(usize, usize),      // 8XY2
    Xor(usize, usize),      // 8XY3
    AddReg(usize, usize),   // 8XY4
    Sub(usize, usize),      // 8XY5
    Shr(usize),             // 8XY6
    Subn(usize, usize),     // 8XY7
    Shl(usize),             // 8XYE
    SneReg(usize, usize),   // 9XY0
    LdI(u16),               // ANNN
    JpV0(u16),              // BNNN
    Rnd(usize, u8),         // CXKK
    Drw(usize, usize, u8),  // DXYN
    Skp(usize),             // EX9E
    Sknp(usize),            // EXA1
    LdVxDt(usize),          // FX07
    LdVxK(usize),           // FX0A
    LdDtVx(usize),          // FX15
    LdStVx(usize),          // FX18
    AddI(usize),            // FX1E
    LdF(usize),             // FX29
    Bcd(usize),             // FX33
    StoreRegs(usize),       // FX55
    LoadRegs(usize),        // FX65
    Bad(u16),
}

fn nnn(op: u16) -> u16 {
    op & 0x0FFF
}

fn n(op: u16) -> u8 {
    (op & 0x000F) as u8
}

fn kk(op: u16) -> u8 {
    (op & 0x00FF) as u8
}

fn x(op: u16) -> usize {
    ((op & 0x0F00) >> 8) as usize
}

fn y(op: u16) -> usize {
    ((op & 0x00F0) >> 4) as usize
}

/// Decode a big-endian instruction word. Never fails; unknown words come
/// back as `Instruction::Bad`.
pub fn decode(op: u16) -> Instruction {
    use Instruction::*;

    match (op & 0xF000) >> 12 {
        0x0 => match kk(op) {
            // 0X__ only looks at the low byte
            0xE0 => Cls,
            0xEE => Ret,
            _ => Bad(op),
        },
        0x1 => Jp(nnn(op)),
        0x2 => Call(nnn(op)),
        0x3 => SeByte(x(op), kk(op)),
        0x4 => SneByte(x(op), kk(op)),
        // the low nibble of 5XY_ and 9XY_ is never looked at
        0x5 => SeReg(x(op), y(op)),
        0x6 => LdByte(x(op), kk(op)),
        0x7 => AddByte(x(op), kk(op)),
        0x8 => match n(op) {
            0x0 => LdReg(x(op), y(op)),
            0x1 => Or(x(op), y(op)),
            0x2 => And(x(op), y(op)),
            0x3 => Xor(x(op), y(op)),
            0x4 => AddReg(x(op), y(op)),
            0x5 => Sub(x(op), y(op)),
            0x6 => Shr(x(op)),
            0x7 => Subn(x(op), y(op)),
            0xE => Shl(x(op)),
            _ => Bad(op),
        },
        0x9 => SneReg(x(op), y(op)),
        0xA => LdI(nnn(op)),
        0xB => JpV0(nnn(op)),
        0xC => Rnd(x(op), kk(op)),
        0xD => Drw(x(op), y(op), n(op)),
        0xE => match kk(op) {
            0x9E => Skp(x(op)),
            0xA1 => Sknp(x(op)),
            _ => Bad(op),
        },
        _ => match kk(op) {
            0x07 => LdVxDt(x(op)),
            0x0A => LdVxK(x(op)),
            0x15 => LdDtVx(x(op)),
            0x18 => LdStVx(x(op)),
            0x1E => AddI(x(op)),
            0x29 => LdF(x(op)),
            0x33 => Bcd(x(op)),
            0x55 => StoreRegs(x(op)),
            0x65 => LoadRegs(x(op)),
            _ => Bad(op),
        },
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(a) => write!(f, "JP {:#05X}", a),
            Call(a) => write!(f, "CALL {:#05X}", a),
            SeByte(x, b) => write!(f, "SE V{:X}, {:#04X}", x, b),
            SneByte(x, b) => write!(f, "SNE V{:X}, {:#04X}", x, b),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte(x, b) => write!(f, "LD V{:X}, {:#04X}", x, b),
            AddByte(x, b) => write!(f, "ADD V{:X}, {:#04X}", x, b),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x) => write!(f, "SHR V{:X}", x),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x) => write!(f, "SHL V{:X}", x),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(a) => write!(f, "LD I, {:#05X}", a),
            JpV0(a) => write!(f, "JP V0, {:#05X}", a),
            Rnd(x, b) => write!(f, "RND V{:X}, {:#04X}", x, b),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdVxDt(x) => write!(f, "LD V{:X}, DT", x),
            LdVxK(x) => write!(f, "LD V{:X}, K", x),
            LdDtVx(x) => write!(f, "LD DT, V{:X}", x),
            LdStVx(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdF(x) => write!(f, "LD F, V{:X}", x),
            Bcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
            Bad(op) => write!(f, "??? {:04X}", op),
        }
    }
}
