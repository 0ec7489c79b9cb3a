use log::debug;
use rand::Rng;

use super::config::{ShiftQuirk, SpriteEdge};
use super::error::{Chip8Error, Result};
use super::font;
use super::opcode::Instruction;
use super::{Chip8, ADDR_MASK, FLAG, SCREEN_HEIGHT, SCREEN_WIDTH, STACK_SIZE};

impl Chip8 {
    /// Execute one decoded instruction fetched from `addr`. PC already points
    /// past it.
    pub(super) fn execute(&mut self, instruction: Instruction, addr: u16) -> Result<()> {
        use Instruction::*;

        match instruction {
            Cls => self.cls(),
            Ret => self.ret(addr)?,
            Jp(nnn) => self.pc = nnn,
            Call(nnn) => self.call(addr, nnn)?,
            SeByte(x, kk) => self.skip_if(self.v[x] == kk),
            SneByte(x, kk) => self.skip_if(self.v[x] != kk),
            SeReg(x, y) => self.skip_if(self.v[x] == self.v[y]),
            SneReg(x, y) => self.skip_if(self.v[x] != self.v[y]),
            LdByte(x, kk) => self.v[x] = kk,
            AddByte(x, kk) => self.v[x] = self.v[x].wrapping_add(kk),
            LdReg(x, y) => self.v[x] = self.v[y],
            Or(x, y) => self.v[x] |= self.v[y],
            And(x, y) => self.v[x] &= self.v[y],
            Xor(x, y) => self.v[x] ^= self.v[y],
            AddReg(x, y) => self.add(x, y),
            Sub(x, y) => self.sub(x, y),
            Subn(x, y) => self.subn(x, y),
            Shr(x) => self.shr(x),
            Shl(x) => self.shl(x),
            LdI(nnn) => self.i = nnn,
            JpV0(nnn) => self.pc = (nnn + self.v[0] as u16) & ADDR_MASK,
            Rnd(x, kk) => self.v[x] = self.rng.gen::<u8>() & kk,
            Drw(x, y, n) => self.draw(x, y, n as usize),
            Skp(x) => self.skip_if(self.key[(self.v[x] & 0xF) as usize]),
            Sknp(x) => self.skip_if(!self.key[(self.v[x] & 0xF) as usize]),
            LdVxK(x) => self.wait_for_key(x),
            LdVxDt(x) => self.v[x] = self.delay_timer,
            LdDtVx(x) => self.delay_timer = self.v[x],
            LdStVx(x) => self.sound_timer = self.v[x],
            AddI(x) => self.i = (self.i + self.v[x] as u16) & ADDR_MASK,
            LdF(x) => self.i = font::glyph_addr(self.v[x]),
            Bcd(x) => self.bcd(x),
            StoreRegs(x) => self.store_regs(x),
            LoadRegs(x) => self.load_regs(x),
            Bad(opcode) => return Err(Chip8Error::BadInstruction { opcode, addr }),
        }
        Ok(())
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = (self.pc + 2) & ADDR_MASK;
        }
    }

    // control flow

    fn call(&mut self, addr: u16, nnn: u16) -> Result<()> {
        let sp = self.sp as usize;
        if sp >= STACK_SIZE {
            return Err(Chip8Error::StackOverflow { addr });
        }
        self.stack[sp] = self.pc;
        self.sp += 1;
        self.pc = nnn;
        Ok(())
    }

    fn ret(&mut self, addr: u16) -> Result<()> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow { addr });
        }
        self.sp -= 1;
        self.pc = self.stack[self.sp as usize];
        Ok(())
    }

    // arithmetic
    //
    // VF is written before the result so that VF as an operand sees the new
    // flag and VF as the destination ends up holding the result.

    fn add(&mut self, x: usize, y: usize) {
        let sum = self.v[x] as u16 + self.v[y] as u16;
        self.v[FLAG] = (sum > 0xFF) as u8;
        self.v[x] = self.v[x].wrapping_add(self.v[y]);
    }

    fn sub(&mut self, x: usize, y: usize) {
        self.v[FLAG] = (self.v[x] >= self.v[y]) as u8;
        self.v[x] = self.v[x].wrapping_sub(self.v[y]);
    }

    fn subn(&mut self, x: usize, y: usize) {
        self.v[FLAG] = (self.v[y] >= self.v[x]) as u8;
        self.v[x] = self.v[y].wrapping_sub(self.v[x]);
    }

    fn shr(&mut self, x: usize) {
        self.v[FLAG] = match self.config.shift {
            ShiftQuirk::Canonical => self.v[x] & 0x01,
            ShiftQuirk::Reference => (self.v[x] >> 3) & 0x01,
        };
        self.v[x] >>= 1;
    }

    fn shl(&mut self, x: usize) {
        self.v[FLAG] = match self.config.shift {
            ShiftQuirk::Canonical => self.v[x] >> 7,
            // an 8-bit value shifted right by 15 is always 0
            ShiftQuirk::Reference => 0,
        };
        self.v[x] <<= 1;
    }

    // display

    fn cls(&mut self) {
        self.gfx = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.draw_flag = true;
    }

    /// DXYN: XOR an 8xN sprite from I onto the screen at VX,VY. VF is set to
    /// 1 if any lit pixel was turned off.
    fn draw(&mut self, x: usize, y: usize, height: usize) {
        let clip = self.config.sprite_edge == SpriteEdge::Clip;
        let vx = self.v[x] as usize % SCREEN_WIDTH;
        let vy = self.v[y] as usize % SCREEN_HEIGHT;

        let mut collision = false;
        for row in 0..height {
            let py = vy + row;
            if clip && py >= SCREEN_HEIGHT {
                break;
            }
            let sprite = self.read(self.i.wrapping_add(row as u16)); // load sprite row starting at I
            for p in 0..8 {
                if sprite & (0x80 >> p) == 0 {
                    continue;
                }
                let px = vx + p;
                if clip && px >= SCREEN_WIDTH {
                    break;
                }
                let offset = SCREEN_WIDTH * (py % SCREEN_HEIGHT) + px % SCREEN_WIDTH;
                collision |= self.gfx[offset] == 1;
                self.gfx[offset] ^= 1;
            }
        }

        self.v[FLAG] = collision as u8;
        self.draw_flag = true;
    }

    // keypad, BCD and memory

    fn wait_for_key(&mut self, x: usize) {
        match self.first_pressed_key() {
            Some(key) => self.v[x] = key,
            None => {
                debug!("waiting for key into V{:X}", x);
                self.waiting_for_key = Some(x);
            }
        }
    }

    fn bcd(&mut self, x: usize) {
        // 193 becomes [1, 9, 3] in memory at I
        let vx = self.v[x];
        self.write(self.i, vx / 100);
        self.write(self.i.wrapping_add(1), (vx / 10) % 10);
        self.write(self.i.wrapping_add(2), vx % 10);
    }

    fn store_regs(&mut self, x: usize) {
        for offset in 0..=x {
            self.write(self.i.wrapping_add(offset as u16), self.v[offset]);
        }
        self.i = (self.i + x as u16 + 1) & ADDR_MASK;
    }

    fn load_regs(&mut self, x: usize) {
        for offset in 0..=x {
            self.v[offset] = self.read(self.i.wrapping_add(offset as u16));
        }
        self.i = (self.i + x as u16 + 1) & ADDR_MASK;
    }
}
