extern crate sdl2;

use std::env;
use std::error::Error;
use std::time::{Duration, Instant};

use chip8vm::{Chip8, SCREEN_HEIGHT, SCREEN_WIDTH};
use log::{error, info};
use sdl2::event::Event;
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::Keycode;
use sdl2::pixels;

const SCALE: i16 = 10;
const TIMER_PERIOD: Duration = Duration::from_micros(1_000_000 / 60);

/// hex keypad layout on the left of a QWERTY keyboard
fn keypad(keycode: Keycode) -> Option<usize> {
    let key = match keycode {
        Keycode::X => 0x0,
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Q => 0x4,
        Keycode::W => 0x5,
        Keycode::E => 0x6,
        Keycode::A => 0x7,
        Keycode::S => 0x8,
        Keycode::D => 0x9,
        Keycode::Z => 0xA,
        Keycode::C => 0xB,
        Keycode::Num4 => 0xC,
        Keycode::R => 0xD,
        Keycode::F => 0xE,
        Keycode::V => 0xF,
        _ => return None,
    };
    Some(key)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let rom = args.next().ok_or("usage: chip8vm <rom> [cycle_delay_ms]")?;
    let delay: u64 = match args.next() {
        Some(ms) => ms.parse()?,
        None => 2,
    };

    let mut emu = Chip8::new();
    emu.load_rom(&rom)?;
    info!("running {}", rom);

    let sdl_ctx = sdl2::init()?;
    let video = sdl_ctx.video()?;

    let window = video
        .window(
            "CHIP-8",
            SCREEN_WIDTH as u32 * SCALE as u32,
            SCREEN_HEIGHT as u32 * SCALE as u32,
        )
        .position_centered()
        .build()?;
    let mut canvas = window.into_canvas().build()?;

    let black = pixels::Color::RGB(0, 0, 0);
    let white = pixels::Color::RGB(255, 255, 255);
    canvas.set_draw_color(black);
    canvas.clear();
    canvas.present();

    let mut event_pump = sdl_ctx.event_pump()?;

    let sleep = Duration::from_millis(delay);
    let mut last_tick = Instant::now();

    'main: loop {
        for e in event_pump.poll_iter() {
            match e {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                Event::KeyDown {
                    keycode: Some(Keycode::Y),
                    ..
                } => emu.reset(),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => {
                    if let Some(key) = keypad(k) {
                        emu.press_key(key);
                    }
                }
                Event::KeyUp {
                    keycode: Some(k), ..
                } => {
                    if let Some(key) = keypad(k) {
                        emu.release_key(key);
                    }
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= TIMER_PERIOD {
            emu.tick();
            last_tick = Instant::now();
        }

        if let Err(e) = emu.step() {
            error!("halting: {}", e);
            break 'main;
        }

        if emu.draw_flag() {
            canvas.set_draw_color(black);
            canvas.clear();
            for (i, p) in emu.gfx().iter().enumerate() {
                if *p == 0 {
                    continue;
                }
                let x = (i % SCREEN_WIDTH) as i16 * SCALE;
                let y = (i / SCREEN_WIDTH) as i16 * SCALE;
                canvas.box_(x, y, x + SCALE - 1, y + SCALE - 1, white)?;
            }
            canvas.present();
        }

        std::thread::sleep(sleep);
    }

    Ok(())
}
