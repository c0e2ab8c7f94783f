use std::{env, fs, path::Path, thread, time::Instant};

use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use dmg_core::Machine;

mod constants;
mod input;
mod sdl_setup;

fn main() -> Result<(), String> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: {} <rom_path>", args[0]);
        std::process::exit(1);
    }
    let rom_path = Path::new(&args[1]);
    let rom_bytes = fs::read(rom_path).map_err(|e| format!("failed to read {}: {e}", rom_path.display()))?;

    let title = format!("dmg-core - {}", rom_path.file_name().unwrap_or_default().to_string_lossy());
    let mut sdl_context = sdl_setup::init_sdl(&title)?;

    let mut machine = Machine::new();
    machine.load(rom_path, &rom_bytes).map_err(|e| e.to_string())?;

    let mut texture = sdl_context
        .texture_creator
        .create_texture_streaming(PixelFormatEnum::RGBA32, constants::GB_WIDTH as u32, constants::GB_HEIGHT as u32)
        .map_err(|e| e.to_string())?;

    'main_loop: loop {
        let frame_start = Instant::now();

        if input::handle_input(&mut sdl_context.event_pump, &mut machine) {
            break 'main_loop;
        }

        machine.update(1.0 / constants::TARGET_FPS as f32);

        if let Some(fault) = machine.fault() {
            eprintln!("core halted: {fault}");
        }

        texture
            .update(None, machine.read_framebuffer(), constants::GB_WIDTH * 4)
            .map_err(|e| e.to_string())?;
        sdl_context.canvas.clear();
        sdl_context
            .canvas
            .copy(&texture, None, Rect::new(0, 0, constants::WINDOW_WIDTH, constants::WINDOW_HEIGHT))?;
        sdl_context.canvas.present();

        let elapsed = frame_start.elapsed();
        if elapsed < constants::TARGET_FRAME_DURATION {
            thread::sleep(constants::TARGET_FRAME_DURATION - elapsed);
        }
    }

    machine.close().map_err(|e| e.to_string())?;
    Ok(())
}
