use std::path::PathBuf;

use anyhow::Context;
use tickboy_gb::machine::Cartridge;
use tickboy_gb::{GameBoy, SCREEN_HEIGHT, SCREEN_WIDTH};

const USAGE: &str = "Usage: gb_frame_dump <rom_path> <out_rgb24_path> [frames] [boot_rom_path]";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(rom_path), Some(out_path)) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let (rom_path, out_path) = (PathBuf::from(rom_path), PathBuf::from(out_path));
    let frames: u32 = match args.next() {
        Some(frames) => frames
            .parse()
            .with_context(|| format!("invalid frame count '{frames}'"))?,
        None => 120,
    };

    let cartridge = Cartridge::from_file(&rom_path)?;
    let mut gb = match args.next() {
        Some(boot_path) => {
            let boot = std::fs::read(&boot_path)
                .with_context(|| format!("failed to read boot ROM {boot_path}"))?;
            GameBoy::with_boot_rom(cartridge, &boot)?
        }
        None => GameBoy::new(cartridge),
    };

    for _ in 0..frames {
        gb.run_frame();
    }

    let mut buffer = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
    gb.video_frame(&mut buffer);
    std::fs::write(&out_path, &buffer)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    println!(
        "Wrote {} bytes ({}x{} rgb24) after {} frames to '{}'",
        buffer.len(),
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        frames,
        out_path.display()
    );
    Ok(())
}
