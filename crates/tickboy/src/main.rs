use std::path::PathBuf;

use tickboy::RunConfig;

const USAGE: &str = "Usage: tickboy <rom_path> [frames] [dump_rgb24_path] [boot_rom_path]";

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(rom_path) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let frames = match args.next().map(|f| f.parse::<u32>()) {
        Some(Ok(frames)) => frames,
        Some(Err(_)) => {
            eprintln!("Invalid frame count.\n{USAGE}");
            std::process::exit(2);
        }
        None => 60,
    };
    let dump_path = args.next().map(PathBuf::from);
    let boot_rom_path = args.next().map(PathBuf::from);

    let config = RunConfig::builder()
        .rom_path(PathBuf::from(rom_path))
        .boot_rom_path(boot_rom_path)
        .frames(frames)
        .dump_path(dump_path)
        .build();

    match tickboy::run(config) {
        Ok(summary) => println!(
            "Ran {} frames ({} cycles)",
            summary.frames, summary.cycles
        ),
        Err(err) => {
            eprintln!("tickboy: {err:#}");
            std::process::exit(1);
        }
    }
}
