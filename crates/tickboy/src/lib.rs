use std::path::PathBuf;

use anyhow::{Context, Result};
use tickboy_common::app::App;
use tickboy_gb::machine::Cartridge;
use tickboy_gb::{GameBoy, GameBoyApp};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct RunConfig {
    pub rom_path: PathBuf,
    #[builder(default)]
    pub boot_rom_path: Option<PathBuf>,
    #[builder(default = 60)]
    pub frames: u32,
    /// Where the last frame goes as raw RGB24, if anywhere.
    #[builder(default)]
    pub dump_path: Option<PathBuf>,
}

/// What a headless run ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u32,
    pub cycles: u64,
    pub screen: Vec<u8>,
}

pub fn load_gameboy(config: &RunConfig) -> Result<GameBoy> {
    log::info!("Loading ROM '{}'", config.rom_path.display());
    let cartridge = Cartridge::from_file(&config.rom_path)?;
    match &config.boot_rom_path {
        Some(path) => {
            let boot = std::fs::read(path)
                .with_context(|| format!("failed to read boot ROM {}", path.display()))?;
            GameBoy::with_boot_rom(cartridge, &boot)
        }
        None => Ok(GameBoy::new(cartridge)),
    }
}

/// Drive the machine through the `App` surface for `config.frames` frames.
pub fn run(config: RunConfig) -> Result<RunSummary> {
    let mut app = GameBoyApp::new(load_gameboy(&config)?);
    let mut screen = vec![0u8; (app.width() * app.height() * 3) as usize];

    app.init();
    let mut frames = 0;
    while frames < config.frames && !app.should_exit() {
        app.update(&mut screen);
        frames += 1;
    }
    app.exit();

    if let Some(path) = &config.dump_path {
        std::fs::write(path, &screen)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Wrote {} bytes of RGB24 to '{}'", screen.len(), path.display());
    }

    Ok(RunSummary {
        frames,
        cycles: app.gb.cycles(),
        screen,
    })
}
