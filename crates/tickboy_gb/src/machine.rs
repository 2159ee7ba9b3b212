mod cartridge;
mod gameboy;
pub mod joypad;
pub mod lcd;
pub(crate) mod memory;
mod timer;

pub use cartridge::{Cartridge, Mbc0, Mbc1};
pub use gameboy::{GameBoy, CYCLES_PER_FRAME, CYCLES_PER_SECOND};
pub use joypad::{Joypad, Key};
pub use lcd::{LcdController, LcdImage, LcdImageLine};
pub use timer::Timer;
