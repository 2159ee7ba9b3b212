//! DMG memory map. Ranges are half-open: `*_END` is one past the last byte.

pub const BOOT_ROM_START: u16 = 0x0000;
pub const BOOT_ROM_END: u16 = 0x0100;
pub const BOOT_ROM_SIZE: usize = (BOOT_ROM_END - BOOT_ROM_START) as usize;

pub const CARTRIDGE_HEADER_TYPE: usize = 0x0147;
pub const CARTRIDGE_HEADER_RAM_SIZE: usize = 0x0149;
pub const CARTRIDGE_ROM_END: u16 = 0x8000;

pub const VIDEO_RAM_START: u16 = 0x8000;
pub const VIDEO_RAM_END: u16 = 0xA000;
pub const VIDEO_RAM_SIZE: usize = (VIDEO_RAM_END - VIDEO_RAM_START) as usize;

pub const EXTERNAL_RAM_START: u16 = 0xA000;
pub const EXTERNAL_RAM_END: u16 = 0xC000;

pub const WORK_RAM_START: u16 = 0xC000;
pub const WORK_RAM_END: u16 = 0xE000;
pub const WORK_RAM_SIZE: usize = (WORK_RAM_END - WORK_RAM_START) as usize;

pub const ECHO_RAM_START: u16 = 0xE000;
pub const ECHO_RAM_END: u16 = 0xFE00;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFEA0;
pub const OAM_RAM_SIZE: usize = (OAM_END - OAM_START) as usize;

pub const REGS_START: u16 = 0xFF00;
pub const REG_P1: u16 = 0xFF00;
pub const REG_DIV: u16 = 0xFF04;
pub const REG_TIMA: u16 = 0xFF05;
pub const REG_TMA: u16 = 0xFF06;
pub const REG_TAC: u16 = 0xFF07;
pub const REG_IF: u16 = 0xFF0F;
pub const REGS_LCDC_START: u16 = 0xFF40;
pub const REGS_LCDC_END: u16 = 0xFF4C;
pub const REG_BOOT_ROM_DISABLE: u16 = 0xFF50;

pub const HIGH_RAM_START: u16 = 0xFF80;
pub const HIGH_RAM_END: u16 = 0xFFFF;
pub const HIGH_RAM_SIZE: usize = (HIGH_RAM_END - HIGH_RAM_START) as usize;

pub const REG_IE: u16 = 0xFFFF;

/// Tile data blocks selected by LCDC.TILE_SOURCE (0 = signed, 1 = unsigned).
pub const TILE_SOURCE: [u16; 2] = [0x8800, 0x8000];
/// Tile maps selected by LCDC.BG_AREA / LCDC.WIN_AREA.
pub const BG_DISPLAY_DATA: [u16; 2] = [0x9800, 0x9C00];

/// Interrupt handler entry points, by interrupt index.
pub const INTERRUPTS: [u16; 5] = [0x40, 0x48, 0x50, 0x58, 0x60];
/// `RST n` targets, by the 3-bit field of the opcode.
pub const RESETS: [u16; 8] = [0x00, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38];
