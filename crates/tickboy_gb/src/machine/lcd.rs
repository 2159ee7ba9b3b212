//! LCD controller: video memories, the per-line mode state machine, OAM DMA
//! and the frame being assembled.
//!
//! Each visible line spends 20 cycles in mode 2, 43 in mode 3 and 51 in
//! mode 0; the controller only wakes at those boundaries. Lines are drawn
//! whole at the start of mode 3.

mod image;
mod line;
mod render;

use std::mem;

use crate::address_map::{
    OAM_END, OAM_RAM_SIZE, OAM_START, REGS_LCDC_END, REGS_LCDC_START, VIDEO_RAM_END,
    VIDEO_RAM_SIZE, VIDEO_RAM_START,
};
use crate::bits::{self, Bit};
use crate::bus::{AddressSpace, Component};
use crate::cpu::{Interrupt, InterruptRequests};
use crate::register_file::{Register, RegisterFile};

use super::memory::Ram;

pub use image::{LcdImage, LcdImageBuilder};
pub use line::{LcdImageLine, LcdImageLineBuilder};

pub const LCD_WIDTH: usize = 160;
pub const LCD_HEIGHT: usize = 144;

const LINE_CYCLES: u64 = 114;
const LINES_PER_FRAME: u64 = 154;
pub const FRAME_CYCLES: u64 = LINE_CYCLES * LINES_PER_FRAME;
const MODE2_CYCLES: u64 = 20;
const MODE3_CYCLES: u64 = 43;
const MODE0_CYCLES: u64 = 51;
const HBLANK_START: u64 = MODE2_CYCLES + MODE3_CYCLES;
const VBLANK_START: u64 = LCD_HEIGHT as u64 * LINE_CYCLES;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LcdReg {
    Lcdc = 0,
    Stat = 1,
    Scy = 2,
    Scx = 3,
    Ly = 4,
    Lyc = 5,
    Dma = 6,
    Bgp = 7,
    Obp0 = 8,
    Obp1 = 9,
    Wy = 10,
    Wx = 11,
}

/// Registers in address order from 0xFF40.
const LCD_REGS: [LcdReg; 12] = [
    LcdReg::Lcdc,
    LcdReg::Stat,
    LcdReg::Scy,
    LcdReg::Scx,
    LcdReg::Ly,
    LcdReg::Lyc,
    LcdReg::Dma,
    LcdReg::Bgp,
    LcdReg::Obp0,
    LcdReg::Obp1,
    LcdReg::Wy,
    LcdReg::Wx,
];

impl Register for LcdReg {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug)]
enum Lcdc {
    Bg = 0,
    Obj = 1,
    ObjSize = 2,
    BgArea = 3,
    TileSource = 4,
    Win = 5,
    WinArea = 6,
    LcdStatus = 7,
}

impl Bit for Lcdc {
    #[inline]
    fn index(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug)]
enum Stat {
    Mode0 = 0,
    Mode1 = 1,
    LycEqLy = 2,
    IntMode0 = 3,
    IntMode1 = 4,
    IntMode2 = 5,
    IntLyc = 6,
}

impl Bit for Stat {
    #[inline]
    fn index(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    Transfer = 3,
}

pub struct LcdController {
    regs: RegisterFile<LcdReg, 12>,
    video_ram: Ram,
    oam: Ram,
    /// `u64::MAX` while the LCD is off.
    next_non_idle_cycle: u64,
    lcd_on_cycle: u64,
    next_image: LcdImageBuilder,
    image: LcdImage,
    win_y: usize,
    /// Next OAM byte to copy; `OAM_RAM_SIZE` when no transfer is running.
    dma_offset: usize,
    requests: InterruptRequests,
}

impl Default for LcdController {
    fn default() -> Self {
        Self::new()
    }
}

impl LcdController {
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            video_ram: Ram::new(VIDEO_RAM_SIZE),
            oam: Ram::new(OAM_RAM_SIZE),
            next_non_idle_cycle: u64::MAX,
            lcd_on_cycle: 0,
            next_image: LcdImageBuilder::new(LCD_WIDTH, LCD_HEIGHT),
            image: LcdImageBuilder::new(LCD_WIDTH, LCD_HEIGHT).build(),
            win_y: 0,
            dma_offset: OAM_RAM_SIZE,
            requests: InterruptRequests::default(),
        }
    }

    /// LCDC and BGP as the boot ROM leaves them.
    pub(crate) fn apply_dmg_boot_state(&mut self) {
        self.regs.set(LcdReg::Lcdc, 0x91);
        self.regs.set(LcdReg::Bgp, 0xFC);
    }

    /// The last frame completed at V-blank.
    pub fn current_image(&self) -> &LcdImage {
        &self.image
    }

    pub(crate) fn take_requests(&mut self) -> InterruptRequests {
        self.requests.take()
    }

    pub fn cycle<A: AddressSpace>(&mut self, cycle: u64, bus: &mut A) {
        if self.next_non_idle_cycle == u64::MAX && self.regs.test_bit(LcdReg::Lcdc, Lcdc::LcdStatus) {
            log::debug!("LCD: on at cycle {cycle}");
            self.next_non_idle_cycle = cycle;
            self.lcd_on_cycle = cycle;
        }

        if self.dma_offset < OAM_RAM_SIZE {
            let source = bits::make16(self.regs.get(LcdReg::Dma), self.dma_offset as u8);
            let value = match self.read(source) {
                Some(value) => value,
                None => bus.read8(source),
            };
            self.oam.write(self.dma_offset, value);
            self.dma_offset += 1;
        }

        if cycle == self.next_non_idle_cycle {
            self.advance(cycle);
        }
    }

    fn advance(&mut self, cycle: u64) {
        let elapsed = (cycle - self.lcd_on_cycle) % FRAME_CYCLES;
        let line = (elapsed / LINE_CYCLES) as u8;

        if elapsed < VBLANK_START {
            match elapsed % LINE_CYCLES {
                0 => {
                    if elapsed == 0 {
                        self.next_image = LcdImageBuilder::new(LCD_WIDTH, LCD_HEIGHT);
                        self.win_y = 0;
                    }
                    self.set_mode(Mode::OamSearch);
                    self.update_ly_lyc(LcdReg::Ly, line);
                    self.next_non_idle_cycle += MODE2_CYCLES;
                }
                MODE2_CYCLES => {
                    self.set_mode(Mode::Transfer);
                    self.compute_line(line as usize);
                    self.next_non_idle_cycle += MODE3_CYCLES;
                }
                HBLANK_START => {
                    self.set_mode(Mode::HBlank);
                    self.next_non_idle_cycle += MODE0_CYCLES;
                }
                _ => {}
            }
        } else {
            if elapsed == VBLANK_START {
                self.set_mode(Mode::VBlank);
                let finished = mem::replace(
                    &mut self.next_image,
                    LcdImageBuilder::new(LCD_WIDTH, LCD_HEIGHT),
                );
                self.image = finished.build();
                self.requests.raise(Interrupt::VBlank);
                log::trace!("LCD: frame complete at cycle {cycle}");
            }
            self.update_ly_lyc(LcdReg::Ly, line);
            self.next_non_idle_cycle += LINE_CYCLES;
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        let m = mode as u32;
        self.regs.set_bit(LcdReg::Stat, Stat::Mode0, bits::test(m, 0));
        self.regs.set_bit(LcdReg::Stat, Stat::Mode1, bits::test(m, 1));
        let source = match mode {
            Mode::HBlank => Some(Stat::IntMode0),
            Mode::VBlank => Some(Stat::IntMode1),
            Mode::OamSearch => Some(Stat::IntMode2),
            Mode::Transfer => None,
        };
        if source.is_some_and(|s| self.regs.test_bit(LcdReg::Stat, s)) {
            self.requests.raise(Interrupt::LcdStat);
        }
    }

    /// Write LY or LYC and refresh the coincidence flag.
    fn update_ly_lyc(&mut self, reg: LcdReg, value: u8) {
        self.regs.set(reg, value);
        let equal = self.regs.get(LcdReg::Ly) == self.regs.get(LcdReg::Lyc);
        self.regs.set_bit(LcdReg::Stat, Stat::LycEqLy, equal);
        if equal && self.regs.test_bit(LcdReg::Stat, Stat::IntLyc) {
            self.requests.raise(Interrupt::LcdStat);
        }
    }
}

impl Component for LcdController {
    fn read(&self, address: u16) -> Option<u8> {
        match address {
            a if (VIDEO_RAM_START..VIDEO_RAM_END).contains(&a) => {
                Some(self.video_ram.read((a - VIDEO_RAM_START) as usize))
            }
            a if (REGS_LCDC_START..REGS_LCDC_END).contains(&a) => {
                Some(self.regs.get(LCD_REGS[(a - REGS_LCDC_START) as usize]))
            }
            a if (OAM_START..OAM_END).contains(&a) => Some(self.oam.read((a - OAM_START) as usize)),
            _ => None,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match address {
            a if (VIDEO_RAM_START..VIDEO_RAM_END).contains(&a) => {
                self.video_ram.write((a - VIDEO_RAM_START) as usize, data)
            }
            a if (OAM_START..OAM_END).contains(&a) => self.oam.write((a - OAM_START) as usize, data),
            a if (REGS_LCDC_START..REGS_LCDC_END).contains(&a) => {
                match LCD_REGS[(a - REGS_LCDC_START) as usize] {
                    LcdReg::Lcdc => {
                        let was_on = self.regs.test_bit(LcdReg::Lcdc, Lcdc::LcdStatus);
                        if was_on && !bits::test_bit(data as u32, Lcdc::LcdStatus) {
                            log::debug!("LCD: off");
                            self.set_mode(Mode::HBlank);
                            self.update_ly_lyc(LcdReg::Ly, 0);
                            self.next_non_idle_cycle = u64::MAX;
                        }
                        self.regs.set(LcdReg::Lcdc, data);
                    }
                    LcdReg::Stat => {
                        // Mode and coincidence bits are read-only.
                        let stat = (self.regs.get(LcdReg::Stat) & 0b111) | (data & !0b111);
                        self.regs.set(LcdReg::Stat, stat);
                    }
                    LcdReg::Ly => {}
                    LcdReg::Lyc => self.update_ly_lyc(LcdReg::Lyc, data),
                    LcdReg::Dma => {
                        log::debug!("LCD: OAM DMA from 0x{data:02X}00");
                        self.dma_offset = 0;
                        self.regs.set(LcdReg::Dma, data);
                    }
                    reg => self.regs.set(reg, data),
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::machine::memory::RamController;

    const REG_LCDC: u16 = 0xFF40;
    const REG_STAT: u16 = 0xFF41;
    const REG_LY: u16 = 0xFF44;
    const REG_LYC: u16 = 0xFF45;
    const REG_DMA: u16 = 0xFF46;

    fn run(lcd: &mut LcdController, bus: &mut Bus, from: u64, to: u64) {
        for c in from..to {
            lcd.cycle(c, bus);
        }
    }

    fn mode(lcd: &LcdController) -> u8 {
        lcd.read(REG_STAT).unwrap_or(0) & 0b11
    }

    #[test]
    fn registers_are_mapped_in_order() {
        let mut lcd = LcdController::new();
        for (i, a) in (REGS_LCDC_START..REGS_LCDC_END).enumerate() {
            if ![REG_LCDC, REG_STAT, REG_LY, REG_LYC, REG_DMA].contains(&a) {
                lcd.write(a, i as u8 + 1);
                assert_eq!(lcd.read(a), Some(i as u8 + 1));
            }
        }
        assert_eq!(lcd.read(REGS_LCDC_END), None);
        lcd.write(REG_LY, 9);
        assert_eq!(lcd.read(REG_LY), Some(0));
    }

    #[test]
    fn mode_sequence_over_a_line() {
        let mut lcd = LcdController::new();
        let mut bus = Bus::new();
        lcd.write(REG_LCDC, 0x80);
        run(&mut lcd, &mut bus, 0, 1);
        assert_eq!(mode(&lcd), 2);
        run(&mut lcd, &mut bus, 1, 21);
        assert_eq!(mode(&lcd), 3);
        run(&mut lcd, &mut bus, 21, 64);
        assert_eq!(mode(&lcd), 0);
        run(&mut lcd, &mut bus, 64, 115);
        assert_eq!(lcd.read(REG_LY), Some(1));
        assert_eq!(mode(&lcd), 2);
    }

    #[test]
    fn vblank_latches_the_frame_and_interrupts() {
        let mut lcd = LcdController::new();
        let mut bus = Bus::new();
        lcd.write(REG_LCDC, 0x80);
        run(&mut lcd, &mut bus, 0, VBLANK_START);
        assert!(!lcd.take_requests().is_raised(Interrupt::VBlank));
        run(&mut lcd, &mut bus, VBLANK_START, VBLANK_START + 1);
        assert_eq!(mode(&lcd), 1);
        assert_eq!(lcd.read(REG_LY), Some(144));
        assert!(lcd.take_requests().is_raised(Interrupt::VBlank));
        run(&mut lcd, &mut bus, VBLANK_START + 1, FRAME_CYCLES);
        assert_eq!(lcd.read(REG_LY), Some(153));
    }

    #[test]
    fn lyc_match_raises_stat() {
        let mut lcd = LcdController::new();
        let mut bus = Bus::new();
        lcd.write(REG_STAT, 0x40);
        lcd.write(REG_LYC, 2);
        lcd.write(REG_LCDC, 0x80);
        run(&mut lcd, &mut bus, 0, 2 * LINE_CYCLES);
        assert_eq!(lcd.take_requests().bits(), 0);
        run(&mut lcd, &mut bus, 2 * LINE_CYCLES, 2 * LINE_CYCLES + 1);
        assert!(lcd.read(REG_STAT).is_some_and(|s| s & 0b100 != 0));
        assert!(lcd.take_requests().is_raised(Interrupt::LcdStat));
    }

    #[test]
    fn turning_off_resets_ly_and_stops() {
        let mut lcd = LcdController::new();
        let mut bus = Bus::new();
        lcd.write(REG_LCDC, 0x80);
        run(&mut lcd, &mut bus, 0, 3 * LINE_CYCLES + 1);
        assert_eq!(lcd.read(REG_LY), Some(3));
        lcd.write(REG_LCDC, 0x00);
        assert_eq!(lcd.read(REG_LY), Some(0));
        assert_eq!(mode(&lcd), 0);
        assert_eq!(lcd.next_non_idle_cycle, u64::MAX);
    }

    #[test]
    fn dma_copies_one_byte_per_cycle() {
        let mut lcd = LcdController::new();
        let mut bus = Bus::new();
        let mut ram = RamController::new(Ram::new(0x100), 0xC000, 0xC100);
        for i in 0..0xA0u16 {
            ram.write(0xC000 + i, i as u8 ^ 0x5A);
        }
        bus.attach(ram);

        lcd.write(REG_DMA, 0xC0);
        assert_eq!(lcd.read(REG_DMA), Some(0xC0));
        run(&mut lcd, &mut bus, 0, 10);
        assert_eq!(lcd.read(OAM_START + 9), Some(9 ^ 0x5A));
        assert_eq!(lcd.read(OAM_START + 10), Some(0));
        run(&mut lcd, &mut bus, 10, 200);
        assert_eq!(lcd.read(OAM_START + 0x9F), Some(0x9F ^ 0x5A));
    }

    #[test]
    fn register_tags_follow_address_order() {
        assert!(LCD_REGS.iter().enumerate().all(|(i, r)| r.index() == i));
        assert_eq!(LcdReg::Wx.index(), 11);
        assert_eq!([Lcdc::Bg.index(), Lcdc::LcdStatus.index()], [0, 7]);
        assert_eq!([Stat::IntMode0.index(), Stat::IntLyc.index()], [3, 6]);
    }

    #[test]
    fn stat_mode_sources_raise_lcd_stat() {
        let mut lcd = LcdController::new();
        let mut bus = Bus::new();
        lcd.write(REG_STAT, 0x20);
        lcd.write(REG_LCDC, 0x80);
        run(&mut lcd, &mut bus, 0, 1);
        assert!(lcd.take_requests().is_raised(Interrupt::LcdStat));
        run(&mut lcd, &mut bus, 1, HBLANK_START);
        assert_eq!(lcd.take_requests().bits(), 0);

        lcd.write(REG_STAT, 0x08);
        run(&mut lcd, &mut bus, HBLANK_START, HBLANK_START + 1);
        assert_eq!(mode(&lcd), 0);
        assert!(lcd.take_requests().is_raised(Interrupt::LcdStat));

        lcd.write(REG_STAT, 0x10);
        run(&mut lcd, &mut bus, HBLANK_START + 1, VBLANK_START);
        assert_eq!(lcd.take_requests().bits(), 0);
        run(&mut lcd, &mut bus, VBLANK_START, VBLANK_START + 1);
        let requests = lcd.take_requests();
        assert!(requests.is_raised(Interrupt::LcdStat));
        assert!(requests.is_raised(Interrupt::VBlank));
    }
}
