//! Line composition: background, window and sprites.

use bitflags::bitflags;

use super::line::{LcdImageLine, LcdImageLineBuilder};
use super::{Lcdc, LcdController, LcdReg, LCD_WIDTH};
use crate::address_map::{BG_DISPLAY_DATA, OAM_RAM_SIZE, TILE_SOURCE, VIDEO_RAM_START};
use crate::bits;

/// Width and height of the tile maps, in pixels.
const BG_SIZE: usize = 256;
const TILES_PER_ROW: usize = 32;
const TILE_SIDE: usize = 8;
const BYTES_PER_TILE: u16 = 16;
const BYTES_PER_SPRITE: usize = 4;
const MAX_SPRITES_PER_LINE: usize = 10;
const WINDOW_X_OFFSET: i32 = 7;
const SPRITE_X_OFFSET: i32 = 8;
const SPRITE_Y_OFFSET: i32 = 16;

bitflags! {
    /// OAM attribute byte.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(super) struct SpriteFlags: u8 {
        const PALETTE = 1 << 4;
        const FLIP_H = 1 << 5;
        const FLIP_V = 1 << 6;
        const BEHIND_BG = 1 << 7;
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Sprite {
    index: usize,
    y: u8,
    x: u8,
    tile: u8,
    flags: SpriteFlags,
}

impl LcdController {
    pub(super) fn compute_line(&mut self, y: usize) {
        let bgp = self.regs.get(LcdReg::Bgp);

        let background = if self.regs.test_bit(LcdReg::Lcdc, Lcdc::Bg) {
            let row = (y + self.regs.get(LcdReg::Scy) as usize) % BG_SIZE;
            self.tile_map_line(row, Lcdc::BgArea)
        } else {
            LcdImageLine::blank(BG_SIZE)
        };
        let mut line = background
            .extract_wrapped(self.regs.get(LcdReg::Scx) as i32, LCD_WIDTH)
            .map_colors(bgp);

        let wx = (self.regs.get(LcdReg::Wx) as i32 - WINDOW_X_OFFSET).max(0) as usize;
        if self.regs.test_bit(LcdReg::Lcdc, Lcdc::Win)
            && wx < LCD_WIDTH
            && y >= self.regs.get(LcdReg::Wy) as usize
        {
            let window = self
                .tile_map_line(self.win_y, Lcdc::WinArea)
                .extract_wrapped(0, LCD_WIDTH)
                .map_colors(bgp);
            line = line.join(wx, &window.shift(wx as i32));
            self.win_y += 1;
        }

        let mut front = LcdImageLine::blank(LCD_WIDTH);
        if self.regs.test_bit(LcdReg::Lcdc, Lcdc::Obj) {
            let mut behind = LcdImageLine::blank(LCD_WIDTH);
            // Sorted by x, so earlier sprites end up on top.
            for sprite in self.sprites_on_line(y) {
                let sprite_line = self.sprite_line(y, &sprite);
                if sprite.flags.contains(SpriteFlags::BEHIND_BG) {
                    behind = sprite_line.below(&behind);
                } else {
                    front = sprite_line.below(&front);
                }
            }
            // Background-priority sprites show only through colour 0.
            let opacity = behind.opacity().not().or(line.opacity());
            line = behind.below_with_opacity(&opacity, &line);
        }

        self.next_image.set_line(y, line.below(&front));
    }

    #[inline]
    fn vram(&self, address: u16) -> u8 {
        self.video_ram.read((address - VIDEO_RAM_START) as usize)
    }

    /// One 256-pixel row of the tile map chosen by `area`, before scrolling
    /// and palette mapping.
    fn tile_map_line(&self, row: usize, area: Lcdc) -> LcdImageLine {
        let unsigned_tiles = self.regs.test_bit(LcdReg::Lcdc, Lcdc::TileSource);
        let tile_data = TILE_SOURCE[unsigned_tiles as usize];
        let map = BG_DISPLAY_DATA[self.regs.test_bit(LcdReg::Lcdc, area) as usize];
        let map_row = map + (TILES_PER_ROW * (row / TILE_SIDE)) as u16;

        let mut builder = LcdImageLineBuilder::new(BG_SIZE);
        for x in 0..TILES_PER_ROW {
            let index = self.vram(map_row + x as u16) as u16;
            // In 0x8800 mode, tile numbers are signed around 0x9000.
            let tile = match (unsigned_tiles, index) {
                (true, _) => tile_data + index * BYTES_PER_TILE,
                (false, 0x00..=0x7F) => tile_data + 0x800 + index * BYTES_PER_TILE,
                (false, _) => tile_data + (index - 0x80) * BYTES_PER_TILE,
            };
            let address = tile + (row % TILE_SIDE) as u16 * 2;
            builder.set_bytes(
                x,
                bits::reverse8(self.vram(address + 1)),
                bits::reverse8(self.vram(address)),
            );
        }
        builder.build()
    }

    fn sprite_height(&self) -> i32 {
        if self.regs.test_bit(LcdReg::Lcdc, Lcdc::ObjSize) {
            16
        } else {
            8
        }
    }

    fn sprite(&self, index: usize) -> Sprite {
        let base = index * BYTES_PER_SPRITE;
        Sprite {
            index,
            y: self.oam.read(base),
            x: self.oam.read(base + 1),
            tile: self.oam.read(base + 2),
            flags: SpriteFlags::from_bits_truncate(self.oam.read(base + 3)),
        }
    }

    /// Up to ten sprites covering line `y`, first found in OAM order, then
    /// sorted by x (ties by OAM index).
    pub(super) fn sprites_on_line(&self, y: usize) -> Vec<Sprite> {
        let height = self.sprite_height();
        let y = y as i32;
        let mut sprites: Vec<Sprite> = (0..OAM_RAM_SIZE / BYTES_PER_SPRITE)
            .map(|i| self.sprite(i))
            .filter(|s| {
                let top = s.y as i32 - SPRITE_Y_OFFSET;
                (top..top + height).contains(&y)
            })
            .take(MAX_SPRITES_PER_LINE)
            .collect();
        sprites.sort_by_key(|s| (s.x, s.index));
        sprites
    }

    fn sprite_line(&self, y: usize, sprite: &Sprite) -> LcdImageLine {
        let height = self.sprite_height();
        let mut row = y as i32 - (sprite.y as i32 - SPRITE_Y_OFFSET);
        if sprite.flags.contains(SpriteFlags::FLIP_V) {
            row = height - 1 - row;
        }
        // Tall sprites ignore bit 0 of the tile number.
        let tile = if height == 16 {
            sprite.tile & 0xFE
        } else {
            sprite.tile
        };
        let address = tile as usize * BYTES_PER_TILE as usize + row as usize * 2;
        let (mut msb, mut lsb) = (self.video_ram.read(address + 1), self.video_ram.read(address));
        if !sprite.flags.contains(SpriteFlags::FLIP_H) {
            msb = bits::reverse8(msb);
            lsb = bits::reverse8(lsb);
        }

        let palette = if sprite.flags.contains(SpriteFlags::PALETTE) {
            self.regs.get(LcdReg::Obp1)
        } else {
            self.regs.get(LcdReg::Obp0)
        };
        let mut builder = LcdImageLineBuilder::new(LCD_WIDTH);
        builder.set_bytes(0, msb, lsb);
        builder
            .build()
            .shift(sprite.x as i32 - SPRITE_X_OFFSET)
            .map_colors(palette)
    }
}
