use crate::address_map::{CARTRIDGE_ROM_END, EXTERNAL_RAM_END, EXTERNAL_RAM_START};
use crate::bus::Component;
use crate::machine::memory::{Ram, Rom};

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// MBC1 bank controller.
///
/// ROM banking through a 5-bit low register and a 2-bit high register, plus
/// up to four 8 KiB banks of external RAM. In mode 1 the high register also
/// selects the bank seen at 0x0000..0x3FFF and the RAM bank. Battery-backed
/// persistence is not modelled.
pub struct Mbc1 {
    rom: Rom,
    ram: Ram,
    ram_enabled: bool,
    rom_bank_low5: u8,
    bank_high2: u8,
    /// 0 = ROM banking, 1 = RAM banking.
    mode: u8,
}

impl Mbc1 {
    pub(super) fn new(rom: Rom, ram_size: usize) -> Self {
        Self {
            rom,
            ram: Ram::new(ram_size),
            ram_enabled: false,
            rom_bank_low5: 1,
            bank_high2: 0,
            mode: 0,
        }
    }

    fn rom_index(&self, address: u16) -> usize {
        let bank = if address < 0x4000 {
            if self.mode == 1 {
                (self.bank_high2 as usize) << 5
            } else {
                0
            }
        } else {
            ((self.bank_high2 as usize) << 5) | self.rom_bank_low5 as usize
        };
        // Banks past the end of the image wrap around.
        (bank * ROM_BANK_SIZE + (address as usize & (ROM_BANK_SIZE - 1))) % self.rom.size()
    }

    fn ram_index(&self, address: u16) -> Option<usize> {
        if !self.ram_enabled || self.ram.size() == 0 {
            return None;
        }
        let bank = if self.mode == 1 {
            self.bank_high2 as usize
        } else {
            0
        };
        let offset = (address - EXTERNAL_RAM_START) as usize;
        Some((bank * RAM_BANK_SIZE + offset) % self.ram.size())
    }
}

impl Component for Mbc1 {
    fn read(&self, address: u16) -> Option<u8> {
        if address < CARTRIDGE_ROM_END {
            return Some(self.rom.read(self.rom_index(address)));
        }
        if (EXTERNAL_RAM_START..EXTERNAL_RAM_END).contains(&address) {
            // Disabled or absent RAM floats high.
            return Some(self.ram_index(address).map_or(0xFF, |i| self.ram.read(i)));
        }
        None
    }

    fn write(&mut self, address: u16, data: u8) {
        match address {
            0x0000..=0x1FFF => self.ram_enabled = data & 0x0F == 0x0A,
            0x2000..=0x3FFF => self.rom_bank_low5 = (data & 0x1F).max(1),
            0x4000..=0x5FFF => self.bank_high2 = data & 0x03,
            0x6000..=0x7FFF => self.mode = data & 0x01,
            a if (EXTERNAL_RAM_START..EXTERNAL_RAM_END).contains(&a) => {
                if let Some(i) = self.ram_index(a) {
                    self.ram.write(i, data);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Four 16 KiB banks, each filled with its own bank number.
    fn banked_rom() -> Rom {
        let data: Vec<u8> = (0..4u8)
            .flat_map(|bank| std::iter::repeat(bank).take(ROM_BANK_SIZE))
            .collect();
        Rom::new(&data)
    }

    #[test]
    fn switchable_bank_never_maps_bank_zero() {
        let mut mbc = Mbc1::new(banked_rom(), 0);
        assert_eq!(mbc.read(0x0000), Some(0));
        assert_eq!(mbc.read(0x4000), Some(1));
        mbc.write(0x2000, 3);
        assert_eq!(mbc.read(0x7FFF), Some(3));
        mbc.write(0x2000, 0);
        assert_eq!(mbc.read(0x4000), Some(1));
        // Bank 5 wraps onto bank 1 in a four-bank image.
        mbc.write(0x2000, 5);
        assert_eq!(mbc.read(0x4000), Some(1));
    }

    #[test]
    fn ram_needs_enabling() {
        let mut mbc = Mbc1::new(banked_rom(), 8192);
        mbc.write(0xA000, 0x42);
        assert_eq!(mbc.read(0xA000), Some(0xFF));
        mbc.write(0x0000, 0x0A);
        mbc.write(0xA000, 0x42);
        assert_eq!(mbc.read(0xA000), Some(0x42));
        mbc.write(0x0000, 0x00);
        assert_eq!(mbc.read(0xA000), Some(0xFF));
    }

    #[test]
    fn mode_one_banks_ram() {
        let mut mbc = Mbc1::new(banked_rom(), 32768);
        mbc.write(0x0000, 0x0A);
        mbc.write(0x6000, 1);
        mbc.write(0x4000, 2);
        mbc.write(0xA010, 0x99);
        mbc.write(0x4000, 0);
        assert_eq!(mbc.read(0xA010), Some(0x00));
        mbc.write(0x4000, 2);
        assert_eq!(mbc.read(0xA010), Some(0x99));
    }

    #[test]
    fn ignores_addresses_it_does_not_own() {
        let mbc = Mbc1::new(banked_rom(), 0);
        assert_eq!(mbc.read(0xC000), None);
        assert_eq!(mbc.read(0x8000), None);
    }
}
