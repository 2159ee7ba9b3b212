//! Raw memories and the components that map them onto the bus.

use crate::address_map::{BOOT_ROM_END, BOOT_ROM_SIZE, BOOT_ROM_START, REG_BOOT_ROM_DISABLE};
use crate::bus::Component;

use super::cartridge::Cartridge;

/// Zero-initialised read/write memory.
#[derive(Clone, Debug)]
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn read(&self, index: usize) -> u8 {
        assert!(index < self.size(), "RAM index {index} out of range");
        self.data[index]
    }

    #[inline]
    pub fn write(&mut self, index: usize, value: u8) {
        assert!(index < self.size(), "RAM index {index} out of range");
        self.data[index] = value;
    }
}

/// Read-only memory holding a private copy of its image.
#[derive(Clone, Debug)]
pub struct Rom {
    data: Box<[u8]>,
}

impl Rom {
    pub fn new(data: &[u8]) -> Self {
        Self { data: data.into() }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn read(&self, index: usize) -> u8 {
        assert!(index < self.size(), "ROM index {index} out of range");
        self.data[index]
    }
}

/// Maps the `[start, end)` window onto a RAM, optionally with a second window
/// that mirrors its beginning.
#[derive(Debug)]
pub struct RamController {
    ram: Ram,
    start: u16,
    end: u16,
    mirror: Option<(u16, u16)>,
}

impl RamController {
    pub fn new(ram: Ram, start: u16, end: u16) -> Self {
        assert!(start <= end, "window 0x{start:04X}..0x{end:04X} is reversed");
        assert!(
            (end - start) as usize <= ram.size(),
            "window 0x{start:04X}..0x{end:04X} is larger than the RAM"
        );
        Self {
            ram,
            start,
            end,
            mirror: None,
        }
    }

    /// Also answer `[start, end)` with the same bytes, the way echo RAM
    /// repeats work RAM.
    pub fn mirrored(mut self, start: u16, end: u16) -> Self {
        assert!(start <= end, "mirror 0x{start:04X}..0x{end:04X} is reversed");
        assert!(
            (end - start) as usize <= self.ram.size(),
            "mirror 0x{start:04X}..0x{end:04X} is larger than the RAM"
        );
        self.mirror = Some((start, end));
        self
    }

    fn index_of(&self, address: u16) -> Option<usize> {
        if (self.start..self.end).contains(&address) {
            return Some((address - self.start) as usize);
        }
        match self.mirror {
            Some((start, end)) if (start..end).contains(&address) => {
                Some((address - start) as usize)
            }
            _ => None,
        }
    }
}

impl Component for RamController {
    fn read(&self, address: u16) -> Option<u8> {
        self.index_of(address).map(|i| self.ram.read(i))
    }

    fn write(&mut self, address: u16, data: u8) {
        if let Some(i) = self.index_of(address) {
            self.ram.write(i, data);
        }
    }
}

/// Overlays the boot program on the cartridge until the program writes to
/// the boot-disable register.
pub struct BootRomController {
    boot_rom: Option<Rom>,
    cartridge: Cartridge,
}

impl BootRomController {
    /// `boot_rom` must be exactly 256 bytes; callers validate it.
    pub fn new(cartridge: Cartridge, boot_rom: Option<Rom>) -> Self {
        if let Some(rom) = &boot_rom {
            assert_eq!(rom.size(), BOOT_ROM_SIZE, "boot ROM must be {BOOT_ROM_SIZE} bytes");
        }
        Self {
            boot_rom,
            cartridge,
        }
    }
}

impl Component for BootRomController {
    fn read(&self, address: u16) -> Option<u8> {
        match &self.boot_rom {
            Some(rom) if (BOOT_ROM_START..BOOT_ROM_END).contains(&address) => {
                Some(rom.read((address - BOOT_ROM_START) as usize))
            }
            _ => self.cartridge.read(address),
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        if address == REG_BOOT_ROM_DISABLE && self.boot_rom.take().is_some() {
            log::debug!("Boot ROM disabled");
        }
        self.cartridge.write(address, data);
    }
}
