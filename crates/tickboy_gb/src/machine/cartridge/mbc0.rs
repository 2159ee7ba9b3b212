use crate::address_map::CARTRIDGE_ROM_END;
use crate::bus::Component;
use crate::machine::memory::Rom;

/// Cartridge without a bank controller: 32 KiB of ROM, no RAM.
pub struct Mbc0 {
    rom: Rom,
}

impl Mbc0 {
    pub const ROM_SIZE: usize = 0x8000;

    pub(super) fn new(rom: Rom) -> Self {
        assert_eq!(rom.size(), Self::ROM_SIZE, "MBC0 ROM must be 32 KiB");
        Self { rom }
    }
}

impl Component for Mbc0 {
    fn read(&self, address: u16) -> Option<u8> {
        (address < CARTRIDGE_ROM_END).then(|| self.rom.read(address as usize))
    }

    // ROM is read-only and there is nothing to configure.
    fn write(&mut self, _address: u16, _data: u8) {}
}
