mod mbc0;
mod mbc1;

use std::path::Path;

use anyhow::{bail, Context};

use crate::address_map::{CARTRIDGE_HEADER_RAM_SIZE, CARTRIDGE_HEADER_TYPE};
use crate::bus::Component;

pub use mbc0::Mbc0;
pub use mbc1::Mbc1;

use super::memory::Rom;

/// External RAM sizes selected by header byte 0x149.
const RAM_SIZES: [usize; 4] = [0, 2048, 8192, 32768];

/// A cartridge and the memory bank controller its header asks for.
pub enum Cartridge {
    Mbc0(Mbc0),
    Mbc1(Mbc1),
}

impl Cartridge {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read ROM {}", path.display()))?;
        Self::from_bytes(&data).with_context(|| format!("invalid ROM {}", path.display()))
    }

    pub fn from_bytes(data: &[u8]) -> anyhow::Result<Self> {
        let Some(&kind) = data.get(CARTRIDGE_HEADER_TYPE) else {
            bail!("ROM is {} bytes, too short to hold a header", data.len());
        };
        let rom = Rom::new(data);
        match kind {
            0 => {
                if rom.size() != Mbc0::ROM_SIZE {
                    bail!(
                        "ROM-only cartridge must be {} bytes, got {}",
                        Mbc0::ROM_SIZE,
                        rom.size()
                    );
                }
                log::info!("Cartridge: ROM only, {} bytes", rom.size());
                Ok(Cartridge::Mbc0(Mbc0::new(rom)))
            }
            1..=3 => {
                let code = data.get(CARTRIDGE_HEADER_RAM_SIZE).copied().unwrap_or(0);
                let Some(&ram_size) = RAM_SIZES.get(code as usize) else {
                    bail!("unsupported RAM size code 0x{code:02X}");
                };
                log::info!(
                    "Cartridge: MBC1 (type 0x{kind:02X}), {} bytes ROM, {ram_size} bytes RAM",
                    rom.size()
                );
                Ok(Cartridge::Mbc1(Mbc1::new(rom, ram_size)))
            }
            other => bail!("unsupported cartridge type 0x{other:02X}"),
        }
    }
}

impl Component for Cartridge {
    fn read(&self, address: u16) -> Option<u8> {
        match self {
            Cartridge::Mbc0(m) => m.read(address),
            Cartridge::Mbc1(m) => m.read(address),
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match self {
            Cartridge::Mbc0(m) => m.write(address, data),
            Cartridge::Mbc1(m) => m.write(address, data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(size: usize, kind: u8, ram_code: u8) -> Vec<u8> {
        let mut data = vec![0; size];
        data[CARTRIDGE_HEADER_TYPE] = kind;
        data[CARTRIDGE_HEADER_RAM_SIZE] = ram_code;
        data
    }

    #[test]
    fn type_byte_selects_the_controller() {
        assert!(matches!(
            Cartridge::from_bytes(&image(0x8000, 0, 0)),
            Ok(Cartridge::Mbc0(_))
        ));
        assert!(matches!(
            Cartridge::from_bytes(&image(0x10000, 1, 2)),
            Ok(Cartridge::Mbc1(_))
        ));
    }

    #[test]
    fn malformed_images_are_errors() {
        assert!(Cartridge::from_bytes(&[0; 0x100]).is_err());
        assert!(Cartridge::from_bytes(&image(0x4000, 0, 0)).is_err());
        assert!(Cartridge::from_bytes(&image(0x8000, 0x13, 0)).is_err());
        assert!(Cartridge::from_bytes(&image(0x8000, 1, 4)).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Cartridge::from_file("/nonexistent/rom.gb").err();
        assert!(err.is_some_and(|e| e.to_string().contains("failed to read ROM")));
    }
}
