/// A device mapped onto the 16-bit address space.
///
/// `read` returns `None` for addresses the device does not own; `write` is
/// offered every address and ignores the ones it does not own.
pub trait Component {
    fn read(&self, address: u16) -> Option<u8>;
    fn write(&mut self, address: u16, data: u8);
}

/// What the CPU and PPU see when they touch memory.
pub trait AddressSpace {
    fn read8(&mut self, address: u16) -> u8;
    fn write8(&mut self, address: u16, data: u8);
}

/// Value returned when no attached component answers a read.
pub const OPEN_BUS: u8 = 0xFF;

/// Ordered set of components sharing one address space.
///
/// Attach order is priority order for reads; writes go to everyone.
#[derive(Default)]
pub struct Bus {
    components: Vec<Box<dyn Component>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, component: impl Component + 'static) {
        self.components.push(Box::new(component));
    }

    /// First answer from the attached components, if any.
    pub fn try_read(&self, address: u16) -> Option<u8> {
        self.components.iter().find_map(|c| c.read(address))
    }

    pub fn read(&self, address: u16) -> u8 {
        self.try_read(address).unwrap_or(OPEN_BUS)
    }

    pub fn write(&mut self, address: u16, data: u8) {
        for component in &mut self.components {
            component.write(address, data);
        }
    }
}

impl AddressSpace for Bus {
    #[inline]
    fn read8(&mut self, address: u16) -> u8 {
        self.read(address)
    }

    #[inline]
    fn write8(&mut self, address: u16, data: u8) {
        self.write(address, data);
    }
}
