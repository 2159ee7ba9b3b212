use crate::address_map::REG_P1;
use crate::bits::{self, Bit};
use crate::bus::Component;
use crate::cpu::{Interrupt, InterruptRequests};

const KEYS_PER_ROW: u32 = 4;

/// P1 select lines, as stored internally (active-high).
#[derive(Clone, Copy, Debug)]
enum Select {
    Row0 = 4,
    Row1 = 5,
}

impl Bit for Select {
    #[inline]
    fn index(self) -> u32 {
        self as u32
    }
}

/// Joypad buttons. The first four share row 0 of the matrix, the rest row 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Right = 0,
    Left = 1,
    Up = 2,
    Down = 3,
    A = 4,
    B = 5,
    Select = 6,
    Start = 7,
}

impl Bit for Key {
    #[inline]
    fn index(self) -> u32 {
        self as u32
    }
}

/// The P1 register and the 2x4 key matrix behind it.
///
/// Reads return the complement of the internal, active-high state: the
/// selected rows in bits 4..5 and the pressed keys of those rows in 0..3.
#[derive(Default)]
pub struct Joypad {
    select: u8,
    /// Pressed keys, indexed by `Key`.
    pressed: u8,
    requests: InterruptRequests,
}

impl Joypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_pressed(&mut self, key: Key) {
        if !bits::test_bit(self.pressed as u32, key) {
            log::debug!("Joypad: {key:?} pressed");
            self.requests.raise(Interrupt::Joypad);
        }
        self.pressed |= key.mask() as u8;
    }

    pub fn key_released(&mut self, key: Key) {
        if bits::test_bit(self.pressed as u32, key) {
            log::debug!("Joypad: {key:?} released");
        }
        self.pressed &= !(key.mask() as u8);
    }

    pub(crate) fn take_requests(&mut self) -> InterruptRequests {
        self.requests.take()
    }

    fn p1(&self) -> u8 {
        let mut columns = 0;
        if bits::test_bit(self.select as u32, Select::Row0) {
            columns |= bits::clip(KEYS_PER_ROW, self.pressed as u32);
        }
        if bits::test_bit(self.select as u32, Select::Row1) {
            columns |= bits::extract(self.pressed as u32, KEYS_PER_ROW, KEYS_PER_ROW);
        }
        self.select | columns as u8
    }
}

impl Component for Joypad {
    fn read(&self, address: u16) -> Option<u8> {
        (address == REG_P1).then(|| bits::complement8(self.p1()))
    }

    fn write(&mut self, address: u16, data: u8) {
        if address != REG_P1 {
            return;
        }
        let mut select = 0;
        for row in [Select::Row0, Select::Row1] {
            // A line is selected by pulling it low.
            if !bits::test_bit(data as u32, row) {
                select |= row.mask() as u8;
            }
        }
        self.select = select;
    }
}
