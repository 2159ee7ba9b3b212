use std::marker::PhantomData;

use crate::bits::{self, Bit};

/// A named 8-bit cell; the index is the cell's slot in a [`RegisterFile`].
pub trait Register: Copy {
    fn index(self) -> usize;
}

/// Fixed-size bank of 8-bit registers addressed by a register tag.
#[derive(Clone, Debug)]
pub struct RegisterFile<R: Register, const N: usize> {
    cells: [u8; N],
    _tag: PhantomData<R>,
}

impl<R: Register, const N: usize> Default for RegisterFile<R, N> {
    fn default() -> Self {
        Self {
            cells: [0; N],
            _tag: PhantomData,
        }
    }
}

impl<R: Register, const N: usize> RegisterFile<R, N> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, reg: R) -> u8 {
        self.cells[reg.index()]
    }

    #[inline]
    pub fn set(&mut self, reg: R, value: u8) {
        self.cells[reg.index()] = value;
    }

    #[inline]
    pub fn test_bit(&self, reg: R, bit: impl Bit) -> bool {
        bits::test_bit(self.get(reg) as u32, bit)
    }

    pub fn set_bit(&mut self, reg: R, bit: impl Bit, value: bool) {
        assert!(bit.index() < 8, "bit {} does not fit a register", bit.index());
        let updated = bits::set(self.get(reg) as u32, bit.index(), value);
        self.set(reg, updated as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug)]
    enum Pair {
        Hi = 0,
        Lo = 1,
    }

    impl Register for Pair {
        fn index(self) -> usize {
            self as usize
        }
    }

    #[derive(Clone, Copy)]
    enum Top {
        Msb = 7,
    }

    impl Bit for Top {
        fn index(self) -> u32 {
            self as u32
        }
    }

    #[test]
    fn cells_are_independent() {
        let mut file: RegisterFile<Pair, 2> = RegisterFile::new();
        file.set(Pair::Hi, 0x12);
        file.set(Pair::Lo, 0x34);
        assert_eq!(file.get(Pair::Hi), 0x12);
        assert_eq!(file.get(Pair::Lo), 0x34);
        assert_eq!(Pair::Lo.index(), 1);
    }

    #[test]
    fn bit_access_goes_through_bit_tags() {
        let mut file: RegisterFile<Pair, 2> = RegisterFile::new();
        file.set_bit(Pair::Lo, Top::Msb, true);
        assert_eq!(file.get(Pair::Lo), 0x80);
        assert!(file.test_bit(Pair::Lo, Top::Msb));
        file.set_bit(Pair::Lo, Top::Msb, false);
        assert_eq!(file.get(Pair::Lo), 0);
    }
}
