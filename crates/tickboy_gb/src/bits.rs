//! Fixed-width bit helpers shared by the ALU, the register files and the
//! scanline pipeline.
//!
//! Every helper works on `u32` words and panics when an index or size falls
//! outside the 32-bit width. Byte-sized helpers take `u8` so their range is
//! enforced by the type.

mod bit_vector;

pub use bit_vector::{BitVector, BitVectorBuilder};

const WORD_BITS: u32 = u32::BITS;

/// A named bit position, such as a flag in a status register.
///
/// Implementors assign their index explicitly in the type definition.
pub trait Bit: Copy {
    fn index(self) -> u32;

    #[inline]
    fn mask(self) -> u32 {
        mask(self.index())
    }
}

#[inline]
pub fn mask(index: u32) -> u32 {
    assert!(index < WORD_BITS, "bit index {index} out of range");
    1 << index
}

#[inline]
pub fn test(bits: u32, index: u32) -> bool {
    bits & mask(index) != 0
}

#[inline]
pub fn test_bit(bits: u32, bit: impl Bit) -> bool {
    test(bits, bit.index())
}

#[inline]
pub fn set(bits: u32, index: u32, value: bool) -> u32 {
    if value {
        bits | mask(index)
    } else {
        bits & !mask(index)
    }
}

/// Keep the low `size` bits of `bits`. `size` may be 0..=32.
#[inline]
pub fn clip(size: u32, bits: u32) -> u32 {
    assert!(size <= WORD_BITS, "clip size {size} out of range");
    if size == WORD_BITS {
        bits
    } else {
        bits & ((1 << size) - 1)
    }
}

/// The `size` bits of `bits` starting at `start`, moved down to bit 0.
#[inline]
pub fn extract(bits: u32, start: u32, size: u32) -> u32 {
    assert!(
        start <= WORD_BITS && size <= WORD_BITS - start,
        "extract range {start}+{size} out of range"
    );
    if start == WORD_BITS {
        0
    } else {
        clip(size, bits >> start)
    }
}

/// Rotate the low `size` bits of `bits` by `distance`; positive rotates left.
///
/// Only the low `size` bits of `bits` may be set.
pub fn rotate(size: u32, bits: u32, distance: i32) -> u32 {
    assert!(
        size > 0 && size <= WORD_BITS,
        "rotate size {size} out of range"
    );
    assert!(
        clip(size, bits) == bits,
        "value {bits:#x} wider than rotate size {size}"
    );
    let d = distance.rem_euclid(size as i32) as u32;
    if d == 0 {
        return bits;
    }
    clip(size, (bits << d) | (bits >> (size - d)))
}

/// Sign-extend a byte to a full signed value.
#[inline]
pub fn sign_extend8(b: u8) -> i32 {
    b as i8 as i32
}

#[inline]
pub fn reverse8(b: u8) -> u8 {
    REVERSE8[b as usize]
}

#[inline]
pub fn complement8(b: u8) -> u8 {
    b ^ 0xFF
}

#[inline]
pub fn make16(high: u8, low: u8) -> u16 {
    u16::from_be_bytes([high, low])
}

const fn build_reverse_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut reversed = 0u8;
        let mut bit = 0;
        while bit < 8 {
            if i & (1 << bit) != 0 {
                reversed |= 1 << (7 - bit);
            }
            bit += 1;
        }
        table[i] = reversed;
        i += 1;
    }
    table
}

static REVERSE8: [u8; 256] = build_reverse_table();

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    enum Probe {
        Low = 0,
        High = 31,
    }

    impl Bit for Probe {
        fn index(self) -> u32 {
            self as u32
        }
    }

    #[test]
    fn bit_tags_expose_their_explicit_index() {
        assert_eq!(Probe::Low.index(), 0);
        assert_eq!(Probe::High.index(), 31);
        assert_eq!(Probe::High.mask(), 0x8000_0000);
        assert!(test_bit(0x8000_0000, Probe::High));
    }

    #[test]
    fn set_test_and_clip() {
        assert_eq!(set(0, 4, true), 0x10);
        assert_eq!(set(0xFF, 0, false), 0xFE);
        assert!(test(0x10, 4));
        assert_eq!(clip(0, 0xFFFF_FFFF), 0);
        assert_eq!(clip(4, 0xAB), 0xB);
        assert_eq!(clip(32, 0xDEAD_BEEF), 0xDEAD_BEEF);
    }

    #[test]
    fn extract_windows() {
        assert_eq!(extract(0xABCD, 4, 8), 0xBC);
        assert_eq!(extract(0xDEAD_BEEF, 0, 32), 0xDEAD_BEEF);
        assert_eq!(extract(0xDEAD_BEEF, 32, 0), 0);
    }

    #[test]
    #[should_panic]
    fn mask_rejects_out_of_range_index() {
        mask(32);
    }

    #[test]
    #[should_panic]
    fn extract_rejects_range_past_the_word() {
        extract(0, 30, 3);
    }

    #[test]
    fn rotate_is_modular_and_invertible() {
        assert_eq!(rotate(4, 0b1000, 1), 0b0001);
        assert_eq!(rotate(4, 0b0001, -1), 0b1000);
        assert_eq!(rotate(8, 0x81, 9), 0x03);
        assert_eq!(rotate(32, 0x8000_0001, 1), 0x0000_0003);
        for size in [1u32, 5, 8, 9, 16, 32] {
            let v = clip(size, 0x9E37_79B9);
            for d in [-40, -9, -1, 0, 1, 3, 8, 33] {
                assert_eq!(rotate(size, rotate(size, v, d), -d), v);
            }
        }
    }

    #[test]
    fn byte_helpers() {
        assert_eq!(sign_extend8(0xFE), -2);
        assert_eq!(sign_extend8(0x7F), 127);
        assert_eq!(reverse8(0b1000_0001), 0b1000_0001);
        assert_eq!(reverse8(0b1100_0000), 0b0000_0011);
        assert_eq!(reverse8(0x01), 0x80);
        assert_eq!(complement8(0x0F), 0xF0);
        assert_eq!(make16(0x12, 0x34), 0x1234);
    }
}
