//! Arithmetic and flag unit.
//!
//! Every operation returns its result and the four flags packed in one word:
//! the value sits in bits 8 and up, and the flags occupy bits 7..4 of the
//! low byte in Z, N, H, C order. Bits 3..0 are always zero.

use crate::bits::{self, Bit};

/// Flag bits in the F register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    C = 4,
    H = 5,
    N = 6,
    Z = 7,
}

impl Bit for Flag {
    #[inline]
    fn index(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotDir {
    Left,
    Right,
}

impl RotDir {
    #[inline]
    fn distance(self) -> i32 {
        match self {
            RotDir::Left => 1,
            RotDir::Right => -1,
        }
    }
}

pub fn mask_znhc(z: bool, n: bool, h: bool, c: bool) -> u8 {
    let mut flags = 0;
    for (set, flag) in [(z, Flag::Z), (n, Flag::N), (h, Flag::H), (c, Flag::C)] {
        if set {
            flags |= flag.mask();
        }
    }
    flags as u8
}

#[inline]
fn pack(value: u32, z: bool, n: bool, h: bool, c: bool) -> u32 {
    (value << 8) | mask_znhc(z, n, h, c) as u32
}

#[inline]
pub fn unpack_value(packed: u32) -> u32 {
    packed >> 8
}

#[inline]
pub fn unpack_flags(packed: u32) -> u8 {
    packed as u8
}

pub fn add(l: u8, r: u8, c0: bool) -> u32 {
    let c = c0 as u32;
    let (l, r) = (l as u32, r as u32);
    let sum = bits::clip(8, l + r + c);
    let h = bits::clip(4, l) + bits::clip(4, r) + c > 0xF;
    pack(sum, sum == 0, false, h, l + r + c > 0xFF)
}

/// 16-bit add reporting H and C out of the low byte (bits 3 and 7).
pub fn add16_l(l: u16, r: u16) -> u32 {
    let (l, r) = (l as u32, r as u32);
    let h = bits::clip(4, l) + bits::clip(4, r) > 0xF;
    let c = bits::clip(8, l) + bits::clip(8, r) > 0xFF;
    pack(bits::clip(16, l + r), false, false, h, c)
}

/// 16-bit add reporting H and C out of the high byte (bits 11 and 15).
pub fn add16_h(l: u16, r: u16) -> u32 {
    let (l, r) = (l as u32, r as u32);
    let h = bits::clip(12, l) + bits::clip(12, r) > 0xFFF;
    pack(bits::clip(16, l + r), false, false, h, l + r > 0xFFFF)
}

pub fn sub(l: u8, r: u8, b0: bool) -> u32 {
    let b = b0 as i32;
    let (l, r) = (l as i32, r as i32);
    let diff = (l - r - b) as u32 & 0xFF;
    let h = (l & 0xF) - (r & 0xF) - b < 0;
    pack(diff, diff == 0, true, h, l - r - b < 0)
}

/// Decimal adjust after an add (`n` clear) or subtract (`n` set).
pub fn bcd_adjust(v: u8, n: bool, h: bool, c: bool) -> u32 {
    let fix_l = h || (!n && v & 0xF > 9);
    let fix_h = c || (!n && v > 0x99);
    let fix = 0x60 * fix_h as u8 + 0x06 * fix_l as u8;
    let adjusted = if n {
        v.wrapping_sub(fix)
    } else {
        v.wrapping_add(fix)
    };
    pack(adjusted as u32, adjusted == 0, n, false, fix_h)
}

pub fn and(l: u8, r: u8) -> u32 {
    let v = l & r;
    pack(v as u32, v == 0, false, true, false)
}

pub fn or(l: u8, r: u8) -> u32 {
    let v = l | r;
    pack(v as u32, v == 0, false, false, false)
}

pub fn xor(l: u8, r: u8) -> u32 {
    let v = l ^ r;
    pack(v as u32, v == 0, false, false, false)
}

pub fn shift_left(v: u8) -> u32 {
    let shifted = v << 1;
    pack(shifted as u32, shifted == 0, false, false, v & 0x80 != 0)
}

/// Arithmetic right shift: bit 7 is kept.
pub fn shift_right_a(v: u8) -> u32 {
    let shifted = ((v as i8) >> 1) as u8;
    pack(shifted as u32, shifted == 0, false, false, v & 1 != 0)
}

/// Logical right shift: bit 7 becomes 0.
pub fn shift_right_l(v: u8) -> u32 {
    let shifted = v >> 1;
    pack(shifted as u32, shifted == 0, false, false, v & 1 != 0)
}

/// 8-bit rotation; C receives the bit that wrapped around.
pub fn rotate(dir: RotDir, v: u8) -> u32 {
    let rotated = bits::rotate(8, v as u32, dir.distance());
    let carry_bit = match dir {
        RotDir::Left => 0,
        RotDir::Right => 7,
    };
    pack(
        rotated,
        rotated == 0,
        false,
        false,
        bits::test(rotated, carry_bit),
    )
}

/// 9-bit rotation of `c:v`; the new C is bit 8 of the rotated quantity.
pub fn rotate_through_carry(dir: RotDir, v: u8, c: bool) -> u32 {
    let nine = bits::set(v as u32, 8, c);
    let rotated = bits::rotate(9, nine, dir.distance());
    let value = bits::clip(8, rotated);
    pack(value, value == 0, false, false, bits::test(rotated, 8))
}

pub fn swap(v: u8) -> u32 {
    let swapped = bits::rotate(8, v as u32, 4);
    pack(swapped, swapped == 0, false, false, false)
}

/// Value 0 with Z set when bit `index` of `v` is clear, and H set.
pub fn test_bit(v: u8, index: u32) -> u32 {
    assert!(index < 8, "bit index {index} out of range for a byte");
    pack(0, !bits::test(v as u32, index), false, true, false)
}
