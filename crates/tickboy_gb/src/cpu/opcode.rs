//! Static opcode metadata.
//!
//! Each of the 256 direct and 256 `0xCB`-prefixed encodings maps to one
//! immutable record. Cycle counts are in machine cycles (four clocks), which
//! is the unit the scheduler ticks in.

use lazy_static::lazy_static;

pub const PREFIX: u8 = 0xCB;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Direct,
    Prefixed,
}

/// Instruction families. Members of a family share one execution routine and
/// differ only in the operand fields of their encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Nop,
    LdR8Hlr,
    LdAHlru,
    LdAN8r,
    LdACr,
    LdAN16r,
    LdABcr,
    LdADer,
    LdR8N8,
    LdR16spN16,
    PopR16,
    LdHlrR8,
    LdHlruA,
    LdN8rA,
    LdCrA,
    LdN16rA,
    LdBcrA,
    LdDerA,
    LdHlrN8,
    LdN16rSp,
    LdR8R8,
    LdSpHl,
    PushR16,
    AddAR8,
    AddAN8,
    AddAHlr,
    IncR8,
    IncHlr,
    IncR16sp,
    AddHlR16sp,
    LdHlspS8,
    SubAR8,
    SubAN8,
    SubAHlr,
    DecR8,
    DecHlr,
    CpAR8,
    CpAN8,
    CpAHlr,
    DecR16sp,
    AndAN8,
    AndAR8,
    AndAHlr,
    OrAR8,
    OrAN8,
    OrAHlr,
    XorAR8,
    XorAN8,
    XorAHlr,
    Cpl,
    RotcA,
    RotA,
    RotcR8,
    RotR8,
    RotcHlr,
    RotHlr,
    SwapR8,
    SwapHlr,
    SlaR8,
    SraR8,
    SrlR8,
    SlaHlr,
    SraHlr,
    SrlHlr,
    BitU3R8,
    BitU3Hlr,
    ChgU3R8,
    ChgU3Hlr,
    Daa,
    Sccf,
    JpHl,
    JpN16,
    JpCcN16,
    JrE8,
    JrCcE8,
    CallN16,
    CallCcN16,
    RstU3,
    Ret,
    RetCc,
    Edi,
    Reti,
    Halt,
    Stop,
    /// Encodings with no instruction behind them. Executing one locks the CPU.
    Illegal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub encoding: u8,
    pub kind: Kind,
    pub family: Family,
    /// Instruction length including the prefix byte, if any.
    pub total_bytes: u8,
    pub cycles: u8,
    /// Extra cost charged only when a conditional branch is taken.
    pub additional_cycles: u8,
}

lazy_static! {
    pub static ref DIRECT_OPCODES: [Opcode; 256] = build_table(Kind::Direct);
    pub static ref PREFIXED_OPCODES: [Opcode; 256] = build_table(Kind::Prefixed);
}

fn build_table(kind: Kind) -> [Opcode; 256] {
    std::array::from_fn(|i| {
        let encoding = i as u8;
        let (family, total_bytes, cycles, additional_cycles) = match kind {
            Kind::Direct => decode_direct(encoding),
            Kind::Prefixed => decode_prefixed(encoding),
        };
        Opcode {
            encoding,
            kind,
            family,
            total_bytes,
            cycles,
            additional_cycles,
        }
    })
}

fn decode_direct(e: u8) -> (Family, u8, u8, u8) {
    use Family::*;

    let reads_hl = e & 0x07 == 0x06;
    match e {
        0x00 => (Nop, 1, 1, 0),
        0x10 => (Stop, 2, 1, 0),
        0x76 => (Halt, 1, 1, 0),

        // 8-bit loads
        0x02 => (LdBcrA, 1, 2, 0),
        0x12 => (LdDerA, 1, 2, 0),
        0x22 | 0x32 => (LdHlruA, 1, 2, 0),
        0x0A => (LdABcr, 1, 2, 0),
        0x1A => (LdADer, 1, 2, 0),
        0x2A | 0x3A => (LdAHlru, 1, 2, 0),
        0x36 => (LdHlrN8, 2, 3, 0),
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => (LdR8N8, 2, 2, 0),
        0x70..=0x77 => (LdHlrR8, 1, 2, 0),
        0x40..=0x7F if reads_hl => (LdR8Hlr, 1, 2, 0),
        0x40..=0x7F => (LdR8R8, 1, 1, 0),
        0xE0 => (LdN8rA, 2, 3, 0),
        0xF0 => (LdAN8r, 2, 3, 0),
        0xE2 => (LdCrA, 1, 2, 0),
        0xF2 => (LdACr, 1, 2, 0),
        0xEA => (LdN16rA, 3, 4, 0),
        0xFA => (LdAN16r, 3, 4, 0),

        // 16-bit loads and stack
        0x01 | 0x11 | 0x21 | 0x31 => (LdR16spN16, 3, 3, 0),
        0x08 => (LdN16rSp, 3, 5, 0),
        0xF9 => (LdSpHl, 1, 2, 0),
        0xC1 | 0xD1 | 0xE1 | 0xF1 => (PopR16, 1, 3, 0),
        0xC5 | 0xD5 | 0xE5 | 0xF5 => (PushR16, 1, 4, 0),
        0xE8 => (LdHlspS8, 2, 4, 0),
        0xF8 => (LdHlspS8, 2, 3, 0),

        // 8-bit increments and decrements
        0x34 => (IncHlr, 1, 3, 0),
        0x35 => (DecHlr, 1, 3, 0),
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => (IncR8, 1, 1, 0),
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => (DecR8, 1, 1, 0),

        // 16-bit arithmetic
        0x03 | 0x13 | 0x23 | 0x33 => (IncR16sp, 1, 2, 0),
        0x0B | 0x1B | 0x2B | 0x3B => (DecR16sp, 1, 2, 0),
        0x09 | 0x19 | 0x29 | 0x39 => (AddHlR16sp, 1, 2, 0),

        // A op r8 / A op (HL)
        0x80..=0xBF => {
            let family = match ((e >> 3) & 0x07, reads_hl) {
                (0 | 1, false) => AddAR8,
                (0 | 1, true) => AddAHlr,
                (2 | 3, false) => SubAR8,
                (2 | 3, true) => SubAHlr,
                (4, false) => AndAR8,
                (4, true) => AndAHlr,
                (5, false) => XorAR8,
                (5, true) => XorAHlr,
                (6, false) => OrAR8,
                (6, true) => OrAHlr,
                (_, false) => CpAR8,
                (_, true) => CpAHlr,
            };
            (family, 1, if reads_hl { 2 } else { 1 }, 0)
        }

        // A op n8
        0xC6 | 0xCE => (AddAN8, 2, 2, 0),
        0xD6 | 0xDE => (SubAN8, 2, 2, 0),
        0xE6 => (AndAN8, 2, 2, 0),
        0xEE => (XorAN8, 2, 2, 0),
        0xF6 => (OrAN8, 2, 2, 0),
        0xFE => (CpAN8, 2, 2, 0),

        // Accumulator and flag tweaks
        0x07 | 0x0F => (RotcA, 1, 1, 0),
        0x17 | 0x1F => (RotA, 1, 1, 0),
        0x27 => (Daa, 1, 1, 0),
        0x2F => (Cpl, 1, 1, 0),
        0x37 | 0x3F => (Sccf, 1, 1, 0),

        // Jumps, calls and returns
        0xE9 => (JpHl, 1, 1, 0),
        0xC3 => (JpN16, 3, 4, 0),
        0xC2 | 0xCA | 0xD2 | 0xDA => (JpCcN16, 3, 3, 1),
        0x18 => (JrE8, 2, 3, 0),
        0x20 | 0x28 | 0x30 | 0x38 => (JrCcE8, 2, 2, 1),
        0xCD => (CallN16, 3, 6, 0),
        0xC4 | 0xCC | 0xD4 | 0xDC => (CallCcN16, 3, 3, 3),
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => (RstU3, 1, 4, 0),
        0xC9 => (Ret, 1, 4, 0),
        0xC0 | 0xC8 | 0xD0 | 0xD8 => (RetCc, 1, 2, 3),
        0xD9 => (Reti, 1, 4, 0),

        // Interrupt control
        0xF3 | 0xFB => (Edi, 1, 1, 0),

        // 0xCB never reaches this table: the fetch routes it to the prefixed
        // one. The rest are holes in the instruction set.
        _ => (Illegal, 1, 1, 0),
    }
}

fn decode_prefixed(e: u8) -> (Family, u8, u8, u8) {
    use Family::*;

    let on_hl = e & 0x07 == 0x06;
    let (register_form, memory_form, memory_cycles) = match e >> 6 {
        0b00 => match (e >> 3) & 0x07 {
            0 | 1 => (RotcR8, RotcHlr, 4),
            2 | 3 => (RotR8, RotHlr, 4),
            4 => (SlaR8, SlaHlr, 4),
            5 => (SraR8, SraHlr, 4),
            6 => (SwapR8, SwapHlr, 4),
            _ => (SrlR8, SrlHlr, 4),
        },
        0b01 => (BitU3R8, BitU3Hlr, 3),
        _ => (ChgU3R8, ChgU3Hlr, 4),
    };
    if on_hl {
        (memory_form, 2, memory_cycles, 0)
    } else {
        (register_form, 2, 2, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_indexed_by_encoding() {
        for i in 0..=255u8 {
            assert_eq!(DIRECT_OPCODES[i as usize].encoding, i);
            assert_eq!(DIRECT_OPCODES[i as usize].kind, Kind::Direct);
            assert_eq!(PREFIXED_OPCODES[i as usize].encoding, i);
            assert_eq!(PREFIXED_OPCODES[i as usize].total_bytes, 2);
        }
    }

    #[test]
    fn exactly_eleven_holes_plus_the_prefix() {
        let illegal = DIRECT_OPCODES
            .iter()
            .filter(|o| o.family == Family::Illegal)
            .count();
        assert_eq!(illegal, 12);
        assert_eq!(DIRECT_OPCODES[PREFIX as usize].family, Family::Illegal);
    }

    #[test]
    fn spot_check_metadata() {
        let jr = DIRECT_OPCODES[0x18];
        assert_eq!((jr.family, jr.total_bytes, jr.cycles, jr.additional_cycles), (Family::JrE8, 2, 3, 0));
        let call_nz = DIRECT_OPCODES[0xC4];
        assert_eq!((call_nz.cycles, call_nz.additional_cycles), (3, 3));
        assert_eq!(DIRECT_OPCODES[0x46].family, Family::LdR8Hlr);
        assert_eq!(DIRECT_OPCODES[0x76].family, Family::Halt);
        assert_eq!(DIRECT_OPCODES[0x77].family, Family::LdHlrR8);
        assert_eq!(DIRECT_OPCODES[0x9E].family, Family::SubAHlr);
        assert_eq!(DIRECT_OPCODES[0xBF].family, Family::CpAR8);
        assert_eq!(PREFIXED_OPCODES[0x46].family, Family::BitU3Hlr);
        assert_eq!(PREFIXED_OPCODES[0x46].cycles, 3);
        assert_eq!(PREFIXED_OPCODES[0x37].family, Family::SwapR8);
        assert_eq!(PREFIXED_OPCODES[0xFE].family, Family::ChgU3Hlr);
        assert_eq!(PREFIXED_OPCODES[0xFE].cycles, 4);
    }
}
