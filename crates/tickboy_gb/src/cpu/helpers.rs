use super::alu::{self, Flag, RotDir};
use super::opcode::Opcode;
use super::{Cpu, Reg, Reg16};
use crate::bits::{self, Bit};
use crate::bus::{AddressSpace, Component};

/// 3-bit register field of an opcode. Slot 6 means (HL) and is handled by
/// the `*Hlr` families, so it never reaches this table.
const R8_FIELD: [Reg; 8] = [
    Reg::B,
    Reg::C,
    Reg::D,
    Reg::E,
    Reg::H,
    Reg::L,
    Reg::A,
    Reg::A,
];

/// 2-bit pair field (bits 4..5). Slot 3 is AF for push/pop and SP elsewhere.
const R16_FIELD: [Reg16; 4] = [Reg16::BC, Reg16::DE, Reg16::HL, Reg16::AF];

/// Where each flag of an instruction's result comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum FlagSrc {
    /// Forced to 0.
    V0,
    /// Forced to 1.
    V1,
    /// Taken from the ALU result.
    Alu,
    /// Left as the CPU had it.
    Cpu,
}

impl Cpu {
    // Bus access. The CPU answers its own addresses before the rest of the
    // bus, and writes reach both.

    #[inline]
    pub(super) fn read8<A: AddressSpace>(&self, bus: &mut A, address: u16) -> u8 {
        match self.read(address) {
            Some(value) => value,
            None => bus.read8(address),
        }
    }

    #[inline]
    pub(super) fn write8<A: AddressSpace>(&mut self, bus: &mut A, address: u16, value: u8) {
        self.write(address, value);
        bus.write8(address, value);
    }

    pub(super) fn read16<A: AddressSpace>(&self, bus: &mut A, address: u16) -> u16 {
        let low = self.read8(bus, address);
        let high = self.read8(bus, address.wrapping_add(1));
        bits::make16(high, low)
    }

    pub(super) fn write16<A: AddressSpace>(&mut self, bus: &mut A, address: u16, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.write8(bus, address, low);
        self.write8(bus, address.wrapping_add(1), high);
    }

    #[inline]
    pub(super) fn read8_after_opcode<A: AddressSpace>(&self, bus: &mut A) -> u8 {
        self.read8(bus, self.pc.wrapping_add(1))
    }

    #[inline]
    pub(super) fn read16_after_opcode<A: AddressSpace>(&self, bus: &mut A) -> u16 {
        self.read16(bus, self.pc.wrapping_add(1))
    }

    #[inline]
    pub(super) fn read8_at_hl<A: AddressSpace>(&self, bus: &mut A) -> u8 {
        self.read8(bus, self.reg16(Reg16::HL))
    }

    #[inline]
    pub(super) fn write8_at_hl<A: AddressSpace>(&mut self, bus: &mut A, value: u8) {
        self.write8(bus, self.reg16(Reg16::HL), value);
    }

    pub(super) fn push16<A: AddressSpace>(&mut self, bus: &mut A, value: u16) {
        self.sp = self.sp.wrapping_sub(2);
        self.write16(bus, self.sp, value);
    }

    pub(super) fn pop16<A: AddressSpace>(&mut self, bus: &mut A) -> u16 {
        let value = self.read16(bus, self.sp);
        self.sp = self.sp.wrapping_add(2);
        value
    }

    // Operand fields.

    #[inline]
    pub(super) fn extract_reg(opcode: Opcode, start_bit: u32) -> Reg {
        R8_FIELD[bits::extract(opcode.encoding as u32, start_bit, 3) as usize]
    }

    #[inline]
    pub(super) fn extract_reg16(opcode: Opcode) -> Reg16 {
        R16_FIELD[bits::extract(opcode.encoding as u32, 4, 2) as usize]
    }

    /// +1 for `(HL+)`, -1 for `(HL-)`.
    #[inline]
    pub(super) fn extract_hl_increment(opcode: Opcode) -> i16 {
        if bits::test(opcode.encoding as u32, 4) {
            -1
        } else {
            1
        }
    }

    #[inline]
    pub(super) fn extract_rot_dir(opcode: Opcode) -> RotDir {
        if bits::test(opcode.encoding as u32, 3) {
            RotDir::Right
        } else {
            RotDir::Left
        }
    }

    #[inline]
    pub(super) fn extract_bit_index(opcode: Opcode) -> u32 {
        bits::extract(opcode.encoding as u32, 3, 3)
    }

    /// Incoming carry for ADC/SBC: the C flag, but only when bit 3 selects
    /// the carrying variant.
    #[inline]
    pub(super) fn carry_in(&self, opcode: Opcode) -> bool {
        bits::test(opcode.encoding as u32, 3) && self.regs.test_bit(Reg::F, Flag::C)
    }

    pub(super) fn condition_holds(&self, opcode: Opcode) -> bool {
        let z = self.regs.test_bit(Reg::F, Flag::Z);
        let c = self.regs.test_bit(Reg::F, Flag::C);
        match bits::extract(opcode.encoding as u32, 3, 2) {
            0 => !z,
            1 => z,
            2 => !c,
            _ => c,
        }
    }

    /// Pair selected by an opcode whose slot 3 means SP.
    pub(super) fn reg16_sp(&self, reg: Reg16) -> u16 {
        if reg == Reg16::AF {
            self.sp
        } else {
            self.reg16(reg)
        }
    }

    pub(super) fn set_reg16_sp(&mut self, reg: Reg16, value: u16) {
        if reg == Reg16::AF {
            self.sp = value;
        } else {
            self.set_reg16(reg, value);
        }
    }

    // ALU plumbing.

    #[inline]
    pub(super) fn set_flags(&mut self, packed: u32) {
        self.regs.set(Reg::F, alu::unpack_flags(packed));
    }

    #[inline]
    pub(super) fn set_reg_from_alu(&mut self, reg: Reg, packed: u32) {
        self.regs.set(reg, alu::unpack_value(packed) as u8);
    }

    pub(super) fn set_reg_flags(&mut self, reg: Reg, packed: u32) {
        self.set_reg_from_alu(reg, packed);
        self.set_flags(packed);
    }

    pub(super) fn write8_at_hl_and_set_flags<A: AddressSpace>(&mut self, bus: &mut A, packed: u32) {
        self.write8_at_hl(bus, alu::unpack_value(packed) as u8);
        self.set_flags(packed);
    }

    pub(super) fn combine_alu_flags(
        &mut self,
        packed: u32,
        z: FlagSrc,
        n: FlagSrc,
        h: FlagSrc,
        c: FlagSrc,
    ) {
        let from_alu = alu::unpack_flags(packed);
        let current = self.regs.get(Reg::F);
        let flags = [(z, Flag::Z), (n, Flag::N), (h, Flag::H), (c, Flag::C)]
            .into_iter()
            .fold(0u8, |acc, (src, flag)| {
                let mask = flag.mask() as u8;
                acc | match src {
                    FlagSrc::V0 => 0,
                    FlagSrc::V1 => mask,
                    FlagSrc::Alu => from_alu & mask,
                    FlagSrc::Cpu => current & mask,
                }
            });
        self.regs.set(Reg::F, flags);
    }

    pub(super) fn set_reg_combine_alu_flags(
        &mut self,
        reg: Reg,
        packed: u32,
        z: FlagSrc,
        n: FlagSrc,
        h: FlagSrc,
        c: FlagSrc,
    ) {
        self.set_reg_from_alu(reg, packed);
        self.combine_alu_flags(packed, z, n, h, c);
    }
}
