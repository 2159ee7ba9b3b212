use super::super::alu as unit;
use super::super::helpers::FlagSrc;
use super::super::Cpu;
use crate::bits;
use crate::bus::AddressSpace;
use crate::cpu::opcode::Opcode;

impl Cpu {
    /// Prefixed shift/swap of the register in bits 0..2, with full ALU flags.
    pub(in crate::cpu) fn shift_register(&mut self, opcode: Opcode, op: fn(u8) -> u32) {
        let reg = Self::extract_reg(opcode, 0);
        let packed = op(self.regs.get(reg));
        self.set_reg_flags(reg, packed);
    }

    pub(in crate::cpu) fn shift_at_hl<A: AddressSpace>(&mut self, bus: &mut A, op: fn(u8) -> u32) {
        let packed = op(self.read8_at_hl(bus));
        self.write8_at_hl_and_set_flags(bus, packed);
    }

    /// BIT: Z reflects the tested bit, N cleared, H set, C untouched.
    pub(in crate::cpu) fn test_bit_into_flags(&mut self, value: u8, index: u32) {
        let packed = unit::test_bit(value, index);
        self.combine_alu_flags(packed, FlagSrc::Alu, FlagSrc::V0, FlagSrc::V1, FlagSrc::Cpu);
    }

    /// SET when bit 6 of the encoding is set, RES otherwise.
    pub(in crate::cpu) fn change_bit(opcode: Opcode, value: u8) -> u8 {
        let mask = bits::mask(Self::extract_bit_index(opcode)) as u8;
        if bits::test(opcode.encoding as u32, 6) {
            value | mask
        } else {
            value & !mask
        }
    }
}
