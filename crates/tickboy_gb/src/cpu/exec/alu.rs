use super::super::alu::{self as unit, Flag};
use super::super::{Cpu, Reg, Reg16};
use crate::bits;
use crate::bus::AddressSpace;
use crate::cpu::opcode::Opcode;

impl Cpu {
    #[inline]
    pub(in crate::cpu) fn carry_flag(&self) -> bool {
        self.regs.test_bit(Reg::F, Flag::C)
    }

    /// ADD or ADC, depending on bit 3 of the encoding.
    pub(in crate::cpu) fn add_into_a(&mut self, value: u8, opcode: Opcode) {
        let packed = unit::add(self.regs.get(Reg::A), value, self.carry_in(opcode));
        self.set_reg_flags(Reg::A, packed);
    }

    /// SUB or SBC, depending on bit 3 of the encoding.
    pub(in crate::cpu) fn sub_into_a(&mut self, value: u8, opcode: Opcode) {
        let packed = unit::sub(self.regs.get(Reg::A), value, self.carry_in(opcode));
        self.set_reg_flags(Reg::A, packed);
    }

    pub(in crate::cpu) fn compare_with_a(&mut self, value: u8) {
        let packed = unit::sub(self.regs.get(Reg::A), value, false);
        self.set_flags(packed);
    }

    pub(in crate::cpu) fn logic_into_a(&mut self, op: fn(u8, u8) -> u32, value: u8) {
        let packed = op(self.regs.get(Reg::A), value);
        self.set_reg_flags(Reg::A, packed);
    }

    /// `ADD SP,e8` (bit 4 clear) and `LD HL,SP+e8` (bit 4 set). Flags come
    /// from the low byte of the addition.
    pub(in crate::cpu) fn exec_sp_plus_offset<A: AddressSpace>(
        &mut self,
        bus: &mut A,
        opcode: Opcode,
    ) {
        let offset = bits::sign_extend8(self.read8_after_opcode(bus)) as u16;
        let packed = unit::add16_l(self.sp, offset);
        self.set_flags(packed);
        let value = unit::unpack_value(packed) as u16;
        if bits::test(opcode.encoding as u32, 4) {
            self.set_reg16(Reg16::HL, value);
        } else {
            self.sp = value;
        }
    }
}
