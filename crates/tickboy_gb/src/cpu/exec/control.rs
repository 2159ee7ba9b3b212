use super::super::Cpu;
use crate::address_map::RESETS;
use crate::bits;
use crate::bus::AddressSpace;
use crate::cpu::opcode::Opcode;

impl Cpu {
    /// Add the extra cost of a conditional branch that was taken.
    #[inline]
    pub(in crate::cpu) fn charge_branch(&mut self, opcode: Opcode) {
        self.next_non_idle_cycle += opcode.additional_cycles as u64;
    }

    /// The displacement is relative to the following instruction.
    pub(in crate::cpu) fn jump_relative<A: AddressSpace>(&mut self, bus: &mut A) {
        let offset = bits::sign_extend8(self.read8_after_opcode(bus)) as i16;
        self.next_pc = self.next_pc.wrapping_add_signed(offset);
    }

    pub(in crate::cpu) fn call<A: AddressSpace>(&mut self, bus: &mut A) {
        let target = self.read16_after_opcode(bus);
        self.push16(bus, self.next_pc);
        self.next_pc = target;
    }

    pub(in crate::cpu) fn restart<A: AddressSpace>(&mut self, bus: &mut A, opcode: Opcode) {
        self.push16(bus, self.next_pc);
        self.next_pc = RESETS[bits::extract(opcode.encoding as u32, 3, 3) as usize];
    }
}
