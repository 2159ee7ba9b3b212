use super::super::{Cpu, Reg, Reg16};
use crate::bus::AddressSpace;
use crate::cpu::opcode::Opcode;

impl Cpu {
    pub(in crate::cpu) fn load_a_from<A: AddressSpace>(&mut self, bus: &mut A, address: u16) {
        let value = self.read8(bus, address);
        self.regs.set(Reg::A, value);
    }

    pub(in crate::cpu) fn store_a_to<A: AddressSpace>(&mut self, bus: &mut A, address: u16) {
        self.write8(bus, address, self.regs.get(Reg::A));
    }

    /// Post-increment or post-decrement HL for `(HL+)` / `(HL-)`.
    pub(in crate::cpu) fn step_hl(&mut self, opcode: Opcode) {
        let hl = self
            .reg16(Reg16::HL)
            .wrapping_add_signed(Self::extract_hl_increment(opcode));
        self.set_reg16(Reg16::HL, hl);
    }
}
