mod alu;
mod bitops;
mod control;
mod ld;

use super::alu as unit;
use super::helpers::FlagSrc::{Alu, Cpu as Keep, V0, V1};
use super::opcode::{Family, Opcode};
use super::{Cpu, Reg, Reg16};
use crate::address_map::REGS_START;
use crate::bits;
use crate::bus::AddressSpace;

impl Cpu {
    /// Execute one decoded instruction.
    ///
    /// On entry `next_pc` already points past the instruction and the base
    /// cycle cost has been charged; jumps overwrite `next_pc` and taken
    /// conditional branches add their extra cost.
    pub(super) fn dispatch<A: AddressSpace>(&mut self, bus: &mut A, opcode: Opcode) {
        use Family::*;

        match opcode.family {
            Nop => {}

            // Loads into registers
            LdR8Hlr => {
                let value = self.read8_at_hl(bus);
                self.regs.set(Self::extract_reg(opcode, 3), value);
            }
            LdAHlru => {
                let value = self.read8_at_hl(bus);
                self.regs.set(Reg::A, value);
                self.step_hl(opcode);
            }
            LdAN8r => {
                let offset = self.read8_after_opcode(bus);
                self.load_a_from(bus, REGS_START + offset as u16);
            }
            LdACr => {
                let offset = self.regs.get(Reg::C);
                self.load_a_from(bus, REGS_START + offset as u16);
            }
            LdAN16r => {
                let address = self.read16_after_opcode(bus);
                self.load_a_from(bus, address);
            }
            LdABcr => self.load_a_from(bus, self.reg16(Reg16::BC)),
            LdADer => self.load_a_from(bus, self.reg16(Reg16::DE)),
            LdR8N8 => {
                let value = self.read8_after_opcode(bus);
                self.regs.set(Self::extract_reg(opcode, 3), value);
            }
            LdR16spN16 => {
                let value = self.read16_after_opcode(bus);
                self.set_reg16_sp(Self::extract_reg16(opcode), value);
            }
            PopR16 => {
                let value = self.pop16(bus);
                self.set_reg16(Self::extract_reg16(opcode), value);
            }

            // Stores to memory
            LdHlrR8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.write8_at_hl(bus, value);
            }
            LdHlruA => {
                self.write8_at_hl(bus, self.regs.get(Reg::A));
                self.step_hl(opcode);
            }
            LdN8rA => {
                let offset = self.read8_after_opcode(bus);
                self.store_a_to(bus, REGS_START + offset as u16);
            }
            LdCrA => {
                let offset = self.regs.get(Reg::C);
                self.store_a_to(bus, REGS_START + offset as u16);
            }
            LdN16rA => {
                let address = self.read16_after_opcode(bus);
                self.store_a_to(bus, address);
            }
            LdBcrA => self.store_a_to(bus, self.reg16(Reg16::BC)),
            LdDerA => self.store_a_to(bus, self.reg16(Reg16::DE)),
            LdHlrN8 => {
                let value = self.read8_after_opcode(bus);
                self.write8_at_hl(bus, value);
            }
            LdN16rSp => {
                let address = self.read16_after_opcode(bus);
                self.write16(bus, address, self.sp);
            }
            LdR8R8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.regs.set(Self::extract_reg(opcode, 3), value);
            }
            LdSpHl => self.sp = self.reg16(Reg16::HL),
            PushR16 => {
                let value = self.reg16(Self::extract_reg16(opcode));
                self.push16(bus, value);
            }

            // Add
            AddAR8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.add_into_a(value, opcode);
            }
            AddAN8 => {
                let value = self.read8_after_opcode(bus);
                self.add_into_a(value, opcode);
            }
            AddAHlr => {
                let value = self.read8_at_hl(bus);
                self.add_into_a(value, opcode);
            }
            IncR8 => {
                let reg = Self::extract_reg(opcode, 3);
                let packed = unit::add(self.regs.get(reg), 1, false);
                self.set_reg_combine_alu_flags(reg, packed, Alu, V0, Alu, Keep);
            }
            IncHlr => {
                let packed = unit::add(self.read8_at_hl(bus), 1, false);
                self.combine_alu_flags(packed, Alu, V0, Alu, Keep);
                self.write8_at_hl(bus, unit::unpack_value(packed) as u8);
            }
            IncR16sp => {
                let reg = Self::extract_reg16(opcode);
                let value = self.reg16_sp(reg).wrapping_add(1);
                self.set_reg16_sp(reg, value);
            }
            AddHlR16sp => {
                let operand = self.reg16_sp(Self::extract_reg16(opcode));
                let packed = unit::add16_h(self.reg16(Reg16::HL), operand);
                self.combine_alu_flags(packed, Keep, V0, Alu, Alu);
                self.set_reg16(Reg16::HL, unit::unpack_value(packed) as u16);
            }
            LdHlspS8 => self.exec_sp_plus_offset(bus, opcode),

            // Subtract and compare
            SubAR8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.sub_into_a(value, opcode);
            }
            SubAN8 => {
                let value = self.read8_after_opcode(bus);
                self.sub_into_a(value, opcode);
            }
            SubAHlr => {
                let value = self.read8_at_hl(bus);
                self.sub_into_a(value, opcode);
            }
            DecR8 => {
                let reg = Self::extract_reg(opcode, 3);
                let packed = unit::sub(self.regs.get(reg), 1, false);
                self.set_reg_combine_alu_flags(reg, packed, Alu, V1, Alu, Keep);
            }
            DecHlr => {
                let packed = unit::sub(self.read8_at_hl(bus), 1, false);
                self.combine_alu_flags(packed, Alu, V1, Alu, Keep);
                self.write8_at_hl(bus, unit::unpack_value(packed) as u8);
            }
            CpAR8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.compare_with_a(value);
            }
            CpAN8 => {
                let value = self.read8_after_opcode(bus);
                self.compare_with_a(value);
            }
            CpAHlr => {
                let value = self.read8_at_hl(bus);
                self.compare_with_a(value);
            }
            DecR16sp => {
                let reg = Self::extract_reg16(opcode);
                let value = self.reg16_sp(reg).wrapping_sub(1);
                self.set_reg16_sp(reg, value);
            }

            // Bitwise
            AndAN8 => {
                let value = self.read8_after_opcode(bus);
                self.logic_into_a(unit::and, value);
            }
            AndAR8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.logic_into_a(unit::and, value);
            }
            AndAHlr => {
                let value = self.read8_at_hl(bus);
                self.logic_into_a(unit::and, value);
            }
            OrAR8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.logic_into_a(unit::or, value);
            }
            OrAN8 => {
                let value = self.read8_after_opcode(bus);
                self.logic_into_a(unit::or, value);
            }
            OrAHlr => {
                let value = self.read8_at_hl(bus);
                self.logic_into_a(unit::or, value);
            }
            XorAR8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.logic_into_a(unit::xor, value);
            }
            XorAN8 => {
                let value = self.read8_after_opcode(bus);
                self.logic_into_a(unit::xor, value);
            }
            XorAHlr => {
                let value = self.read8_at_hl(bus);
                self.logic_into_a(unit::xor, value);
            }
            Cpl => {
                let value = bits::complement8(self.regs.get(Reg::A));
                self.regs.set(Reg::A, value);
                self.combine_alu_flags(0, Keep, V1, V1, Keep);
            }

            // Rotations and shifts
            RotcA => {
                let packed = unit::rotate(Self::extract_rot_dir(opcode), self.regs.get(Reg::A));
                self.set_reg_combine_alu_flags(Reg::A, packed, V0, V0, V0, Alu);
            }
            RotA => {
                let packed = unit::rotate_through_carry(
                    Self::extract_rot_dir(opcode),
                    self.regs.get(Reg::A),
                    self.carry_flag(),
                );
                self.set_reg_combine_alu_flags(Reg::A, packed, V0, V0, V0, Alu);
            }
            RotcR8 => {
                let reg = Self::extract_reg(opcode, 0);
                let packed = unit::rotate(Self::extract_rot_dir(opcode), self.regs.get(reg));
                self.set_reg_flags(reg, packed);
            }
            RotR8 => {
                let reg = Self::extract_reg(opcode, 0);
                let packed = unit::rotate_through_carry(
                    Self::extract_rot_dir(opcode),
                    self.regs.get(reg),
                    self.carry_flag(),
                );
                self.set_reg_flags(reg, packed);
            }
            RotcHlr => {
                let packed = unit::rotate(Self::extract_rot_dir(opcode), self.read8_at_hl(bus));
                self.write8_at_hl_and_set_flags(bus, packed);
            }
            RotHlr => {
                let value = self.read8_at_hl(bus);
                let packed = unit::rotate_through_carry(
                    Self::extract_rot_dir(opcode),
                    value,
                    self.carry_flag(),
                );
                self.write8_at_hl_and_set_flags(bus, packed);
            }
            SwapR8 => self.shift_register(opcode, unit::swap),
            SwapHlr => self.shift_at_hl(bus, unit::swap),
            SlaR8 => self.shift_register(opcode, unit::shift_left),
            SraR8 => self.shift_register(opcode, unit::shift_right_a),
            SrlR8 => self.shift_register(opcode, unit::shift_right_l),
            SlaHlr => self.shift_at_hl(bus, unit::shift_left),
            SraHlr => self.shift_at_hl(bus, unit::shift_right_a),
            SrlHlr => self.shift_at_hl(bus, unit::shift_right_l),

            // Bit test, set and reset
            BitU3R8 => {
                let value = self.regs.get(Self::extract_reg(opcode, 0));
                self.test_bit_into_flags(value, Self::extract_bit_index(opcode));
            }
            BitU3Hlr => {
                let value = self.read8_at_hl(bus);
                self.test_bit_into_flags(value, Self::extract_bit_index(opcode));
            }
            ChgU3R8 => {
                let reg = Self::extract_reg(opcode, 0);
                let value = Self::change_bit(opcode, self.regs.get(reg));
                self.regs.set(reg, value);
            }
            ChgU3Hlr => {
                let value = Self::change_bit(opcode, self.read8_at_hl(bus));
                self.write8_at_hl(bus, value);
            }

            // Misc ALU
            Daa => {
                let f = self.regs.get(Reg::F) as u32;
                let packed = unit::bcd_adjust(
                    self.regs.get(Reg::A),
                    bits::test_bit(f, unit::Flag::N),
                    bits::test_bit(f, unit::Flag::H),
                    bits::test_bit(f, unit::Flag::C),
                );
                self.set_reg_combine_alu_flags(Reg::A, packed, Alu, Keep, V0, Alu);
            }
            Sccf => {
                // SCF sets C, CCF flips it.
                let complement = bits::test(opcode.encoding as u32, 3);
                let carry = if complement && self.carry_flag() { V0 } else { V1 };
                self.combine_alu_flags(0, Keep, V0, V0, carry);
            }

            // Jumps
            JpHl => self.next_pc = self.reg16(Reg16::HL),
            JpN16 => self.next_pc = self.read16_after_opcode(bus),
            JpCcN16 => {
                if self.condition_holds(opcode) {
                    self.next_pc = self.read16_after_opcode(bus);
                    self.charge_branch(opcode);
                }
            }
            JrE8 => self.jump_relative(bus),
            JrCcE8 => {
                if self.condition_holds(opcode) {
                    self.jump_relative(bus);
                    self.charge_branch(opcode);
                }
            }

            // Calls and returns
            CallN16 => self.call(bus),
            CallCcN16 => {
                if self.condition_holds(opcode) {
                    self.call(bus);
                    self.charge_branch(opcode);
                }
            }
            RstU3 => self.restart(bus, opcode),
            Ret => self.next_pc = self.pop16(bus),
            RetCc => {
                if self.condition_holds(opcode) {
                    self.next_pc = self.pop16(bus);
                    self.charge_branch(opcode);
                }
            }

            // Interrupts and control
            Edi => self.ime = bits::test(opcode.encoding as u32, 3),
            Reti => {
                self.ime = true;
                self.next_pc = self.pop16(bus);
            }
            Halt => {
                log::trace!("CPU: HALT at pc=0x{:04X}", self.pc);
                self.halted = true;
                self.next_non_idle_cycle = u64::MAX;
            }
            Stop => {
                log::error!("CPU: STOP executed at pc=0x{:04X}", self.pc);
                panic!("STOP (0x10) at 0x{:04X} is not supported", self.pc);
            }
            Illegal => {
                log::error!(
                    "CPU: illegal opcode 0x{:02X} at pc=0x{:04X}, locking up",
                    opcode.encoding,
                    self.pc
                );
                self.locked = true;
                self.next_non_idle_cycle = u64::MAX;
            }
        }
    }
}
