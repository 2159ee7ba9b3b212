//! SM83 (LR35902) instruction engine.
//!
//! The CPU keeps the absolute cycle at which its next instruction boundary
//! falls. On every other tick it does nothing; at the boundary it executes a
//! whole instruction (or an interrupt dispatch) and moves the boundary forward
//! by that instruction's cost.

pub mod alu;
mod exec;
mod helpers;
mod init;
mod interrupts;
pub mod opcode;

use crate::address_map::{HIGH_RAM_END, HIGH_RAM_START, REG_IE, REG_IF};
use crate::bus::{AddressSpace, Component};
use crate::machine::memory::Ram;
use crate::register_file::{Register, RegisterFile};

pub use alu::Flag;
pub use interrupts::{Interrupt, InterruptRequests};
use opcode::{Opcode, DIRECT_OPCODES, PREFIX, PREFIXED_OPCODES};

/// 8-bit registers, in register-file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    A = 0,
    F = 1,
    B = 2,
    C = 3,
    D = 4,
    E = 5,
    H = 6,
    L = 7,
}

impl Register for Reg {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Register pairs. The first register of each pair is the high byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    AF = 0,
    BC = 1,
    DE = 2,
    HL = 3,
}

impl Reg16 {
    #[inline]
    fn halves(self) -> (Reg, Reg) {
        match self {
            Reg16::AF => (Reg::A, Reg::F),
            Reg16::BC => (Reg::B, Reg::C),
            Reg16::DE => (Reg::D, Reg::E),
            Reg16::HL => (Reg::H, Reg::L),
        }
    }
}

pub struct Cpu {
    regs: RegisterFile<Reg, 8>,
    pc: u16,
    sp: u16,
    /// Interrupt master enable.
    ime: bool,
    ie: u8,
    if_reg: u8,
    high_ram: Ram,
    /// Cycle at which the next instruction starts; `u64::MAX` while halted.
    next_non_idle_cycle: u64,
    /// PC of the instruction after the one being executed.
    next_pc: u16,
    halted: bool,
    /// Set after executing an illegal opcode; nothing wakes the CPU again.
    locked: bool,
}

impl Cpu {
    /// Advance to `cycle`, executing one instruction if it is a boundary.
    pub fn cycle<A: AddressSpace>(&mut self, cycle: u64, bus: &mut A) {
        if self.next_non_idle_cycle == u64::MAX && !self.locked && self.pending_interrupt().is_some()
        {
            log::trace!("CPU: leaving HALT at cycle {cycle}");
            self.halted = false;
            self.next_non_idle_cycle = cycle;
        }
        if cycle == self.next_non_idle_cycle {
            self.step(bus);
        }
    }

    fn step<A: AddressSpace>(&mut self, bus: &mut A) {
        if self.ime {
            if let Some(interrupt) = self.pending_interrupt() {
                self.service_interrupt(bus, interrupt);
                return;
            }
        }

        let opcode = self.fetch(bus);
        self.next_pc = self.pc.wrapping_add(opcode.total_bytes as u16);
        self.next_non_idle_cycle += opcode.cycles as u64;
        self.dispatch(bus, opcode);
        self.pc = self.next_pc;
    }

    fn fetch<A: AddressSpace>(&mut self, bus: &mut A) -> Opcode {
        let encoding = self.read8(bus, self.pc);
        if encoding == PREFIX {
            PREFIXED_OPCODES[self.read8(bus, self.pc.wrapping_add(1)) as usize]
        } else {
            DIRECT_OPCODES[encoding as usize]
        }
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    #[inline]
    pub fn sp(&self) -> u16 {
        self.sp
    }

    #[inline]
    pub fn ime(&self) -> bool {
        self.ime
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn reg(&self, reg: Reg) -> u8 {
        self.regs.get(reg)
    }

    #[inline]
    pub fn reg16(&self, reg: Reg16) -> u16 {
        let (high, low) = reg.halves();
        u16::from_be_bytes([self.regs.get(high), self.regs.get(low)])
    }

    /// Write a register pair. The low nibble of F always reads as zero.
    pub fn set_reg16(&mut self, reg: Reg16, value: u16) {
        let (high, low) = reg.halves();
        let [h, mut l] = value.to_be_bytes();
        if reg == Reg16::AF {
            l &= 0xF0;
        }
        self.regs.set(high, h);
        self.regs.set(low, l);
    }

    /// `[PC, SP, A, F, B, C, D, E, H, L]`, the snapshot tests compare against.
    pub fn pc_sp_af_bc_de_hl(&self) -> [u16; 10] {
        let r = |reg| self.regs.get(reg) as u16;
        [
            self.pc,
            self.sp,
            r(Reg::A),
            r(Reg::F),
            r(Reg::B),
            r(Reg::C),
            r(Reg::D),
            r(Reg::E),
            r(Reg::H),
            r(Reg::L),
        ]
    }
}

/// IE, IF and high RAM live inside the CPU.
impl Component for Cpu {
    fn read(&self, address: u16) -> Option<u8> {
        match address {
            REG_IE => Some(self.ie),
            REG_IF => Some(self.if_reg),
            a if (HIGH_RAM_START..HIGH_RAM_END).contains(&a) => {
                Some(self.high_ram.read((a - HIGH_RAM_START) as usize))
            }
            _ => None,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match address {
            REG_IE => self.ie = data,
            REG_IF => self.if_reg = data,
            a if (HIGH_RAM_START..HIGH_RAM_END).contains(&a) => {
                self.high_ram.write((a - HIGH_RAM_START) as usize, data)
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests;
