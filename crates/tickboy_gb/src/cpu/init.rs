use super::{Cpu, Reg, Reg16};
use crate::address_map::HIGH_RAM_SIZE;
use crate::machine::memory::Ram;
use crate::register_file::RegisterFile;

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// A CPU in its power-on state: every register zero and PC at 0x0000,
    /// where a boot ROM is expected.
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            pc: 0,
            sp: 0,
            ime: false,
            ie: 0,
            if_reg: 0,
            high_ram: Ram::new(HIGH_RAM_SIZE),
            next_non_idle_cycle: 0,
            next_pc: 0,
            halted: false,
            locked: false,
        }
    }

    /// Registers as the DMG boot ROM leaves them when it jumps to the
    /// cartridge entry point at 0x0100.
    pub(crate) fn apply_dmg_boot_state(&mut self) {
        self.regs.set(Reg::A, 0x01);
        self.regs.set(Reg::F, 0xB0);
        self.set_reg16(Reg16::BC, 0x0013);
        self.set_reg16(Reg16::DE, 0x00D8);
        self.set_reg16(Reg16::HL, 0x014D);
        self.sp = 0xFFFE;
        self.pc = 0x0100;
        self.ime = false;
    }
}
