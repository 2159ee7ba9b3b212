use super::Cpu;
use crate::address_map::INTERRUPTS;
use crate::bits::{self, Bit};
use crate::bus::AddressSpace;

/// Interrupt lines, lowest index has the highest priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    #[inline]
    pub fn vector(self) -> u16 {
        INTERRUPTS[self as usize]
    }
}

impl Bit for Interrupt {
    #[inline]
    fn index(self) -> u32 {
        self as u32
    }
}

/// Requests a device has raised since the scheduler last collected them.
///
/// Devices never hold a reference to the CPU; they latch requests here and
/// the scheduler moves them into IF before the CPU runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptRequests(u8);

impl InterruptRequests {
    #[inline]
    pub fn raise(&mut self, interrupt: Interrupt) {
        self.0 |= interrupt.mask() as u8;
    }

    #[inline]
    pub fn is_raised(&self, interrupt: Interrupt) -> bool {
        bits::test_bit(self.0 as u32, interrupt)
    }

    /// Collect the latched requests, leaving none behind.
    #[inline]
    pub fn take(&mut self) -> InterruptRequests {
        std::mem::take(self)
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        self.0
    }
}

impl Cpu {
    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.if_reg |= interrupt.mask() as u8;
    }

    pub(crate) fn accept_requests(&mut self, requests: InterruptRequests) {
        self.if_reg |= requests.bits();
    }

    /// Highest-priority interrupt that is both enabled and pending.
    pub(super) fn pending_interrupt(&self) -> Option<Interrupt> {
        let active = self.ie & self.if_reg;
        Interrupt::ALL
            .into_iter()
            .find(|&i| bits::test_bit(active as u32, i))
    }

    pub(super) fn service_interrupt<A: AddressSpace>(&mut self, bus: &mut A, interrupt: Interrupt) {
        log::trace!(
            "CPU: servicing {:?} from pc=0x{:04X}",
            interrupt,
            self.pc
        );
        self.ime = false;
        self.if_reg &= !(interrupt.mask() as u8);
        self.push16(bus, self.pc);
        self.pc = interrupt.vector();
        self.next_non_idle_cycle += 5;
    }
}
