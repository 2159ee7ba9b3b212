//! Divider and programmable timer.
//!
//! The 16-bit divider advances by 4 every machine cycle and DIV exposes its
//! upper byte. TIMA counts falling edges of one divider bit chosen by
//! TAC[1:0], gated by TAC bit 2. Because TIMA reacts to edges, writes that
//! move the selected bit (a DIV reset, a TAC change) can tick it too.

use crate::address_map::{REG_DIV, REG_TAC, REG_TIMA, REG_TMA};
use crate::bits;
use crate::bus::Component;
use crate::cpu::{Interrupt, InterruptRequests};

/// Divider bit watched for each TAC[1:0] value.
const DIV_BITS: [u32; 4] = [9, 3, 5, 7];

#[derive(Default)]
pub struct Timer {
    div: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    requests: InterruptRequests,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle(&mut self, _cycle: u64) {
        let previous = self.state();
        self.div = self.div.wrapping_add(4);
        self.tick_on_falling_edge(previous);
    }

    /// Interrupts raised since the last call.
    pub(crate) fn take_requests(&mut self) -> InterruptRequests {
        self.requests.take()
    }

    fn state(&self) -> bool {
        let index = DIV_BITS[bits::extract(self.tac as u32, 0, 2) as usize];
        bits::test(self.tac as u32, 2) && bits::test(self.div as u32, index)
    }

    fn tick_on_falling_edge(&mut self, previous: bool) {
        if !previous || self.state() {
            return;
        }
        if self.tima == 0xFF {
            self.tima = self.tma;
            self.requests.raise(Interrupt::Timer);
        } else {
            self.tima += 1;
        }
    }
}

impl Component for Timer {
    fn read(&self, address: u16) -> Option<u8> {
        match address {
            REG_DIV => Some((self.div >> 8) as u8),
            REG_TIMA => Some(self.tima),
            REG_TMA => Some(self.tma),
            REG_TAC => Some(self.tac),
            _ => None,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match address {
            REG_DIV => {
                let previous = self.state();
                self.div = 0;
                self.tick_on_falling_edge(previous);
            }
            REG_TIMA => self.tima = data,
            REG_TMA => self.tma = data,
            REG_TAC => {
                let previous = self.state();
                self.tac = data;
                self.tick_on_falling_edge(previous);
            }
            _ => {}
        }
    }
}
