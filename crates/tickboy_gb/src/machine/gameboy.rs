use anyhow::ensure;
use tickboy_common::dmg_shade;

use crate::address_map::{
    BOOT_ROM_SIZE, ECHO_RAM_END, ECHO_RAM_START, WORK_RAM_END, WORK_RAM_SIZE, WORK_RAM_START,
};
use crate::bus::{AddressSpace, Bus, Component, OPEN_BUS};
use crate::cpu::Cpu;

use super::cartridge::Cartridge;
use super::joypad::{Joypad, Key};
use super::lcd::{self, LcdController, LcdImage};
use super::memory::{BootRomController, Ram, RamController, Rom};
use super::timer::Timer;

/// Machine cycles per emulated second.
pub const CYCLES_PER_SECOND: u64 = 1 << 20;
/// Machine cycles per LCD frame (154 lines of 114 cycles).
pub const CYCLES_PER_FRAME: u64 = lcd::FRAME_CYCLES;

/// A DMG Game Boy: every device plus the global cycle counter.
///
/// Each simulated cycle steps the timer, then the LCD controller, then the
/// CPU. Interrupt requests the devices latched in the meantime are moved
/// into IF just before the CPU runs.
pub struct GameBoy {
    cpu: Cpu,
    timer: Timer,
    lcd: LcdController,
    joypad: Joypad,
    /// Work RAM, its echo, and the boot ROM overlaying the cartridge.
    bus: Bus,
    cycles: u64,
}

impl GameBoy {
    /// A machine in the state the boot ROM leaves behind, starting at the
    /// cartridge entry point.
    pub fn new(cartridge: Cartridge) -> Self {
        let mut gb = Self::assemble(cartridge, None);
        gb.cpu.apply_dmg_boot_state();
        gb.lcd.apply_dmg_boot_state();
        gb
    }

    /// A machine that powers on into `boot_rom`, which must be 256 bytes.
    pub fn with_boot_rom(cartridge: Cartridge, boot_rom: &[u8]) -> anyhow::Result<Self> {
        ensure!(
            boot_rom.len() == BOOT_ROM_SIZE,
            "boot ROM must be {BOOT_ROM_SIZE} bytes, got {}",
            boot_rom.len()
        );
        Ok(Self::assemble(cartridge, Some(Rom::new(boot_rom))))
    }

    fn assemble(cartridge: Cartridge, boot_rom: Option<Rom>) -> Self {
        let mut bus = Bus::new();
        bus.attach(
            RamController::new(Ram::new(WORK_RAM_SIZE), WORK_RAM_START, WORK_RAM_END)
                .mirrored(ECHO_RAM_START, ECHO_RAM_END),
        );
        bus.attach(BootRomController::new(cartridge, boot_rom));

        Self {
            cpu: Cpu::new(),
            timer: Timer::new(),
            lcd: LcdController::new(),
            joypad: Joypad::new(),
            bus,
            cycles: 0,
        }
    }

    /// Simulate every cycle from `cycles()` up to, but excluding, `cycle`.
    ///
    /// # Panics
    ///
    /// If `cycle` lies before the cycles already simulated.
    pub fn run_until(&mut self, cycle: u64) {
        assert!(
            cycle >= self.cycles,
            "cannot run back to cycle {cycle} from {}",
            self.cycles
        );
        while self.cycles < cycle {
            self.tick();
        }
    }

    /// Simulate one more LCD frame's worth of cycles.
    pub fn run_frame(&mut self) {
        self.run_until(self.cycles + CYCLES_PER_FRAME);
    }

    fn tick(&mut self) {
        let cycle = self.cycles;
        self.timer.cycle(cycle);
        self.lcd.cycle(
            cycle,
            &mut SystemBus {
                cpu: Some(&mut self.cpu),
                timer: &mut self.timer,
                lcd: None,
                joypad: &mut self.joypad,
                bus: &mut self.bus,
            },
        );

        self.cpu.accept_requests(self.timer.take_requests());
        self.cpu.accept_requests(self.lcd.take_requests());
        self.cpu.accept_requests(self.joypad.take_requests());

        self.cpu.cycle(
            cycle,
            &mut SystemBus {
                cpu: None,
                timer: &mut self.timer,
                lcd: Some(&mut self.lcd),
                joypad: &mut self.joypad,
                bus: &mut self.bus,
            },
        );
        self.cycles += 1;
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn lcd(&self) -> &LcdController {
        &self.lcd
    }

    /// The last frame the LCD controller finished.
    pub fn current_image(&self) -> &LcdImage {
        self.lcd.current_image()
    }

    pub fn key_pressed(&mut self, key: Key) {
        self.joypad.key_pressed(key);
    }

    pub fn key_released(&mut self, key: Key) {
        self.joypad.key_released(key);
    }

    /// Read a byte the way the CPU would see it.
    pub fn read(&mut self, address: u16) -> u8 {
        self.system_bus().read8(address)
    }

    /// Write a byte to every device, the way a CPU store would.
    pub fn write(&mut self, address: u16, data: u8) {
        self.system_bus().write8(address, data);
    }

    fn system_bus(&mut self) -> SystemBus<'_> {
        SystemBus {
            cpu: Some(&mut self.cpu),
            timer: &mut self.timer,
            lcd: Some(&mut self.lcd),
            joypad: &mut self.joypad,
            bus: &mut self.bus,
        }
    }

    /// Write the current image as packed RGB24 into `out`.
    pub fn video_frame(&self, out: &mut [u8]) {
        let image = self.current_image();
        debug_assert_eq!(out.len(), image.width() * image.height() * 3);
        for (i, pixel) in out.chunks_exact_mut(3).enumerate() {
            let (x, y) = (i % image.width(), i / image.width());
            if y >= image.height() {
                break;
            }
            let (r, g, b) = dmg_shade(image.get(x, y)).rgb();
            pixel.copy_from_slice(&[r, g, b]);
        }
    }
}

/// Everything on the address space except, optionally, the CPU or the LCD
/// controller, which answer their own addresses before going out.
///
/// Reads go in attach order: CPU, timer, LCD, joypad, then the memories.
struct SystemBus<'a> {
    cpu: Option<&'a mut Cpu>,
    timer: &'a mut Timer,
    lcd: Option<&'a mut LcdController>,
    joypad: &'a mut Joypad,
    bus: &'a mut Bus,
}

impl AddressSpace for SystemBus<'_> {
    fn read8(&mut self, address: u16) -> u8 {
        self.cpu
            .as_deref()
            .and_then(|cpu| cpu.read(address))
            .or_else(|| self.timer.read(address))
            .or_else(|| self.lcd.as_deref().and_then(|lcd| lcd.read(address)))
            .or_else(|| self.joypad.read(address))
            .or_else(|| self.bus.try_read(address))
            .unwrap_or(OPEN_BUS)
    }

    fn write8(&mut self, address: u16, data: u8) {
        if let Some(cpu) = self.cpu.as_deref_mut() {
            cpu.write(address, data);
        }
        self.timer.write(address, data);
        if let Some(lcd) = self.lcd.as_deref_mut() {
            lcd.write(address, data);
        }
        self.joypad.write(address, data);
        self.bus.write(address, data);
    }
}
