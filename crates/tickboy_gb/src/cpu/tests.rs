use super::*;
use crate::bits::Bit;
use crate::register_file::Register;

struct TestBus {
    memory: [u8; 0x10000],
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
        }
    }
}

impl AddressSpace for TestBus {
    fn read8(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write8(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }
}

fn load(program: &[u8]) -> (Cpu, TestBus) {
    let mut bus = TestBus::default();
    bus.memory[..program.len()].copy_from_slice(program);
    (Cpu::new(), bus)
}

/// Tick the CPU exactly at its next instruction boundary.
fn step(cpu: &mut Cpu, bus: &mut TestBus) {
    let at = cpu.next_non_idle_cycle;
    cpu.cycle(at, bus);
}

fn run(program: &[u8], instructions: usize) -> (Cpu, TestBus) {
    let (mut cpu, mut bus) = load(program);
    for _ in 0..instructions {
        step(&mut cpu, &mut bus);
    }
    (cpu, bus)
}

#[test]
fn jr_minus_two_loops_on_itself() {
    let (mut cpu, mut bus) = load(&[0x18, 0xFE]);
    cpu.cycle(0, &mut bus);
    assert_eq!(cpu.pc(), 0);
    assert_eq!(cpu.next_non_idle_cycle, 3);

    // Off-boundary ticks are idle.
    cpu.cycle(1, &mut bus);
    cpu.cycle(2, &mut bus);
    assert_eq!(cpu.next_non_idle_cycle, 3);
    cpu.cycle(3, &mut bus);
    assert_eq!((cpu.pc(), cpu.next_non_idle_cycle), (0, 6));
}

#[test]
fn add_sets_zero_half_and_carry() {
    // LD A,0x3A; LD B,0xC6; ADD A,B
    let (cpu, _) = run(&[0x3E, 0x3A, 0x06, 0xC6, 0x80], 3);
    assert_eq!(cpu.reg(Reg::A), 0x00);
    assert_eq!(cpu.reg(Reg::F), 0xB0);
    assert_eq!(cpu.pc(), 5);
}

#[test]
fn adc_and_sbc_use_the_carry() {
    // SCF; LD A,0x10; ADC A,0x01
    let (cpu, _) = run(&[0x37, 0x3E, 0x10, 0xCE, 0x01], 3);
    assert_eq!(cpu.reg(Reg::A), 0x12);
    assert_eq!(cpu.reg(Reg::F), 0x00);

    // SCF; LD A,0x10; SBC A,0x01
    let (cpu, _) = run(&[0x37, 0x3E, 0x10, 0xDE, 0x01], 3);
    assert_eq!(cpu.reg(Reg::A), 0x0E);
    assert_eq!(cpu.reg(Reg::F), 0x60);
}

#[test]
fn compare_leaves_a_alone() {
    // LD A,0x42; CP 0x42
    let (cpu, _) = run(&[0x3E, 0x42, 0xFE, 0x42], 2);
    assert_eq!(cpu.reg(Reg::A), 0x42);
    assert_eq!(cpu.reg(Reg::F), 0xC0);
}

#[test]
fn inc_and_dec_keep_the_carry() {
    // SCF; LD B,0xFF; INC B
    let (cpu, _) = run(&[0x37, 0x06, 0xFF, 0x04], 3);
    assert_eq!(cpu.reg(Reg::B), 0x00);
    assert_eq!(cpu.reg(Reg::F), 0xB0);

    // LD C,0x10; DEC C
    let (cpu, _) = run(&[0x0E, 0x10, 0x0D], 2);
    assert_eq!(cpu.reg(Reg::C), 0x0F);
    assert_eq!(cpu.reg(Reg::F), 0x60);
}

#[test]
fn push_pop_af_masks_low_flag_bits() {
    // LD SP,0xD000; LD BC,0x12FF; PUSH BC; POP AF
    let (cpu, bus) = run(&[0x31, 0x00, 0xD0, 0x01, 0xFF, 0x12, 0xC5, 0xF1], 4);
    assert_eq!(bus.memory[0xCFFE], 0xFF);
    assert_eq!(bus.memory[0xCFFF], 0x12);
    assert_eq!(cpu.reg16(Reg16::AF), 0x12F0);
    assert_eq!(cpu.sp(), 0xD000);
}

#[test]
fn taken_branch_pays_the_extra_cycle() {
    // XOR A sets Z; JR Z,+2
    let (cpu, _) = run(&[0xAF, 0x28, 0x02], 2);
    assert_eq!(cpu.pc(), 5);
    assert_eq!(cpu.next_non_idle_cycle, 1 + 2 + 1);

    // XOR A; JR NZ,+2 falls through
    let (cpu, _) = run(&[0xAF, 0x20, 0x02], 2);
    assert_eq!(cpu.pc(), 3);
    assert_eq!(cpu.next_non_idle_cycle, 1 + 2);
}

#[test]
fn call_pushes_the_return_address() {
    let mut program = vec![0x31, 0x00, 0xD0, 0xCD, 0x10, 0x00];
    program.resize(0x10, 0x00);
    program.push(0xC9);

    let (mut cpu, mut bus) = run(&program, 2);
    assert_eq!(cpu.pc(), 0x0010);
    assert_eq!(cpu.sp(), 0xCFFE);
    assert_eq!((bus.memory[0xCFFE], bus.memory[0xCFFF]), (0x06, 0x00));

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc(), 0x0006);
    assert_eq!(cpu.sp(), 0xD000);
}

#[test]
fn rst_jumps_to_its_vector() {
    // LD SP,0xD000; RST 0x28
    let (cpu, bus) = run(&[0x31, 0x00, 0xD0, 0xEF], 2);
    assert_eq!(cpu.pc(), 0x0028);
    assert_eq!(bus.memory[0xCFFE], 0x04);
}

#[test]
fn hl_post_increment_store() {
    // LD HL,0xC000; LD A,0x42; LD (HL+),A; LD (HL-),A
    let (cpu, bus) = run(&[0x21, 0x00, 0xC0, 0x3E, 0x42, 0x22, 0x32], 4);
    assert_eq!(bus.memory[0xC000], 0x42);
    assert_eq!(bus.memory[0xC001], 0x42);
    assert_eq!(cpu.reg16(Reg16::HL), 0xC000);
}

#[test]
fn ldh_goes_through_the_high_page() {
    // LD A,0x99; LDH (0x80),A; LD A,0; LDH A,(0x80)
    let (cpu, _) = run(&[0x3E, 0x99, 0xE0, 0x80, 0x3E, 0x00, 0xF0, 0x80], 4);
    assert_eq!(cpu.reg(Reg::A), 0x99);
    assert_eq!(cpu.read(HIGH_RAM_START), Some(0x99));
}

#[test]
fn sp_relative_adds_report_low_byte_flags() {
    // LD SP,0xD000; ADD SP,-1
    let (mut cpu, mut bus) = run(&[0x31, 0x00, 0xD0, 0xE8, 0xFF, 0xF8, 0x01], 2);
    assert_eq!(cpu.sp(), 0xCFFF);
    assert_eq!(cpu.reg(Reg::F), 0x00);

    // LD HL,SP+1
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.reg16(Reg16::HL), 0xD000);
    assert_eq!(cpu.sp(), 0xCFFF);
    assert_eq!(cpu.reg(Reg::F), 0x30);
}

#[test]
fn add_hl_keeps_zero() {
    // XOR A; LD HL,0x0FFF; LD BC,0x0001; ADD HL,BC
    let (cpu, _) = run(&[0xAF, 0x21, 0xFF, 0x0F, 0x01, 0x01, 0x00, 0x09], 4);
    assert_eq!(cpu.reg16(Reg16::HL), 0x1000);
    assert_eq!(cpu.reg(Reg::F), 0xA0);
}

#[test]
fn daa_after_bcd_add() {
    // LD A,0x15; ADD A,0x27; DAA
    let (cpu, _) = run(&[0x3E, 0x15, 0xC6, 0x27, 0x27], 3);
    assert_eq!(cpu.reg(Reg::A), 0x42);
    assert_eq!(cpu.reg(Reg::F), 0x00);
}

#[test]
fn rla_rotates_through_carry() {
    // SCF; LD A,0x80; RLA
    let (cpu, _) = run(&[0x37, 0x3E, 0x80, 0x17], 3);
    assert_eq!(cpu.reg(Reg::A), 0x01);
    assert_eq!(cpu.reg(Reg::F), 0x10);
}

#[test]
fn ccf_and_cpl() {
    // SCF; CCF
    let (cpu, _) = run(&[0x37, 0x3F], 2);
    assert_eq!(cpu.reg(Reg::F), 0x00);

    // CPL
    let (cpu, _) = run(&[0x2F], 1);
    assert_eq!(cpu.reg(Reg::A), 0xFF);
    assert_eq!(cpu.reg(Reg::F), 0x60);
}

#[test]
fn prefixed_swap_and_bit() {
    // LD A,0xF0; SWAP A
    let (cpu, _) = run(&[0x3E, 0xF0, 0xCB, 0x37], 2);
    assert_eq!(cpu.reg(Reg::A), 0x0F);
    assert_eq!(cpu.reg(Reg::F), 0x00);
    assert_eq!(cpu.pc(), 4);

    // SCF; BIT 7,H
    let (cpu, _) = run(&[0x37, 0xCB, 0x7C], 2);
    assert_eq!(cpu.reg(Reg::F), 0xB0);
}

#[test]
fn prefixed_ops_on_memory() {
    // LD HL,0xC000; SET 0,(HL); SLA (HL)
    let (cpu, bus) = run(&[0x21, 0x00, 0xC0, 0xCB, 0xC6, 0xCB, 0x26], 3);
    assert_eq!(bus.memory[0xC000], 0x02);
    assert_eq!(cpu.reg(Reg::F), 0x00);
    assert_eq!(cpu.next_non_idle_cycle, 3 + 4 + 4);
}

#[test]
fn enabled_interrupt_is_serviced_at_the_boundary() {
    // LD SP,0xD000; EI; NOP
    let (mut cpu, mut bus) = run(&[0x31, 0x00, 0xD0, 0xFB, 0x00], 2);
    assert!(cpu.ime());
    cpu.write(REG_IE, Interrupt::Timer.mask() as u8);
    cpu.request_interrupt(Interrupt::Timer);

    let at = cpu.next_non_idle_cycle;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc(), 0x0050);
    assert!(!cpu.ime());
    assert_eq!(cpu.read(REG_IF), Some(0));
    assert_eq!((bus.memory[0xCFFE], bus.memory[0xCFFF]), (0x04, 0x00));
    assert_eq!(cpu.next_non_idle_cycle, at + 5);
}

#[test]
fn halt_wakes_on_any_enabled_request() {
    let (mut cpu, mut bus) = load(&[0x76, 0x00]);
    cpu.cycle(0, &mut bus);
    assert!(cpu.is_halted());
    assert_eq!(cpu.next_non_idle_cycle, u64::MAX);

    for c in 1..10 {
        cpu.cycle(c, &mut bus);
    }
    assert_eq!(cpu.pc(), 1);

    cpu.write(REG_IE, 0x1F);
    cpu.request_interrupt(Interrupt::Joypad);
    cpu.cycle(10, &mut bus);
    // IME is off: the CPU resumes without dispatching.
    assert!(!cpu.is_halted());
    assert_eq!(cpu.pc(), 2);
    assert_eq!(cpu.next_non_idle_cycle, 11);
}

#[test]
fn illegal_opcode_locks_the_cpu() {
    let (mut cpu, mut bus) = load(&[0xD3]);
    cpu.cycle(0, &mut bus);
    assert!(cpu.is_locked());

    cpu.write(REG_IE, 0x1F);
    cpu.request_interrupt(Interrupt::VBlank);
    cpu.cycle(1, &mut bus);
    assert!(cpu.is_locked());
    assert_eq!(cpu.next_non_idle_cycle, u64::MAX);
}

#[test]
#[should_panic(expected = "STOP")]
fn stop_is_fatal() {
    let (mut cpu, mut bus) = load(&[0x10, 0x00]);
    cpu.cycle(0, &mut bus);
}

#[test]
fn post_boot_registers() {
    let mut cpu = Cpu::new();
    cpu.apply_dmg_boot_state();
    assert_eq!(
        cpu.pc_sp_af_bc_de_hl(),
        [0x0100, 0xFFFE, 0x01, 0xB0, 0x00, 0x13, 0x00, 0xD8, 0x01, 0x4D]
    );
}

#[test]
fn register_tags_have_fixed_indices() {
    let regs = [Reg::A, Reg::F, Reg::B, Reg::C, Reg::D, Reg::E, Reg::H, Reg::L];
    assert_eq!(regs.map(|r| r.index()), [0, 1, 2, 3, 4, 5, 6, 7]);

    let pairs = [Reg16::AF, Reg16::BC, Reg16::DE, Reg16::HL];
    assert_eq!(pairs.map(|r| r as usize), [0, 1, 2, 3]);
    assert_eq!(pairs.map(|r| r.halves()), [
        (Reg::A, Reg::F),
        (Reg::B, Reg::C),
        (Reg::D, Reg::E),
        (Reg::H, Reg::L),
    ]);
}
