//! System control: clock gating and the system clock

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

/// System clock after [`clock_init`]
pub const SYSTEM_CLOCK_HZ: u32 = 50_000_000;

/// Cycles to wait after gating a peripheral clock on before touching it
pub const SETTLE_CYCLES: u32 = 6;

const SYSCTL_BASE: usize = 0x400F_E000;

register_structs! {
    SysctlRegisters {
        (0x000 => _reserved0),
        (0x050 => ris: ReadOnly<u32, RIS::Register>),
        (0x054 => _reserved1),
        /// Masked interrupt status, write 1 to clear
        (0x058 => misc: ReadWrite<u32, MISC::Register>),
        (0x05C => _reserved2),
        (0x060 => rcc: ReadWrite<u32, RCC::Register>),
        (0x064 => _reserved3),
        (0x070 => rcc2: ReadWrite<u32, RCC2::Register>),
        (0x074 => _reserved4),
        /// GPIO run mode clock gating
        (0x608 => rcgcgpio: ReadWrite<u32>),
        (0x60C => _reserved5),
        /// GPIO peripheral ready
        (0xA08 => prgpio: ReadOnly<u32>),
        (0xA0C => @END),
    }
}

register_bitfields![u32,
    RIS [
        /// PLL lock
        PLLLRIS OFFSET(6) NUMBITS(1) []
    ],
    MISC [
        PLLLMIS OFFSET(6) NUMBITS(1) []
    ],
    RCC [
        /// Main oscillator disable
        MOSCDIS OFFSET(0) NUMBITS(1) [],
        /// Crystal value
        XTAL OFFSET(6) NUMBITS(5) [
            Mhz16 = 0x15
        ],
        /// Enable the system clock divider
        USESYSDIV OFFSET(22) NUMBITS(1) []
    ],
    RCC2 [
        OSCSRC2 OFFSET(4) NUMBITS(3) [
            Main = 0
        ],
        BYPASS2 OFFSET(11) NUMBITS(1) [],
        PWRDN2 OFFSET(13) NUMBITS(1) [],
        /// System clock divisor minus one, from the 200MHz PLL output
        SYSDIV2 OFFSET(23) NUMBITS(6) [],
        /// Use RCC2 fields
        USERCC2 OFFSET(31) NUMBITS(1) []
    ]
];

fn registers() -> &'static SysctlRegisters {
    // SAFETY: fixed system control block address on every TM4C123 part.
    unsafe { &*(SYSCTL_BASE as *const SysctlRegisters) }
}

/// Gate on the clock of GPIO port `periph` and wait until it is ready
///
/// Idempotent.
pub fn enable_gpio(periph: u32) {
    let regs = registers();
    let bit = 1 << periph;

    regs.rcgcgpio.set(regs.rcgcgpio.get() | bit);
    while regs.prgpio.get() & bit == 0 {}

    #[cfg(feature = "defmt")]
    defmt::trace!("sysctl: GPIO {} ready", periph);
}

/// Wait out the window after a clock enable in which register writes fault
pub fn settle() {
    cortex_m::asm::delay(SETTLE_CYCLES);
}

/// Run from the PLL at [`SYSTEM_CLOCK_HZ`], fed by the 16MHz main crystal
pub fn clock_init() {
    let regs = registers();

    start_pll(regs, sysdiv(SYSTEM_CLOCK_HZ));
    while !regs.ris.is_set(RIS::PLLLRIS) {}
    regs.rcc2.modify(RCC2::BYPASS2::CLEAR);

    #[cfg(feature = "defmt")]
    defmt::debug!("sysctl: system clock {=u32} Hz", SYSTEM_CLOCK_HZ);
}

/// Reprogram the PLL for divisor `div`, leaving the system clock bypassed
///
/// The lock bit still set from boot ROM or an earlier call is cleared
/// before the PLL is touched, so a later poll of `RIS.PLLLRIS` only sees the
/// new lock.
fn start_pll(regs: &SysctlRegisters, div: u32) {
    // Run from the raw oscillator while the PLL is reprogrammed
    regs.rcc2.modify(RCC2::USERCC2::SET + RCC2::BYPASS2::SET);
    regs.rcc.modify(RCC::USESYSDIV::CLEAR);
    regs.misc.write(MISC::PLLLMIS::SET);

    regs.rcc.modify(RCC::XTAL::Mhz16 + RCC::MOSCDIS::CLEAR);
    regs.rcc2.modify(RCC2::OSCSRC2::Main + RCC2::PWRDN2::CLEAR);

    regs.rcc2.modify(RCC2::SYSDIV2.val(div));
    regs.rcc.modify(RCC::USESYSDIV::SET);
}

/// SYSDIV2 field value that divides the 200MHz PLL output down to `hz`
const fn sysdiv(hz: u32) -> u32 {
    200_000_000 / hz - 1
}

/// Busy-wait for `ms` milliseconds at [`SYSTEM_CLOCK_HZ`]
pub fn delay_ms(ms: u32) {
    let mut remaining = delay_cycles(ms);
    while remaining > 0 {
        let step = remaining.min(u64::from(u32::MAX)) as u32;
        cortex_m::asm::delay(step);
        remaining -= u64::from(step);
    }
}

const fn delay_cycles(ms: u32) -> u64 {
    cycles_per_ms() as u64 * ms as u64
}

const fn cycles_per_ms() -> u32 {
    SYSTEM_CLOCK_HZ / 1000
}
