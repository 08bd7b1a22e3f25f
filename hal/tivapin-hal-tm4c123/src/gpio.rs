//! GPIO register block for TM4C123
//!
//! Ports are reached through the APB aperture. Register offsets are shared
//! by every port; only the base address differs.

use tivapin_hal::{DirMode, GpioDriver, Handler, IntType, PadStrength, PadType};
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};

use crate::{sysctl, vector};

register_structs! {
    /// GPIO port registers
    GpioRegisters {
        /// Data, address-masked: offset `mask << 2` touches only `mask`
        (0x000 => data: [ReadWrite<u32>; 256]),
        (0x400 => dir: ReadWrite<u32>),
        /// Interrupt sense (level when set)
        (0x404 => is: ReadWrite<u32>),
        /// Interrupt both edges
        (0x408 => ibe: ReadWrite<u32>),
        /// Interrupt event (high/rising when set)
        (0x40C => iev: ReadWrite<u32>),
        /// Interrupt mask
        (0x410 => im: ReadWrite<u32>),
        /// Raw interrupt status
        (0x414 => ris: ReadOnly<u32>),
        /// Masked interrupt status
        (0x418 => mis: ReadOnly<u32>),
        /// Interrupt clear
        (0x41C => icr: WriteOnly<u32>),
        (0x420 => _reserved0),
        (0x500 => dr2r: ReadWrite<u32>),
        (0x504 => dr4r: ReadWrite<u32>),
        (0x508 => dr8r: ReadWrite<u32>),
        (0x50C => odr: ReadWrite<u32>),
        (0x510 => pur: ReadWrite<u32>),
        (0x514 => pdr: ReadWrite<u32>),
        (0x518 => slr: ReadWrite<u32>),
        (0x51C => den: ReadWrite<u32>),
        (0x520 => _reserved1),
        (0x528 => amsel: ReadWrite<u32>),
        (0x52C => @END),
    }
}

/// Register bits implied by a drive strength and pad type
///
/// Each field says whether the pin's bit is set in that register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadSettings {
    pub dr2r: bool,
    pub dr4r: bool,
    pub dr8r: bool,
    pub slr: bool,
    pub odr: bool,
    pub pur: bool,
    pub pdr: bool,
    pub den: bool,
    pub amsel: bool,
}

impl PadSettings {
    /// Decode strength and pad type codes into register bits
    ///
    /// The analog pad type clears every digital bit and selects the analog
    /// function.
    pub const fn decode(strength: PadStrength, pad: PadType) -> Self {
        Self {
            dr2r: strength.0 & 0x1 != 0,
            dr4r: strength.0 & 0x2 != 0,
            dr8r: strength.0 & 0x4 != 0,
            slr: strength.0 & 0x8 != 0,
            odr: pad.0 & 0x1 != 0,
            pur: pad.0 & 0x2 != 0,
            pdr: pad.0 & 0x4 != 0,
            den: pad.0 & 0x8 != 0,
            amsel: pad.0 == PadType::ANALOG.0,
        }
    }
}

/// Interrupt sense register bits implied by an [`IntType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptSense {
    /// IS: level-sensitive
    pub level: bool,
    /// IBE: both edges
    pub both_edges: bool,
    /// IEV: high level or rising edge
    pub high_or_rising: bool,
}

impl InterruptSense {
    pub const fn decode(int_type: IntType) -> Self {
        Self {
            level: int_type.is_level(),
            both_edges: int_type.is_both_edges(),
            high_or_rising: int_type.is_high_or_rising(),
        }
    }
}

fn registers(port_base: u32) -> &'static GpioRegisters {
    // SAFETY: callers pass a port base from the port table; each is the
    // start of a GPIO register block that lives for the whole program.
    unsafe { &*(port_base as usize as *const GpioRegisters) }
}

fn update(reg: &ReadWrite<u32>, pins: u8, set: bool) {
    let value = reg.get();
    if set {
        reg.set(value | pins as u32);
    } else {
        reg.set(value & !(pins as u32));
    }
}

/// GPIO driver for TM4C123
///
/// Zero-sized handle onto the memory-mapped GPIO ports. Any number may
/// exist at once; register updates are read-modify-write, so concurrent
/// writers to the same register of the same port must serialize
/// externally.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tm4c123Gpio;

impl Tm4c123Gpio {
    pub const fn new() -> Self {
        Self
    }

    /// Masked interrupt status of a port
    pub fn masked_pending(&self, port_base: u32) -> u8 {
        registers(port_base).mis.get() as u8
    }
}

impl GpioDriver for Tm4c123Gpio {
    fn enable_peripheral(&self, periph: u32) {
        sysctl::enable_gpio(periph);
    }

    fn settle_delay(&self) {
        sysctl::settle();
    }

    fn set_pin_direction(&self, port_base: u32, pins: u8, dir: DirMode) {
        let regs = registers(port_base);
        update(&regs.dir, pins, dir == DirMode::OUT);
    }

    fn set_pad_config(&self, port_base: u32, pins: u8, strength: PadStrength, pad: PadType) {
        let regs = registers(port_base);
        let settings = PadSettings::decode(strength, pad);

        update(&regs.dr2r, pins, settings.dr2r);
        update(&regs.dr4r, pins, settings.dr4r);
        update(&regs.dr8r, pins, settings.dr8r);
        update(&regs.slr, pins, settings.slr);
        update(&regs.odr, pins, settings.odr);
        update(&regs.pur, pins, settings.pur);
        update(&regs.pdr, pins, settings.pdr);
        update(&regs.den, pins, settings.den);
        update(&regs.amsel, pins, settings.amsel);
    }

    fn read_pin(&self, port_base: u32, pins: u8) -> u8 {
        registers(port_base).data[pins as usize].get() as u8
    }

    fn write_pin(&self, port_base: u32, pins: u8, value: u8) {
        registers(port_base).data[pins as usize].set(value as u32);
    }

    fn clear_pending_interrupt(&self, port_base: u32, pins: u8) {
        registers(port_base).icr.set(pins as u32);
    }

    fn enable_pin_interrupt(&self, port_base: u32, pins: u8) {
        update(&registers(port_base).im, pins, true);
    }

    fn disable_pin_interrupt(&self, port_base: u32, pins: u8) {
        update(&registers(port_base).im, pins, false);
    }

    fn set_interrupt_type(&self, port_base: u32, pins: u8, int_type: IntType) {
        let regs = registers(port_base);
        let sense = InterruptSense::decode(int_type);

        update(&regs.ibe, pins, sense.both_edges);
        update(&regs.is, pins, sense.level);
        update(&regs.iev, pins, sense.high_or_rising);
    }

    fn read_pending_mask(&self, port_base: u32) -> u8 {
        registers(port_base).ris.get() as u8
    }

    fn enable_global_interrupt_line(&self, irq: u16) {
        vector::enable_irq(irq);
    }

    fn register_interrupt_handler(&self, irq: u16, handler: Handler) {
        vector::register(irq, handler);
    }

    fn enable_global_interrupts(&self) {
        // SAFETY: handlers are installed before any pin is armed.
        unsafe { cortex_m::interrupt::enable() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_standard_pad() {
        let s = PadSettings::decode(PadStrength::MA2, PadType::STD);
        assert_eq!(
            s,
            PadSettings {
                dr2r: true,
                den: true,
                ..PadSettings::default()
            }
        );
    }

    #[test]
    fn test_decode_pulls_and_open_drain() {
        let s = PadSettings::decode(PadStrength::MA8_SC, PadType::OD_WPU);
        assert!(s.dr8r && s.slr);
        assert!(!s.dr2r && !s.dr4r);
        assert!(s.odr && s.pur && s.den);
        assert!(!s.pdr && !s.amsel);

        let s = PadSettings::decode(PadStrength::MA4, PadType::STD_WPD);
        assert!(s.dr4r && s.pdr && s.den);
        assert!(!s.odr && !s.pur);
    }

    #[test]
    fn test_decode_analog_pad() {
        let s = PadSettings::decode(PadStrength::MA2, PadType::ANALOG);
        assert!(s.amsel);
        assert!(!s.den && !s.odr && !s.pur && !s.pdr);
    }

    #[test]
    fn test_decode_interrupt_sense() {
        let falling = InterruptSense::decode(IntType::FALLING_EDGE);
        assert!(!falling.level && !falling.both_edges && !falling.high_or_rising);

        let rising = InterruptSense::decode(IntType::RISING_EDGE);
        assert!(!rising.level && rising.high_or_rising);

        let both = InterruptSense::decode(IntType::BOTH_EDGES);
        assert!(both.both_edges && !both.level);

        let low = InterruptSense::decode(IntType::LOW_LEVEL);
        assert!(low.level && !low.high_or_rising);

        let high = InterruptSense::decode(IntType::HIGH_LEVEL);
        assert!(high.level && high.high_or_rising);
    }

    #[test]
    fn test_register_layout() {
        assert_eq!(core::mem::size_of::<GpioRegisters>(), 0x52C);
    }
}
