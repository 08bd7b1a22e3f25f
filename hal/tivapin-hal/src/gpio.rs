//! GPIO peripheral driver abstraction
//!
//! The driver works at register granularity: a port is named by its base
//! address and pins by an 8-bit mask, the same shape the Tiva peripheral
//! library uses. Values written to direction, pad and interrupt-type
//! registers are carried as newtypes over the vendor register codes so the
//! translation from abstract configuration happens exactly once, above this
//! layer.

/// Interrupt handler installed in the vector table
pub type Handler = extern "C" fn();

/// Pin direction register code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirMode(pub u32);

impl DirMode {
    /// Pin is an input
    pub const IN: Self = Self(0x0000_0000);
    /// Pin is an output
    pub const OUT: Self = Self(0x0000_0001);
}

/// Pad drive strength code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadStrength(pub u32);

impl PadStrength {
    /// 2mA drive
    pub const MA2: Self = Self(0x0000_0001);
    /// 4mA drive
    pub const MA4: Self = Self(0x0000_0002);
    /// 8mA drive
    pub const MA8: Self = Self(0x0000_0004);
    /// 8mA drive with slew rate control
    pub const MA8_SC: Self = Self(0x0000_000C);
}

/// Pad type code
///
/// Bit 3 selects digital, bit 0 open-drain, bit 1 weak pull-up,
/// bit 2 weak pull-down. Zero is analog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadType(pub u32);

impl PadType {
    /// Push-pull
    pub const STD: Self = Self(0x0000_0008);
    /// Push-pull with weak pull-up
    pub const STD_WPU: Self = Self(0x0000_000A);
    /// Push-pull with weak pull-down
    pub const STD_WPD: Self = Self(0x0000_000C);
    /// Open-drain
    pub const OD: Self = Self(0x0000_0009);
    /// Open-drain with weak pull-up
    pub const OD_WPU: Self = Self(0x0000_000B);
    /// Open-drain with weak pull-down
    pub const OD_WPD: Self = Self(0x0000_000D);
    /// Analog comparator
    pub const ANALOG: Self = Self(0x0000_0000);
}

/// Interrupt detection type code
///
/// Bit 1 selects level (IS), bit 0 both edges (IBE), bit 2 the
/// high/rising event (IEV).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntType(pub u32);

impl IntType {
    /// Interrupt on falling edge
    pub const FALLING_EDGE: Self = Self(0x0000_0000);
    /// Interrupt on both edges
    pub const BOTH_EDGES: Self = Self(0x0000_0001);
    /// Interrupt while the pin is low
    pub const LOW_LEVEL: Self = Self(0x0000_0002);
    /// Interrupt on rising edge
    pub const RISING_EDGE: Self = Self(0x0000_0004);
    /// Interrupt while the pin is high
    pub const HIGH_LEVEL: Self = Self(0x0000_0006);

    /// Level-sensitive (IS bit)
    pub const fn is_level(self) -> bool {
        self.0 & 0x2 != 0
    }

    /// Both-edge detection (IBE bit)
    pub const fn is_both_edges(self) -> bool {
        self.0 & 0x1 != 0
    }

    /// High level or rising edge (IEV bit)
    pub const fn is_high_or_rising(self) -> bool {
        self.0 & 0x4 != 0
    }
}

/// GPIO peripheral driver
///
/// Implementations perform the register transactions for one chip family.
/// All methods take `&self`: a driver is a handle onto memory-mapped
/// hardware, and the per-port interrupt handler needs one while the
/// foreground still holds its own.
///
/// Every method is a bounded sequence of register accesses; none of them
/// block.
pub trait GpioDriver {
    /// Enable the clock to a peripheral (idempotent)
    fn enable_peripheral(&self, periph: u32);

    /// Wait out the post clock-enable window
    ///
    /// Register writes within a few cycles of enabling a peripheral clock
    /// can fault. Called once after [`enable_peripheral`](Self::enable_peripheral)
    /// and before the first access to that port.
    fn settle_delay(&self);

    /// Set the direction of the pins in `pins`
    fn set_pin_direction(&self, port_base: u32, pins: u8, dir: DirMode);

    /// Set drive strength and pad type of the pins in `pins`
    fn set_pad_config(&self, port_base: u32, pins: u8, strength: PadStrength, pad: PadType);

    /// Sample the pins in `pins`
    ///
    /// Bits outside `pins` read as zero.
    fn read_pin(&self, port_base: u32, pins: u8) -> u8;

    /// Write `value` to the pins in `pins`, leaving the others untouched
    fn write_pin(&self, port_base: u32, pins: u8, value: u8);

    /// Acknowledge pending interrupts on the pins in `pins`
    fn clear_pending_interrupt(&self, port_base: u32, pins: u8);

    /// Unmask the pin-level interrupt of the pins in `pins`
    fn enable_pin_interrupt(&self, port_base: u32, pins: u8);

    /// Mask the pin-level interrupt of the pins in `pins`
    fn disable_pin_interrupt(&self, port_base: u32, pins: u8);

    /// Program edge/level detection for the pins in `pins`
    fn set_interrupt_type(&self, port_base: u32, pins: u8, int_type: IntType);

    /// Raw pending-interrupt mask of a port
    fn read_pending_mask(&self, port_base: u32) -> u8;

    /// Enable an interrupt line at the interrupt controller
    fn enable_global_interrupt_line(&self, irq: u16);

    /// Install `handler` as the vector for `irq`
    fn register_interrupt_handler(&self, irq: u16, handler: Handler);

    /// Set the processor's global interrupt enable
    fn enable_global_interrupts(&self);
}

impl<T: GpioDriver + ?Sized> GpioDriver for &T {
    fn enable_peripheral(&self, periph: u32) {
        (**self).enable_peripheral(periph)
    }

    fn settle_delay(&self) {
        (**self).settle_delay()
    }

    fn set_pin_direction(&self, port_base: u32, pins: u8, dir: DirMode) {
        (**self).set_pin_direction(port_base, pins, dir)
    }

    fn set_pad_config(&self, port_base: u32, pins: u8, strength: PadStrength, pad: PadType) {
        (**self).set_pad_config(port_base, pins, strength, pad)
    }

    fn read_pin(&self, port_base: u32, pins: u8) -> u8 {
        (**self).read_pin(port_base, pins)
    }

    fn write_pin(&self, port_base: u32, pins: u8, value: u8) {
        (**self).write_pin(port_base, pins, value)
    }

    fn clear_pending_interrupt(&self, port_base: u32, pins: u8) {
        (**self).clear_pending_interrupt(port_base, pins)
    }

    fn enable_pin_interrupt(&self, port_base: u32, pins: u8) {
        (**self).enable_pin_interrupt(port_base, pins)
    }

    fn disable_pin_interrupt(&self, port_base: u32, pins: u8) {
        (**self).disable_pin_interrupt(port_base, pins)
    }

    fn set_interrupt_type(&self, port_base: u32, pins: u8, int_type: IntType) {
        (**self).set_interrupt_type(port_base, pins, int_type)
    }

    fn read_pending_mask(&self, port_base: u32) -> u8 {
        (**self).read_pending_mask(port_base)
    }

    fn enable_global_interrupt_line(&self, irq: u16) {
        (**self).enable_global_interrupt_line(irq)
    }

    fn register_interrupt_handler(&self, irq: u16, handler: Handler) {
        (**self).register_interrupt_handler(irq, handler)
    }

    fn enable_global_interrupts(&self) {
        (**self).enable_global_interrupts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_type_bits() {
        assert!(!IntType::FALLING_EDGE.is_level());
        assert!(!IntType::FALLING_EDGE.is_both_edges());
        assert!(!IntType::FALLING_EDGE.is_high_or_rising());

        assert!(IntType::RISING_EDGE.is_high_or_rising());
        assert!(!IntType::RISING_EDGE.is_level());

        assert!(IntType::BOTH_EDGES.is_both_edges());
        assert!(!IntType::BOTH_EDGES.is_level());

        assert!(IntType::LOW_LEVEL.is_level());
        assert!(!IntType::LOW_LEVEL.is_high_or_rising());

        assert!(IntType::HIGH_LEVEL.is_level());
        assert!(IntType::HIGH_LEVEL.is_high_or_rising());
    }

    #[test]
    fn test_pad_type_codes() {
        // Every digital pad type carries the digital-enable bit
        for pad in [
            PadType::STD,
            PadType::STD_WPU,
            PadType::STD_WPD,
            PadType::OD,
            PadType::OD_WPU,
            PadType::OD_WPD,
        ] {
            assert_ne!(pad.0 & 0x8, 0);
        }
        assert_eq!(PadType::ANALOG.0 & 0x8, 0);
    }
}
