//! Mock GPIO driver for testing
//!
//! [`MockDriver`] keeps a software model of every port (direction, output
//! latch, external input level, raw interrupt status, interrupt mask and
//! per-pin detection type) and records each driver call in order.
//!
//! # Feature Gate
//!
//! Available during test builds (`#[cfg(test)]`) and when the `mock`
//! feature is enabled.
//!
//! # Example
//!
//! ```ignore
//! use tivapin_core::mock::MockDriver;
//! use tivapin_core::{PinController, PinDirection};
//!
//! let driver = MockDriver::new();
//! let mut led = PinController::new(&driver, 5, 2);
//! led.set_direction(PinDirection::Out);
//! led.write(1);
//! assert_eq!(led.read(), 1);
//! ```

use core::cell::{Cell, RefCell};

use heapless::Vec;
use tivapin_hal::{DirMode, GpioDriver, Handler, IntType, PadStrength, PadType};

use crate::config::{PinId, PINS_PER_PORT, PORTS, PORT_COUNT};

/// Maximum number of recorded calls; later calls are dropped
pub const MAX_CALLS: usize = 128;

/// One recorded driver call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    EnablePeripheral(u32),
    SettleDelay,
    SetDirection(u32, u8, DirMode),
    SetPadConfig(u32, u8, PadStrength, PadType),
    ReadPin(u32, u8),
    WritePin(u32, u8, u8),
    ClearPending(u32, u8),
    EnablePinInterrupt(u32, u8),
    DisablePinInterrupt(u32, u8),
    SetInterruptType(u32, u8, IntType),
    ReadPending(u32),
    EnableIrq(u16),
    RegisterHandler(u16),
    EnableGlobalInterrupts,
}

/// Software model of one port
#[derive(Debug, Clone, Copy)]
struct PortState {
    dir: u8,
    output: u8,
    input: u8,
    ris: u8,
    im: u8,
    int_types: [IntType; PINS_PER_PORT],
    pads: [(PadStrength, PadType); PINS_PER_PORT],
}

impl PortState {
    /// Register reset values
    const RESET: Self = Self {
        dir: 0,
        output: 0,
        input: 0,
        ris: 0,
        im: 0,
        int_types: [IntType::FALLING_EDGE; PINS_PER_PORT],
        pads: [(PadStrength::MA2, PadType::ANALOG); PINS_PER_PORT],
    };

    /// Level seen on the pads: the output latch for outputs, the external
    /// level for inputs
    fn sampled(&self) -> u8 {
        (self.output & self.dir) | (self.input & !self.dir)
    }

    /// Latch raw interrupt status for pins whose condition is met by the
    /// change from `before` to the current level
    fn latch(&mut self, before: u8) {
        let after = self.sampled();

        for pin in 0..PINS_PER_PORT {
            let bit = 1u8 << pin;
            let old = before & bit != 0;
            let new = after & bit != 0;
            let int_type = self.int_types[pin];

            let hit = if int_type.is_level() {
                new == int_type.is_high_or_rising()
            } else if int_type.is_both_edges() {
                old != new
            } else if int_type.is_high_or_rising() {
                !old && new
            } else {
                old && !new
            };

            if hit {
                self.ris |= bit;
            }
        }
    }
}

/// Mock GPIO driver
///
/// Raw interrupt status latches whether or not a pin's interrupt is
/// unmasked, as on the real part.
#[derive(Debug)]
pub struct MockDriver {
    ports: RefCell<[PortState; PORT_COUNT]>,
    peripherals: Cell<u32>,
    irqs: Cell<u64>,
    global_interrupts: Cell<bool>,
    handlers: RefCell<Vec<(u16, Handler), PORT_COUNT>>,
    calls: RefCell<Vec<DriverCall, MAX_CALLS>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create a mock with every port at reset state
    pub fn new() -> Self {
        Self {
            ports: RefCell::new([PortState::RESET; PORT_COUNT]),
            peripherals: Cell::new(0),
            irqs: Cell::new(0),
            global_interrupts: Cell::new(false),
            handlers: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, call: DriverCall) {
        // Past capacity the log is truncated
        let _ = self.calls.borrow_mut().push(call);
    }

    fn port_index(base: u32) -> usize {
        PORTS
            .iter()
            .position(|p| p.base == base)
            .unwrap_or_else(|| panic!("no GPIO port at {:#010x}", base))
    }

    fn with_port<R>(&self, base: u32, f: impl FnOnce(&mut PortState) -> R) -> R {
        let mut ports = self.ports.borrow_mut();
        f(&mut ports[Self::port_index(base)])
    }

    fn port(&self, port: u8) -> PortState {
        self.ports.borrow()[port as usize]
    }

    /// Drive the external level of a pin
    ///
    /// Only observable through `read` while the pin is an input.
    pub fn set_input(&self, id: PinId, high: bool) {
        self.with_port(id.port_info().base, |p| {
            let before = p.sampled();
            if high {
                p.input |= id.mask();
            } else {
                p.input &= !id.mask();
            }
            p.latch(before);
        });
    }

    /// Raw interrupt status of a port
    pub fn pending_mask(&self, port: u8) -> u8 {
        self.port(port).ris
    }

    /// Level currently seen on a pin's pad
    pub fn level(&self, id: PinId) -> bool {
        self.port(id.port()).sampled() & id.mask() != 0
    }

    /// Value latched in a pin's output register
    pub fn output_latch(&self, id: PinId) -> bool {
        self.port(id.port()).output & id.mask() != 0
    }

    /// Programmed direction of a pin
    pub fn direction(&self, id: PinId) -> DirMode {
        if self.port(id.port()).dir & id.mask() != 0 {
            DirMode::OUT
        } else {
            DirMode::IN
        }
    }

    /// Programmed drive strength and pad type of a pin
    pub fn pad_config(&self, id: PinId) -> (PadStrength, PadType) {
        self.port(id.port()).pads[id.pin() as usize]
    }

    /// Programmed interrupt detection type of a pin
    pub fn int_type(&self, id: PinId) -> IntType {
        self.port(id.port()).int_types[id.pin() as usize]
    }

    /// Check if a pin's interrupt is unmasked
    pub fn is_pin_interrupt_enabled(&self, id: PinId) -> bool {
        self.port(id.port()).im & id.mask() != 0
    }

    /// Check if an NVIC line is enabled
    pub fn is_irq_enabled(&self, irq: u16) -> bool {
        self.irqs.get() & (1 << irq) != 0
    }

    /// Check if a peripheral clock is enabled
    pub fn is_peripheral_enabled(&self, periph: u32) -> bool {
        self.peripherals.get() & (1 << periph) != 0
    }

    /// Check if global interrupts are enabled
    pub fn global_interrupts_enabled(&self) -> bool {
        self.global_interrupts.get()
    }

    /// Handler registered for an NVIC line
    pub fn handler(&self, irq: u16) -> Option<Handler> {
        self.handlers
            .borrow()
            .iter()
            .find(|(n, _)| *n == irq)
            .map(|(_, h)| *h)
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> Vec<DriverCall, MAX_CALLS> {
        self.calls.borrow().clone()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl GpioDriver for MockDriver {
    fn enable_peripheral(&self, periph: u32) {
        self.record(DriverCall::EnablePeripheral(periph));
        self.peripherals.set(self.peripherals.get() | (1 << periph));
    }

    fn settle_delay(&self) {
        self.record(DriverCall::SettleDelay);
    }

    fn set_pin_direction(&self, port_base: u32, pins: u8, dir: DirMode) {
        self.record(DriverCall::SetDirection(port_base, pins, dir));
        self.with_port(port_base, |p| {
            let before = p.sampled();
            if dir == DirMode::OUT {
                p.dir |= pins;
            } else {
                p.dir &= !pins;
            }
            p.latch(before);
        });
    }

    fn set_pad_config(&self, port_base: u32, pins: u8, strength: PadStrength, pad: PadType) {
        self.record(DriverCall::SetPadConfig(port_base, pins, strength, pad));
        self.with_port(port_base, |p| {
            for pin in 0..PINS_PER_PORT {
                if pins & (1 << pin) != 0 {
                    p.pads[pin] = (strength, pad);
                }
            }
        });
    }

    fn read_pin(&self, port_base: u32, pins: u8) -> u8 {
        self.record(DriverCall::ReadPin(port_base, pins));
        self.with_port(port_base, |p| p.sampled() & pins)
    }

    fn write_pin(&self, port_base: u32, pins: u8, value: u8) {
        self.record(DriverCall::WritePin(port_base, pins, value));
        self.with_port(port_base, |p| {
            let before = p.sampled();
            p.output = (p.output & !pins) | (value & pins);
            p.latch(before);
        });
    }

    fn clear_pending_interrupt(&self, port_base: u32, pins: u8) {
        self.record(DriverCall::ClearPending(port_base, pins));
        self.with_port(port_base, |p| p.ris &= !pins);
    }

    fn enable_pin_interrupt(&self, port_base: u32, pins: u8) {
        self.record(DriverCall::EnablePinInterrupt(port_base, pins));
        self.with_port(port_base, |p| p.im |= pins);
    }

    fn disable_pin_interrupt(&self, port_base: u32, pins: u8) {
        self.record(DriverCall::DisablePinInterrupt(port_base, pins));
        self.with_port(port_base, |p| p.im &= !pins);
    }

    fn set_interrupt_type(&self, port_base: u32, pins: u8, int_type: IntType) {
        self.record(DriverCall::SetInterruptType(port_base, pins, int_type));
        self.with_port(port_base, |p| {
            for pin in 0..PINS_PER_PORT {
                if pins & (1 << pin) != 0 {
                    p.int_types[pin] = int_type;
                }
            }
            // A new level sense latches at once if the pad already matches
            let now = p.sampled();
            p.latch(now);
        });
    }

    fn read_pending_mask(&self, port_base: u32) -> u8 {
        self.record(DriverCall::ReadPending(port_base));
        self.with_port(port_base, |p| p.ris)
    }

    fn enable_global_interrupt_line(&self, irq: u16) {
        self.record(DriverCall::EnableIrq(irq));
        self.irqs.set(self.irqs.get() | (1 << irq));
    }

    fn register_interrupt_handler(&self, irq: u16, handler: Handler) {
        self.record(DriverCall::RegisterHandler(irq));
        let mut handlers = self.handlers.borrow_mut();
        if let Some(entry) = handlers.iter_mut().find(|(n, _)| *n == irq) {
            entry.1 = handler;
        } else {
            let _ = handlers.push((irq, handler));
        }
    }

    fn enable_global_interrupts(&self) {
        self.record(DriverCall::EnableGlobalInterrupts);
        self.global_interrupts.set(true);
    }
}
