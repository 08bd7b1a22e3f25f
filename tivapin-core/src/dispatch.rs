//! GPIO interrupt dispatch
//!
//! A fixed table of callback slots, one per (port, pin), shared between
//! foreground code and the port interrupt handlers.
//!
//! ## Concurrency
//!
//! Foreground code writes a slot on attach/detach; the port handler reads
//! slots while it may have preempted that write. Each slot is a single
//! pointer-sized atomic, so the handler sees either the old or the new
//! callback and never a partial value. No lock is taken on either side.
//!
//! All GPIO lines share one NVIC priority, so port handlers do not nest.
//!
//! ## Arming order
//!
//! Attach masks the pin, programs the detection type, acknowledges any
//! pending bit (including one latched by the type change) and only then
//! unmasks the pin.

use portable_atomic::{AtomicPtr, Ordering};
use tivapin_hal::{GpioDriver, Handler, IntType};

use crate::config::{PinId, PINS_PER_PORT, PORTS, PORT_COUNT};
use crate::error::Error;

/// Number of [`InterruptCondition`] values
pub const CONDITION_TOTAL: u8 = 6;

/// Electrical condition that triggers a pin's callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InterruptCondition {
    /// Do not arm
    #[default]
    None = 0,
    /// While the pin is low
    LowLevel = 1,
    /// While the pin is high
    HighLevel = 2,
    /// On a low-to-high transition
    RisingEdge = 3,
    /// On a high-to-low transition
    FallingEdge = 4,
    /// On any transition
    BothEdges = 5,
}

impl InterruptCondition {
    /// Get the condition as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a condition from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(InterruptCondition::None),
            1 => Some(InterruptCondition::LowLevel),
            2 => Some(InterruptCondition::HighLevel),
            3 => Some(InterruptCondition::RisingEdge),
            4 => Some(InterruptCondition::FallingEdge),
            5 => Some(InterruptCondition::BothEdges),
            _ => None,
        }
    }

    /// Interrupt type register code, or `None` for [`InterruptCondition::None`]
    pub fn int_type(self) -> Option<IntType> {
        match self {
            InterruptCondition::None => None,
            InterruptCondition::LowLevel => Some(IntType::LOW_LEVEL),
            InterruptCondition::HighLevel => Some(IntType::HIGH_LEVEL),
            InterruptCondition::RisingEdge => Some(IntType::RISING_EDGE),
            InterruptCondition::FallingEdge => Some(IntType::FALLING_EDGE),
            InterruptCondition::BothEdges => Some(IntType::BOTH_EDGES),
        }
    }
}

impl TryFrom<u8> for InterruptCondition {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(Error::InvalidCondition(value))
    }
}

/// One callback slot; null means empty
struct CallbackSlot(AtomicPtr<()>);

impl CallbackSlot {
    const fn new() -> Self {
        Self(AtomicPtr::new(core::ptr::null_mut()))
    }

    fn store(&self, f: fn()) {
        self.0.store(f as *mut (), Ordering::Release);
    }

    fn clear(&self) {
        self.0.store(core::ptr::null_mut(), Ordering::Release);
    }

    #[allow(unsafe_code)]
    fn load(&self) -> Option<fn()> {
        let ptr = self.0.load(Ordering::Acquire);
        if ptr.is_null() {
            None
        } else {
            // SAFETY: the only non-null values ever stored come from `store`,
            // which casts a valid `fn()`.
            Some(unsafe { core::mem::transmute::<*mut (), fn()>(ptr) })
        }
    }
}

/// Per-pin callback table
///
/// [`CALLBACKS`] is the instance the installed port handlers service. Other
/// instances are useful for driving [`DispatchTable::dispatch`] by hand.
pub struct DispatchTable {
    slots: [[CallbackSlot; PINS_PER_PORT]; PORT_COUNT],
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTable {
    /// Create a table with every slot empty
    #[allow(clippy::declare_interior_mutable_const)]
    pub const fn new() -> Self {
        const EMPTY: CallbackSlot = CallbackSlot::new();
        const EMPTY_PORT: [CallbackSlot; PINS_PER_PORT] = [EMPTY; PINS_PER_PORT];
        Self {
            slots: [EMPTY_PORT; PORT_COUNT],
        }
    }

    fn slot(&self, id: PinId) -> &CallbackSlot {
        &self.slots[id.port() as usize][id.pin() as usize]
    }

    /// Register `callback` for `id` and arm the pin for `condition`
    ///
    /// Replaces any callback already registered for the pin. The pin stays
    /// masked while its detection type changes, and anything latched by the
    /// change is cleared before it is unmasked again.
    /// [`InterruptCondition::None`] leaves both the table and the hardware
    /// untouched.
    pub fn attach<D: GpioDriver>(
        &self,
        driver: &D,
        id: PinId,
        condition: InterruptCondition,
        callback: fn(),
    ) {
        let Some(int_type) = condition.int_type() else {
            return;
        };
        let port = id.port_info();
        let mask = id.mask();

        driver.disable_pin_interrupt(port.base, mask);
        self.slot(id).store(callback);

        driver.set_interrupt_type(port.base, mask, int_type);
        driver.clear_pending_interrupt(port.base, mask);
        driver.enable_pin_interrupt(port.base, mask);
        driver.enable_global_interrupt_line(port.irq);
        driver.enable_global_interrupts();

        #[cfg(feature = "defmt")]
        defmt::debug!("gpio: attached {} on {}", condition, id);
    }

    /// [`attach`](Self::attach) with a raw condition value
    ///
    /// An out-of-range value is treated like [`InterruptCondition::None`].
    pub fn attach_raw<D: GpioDriver>(&self, driver: &D, id: PinId, condition: u8, callback: fn()) {
        if let Some(condition) = InterruptCondition::from_u8(condition) {
            self.attach(driver, id, condition, callback);
        }
    }

    /// Drop the callback for `id` and mask the pin's interrupt
    ///
    /// The port's NVIC line stays enabled for the other pins on it.
    pub fn detach<D: GpioDriver>(&self, driver: &D, id: PinId) {
        let base = id.port_info().base;

        for (port, info) in PORTS.iter().enumerate() {
            if info.base == base {
                self.slots[port][id.pin() as usize].clear();
            }
        }
        driver.disable_pin_interrupt(base, id.mask());

        #[cfg(feature = "defmt")]
        defmt::debug!("gpio: detached {}", id);
    }

    /// Callback currently registered for `id`
    pub fn callback(&self, id: PinId) -> Option<fn()> {
        self.slot(id).load()
    }

    /// Check if a callback is registered for `id`
    pub fn is_attached(&self, id: PinId) -> bool {
        self.callback(id).is_some()
    }

    /// Service a port interrupt
    ///
    /// Reads and acknowledges the port's pending mask, then runs the
    /// callback of every pending pin in increasing pin order. Pins that
    /// signal together are all handled in this one pass.
    ///
    /// # Panics
    ///
    /// If `port >= PORT_COUNT`.
    pub fn dispatch<D: GpioDriver>(&self, driver: &D, port: usize) {
        let base = PORTS[port].base;

        let pending = driver.read_pending_mask(base);
        driver.clear_pending_interrupt(base, pending);

        let mut fired = pending;
        while fired != 0 {
            let pin = fired.trailing_zeros() as usize;
            fired &= !(1 << pin);

            if let Some(callback) = self.slots[port][pin].load() {
                callback();
            }
        }
    }
}

/// Process-wide callback table serviced by the installed port handlers
pub static CALLBACKS: DispatchTable = DispatchTable::new();

/// Port handler for port `PORT`
///
/// `D` must be constructible from nothing, which holds for drivers that
/// are plain handles onto memory-mapped registers.
extern "C" fn port_handler<D: GpioDriver + Default, const PORT: usize>() {
    CALLBACKS.dispatch(&D::default(), PORT);
}

/// Install the port handlers for every port
///
/// Called once at startup, before the first attach.
pub fn install<D: GpioDriver + Default>(driver: &D) {
    let handlers: [Handler; PORT_COUNT] = [
        port_handler::<D, 0>,
        port_handler::<D, 1>,
        port_handler::<D, 2>,
        port_handler::<D, 3>,
        port_handler::<D, 4>,
        port_handler::<D, 5>,
    ];

    for (port, handler) in PORTS.iter().zip(handlers) {
        driver.register_interrupt_handler(port.irq, handler);
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("gpio: installed {} port handlers", PORT_COUNT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DriverCall, MockDriver};
    use core::sync::atomic::{AtomicUsize, Ordering};

    // Each test owns its counters; the test harness runs tests in parallel.

    #[test]
    fn test_condition_mapping_follows_names() {
        assert_eq!(InterruptCondition::None.int_type(), None);
        assert_eq!(
            InterruptCondition::RisingEdge.int_type(),
            Some(IntType::RISING_EDGE)
        );
        assert_eq!(
            InterruptCondition::FallingEdge.int_type(),
            Some(IntType::FALLING_EDGE)
        );
        assert_eq!(
            InterruptCondition::LowLevel.int_type(),
            Some(IntType::LOW_LEVEL)
        );
        assert_eq!(
            InterruptCondition::HighLevel.int_type(),
            Some(IntType::HIGH_LEVEL)
        );
        assert_eq!(
            InterruptCondition::BothEdges.int_type(),
            Some(IntType::BOTH_EDGES)
        );
        assert_eq!(InterruptCondition::from_u8(CONDITION_TOTAL), None);
        assert_eq!(
            InterruptCondition::try_from(CONDITION_TOTAL),
            Err(Error::InvalidCondition(CONDITION_TOTAL))
        );
    }

    #[test]
    fn test_rising_edge_fires_once_and_clears_pending() {
        static HITS: AtomicUsize = AtomicUsize::new(0);
        fn on_edge() {
            HITS.fetch_add(1, Ordering::SeqCst);
        }

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let id = PinId::new(1, 4);

        table.attach(&driver, id, InterruptCondition::RisingEdge, on_edge);
        driver.set_input(id, true);
        assert_eq!(driver.pending_mask(1), id.mask());

        table.dispatch(&driver, 1);
        assert_eq!(HITS.load(Ordering::SeqCst), 1);
        assert_eq!(driver.pending_mask(1), 0);

        // Falling back low is not a rising edge
        driver.set_input(id, false);
        table.dispatch(&driver, 1);
        assert_eq!(HITS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detach_silences_pin() {
        static HITS: AtomicUsize = AtomicUsize::new(0);
        fn on_edge() {
            HITS.fetch_add(1, Ordering::SeqCst);
        }

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let id = PinId::new(2, 1);

        table.attach(&driver, id, InterruptCondition::RisingEdge, on_edge);
        assert!(table.is_attached(id));
        table.detach(&driver, id);
        assert!(!table.is_attached(id));
        assert!(!driver.is_pin_interrupt_enabled(id));

        driver.set_input(id, true);
        table.dispatch(&driver, 2);
        assert_eq!(HITS.load(Ordering::SeqCst), 0);

        // The port line stays enabled for other pins
        assert!(driver.is_irq_enabled(id.port_info().irq));
    }

    #[test]
    fn test_detach_without_callback_is_noop() {
        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let id = PinId::new(0, 0);

        table.detach(&driver, id);
        assert!(!table.is_attached(id));
    }

    #[test]
    fn test_simultaneous_pins_serviced_in_index_order() {
        static ORDER: AtomicUsize = AtomicUsize::new(0);
        static PIN3_AT: AtomicUsize = AtomicUsize::new(0);
        static PIN5_AT: AtomicUsize = AtomicUsize::new(0);
        fn on_pin3() {
            PIN3_AT.store(ORDER.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
        }
        fn on_pin5() {
            PIN5_AT.store(ORDER.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
        }

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let pin3 = PinId::new(3, 3);
        let pin5 = PinId::new(3, 5);

        // Attach in reverse order; servicing order is by pin index
        table.attach(&driver, pin5, InterruptCondition::RisingEdge, on_pin5);
        table.attach(&driver, pin3, InterruptCondition::RisingEdge, on_pin3);
        driver.set_input(pin5, true);
        driver.set_input(pin3, true);

        table.dispatch(&driver, 3);
        assert_eq!(PIN3_AT.load(Ordering::SeqCst), 1);
        assert_eq!(PIN5_AT.load(Ordering::SeqCst), 2);
        assert_eq!(driver.pending_mask(3), 0);
    }

    #[test]
    fn test_reattach_replaces_callback() {
        static OLD: AtomicUsize = AtomicUsize::new(0);
        static NEW: AtomicUsize = AtomicUsize::new(0);
        fn old_callback() {
            OLD.fetch_add(1, Ordering::SeqCst);
        }
        fn new_callback() {
            NEW.fetch_add(1, Ordering::SeqCst);
        }

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let id = PinId::new(4, 2);

        table.attach(&driver, id, InterruptCondition::BothEdges, old_callback);
        // Condition latched before the replacement
        driver.set_input(id, true);
        table.attach(&driver, id, InterruptCondition::BothEdges, new_callback);
        driver.set_input(id, false);

        table.dispatch(&driver, 4);
        assert_eq!(OLD.load(Ordering::SeqCst), 0);
        assert_eq!(NEW.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_attach_none_is_noop() {
        fn never() {}

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let id = PinId::new(0, 7);

        table.attach(&driver, id, InterruptCondition::None, never);
        table.attach_raw(&driver, id, CONDITION_TOTAL, never);
        assert!(!table.is_attached(id));
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_attach_clears_stale_pending_before_unmask() {
        fn callback() {}

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let id = PinId::new(5, 4);

        // Default detection is falling edge; latch one before attaching
        driver.set_input(id, true);
        driver.set_input(id, false);
        assert_eq!(driver.pending_mask(5), id.mask());

        table.attach(&driver, id, InterruptCondition::LowLevel, callback);

        let calls = driver.calls();
        let base = id.port_info().base;
        let position = |call: DriverCall| calls.iter().position(|c| *c == call).unwrap();
        let int_type = position(DriverCall::SetInterruptType(base, id.mask(), IntType::LOW_LEVEL));
        let clear = position(DriverCall::ClearPending(base, id.mask()));
        let unmask = position(DriverCall::EnablePinInterrupt(base, id.mask()));
        assert!(int_type < clear);
        assert!(clear < unmask);
        assert!(calls.contains(&DriverCall::EnableIrq(30)));
        assert_eq!(calls.last(), Some(&DriverCall::EnableGlobalInterrupts));
        assert!(driver.global_interrupts_enabled());
    }

    #[test]
    fn test_reattach_masks_pin_while_sense_changes() {
        static HITS: AtomicUsize = AtomicUsize::new(0);
        fn callback() {
            HITS.fetch_add(1, Ordering::SeqCst);
        }

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let id = PinId::new(2, 6);
        let base = id.port_info().base;

        // Pad stays low throughout
        table.attach(&driver, id, InterruptCondition::HighLevel, callback);
        assert!(driver.is_pin_interrupt_enabled(id));
        driver.clear_calls();

        // The new sense matches the current level and latches at once
        table.attach(&driver, id, InterruptCondition::RisingEdge, callback);
        table.attach(&driver, id, InterruptCondition::LowLevel, callback);

        let calls = driver.calls();
        let position = |call: DriverCall| calls.iter().position(|c| *c == call).unwrap();
        let mask = position(DriverCall::DisablePinInterrupt(base, id.mask()));
        let int_type = position(DriverCall::SetInterruptType(base, id.mask(), IntType::RISING_EDGE));
        let clear = position(DriverCall::ClearPending(base, id.mask()));
        let unmask = position(DriverCall::EnablePinInterrupt(base, id.mask()));
        assert!(mask < int_type);
        assert!(int_type < clear);
        assert!(clear < unmask);

        let rearm = &calls[unmask + 1..];
        let mask = rearm
            .iter()
            .position(|c| *c == DriverCall::DisablePinInterrupt(base, id.mask()))
            .unwrap();
        let int_type = rearm
            .iter()
            .position(|c| *c == DriverCall::SetInterruptType(base, id.mask(), IntType::LOW_LEVEL))
            .unwrap();
        assert!(mask < int_type);

        // The latch from the sense change was dropped before unmasking
        assert_eq!(driver.pending_mask(2), 0);
        table.dispatch(&driver, 2);
        assert_eq!(HITS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_level_condition_fires_while_level_holds() {
        static HITS: AtomicUsize = AtomicUsize::new(0);
        fn on_level() {
            HITS.fetch_add(1, Ordering::SeqCst);
        }

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let id = PinId::new(3, 2);

        table.attach(&driver, id, InterruptCondition::HighLevel, on_level);
        assert_eq!(driver.pending_mask(3), 0);

        driver.set_input(id, true);
        assert_eq!(driver.pending_mask(3), id.mask());
        table.dispatch(&driver, 3);
        assert_eq!(HITS.load(Ordering::SeqCst), 1);
        assert_eq!(driver.pending_mask(3), 0);

        // Still high: the next sample latches again
        driver.set_input(id, true);
        table.dispatch(&driver, 3);
        assert_eq!(HITS.load(Ordering::SeqCst), 2);

        driver.set_input(id, false);
        assert_eq!(driver.pending_mask(3), 0);
        table.dispatch(&driver, 3);
        assert_eq!(HITS.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[should_panic]
    fn test_dispatch_rejects_unknown_port() {
        let table = DispatchTable::new();
        let driver = MockDriver::new();
        table.dispatch(&driver, PORT_COUNT);
    }

    #[test]
    fn test_dispatch_skips_pins_without_callback() {
        static HITS: AtomicUsize = AtomicUsize::new(0);
        fn callback() {
            HITS.fetch_add(1, Ordering::SeqCst);
        }

        let table = DispatchTable::new();
        let driver = MockDriver::new();
        let armed = PinId::new(0, 1);
        let bare = PinId::new(0, 2);

        table.attach(&driver, armed, InterruptCondition::FallingEdge, callback);
        // `bare` still latches falling edges in the raw status
        driver.set_input(bare, true);
        driver.set_input(bare, false);
        driver.set_input(armed, true);
        driver.set_input(armed, false);

        table.dispatch(&driver, 0);
        assert_eq!(HITS.load(Ordering::SeqCst), 1);
        assert_eq!(driver.pending_mask(0), 0);
    }

    #[test]
    fn test_install_registers_every_port() {
        let driver = MockDriver::new();
        install(&driver);

        for port in PORTS.iter() {
            assert!(driver.handler(port.irq).is_some());
        }
    }
}
