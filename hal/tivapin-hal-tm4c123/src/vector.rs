//! RAM vector table and NVIC line control
//!
//! Handlers registered at runtime live in a copy of the vector table in
//! RAM. The first registration copies the active table and points
//! `SCB.VTOR` at the copy.

use core::cell::UnsafeCell;

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::{NVIC, SCB};
use tivapin_hal::Handler;

/// System exception vectors ahead of the first interrupt
const EXCEPTIONS: usize = 16;

/// Interrupt lines on the TM4C123 NVIC
pub const IRQ_COUNT: usize = 139;

const VECTORS: usize = EXCEPTIONS + IRQ_COUNT;

/// VTOR requires alignment to the table size rounded up to a power of two
#[repr(C, align(1024))]
struct VectorTable(UnsafeCell<[usize; VECTORS]>);

// SAFETY: written only inside critical sections; the NVIC reads it.
unsafe impl Sync for VectorTable {}

static RAM_TABLE: VectorTable = VectorTable(UnsafeCell::new([0; VECTORS]));

#[derive(Debug, Clone, Copy)]
struct Irq(u16);

// SAFETY: only numbers below IRQ_COUNT reach the NVIC.
unsafe impl InterruptNumber for Irq {
    fn number(self) -> u16 {
        self.0
    }
}

const fn vector_index(irq: u16) -> usize {
    EXCEPTIONS + irq as usize
}

/// Point VTOR at the RAM table, copying the active table first
///
/// The active table holds at least `VECTORS` entries; `cortex-m-rt` emits
/// 240 interrupt vectors when built without a device crate.
fn relocate(table: *mut usize) {
    // SAFETY: SCB is a fixed core peripheral; VTOR is only written here.
    let scb = unsafe { &*SCB::PTR };
    let ram = table as u32;
    let active = scb.vtor.read();

    if active == ram {
        return;
    }

    let flash = active as usize as *const usize;
    for i in 0..VECTORS {
        // SAFETY: `i` is inside both tables.
        unsafe { table.add(i).write_volatile(flash.add(i).read_volatile()) };
    }

    // SAFETY: the RAM table is a complete copy of the active one.
    unsafe { scb.vtor.write(ram) };
    cortex_m::asm::dsb();

    #[cfg(feature = "defmt")]
    defmt::debug!("vector: table relocated to {=u32:#x}", ram);
}

/// Install `handler` as the vector of interrupt line `irq`
///
/// # Panics
///
/// If `irq >= IRQ_COUNT`.
pub fn register(irq: u16, handler: Handler) {
    assert!((irq as usize) < IRQ_COUNT, "interrupt line out of range");

    cortex_m::interrupt::free(|_| {
        let table = RAM_TABLE.0.get() as *mut usize;
        relocate(table);

        // SAFETY: index checked above; inside a critical section.
        unsafe {
            table
                .add(vector_index(irq))
                .write_volatile(handler as usize)
        };
    });
}

/// Enable interrupt line `irq` at the NVIC
///
/// # Panics
///
/// If `irq >= IRQ_COUNT`.
pub fn enable_irq(irq: u16) {
    assert!((irq as usize) < IRQ_COUNT, "interrupt line out of range");

    // SAFETY: a line is only enabled once its handler is registered.
    unsafe { NVIC::unmask(Irq(irq)) };
}
