//! Port table and pin identity
//!
//! The TM4C123 exposes six GPIO ports (A-F) of eight pins each on the APB
//! aperture. Each port has its own clock-gate bit in RCGCGPIO and its own
//! NVIC line.

use core::fmt;

use crate::error::Error;

/// Number of GPIO ports
pub const PORT_COUNT: usize = 6;

/// Pins per GPIO port
pub const PINS_PER_PORT: usize = 8;

/// Hardware description of one GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortInfo {
    /// Register block base address (APB aperture)
    pub base: u32,
    /// Peripheral clock id (RCGCGPIO bit index)
    pub periph: u32,
    /// NVIC interrupt number
    pub irq: u16,
}

/// Port table, indexed by port index
pub static PORTS: [PortInfo; PORT_COUNT] = [
    PortInfo { base: 0x4000_4000, periph: 0, irq: 0 },  // A
    PortInfo { base: 0x4000_5000, periph: 1, irq: 1 },  // B
    PortInfo { base: 0x4000_6000, periph: 2, irq: 2 },  // C
    PortInfo { base: 0x4000_7000, periph: 3, irq: 3 },  // D
    PortInfo { base: 0x4002_4000, periph: 4, irq: 4 },  // E
    PortInfo { base: 0x4002_5000, periph: 5, irq: 30 }, // F
];

/// Port letters, indexed by port index
const PORT_NAMES: [char; PORT_COUNT] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Identity of one GPIO pin
///
/// Fixed at construction. This is the key for configuration and for the
/// callback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    port: u8,
    pin: u8,
}

impl PinId {
    /// Create a pin identity
    ///
    /// # Panics
    ///
    /// If `port >= PORT_COUNT` or `pin >= PINS_PER_PORT`. In a const
    /// context this is a compile error.
    pub const fn new(port: u8, pin: u8) -> Self {
        assert!((port as usize) < PORT_COUNT, "port index out of range");
        assert!((pin as usize) < PINS_PER_PORT, "pin index out of range");
        Self { port, pin }
    }

    /// Create a pin identity, rejecting out-of-range indices
    pub const fn try_new(port: u8, pin: u8) -> Result<Self, Error> {
        if port as usize >= PORT_COUNT {
            return Err(Error::InvalidPort(port));
        }
        if pin as usize >= PINS_PER_PORT {
            return Err(Error::InvalidPin(pin));
        }
        Ok(Self { port, pin })
    }

    /// Port index
    pub const fn port(self) -> u8 {
        self.port
    }

    /// Pin index within the port
    pub const fn pin(self) -> u8 {
        self.pin
    }

    /// Single-bit mask of this pin within its port
    pub const fn mask(self) -> u8 {
        1 << self.pin
    }

    /// Hardware description of this pin's port
    pub fn port_info(self) -> &'static PortInfo {
        &PORTS[self.port as usize]
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", PORT_NAMES[self.port as usize], self.pin)
    }
}

/// Parse a pin string from config
///
/// Supports formats:
/// - "PF2" -> (Port F, Pin 2, false)
/// - "!PF4" -> (Port F, Pin 4, true/inverted)
///
/// The port letter is case-insensitive.
pub fn parse_pin_string(s: &str) -> Option<(PinId, bool)> {
    let s = s.trim();

    let (s, inverted) = match s.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    let mut chars = s.chars();
    if !matches!(chars.next(), Some('P' | 'p')) {
        return None;
    }

    let letter = chars.next()?.to_ascii_uppercase();
    let port = PORT_NAMES.iter().position(|&c| c == letter)?;

    let pin_str = chars.as_str();
    if pin_str.len() != 1 {
        return None;
    }
    let pin: u8 = pin_str.parse().ok()?;

    PinId::try_new(port as u8, pin)
        .ok()
        .map(|id| (id, inverted))
}
