//! Error types
//!
//! Every variant is a caller defect caught at the API boundary, before any
//! register is touched. There is no transient error class.

use core::fmt;

/// Rejected pin identity or enumeration value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Port index out of range
    InvalidPort(u8),
    /// Pin index out of range
    InvalidPin(u8),
    /// Raw direction value out of range
    InvalidDirection(u8),
    /// Raw pad mode value out of range
    InvalidMode(u8),
    /// Raw drive strength value out of range
    InvalidDrive(u8),
    /// Raw interrupt condition value out of range
    InvalidCondition(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPort(v) => write!(f, "invalid port index {}", v),
            Error::InvalidPin(v) => write!(f, "invalid pin index {}", v),
            Error::InvalidDirection(v) => write!(f, "invalid direction {}", v),
            Error::InvalidMode(v) => write!(f, "invalid pad mode {}", v),
            Error::InvalidDrive(v) => write!(f, "invalid drive strength {}", v),
            Error::InvalidCondition(v) => write!(f, "invalid interrupt condition {}", v),
        }
    }
}
