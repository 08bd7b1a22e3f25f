//! Board-agnostic GPIO pin control for Tiva C microcontrollers
//!
//! This crate contains everything above the register layer:
//!
//! - Pin identity and the port table
//! - Pin configuration types and their register encodings
//! - [`PinController`]: one pin's configuration and level I/O
//! - [`DispatchTable`]: per-pin interrupt callbacks serviced from the
//!   port interrupt handlers
//!
//! Hardware access goes through [`tivapin_hal::GpioDriver`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod pin;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{DriveStrength, PinConfig, PinDirection, PinId, PinMode};
pub use dispatch::{install, DispatchTable, InterruptCondition, CALLBACKS};
pub use error::Error;
pub use pin::PinController;
