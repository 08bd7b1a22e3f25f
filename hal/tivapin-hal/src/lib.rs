//! tivapin Hardware Abstraction Layer
//!
//! This crate defines the peripheral driver capability that the pin
//! controller and interrupt dispatch table are written against. Chip crates
//! (TM4C123, a host-side mock, etc.) implement it; the core never touches a
//! register directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (tivapin-firmware, etc.)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tivapin-core (PinController, dispatch) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tivapin-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ tivapin-hal-  │       │ tivapin-core  │
//! │   tm4c123     │       │ MockDriver    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioDriver`] - Port clocking, pad setup, pin I/O and interrupt control

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

// Re-export key items at crate root for convenience
pub use gpio::{DirMode, GpioDriver, Handler, IntType, PadStrength, PadType};
