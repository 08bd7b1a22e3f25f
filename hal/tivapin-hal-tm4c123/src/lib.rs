//! TM4C123-specific HAL for tivapin
//!
//! Register-level implementation of [`tivapin_hal::GpioDriver`] for the
//! TM4C123 family (EK-TM4C123GXL LaunchPad and similar boards).
//!
//! - [`gpio`]: the GPIO register block and [`Tm4c123Gpio`]
//! - [`sysctl`]: peripheral clock gating and system clock setup
//! - [`vector`]: RAM vector table and NVIC line control
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod gpio;
pub mod sysctl;
pub mod vector;

pub use gpio::Tm4c123Gpio;
