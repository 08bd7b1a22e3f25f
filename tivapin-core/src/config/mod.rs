//! Configuration types
//!
//! Pin identity and the chip's port table live in [`hardware`]; the
//! per-pin electrical configuration and its register encodings in
//! [`types`].

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
