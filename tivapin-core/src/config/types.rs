//! Pin configuration types
//!
//! Abstract direction, pad mode and drive strength, and their translation
//! to the register codes the peripheral driver takes. Every enumeration has
//! a stable `u8` encoding so raw values from outside a typed API can be
//! validated at the boundary.

use tivapin_hal::{DirMode, PadStrength, PadType};

use crate::error::Error;

/// Number of [`PinDirection`] values
pub const DIRECTION_TOTAL: u8 = 2;

/// Number of [`PinMode`] values
pub const MODE_TOTAL: u8 = 7;

/// Number of [`DriveStrength`] values
pub const DRIVE_TOTAL: u8 = 4;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PinDirection {
    /// Input
    #[default]
    In = 0,
    /// Output
    Out = 1,
}

impl PinDirection {
    /// Get the direction as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a direction from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PinDirection::In),
            1 => Some(PinDirection::Out),
            _ => None,
        }
    }

    /// Direction register code
    pub fn dir_mode(self) -> DirMode {
        match self {
            PinDirection::In => DirMode::IN,
            PinDirection::Out => DirMode::OUT,
        }
    }
}

impl TryFrom<u8> for PinDirection {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(Error::InvalidDirection(value))
    }
}

/// Electrical pad mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PinMode {
    /// Push-pull
    #[default]
    Standard = 0,
    /// Push-pull with weak pull-up
    StandardPullUp = 1,
    /// Push-pull with weak pull-down
    StandardPullDown = 2,
    /// Open-drain
    OpenDrain = 3,
    /// Open-drain with weak pull-up
    OpenDrainPullUp = 4,
    /// Open-drain with weak pull-down
    OpenDrainPullDown = 5,
    /// Analog (digital function disabled)
    Analog = 6,
}

impl PinMode {
    /// Get the mode as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a mode from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PinMode::Standard),
            1 => Some(PinMode::StandardPullUp),
            2 => Some(PinMode::StandardPullDown),
            3 => Some(PinMode::OpenDrain),
            4 => Some(PinMode::OpenDrainPullUp),
            5 => Some(PinMode::OpenDrainPullDown),
            6 => Some(PinMode::Analog),
            _ => None,
        }
    }

    /// Pad type register code
    pub fn pad_type(self) -> PadType {
        match self {
            PinMode::Standard => PadType::STD,
            PinMode::StandardPullUp => PadType::STD_WPU,
            PinMode::StandardPullDown => PadType::STD_WPD,
            PinMode::OpenDrain => PadType::OD,
            PinMode::OpenDrainPullUp => PadType::OD_WPU,
            PinMode::OpenDrainPullDown => PadType::OD_WPD,
            PinMode::Analog => PadType::ANALOG,
        }
    }
}

impl TryFrom<u8> for PinMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(Error::InvalidMode(value))
    }
}

/// Output drive strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DriveStrength {
    /// 2mA
    #[default]
    Ma2 = 0,
    /// 4mA
    Ma4 = 1,
    /// 8mA
    Ma8 = 2,
    /// 8mA with slew rate control
    Ma8SlewControlled = 3,
}

impl DriveStrength {
    /// Get the strength as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a strength from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DriveStrength::Ma2),
            1 => Some(DriveStrength::Ma4),
            2 => Some(DriveStrength::Ma8),
            3 => Some(DriveStrength::Ma8SlewControlled),
            _ => None,
        }
    }

    /// Drive strength register code
    pub fn pad_strength(self) -> PadStrength {
        match self {
            DriveStrength::Ma2 => PadStrength::MA2,
            DriveStrength::Ma4 => PadStrength::MA4,
            DriveStrength::Ma8 => PadStrength::MA8,
            DriveStrength::Ma8SlewControlled => PadStrength::MA8_SC,
        }
    }
}

impl TryFrom<u8> for DriveStrength {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(Error::InvalidDrive(value))
    }
}

/// Complete configuration of one pin
///
/// The default (input, push-pull, 2mA) is what a freshly constructed pin
/// is set to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// Direction
    pub direction: PinDirection,
    /// Pad mode
    pub mode: PinMode,
    /// Drive strength
    pub drive: DriveStrength,
}

impl PinConfig {
    /// Create a pin config
    pub const fn new(direction: PinDirection, mode: PinMode, drive: DriveStrength) -> Self {
        Self {
            direction,
            mode,
            drive,
        }
    }

    /// Push-pull output at the given drive strength
    pub const fn output(drive: DriveStrength) -> Self {
        Self::new(PinDirection::Out, PinMode::Standard, drive)
    }

    /// Input with the given pad mode
    pub const fn input(mode: PinMode) -> Self {
        Self::new(PinDirection::In, mode, DriveStrength::Ma2)
    }

    /// Build a config from raw byte values
    ///
    /// Fields are checked in order direction, mode, drive; the first
    /// out-of-range value is reported.
    pub fn from_raw(direction: u8, mode: u8, drive: u8) -> Result<Self, Error> {
        Ok(Self {
            direction: PinDirection::try_from(direction)?,
            mode: PinMode::try_from(mode)?,
            drive: DriveStrength::try_from(drive)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PinConfig::default();
        assert_eq!(config.direction, PinDirection::In);
        assert_eq!(config.mode, PinMode::Standard);
        assert_eq!(config.drive, DriveStrength::Ma2);
    }

    #[test]
    fn test_byte_encodings_are_total() {
        for v in 0..DIRECTION_TOTAL {
            assert_eq!(PinDirection::from_u8(v).map(PinDirection::as_u8), Some(v));
        }
        for v in 0..MODE_TOTAL {
            assert_eq!(PinMode::from_u8(v).map(PinMode::as_u8), Some(v));
        }
        for v in 0..DRIVE_TOTAL {
            assert_eq!(DriveStrength::from_u8(v).map(DriveStrength::as_u8), Some(v));
        }

        assert_eq!(PinDirection::from_u8(DIRECTION_TOTAL), None);
        assert_eq!(PinMode::from_u8(MODE_TOTAL), None);
        assert_eq!(DriveStrength::from_u8(DRIVE_TOTAL), None);
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(
            PinConfig::from_raw(1, 3, 2),
            Ok(PinConfig::new(
                PinDirection::Out,
                PinMode::OpenDrain,
                DriveStrength::Ma8
            ))
        );
        assert_eq!(
            PinConfig::from_raw(0, MODE_TOTAL, 0),
            Err(Error::InvalidMode(MODE_TOTAL))
        );
        assert_eq!(
            PinConfig::from_raw(DIRECTION_TOTAL, MODE_TOTAL, 0),
            Err(Error::InvalidDirection(DIRECTION_TOTAL))
        );
        assert_eq!(
            PinConfig::from_raw(0, 0, DRIVE_TOTAL),
            Err(Error::InvalidDrive(DRIVE_TOTAL))
        );
    }

    #[test]
    fn test_register_codes() {
        assert_eq!(PinDirection::Out.dir_mode(), DirMode::OUT);
        assert_eq!(PinMode::StandardPullUp.pad_type(), PadType::STD_WPU);
        assert_eq!(PinMode::OpenDrainPullDown.pad_type(), PadType::OD_WPD);
        assert_eq!(PinMode::Analog.pad_type(), PadType::ANALOG);
        assert_eq!(DriveStrength::Ma8SlewControlled.pad_strength(), PadStrength::MA8_SC);
    }
}
