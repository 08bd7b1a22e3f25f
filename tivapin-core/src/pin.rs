//! Single-pin controller
//!
//! A [`PinController`] owns one pin's identity and its last applied
//! configuration. Every configuration change is pushed to hardware in full,
//! so the stored record and the registers never drift apart.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use tivapin_hal::GpioDriver;

use crate::config::{DriveStrength, PinConfig, PinDirection, PinId, PinMode};
use crate::dispatch::{InterruptCondition, CALLBACKS};
use crate::error::Error;

/// One GPIO pin
pub struct PinController<D: GpioDriver> {
    driver: D,
    id: PinId,
    config: PinConfig,
}

impl<D: GpioDriver> PinController<D> {
    /// Take control of pin `pin` on port `port`
    ///
    /// Enables the port clock and sets the pin to the default configuration
    /// (input, push-pull, 2mA).
    ///
    /// # Panics
    ///
    /// If `port` or `pin` is out of range. No register is touched.
    pub fn new(driver: D, port: u8, pin: u8) -> Self {
        Self::from_id(driver, PinId::new(port, pin))
    }

    /// Like [`new`](Self::new), rejecting out-of-range indices
    pub fn try_new(driver: D, port: u8, pin: u8) -> Result<Self, Error> {
        PinId::try_new(port, pin).map(|id| Self::from_id(driver, id))
    }

    /// Take control of the pin named by `id` with the default configuration
    pub fn from_id(driver: D, id: PinId) -> Self {
        Self::with_config(driver, id, PinConfig::default())
    }

    /// Take control of the pin named by `id` and apply `config`
    pub fn with_config(driver: D, id: PinId, config: PinConfig) -> Self {
        driver.enable_peripheral(id.port_info().periph);
        driver.settle_delay();

        let mut pin = Self { driver, id, config };
        pin.apply();

        #[cfg(feature = "defmt")]
        defmt::trace!("gpio: {} constructed", id);

        pin
    }

    /// Pin identity
    pub fn id(&self) -> PinId {
        self.id
    }

    /// Last applied configuration
    pub fn config(&self) -> PinConfig {
        self.config
    }

    /// Apply a full configuration
    ///
    /// Direction and pad registers are rewritten even for unchanged fields.
    pub fn configure(&mut self, direction: PinDirection, mode: PinMode, drive: DriveStrength) {
        self.set_config(PinConfig::new(direction, mode, drive));
    }

    /// Apply a full configuration given as raw byte values
    ///
    /// Nothing is written when any value is out of range.
    pub fn configure_raw(&mut self, direction: u8, mode: u8, drive: u8) -> Result<(), Error> {
        let config = PinConfig::from_raw(direction, mode, drive)?;
        self.set_config(config);
        Ok(())
    }

    /// Apply a full configuration record
    pub fn set_config(&mut self, config: PinConfig) {
        self.config = config;
        self.apply();

        #[cfg(feature = "defmt")]
        defmt::trace!("gpio: {} configured {}", self.id, config);
    }

    /// Change only the direction
    pub fn set_direction(&mut self, direction: PinDirection) {
        let PinConfig { mode, drive, .. } = self.config;
        self.configure(direction, mode, drive);
    }

    /// Change only the pad mode
    pub fn set_mode(&mut self, mode: PinMode) {
        let PinConfig {
            direction, drive, ..
        } = self.config;
        self.configure(direction, mode, drive);
    }

    /// Change only the drive strength
    pub fn set_drive_strength(&mut self, drive: DriveStrength) {
        let PinConfig {
            direction, mode, ..
        } = self.config;
        self.configure(direction, mode, drive);
    }

    /// Drive the pin high for a nonzero `level`, low otherwise
    ///
    /// The output latch is written whatever the direction; an input pin
    /// drives the latched level once switched to output.
    pub fn write(&mut self, level: u8) {
        let port = self.id.port_info();
        let mask = self.id.mask();
        let value = if level != 0 { mask } else { 0 };
        self.driver.write_pin(port.base, mask, value);
    }

    /// Invert the pin's current level
    ///
    /// Read-modify-write; not atomic with respect to other writers.
    pub fn toggle(&mut self) {
        let level = self.read();
        self.write(level ^ 1);
    }

    /// Sample the pin: 1 if high, 0 if low
    pub fn read(&self) -> u8 {
        let port = self.id.port_info();
        let mask = self.id.mask();
        u8::from(self.driver.read_pin(port.base, mask) != 0)
    }

    /// Run `callback` from the port interrupt whenever `condition` occurs
    ///
    /// Replaces any callback attached earlier.
    /// [`InterruptCondition::None`] does nothing.
    pub fn attach_callback(&mut self, condition: InterruptCondition, callback: fn()) {
        CALLBACKS.attach(&self.driver, self.id, condition, callback);
    }

    /// Remove the pin's callback and mask its interrupt
    pub fn detach_callback(&mut self) {
        CALLBACKS.detach(&self.driver, self.id);
    }

    /// Release the driver handle
    pub fn free(self) -> D {
        self.driver
    }

    fn apply(&mut self) {
        let port = self.id.port_info();
        let mask = self.id.mask();

        self.driver
            .set_pin_direction(port.base, mask, self.config.direction.dir_mode());
        self.driver.set_pad_config(
            port.base,
            mask,
            self.config.drive.pad_strength(),
            self.config.mode.pad_type(),
        );
    }
}

impl<D: GpioDriver> ErrorType for PinController<D> {
    type Error = Infallible;
}

impl<D: GpioDriver> OutputPin for PinController<D> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(0);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(1);
        Ok(())
    }
}

impl<D: GpioDriver> StatefulOutputPin for PinController<D> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read() != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read() == 0)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        PinController::toggle(self);
        Ok(())
    }
}

impl<D: GpioDriver> InputPin for PinController<D> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read() != 0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read() == 0)
    }
}
