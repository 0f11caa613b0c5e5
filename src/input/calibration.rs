//! # Calibration Module
//!
//! Applies deadzones and exponential curves to stick inputs.
//!
//! The formula used is: `output = (1 - expo) * input + expo * input³`,
//! applied after the deadzone has been cut out and the remaining travel
//! rescaled to the full range.
//!
//! ```
//! use helicmax_link::input::calibration::Calibration;
//!
//! let cal = Calibration::new(0.05, 0.3);
//! assert_eq!(cal.apply(0.02), 0.0);
//! assert!((cal.apply(1.0) - 1.0).abs() < 0.001);
//! ```

use crate::config::ControllerConfig;

/// Deadzone and expo for one stick axis, on the -1.0..=1.0 range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Center travel ignored, 0.0 to 0.25
    deadzone: f32,
    /// Cubic blend, 0.0 (linear) to 1.0
    expo: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(0.05, 0.0)
    }
}

impl Calibration {
    /// Out-of-range parameters are clamped
    #[must_use]
    pub fn new(deadzone: f32, expo: f32) -> Self {
        Self {
            deadzone: deadzone.clamp(0.0, 0.25),
            expo: expo.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn linear() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Calibrated value of a normalized stick reading
    #[must_use]
    pub fn apply(&self, input: f32) -> f32 {
        let input = input.clamp(-1.0, 1.0);
        let travel = input.abs();
        if travel <= self.deadzone {
            return 0.0;
        }

        let x = (travel - self.deadzone) / (1.0 - self.deadzone);
        input.signum() * ((1.0 - self.expo) * x + self.expo * x.powi(3))
    }
}

/// Calibration for each control axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisCalibration {
    pub horizontal: Calibration,
    pub vertical: Calibration,
    /// Applied to the centered throttle stick before it is offset to 0..2
    pub throttle: Calibration,
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

impl AxisCalibration {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            horizontal: Calibration::new(config.deadzone_stick, config.expo_horizontal),
            vertical: Calibration::new(config.deadzone_stick, config.expo_vertical),
            throttle: Calibration::new(config.deadzone_stick, config.expo_throttle),
        }
    }
}
