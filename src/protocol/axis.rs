//! Normalized stick state consumed by the encoder.

/// Horizontal/vertical/throttle snapshot
///
/// Horizontal and vertical are in -1.0..=1.0 with 0.0 at rest. Throttle is in
/// 0.0..=2.0 where 1.0 is stick center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisState {
    pub horizontal: f32,
    pub vertical: f32,
    pub throttle: f32,
}

impl AxisState {
    /// Rest position: both axes centered, throttle at zero.
    pub const REST: AxisState = AxisState {
        horizontal: 0.0,
        vertical: 0.0,
        throttle: 0.0,
    };

    #[must_use]
    pub fn new(horizontal: f32, vertical: f32, throttle: f32) -> Self {
        Self {
            horizontal,
            vertical,
            throttle,
        }
    }
}
