//! # Control Frame Encoder
//!
//! Stamps an [`AxisState`] snapshot into a copy of the frame template.

use super::axis::AxisState;
use super::frame::ControlFrame;

/// Scale factor between normalized axis values and wire bytes
pub const AXIS_SCALE: f32 = 127.0;

/// Encode an axis snapshot into a new control frame
///
/// The template is copied, never mutated, so the same base can be reused on
/// every tick.
///
/// # Arguments
///
/// * `base` - Frame template (usually [`neutral_template`](super::neutral_template))
/// * `axis` - Current stick snapshot
///
/// # Returns
///
/// * `ControlFrame` - Frame with axis bytes and checksum filled in
///
/// # Examples
///
/// ```
/// use helicmax_link::protocol::{encode_frame, neutral_template, AxisState};
///
/// let frame = encode_frame(&neutral_template(), &AxisState::new(0.0, 0.0, 1.0));
/// assert_eq!(frame.horizontal(), 127);
/// assert_eq!(frame.vertical(), 127);
/// assert_eq!(frame.throttle(), 127);
/// ```
#[must_use]
pub fn encode_frame(base: &ControlFrame, axis: &AxisState) -> ControlFrame {
    let mut frame = *base;
    frame.stamp(
        axis_to_byte(axis.horizontal + 1.0),
        axis_to_byte(axis.vertical + 1.0),
        axis_to_byte(axis.throttle),
    );
    frame
}

/// Encode the frame that stops the rotors
///
/// Axes stay at whatever the template holds, throttle is forced to zero.
#[must_use]
pub fn encode_disarm_frame(base: &ControlFrame) -> ControlFrame {
    let mut frame = *base;
    frame.stamp(frame.horizontal(), frame.vertical(), 0);
    frame
}

/// Map a value in 0.0..=2.0 to a wire byte
///
/// Rounds half away from zero, then saturates to 0..=255. NaN maps to 0.
#[inline]
pub fn axis_to_byte(value: f32) -> u8 {
    (value * AXIS_SCALE).round().clamp(0.0, 255.0) as u8
}
