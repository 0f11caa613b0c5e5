//! # Control Frame Layout
//!
//! Core wire definitions for the HelicMax control plane.
//!
//! ```text
//! offset  0..=7   template header (opaque)
//! offset  8       horizontal axis   (0-255, 127 = center)
//! offset  9       vertical axis     (0-255, 127 = center)
//! offset 10       throttle          (0-255)
//! offset 11       template byte, covered by the checksum (opaque)
//! offset 12       template byte (opaque)
//! offset 13       XOR of offsets 8..=11
//! ```

use super::checksum::xor_checksum;
use crate::error::{HelicLinkError, Result};

/// Control frame length in bytes
pub const FRAME_LEN: usize = 14;

/// Horizontal axis byte offset
pub const HORIZONTAL_OFFSET: usize = 8;

/// Vertical axis byte offset
pub const VERTICAL_OFFSET: usize = 9;

/// Throttle byte offset
pub const THROTTLE_OFFSET: usize = 10;

/// Checksum byte offset
pub const CHECKSUM_OFFSET: usize = 13;

/// Bytes covered by the checksum (offsets 8 to 11 inclusive)
pub const CHECKSUM_RANGE: std::ops::Range<usize> = HORIZONTAL_OFFSET..12;

/// Built-in wake datagram
///
/// Placeholder bytes: the real device value has not been captured. Override
/// it with `wake_packet` under `[protocol]` in the config.
const WAKE_PACKET: [u8; 7] = [0x63, 0x63, 0x01, 0x00, 0x00, 0x00, 0x00];

/// Built-in rest-state control frame, checksum precomputed
///
/// Placeholder bytes that follow the known layout (axis offsets, opaque byte
/// 11, XOR checksum) but not a captured device frame. Override it with
/// `neutral_template` under `[protocol]` in the config.
const NEUTRAL_TEMPLATE: [u8; FRAME_LEN] = [
    0x63, 0x63, 0x0A, 0x00, 0x00, 0x08, 0x00, 0x66, // header
    0x80, 0x80, 0x00, 0x80, // horizontal, vertical, throttle, opaque
    0x00, // opaque
    0x80, // checksum
];

/// The wake datagram. Send exactly once, before the first control frame.
#[must_use]
pub fn wake_packet() -> &'static [u8] {
    &WAKE_PACKET
}

/// The neutral control frame used as the base for every encoded frame.
#[must_use]
pub fn neutral_template() -> ControlFrame {
    ControlFrame {
        bytes: NEUTRAL_TEMPLATE,
    }
}

/// One 14-byte control datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFrame {
    bytes: [u8; FRAME_LEN],
}

impl ControlFrame {
    /// Build a frame from raw bytes, e.g. a template override from config
    ///
    /// # Errors
    ///
    /// Returns `Protocol` error if the length is not 14 bytes or the checksum
    /// byte does not match offsets 8 to 11.
    ///
    /// # Examples
    ///
    /// ```
    /// use helicmax_link::protocol::ControlFrame;
    ///
    /// let frame = ControlFrame::from_bytes(&[0u8; 14])?;
    /// assert_eq!(frame.checksum(), 0);
    /// assert!(ControlFrame::from_bytes(&[0u8; 13]).is_err());
    /// # Ok::<(), helicmax_link::error::HelicLinkError>(())
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let bytes: [u8; FRAME_LEN] = data.try_into().map_err(|_| {
            HelicLinkError::Protocol(format!(
                "control frame must be {} bytes, got {}",
                FRAME_LEN,
                data.len()
            ))
        })?;

        let frame = Self { bytes };
        frame.verify()?;
        Ok(frame)
    }

    /// Check the checksum invariant
    ///
    /// # Errors
    ///
    /// Returns `Protocol` error naming the expected and stored checksum.
    pub fn verify(&self) -> Result<()> {
        let expected = self.expected_checksum();
        if self.checksum() != expected {
            return Err(HelicLinkError::Protocol(format!(
                "checksum mismatch: expected 0x{:02x}, found 0x{:02x}",
                expected,
                self.checksum()
            )));
        }
        Ok(())
    }

    pub fn horizontal(&self) -> u8 {
        self.bytes[HORIZONTAL_OFFSET]
    }

    pub fn vertical(&self) -> u8 {
        self.bytes[VERTICAL_OFFSET]
    }

    pub fn throttle(&self) -> u8 {
        self.bytes[THROTTLE_OFFSET]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[CHECKSUM_OFFSET]
    }

    /// Raw datagram bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Write the three control bytes and recompute the checksum.
    pub(crate) fn stamp(&mut self, horizontal: u8, vertical: u8, throttle: u8) {
        self.bytes[HORIZONTAL_OFFSET] = horizontal;
        self.bytes[VERTICAL_OFFSET] = vertical;
        self.bytes[THROTTLE_OFFSET] = throttle;
        self.bytes[CHECKSUM_OFFSET] = self.expected_checksum();
    }

    fn expected_checksum(&self) -> u8 {
        xor_checksum(&self.bytes[CHECKSUM_RANGE])
    }
}

impl AsRef<[u8]> for ControlFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(FRAME_LEN, 14);
        assert_eq!(HORIZONTAL_OFFSET, 8);
        assert_eq!(VERTICAL_OFFSET, 9);
        assert_eq!(THROTTLE_OFFSET, 10);
        assert_eq!(CHECKSUM_OFFSET, 13);
        assert_eq!(CHECKSUM_RANGE.len(), 4);
    }

    #[test]
    fn test_neutral_template_is_valid() {
        let template = neutral_template();
        assert_eq!(template.as_bytes().len(), FRAME_LEN);
        assert!(template.verify().is_ok());
        assert_eq!(template.throttle(), 0x00);
    }

    #[test]
    fn test_wake_packet_is_not_a_control_frame() {
        assert!(!wake_packet().is_empty());
        assert_ne!(wake_packet().len(), FRAME_LEN);
    }

    #[test]
    fn test_from_bytes_rejects_bad_length() {
        let err = ControlFrame::from_bytes(&[0u8; 15]).unwrap_err();
        assert!(err.to_string().contains("14 bytes"));
    }

    #[test]
    fn test_from_bytes_rejects_bad_checksum() {
        let mut bytes = NEUTRAL_TEMPLATE;
        bytes[CHECKSUM_OFFSET] ^= 0x01;
        let err = ControlFrame::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, HelicLinkError::Protocol(_)));
    }

    #[test]
    fn test_checksum_ignores_opaque_byte_12() {
        let mut bytes = NEUTRAL_TEMPLATE;
        bytes[12] = 0xEE;
        assert!(ControlFrame::from_bytes(&bytes).is_ok());
    }

    #[test]
    fn test_stamp_recomputes_checksum() {
        let mut frame = neutral_template();
        frame.stamp(0x10, 0x20, 0x30);
        assert_eq!(frame.horizontal(), 0x10);
        assert_eq!(frame.vertical(), 0x20);
        assert_eq!(frame.throttle(), 0x30);
        assert_eq!(frame.checksum(), 0x10 ^ 0x20 ^ 0x30 ^ 0x80);
        assert!(frame.verify().is_ok());
    }
}
