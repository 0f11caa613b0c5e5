//! # XOR Checksum
//!
//! Single-byte XOR checksum used by the drone to validate control frames.
//!
//! The checksum covers the four control bytes (offsets 8 to 11) and is stored
//! at offset 13.

/// XOR all bytes together
///
/// # Examples
///
/// ```
/// use helicmax_link::protocol::checksum::xor_checksum;
///
/// assert_eq!(xor_checksum(&[0x7F, 0x7F, 0x7F, 0x80]), 0xFF);
/// assert_eq!(xor_checksum(&[]), 0x00);
/// ```
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &byte| acc ^ byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_empty() {
        assert_eq!(xor_checksum(&[]), 0x00);
    }

    #[test]
    fn test_xor_single_byte() {
        assert_eq!(xor_checksum(&[0xA5]), 0xA5);
    }

    #[test]
    fn test_xor_self_cancels() {
        assert_eq!(xor_checksum(&[0x3C, 0x3C]), 0x00);
        assert_eq!(xor_checksum(&[0x12, 0x34, 0x12, 0x34]), 0x00);
    }

    #[test]
    fn test_xor_order_independent() {
        assert_eq!(
            xor_checksum(&[0x01, 0x02, 0x04, 0x08]),
            xor_checksum(&[0x08, 0x04, 0x02, 0x01])
        );
        assert_eq!(xor_checksum(&[0x01, 0x02, 0x04, 0x08]), 0x0F);
    }
}
